//! Action executor — wraps a single outbound network action with bounded
//! retries and per-attempt success classification.
//!
//! Retry is modeled as an explicit state machine
//! (`Pending → Retrying(n) → Succeeded | Exhausted`) so backoff and
//! terminal-record emission are unambiguous. Exactly one `AttemptRecord`
//! is emitted per target once a terminal outcome is reached, regardless
//! of how many attempts it took.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};

use crate::model::{ActionKind, AttemptRecord, Target, TargetId};
use crate::pacing::PacingScheduler;
use crate::platform::PlatformApi;

/// One outbound action to drive to a terminal outcome.
#[derive(Debug, Clone)]
pub enum OutboundAction {
    /// Request a connection with a discovered target.
    Connect { target: Target },
    /// Send a direct message to a connected profile.
    DirectMessage {
        body: String,
        recipient: TargetId,
        recipient_name: String,
    },
    /// Reply into an existing conversation (triage acknowledgement).
    ConversationReply {
        body: String,
        conversation_id: String,
    },
}

impl OutboundAction {
    pub fn kind(&self) -> ActionKind {
        match self {
            Self::Connect { .. } => ActionKind::Connect,
            Self::DirectMessage { .. } | Self::ConversationReply { .. } => ActionKind::Message,
        }
    }

    /// Identifier the terminal record is keyed by.
    fn record_id(&self) -> TargetId {
        match self {
            Self::Connect { target } => target.id.clone(),
            Self::DirectMessage { recipient, .. } => recipient.clone(),
            Self::ConversationReply { conversation_id, .. } => {
                TargetId::new(conversation_id.clone())
            }
        }
    }
}

/// How to read the platform's raw indicators.
///
/// The two mutating calls report outcomes with inconsistent polarity
/// (the connection call returns `true` on failure, the message call
/// returns a truthy error indicator) and neither is verified against
/// current platform behavior, so both are configurable.
#[derive(Debug, Clone)]
pub struct SuccessConvention {
    /// `true`: a truthy connect indicator means the request failed.
    pub connect_indicator_means_failure: bool,
    /// `true`: a truthy message indicator means the send failed.
    pub message_indicator_means_failure: bool,
}

impl Default for SuccessConvention {
    fn default() -> Self {
        Self {
            connect_indicator_means_failure: true,
            message_indicator_means_failure: true,
        }
    }
}

/// Executor tuning.
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    pub convention: SuccessConvention,
    /// Attempts per action, including the first.
    pub max_attempts: u32,
    /// Re-validate target reachability with a read-only lookup before
    /// each mutating connect call.
    pub revalidate_before_connect: bool,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            convention: SuccessConvention::default(),
            max_attempts: 3,
            revalidate_before_connect: true,
        }
    }
}

/// Retry progress for one action.
#[derive(Debug, Clone, PartialEq, Eq)]
enum AttemptState {
    Pending,
    Retrying(u32),
    Succeeded(String),
    Exhausted(String),
}

/// Drives one outbound action to a terminal outcome with bounded retries.
pub struct ActionExecutor {
    api: Arc<dyn PlatformApi>,
    pacing: Arc<PacingScheduler>,
    config: ExecutorConfig,
}

impl ActionExecutor {
    pub fn new(
        api: Arc<dyn PlatformApi>,
        pacing: Arc<PacingScheduler>,
        config: ExecutorConfig,
    ) -> Self {
        Self {
            api,
            pacing,
            config,
        }
    }

    /// Execute an action with bounded retries and return its terminal
    /// record. Transient per-attempt failures are retried with backoff;
    /// only exhaustion produces a failed record.
    pub async fn execute(&self, action: &OutboundAction) -> AttemptRecord {
        let id = action.record_id();
        let mut state = AttemptState::Pending;

        let terminal = loop {
            let attempt = match state {
                AttemptState::Pending => 0,
                AttemptState::Retrying(n) => n,
                AttemptState::Succeeded(_) | AttemptState::Exhausted(_) => break state,
            };

            match self.attempt_once(action).await {
                Ok(detail) => {
                    state = AttemptState::Succeeded(detail);
                }
                Err(reason) => {
                    let next = attempt + 1;
                    if next >= self.config.max_attempts {
                        state = AttemptState::Exhausted(reason);
                    } else {
                        warn!(
                            target = %id,
                            kind = action.kind().label(),
                            attempt = next,
                            reason = %reason,
                            "Attempt failed, retrying"
                        );
                        let delay = self.pacing.retry_backoff(next);
                        self.pacing.pause(delay).await;
                        state = AttemptState::Retrying(next);
                    }
                }
            }
        };

        let (success, reason) = match terminal {
            AttemptState::Succeeded(detail) => (true, detail),
            AttemptState::Exhausted(reason) => (false, reason),
            AttemptState::Pending | AttemptState::Retrying(_) => unreachable!("non-terminal state"),
        };

        debug!(
            target = %id,
            kind = action.kind().label(),
            success,
            reason = %reason,
            "Action reached terminal outcome"
        );

        let (display_name, affiliation) = match action {
            OutboundAction::Connect { target } => {
                (Some(target.name.clone()), Some(target.affiliation.clone()))
            }
            OutboundAction::DirectMessage { recipient_name, .. } => {
                (Some(recipient_name.clone()), None)
            }
            OutboundAction::ConversationReply { .. } => (None, None),
        };

        AttemptRecord {
            target_id: id,
            display_name,
            affiliation,
            kind: action.kind(),
            timestamp: Utc::now(),
            success,
            reason,
        }
    }

    /// One attempt. `Err` carries a human-readable failure reason.
    async fn attempt_once(&self, action: &OutboundAction) -> Result<String, String> {
        match action {
            OutboundAction::Connect { target } => {
                if self.config.revalidate_before_connect {
                    match self.api.lookup(&target.id).await {
                        Ok(Some(_)) => {}
                        Ok(None) => {
                            return Err("profile not found or not accessible".to_string());
                        }
                        Err(e) => return Err(format!("profile lookup failed: {e}")),
                    }
                }
                let indicator = self
                    .api
                    .request_connection(&target.id)
                    .await
                    .map_err(|e| e.to_string())?;
                if self.classify(ActionKind::Connect, indicator) {
                    Ok("connection request sent".to_string())
                } else {
                    Err("platform rejected the connection request".to_string())
                }
            }
            OutboundAction::DirectMessage {
                body, recipient, ..
            } => {
                let indicator = self
                    .api
                    .send_message(body, recipient)
                    .await
                    .map_err(|e| e.to_string())?;
                if self.classify(ActionKind::Message, indicator) {
                    Ok("message sent".to_string())
                } else {
                    Err("platform reported a message send error".to_string())
                }
            }
            OutboundAction::ConversationReply {
                body,
                conversation_id,
            } => {
                let indicator = self
                    .api
                    .reply_to_conversation(conversation_id, body)
                    .await
                    .map_err(|e| e.to_string())?;
                if self.classify(ActionKind::Message, indicator) {
                    Ok("acknowledgement sent".to_string())
                } else {
                    Err("platform reported an acknowledgement send error".to_string())
                }
            }
        }
    }

    /// Map a raw platform indicator to success under the configured
    /// per-action-kind convention.
    fn classify(&self, kind: ActionKind, indicator: bool) -> bool {
        let indicator_means_failure = match kind {
            ActionKind::Connect => self.config.convention.connect_indicator_means_failure,
            ActionKind::Message => self.config.convention.message_indicator_means_failure,
        };
        if indicator_means_failure {
            !indicator
        } else {
            indicator
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pacing::PacingConfig;
    use crate::platform::sim::SimulatedNetwork;

    fn executor(sim: &Arc<SimulatedNetwork>) -> ActionExecutor {
        ActionExecutor::new(
            Arc::clone(sim) as Arc<dyn PlatformApi>,
            Arc::new(PacingScheduler::seeded(PacingConfig::instant(), 1)),
            ExecutorConfig::default(),
        )
    }

    fn connect_action(id: &str) -> OutboundAction {
        OutboundAction::Connect {
            target: Target {
                id: TargetId::new(id),
                name: "Test Target".into(),
                affiliation: "Acme".into(),
                batch: "b1".into(),
            },
        }
    }

    #[tokio::test]
    async fn succeeds_first_attempt_with_one_record() {
        let sim = Arc::new(SimulatedNetwork::new());
        let record = executor(&sim).execute(&connect_action("t1")).await;
        assert!(record.success);
        assert_eq!(record.kind, ActionKind::Connect);
        assert_eq!(sim.connect_calls().len(), 1);
    }

    #[tokio::test]
    async fn retries_twice_then_succeeds() {
        let sim = Arc::new(SimulatedNetwork::new());
        sim.fail_connect("t1", 2);
        let record = executor(&sim).execute(&connect_action("t1")).await;
        assert!(record.success);
        assert_eq!(record.reason, "connection request sent");
        assert_eq!(sim.connect_calls().len(), 3);
    }

    #[tokio::test]
    async fn exhausts_attempts_with_last_reason() {
        let sim = Arc::new(SimulatedNetwork::new());
        sim.fail_connect("t1", 5);
        let record = executor(&sim).execute(&connect_action("t1")).await;
        assert!(!record.success);
        assert_eq!(record.reason, "platform rejected the connection request");
        // max_attempts bounds the mutating calls.
        assert_eq!(sim.connect_calls().len(), 3);
    }

    #[tokio::test]
    async fn failed_lookup_counts_as_attempt_failure_not_abort() {
        let sim = Arc::new(SimulatedNetwork::new());
        sim.mark_profile_missing("ghost");
        let record = executor(&sim).execute(&connect_action("ghost")).await;
        assert!(!record.success);
        assert_eq!(record.reason, "profile not found or not accessible");
        // The mutating call is never made when revalidation fails.
        assert!(sim.connect_calls().is_empty());
    }

    #[tokio::test]
    async fn direct_message_success_records_message_kind() {
        let sim = Arc::new(SimulatedNetwork::new());
        let record = executor(&sim)
            .execute(&OutboundAction::DirectMessage {
                body: "hello".into(),
                recipient: TargetId::new("r1"),
                recipient_name: "R One".into(),
            })
            .await;
        assert!(record.success);
        assert_eq!(record.kind, ActionKind::Message);
        assert_eq!(sim.message_calls().len(), 1);
    }

    #[tokio::test]
    async fn inverted_convention_flips_classification() {
        let sim = Arc::new(SimulatedNetwork::new());
        let exec = ActionExecutor::new(
            Arc::clone(&sim) as Arc<dyn PlatformApi>,
            Arc::new(PacingScheduler::seeded(PacingConfig::instant(), 1)),
            ExecutorConfig {
                convention: SuccessConvention {
                    connect_indicator_means_failure: false,
                    message_indicator_means_failure: true,
                },
                ..ExecutorConfig::default()
            },
        );
        // The sim returns `false` on a good connect; under the inverted
        // convention that now reads as a failure on every attempt.
        let record = exec.execute(&connect_action("t1")).await;
        assert!(!record.success);
    }
}
