//! Follow-up messenger — sends one generated message to each recently
//! accepted connection.
//!
//! Generation failures skip the recipient outright: a default or empty
//! message is never sent in place of a personalized one.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::FollowUpConfig;
use crate::context::RunContext;
use crate::error::{Error, Result};
use crate::executor::{ActionExecutor, OutboundAction};
use crate::model::{AttemptRecord, FollowUpSummary, ProfileFacts};
use crate::platform::{Discovery, MessageGenerator};

/// Orchestrates one follow-up messaging run.
pub struct FollowUpMessenger {
    discovery: Arc<dyn Discovery>,
    generator: Arc<dyn MessageGenerator>,
    executor: ActionExecutor,
    ctx: RunContext,
    config: FollowUpConfig,
}

impl FollowUpMessenger {
    pub fn new(
        discovery: Arc<dyn Discovery>,
        generator: Arc<dyn MessageGenerator>,
        executor: ActionExecutor,
        ctx: RunContext,
        config: FollowUpConfig,
    ) -> Self {
        Self {
            discovery,
            generator,
            executor,
            ctx,
            config,
        }
    }

    /// Message each recent connection with a generated note.
    pub async fn run(&self) -> Result<FollowUpSummary> {
        self.ctx.store.ensure_dirs().await.map_err(Error::Storage)?;

        let connections = self
            .discovery
            .recent_connections(self.config.max_recipients)
            .await
            .map_err(Error::Discovery)?;
        info!(count = connections.len(), "Fetched recent connections");

        let mut summary = FollowUpSummary::default();
        let mut records: Vec<AttemptRecord> = Vec::new();

        for connection in &connections {
            // Restricted/anonymized profiles expose nothing to personalize on.
            if connection.restricted {
                debug!(target = %connection.id, "Skipping restricted profile");
                summary.skipped += 1;
                continue;
            }

            let facts = ProfileFacts::from(connection);
            let body = match self.generator.generate(&facts).await {
                Ok(body) => body,
                Err(e) => {
                    warn!(
                        target = %connection.id,
                        error = %e,
                        "Message generation failed, skipping recipient"
                    );
                    summary.skipped += 1;
                    continue;
                }
            };

            info!(target = %connection.id, name = %connection.name, "Sending follow-up message");
            let record = self
                .executor
                .execute(&OutboundAction::DirectMessage {
                    body,
                    recipient: connection.id.clone(),
                    recipient_name: connection.name.clone(),
                })
                .await;
            let succeeded = record.success;
            records.push(record);

            if succeeded {
                summary.sent += 1;
                let delay = self.ctx.pacing.inter_target_delay();
                debug!(delay_secs = delay.as_secs(), "Waiting before next recipient");
                self.ctx.pacing.pause(delay).await;
            } else {
                warn!(target = %connection.id, "Follow-up message failed after retries");
                summary.failed += 1;
            }
        }

        if !records.is_empty() {
            self.ctx
                .store
                .append_attempts(&records)
                .await
                .map_err(Error::Storage)?;
        }

        info!(
            sent = summary.sent,
            skipped = summary.skipped,
            failed = summary.failed,
            "Follow-up summary"
        );
        Ok(summary)
    }
}
