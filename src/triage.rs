//! Inbox triage controller — scans inbound conversations for contact
//! details and acknowledges the ones that yield any.
//!
//! Conversations are processed in the order the platform returns them.
//! Read conversations get metadata-only treatment; unread ones have their
//! full event history re-scanned (there is no incremental cursor, so the
//! whole history is cheap to re-read and nothing is missed). Participant
//! records are persisted for every conversation either way.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::config::TriageConfig;
use crate::context::RunContext;
use crate::error::{Error, Result};
use crate::executor::{ActionExecutor, OutboundAction};
use crate::extract::ContactExtractor;
use crate::model::{AttemptRecord, ContactFact, Conversation, TriageSummary};
use crate::platform::PlatformApi;

/// Orchestrates one triage pass over the inbox.
pub struct TriageController {
    api: Arc<dyn PlatformApi>,
    executor: ActionExecutor,
    extractor: ContactExtractor,
    ctx: RunContext,
    config: TriageConfig,
}

impl TriageController {
    pub fn new(
        api: Arc<dyn PlatformApi>,
        executor: ActionExecutor,
        ctx: RunContext,
        config: TriageConfig,
    ) -> Self {
        Self {
            api,
            executor,
            extractor: ContactExtractor::new(),
            ctx,
            config,
        }
    }

    /// Run one full triage pass.
    pub async fn run(&self) -> Result<TriageSummary> {
        self.ctx.store.ensure_dirs().await.map_err(Error::Storage)?;

        let conversations = self.api.list_conversations().await.map_err(Error::Api)?;
        info!(count = conversations.len(), "Fetched conversations");

        if let Err(e) = self
            .ctx
            .store
            .write_raw_conversations(&conversations, &self.ctx.run_id)
            .await
        {
            warn!(error = %e, "Could not save raw conversation listing");
        }

        let mut summary = TriageSummary::default();
        let mut metas = Vec::with_capacity(conversations.len());
        let mut ack_records: Vec<AttemptRecord> = Vec::new();

        for (index, conversation) in conversations.iter().enumerate() {
            info!(
                index = index + 1,
                total = conversations.len(),
                conversation = %conversation.id,
                unread = conversation.unread_count,
                "Processing conversation"
            );
            summary.conversations += 1;
            metas.push(conversation.meta());

            if conversation.unread_count > 0 {
                summary.unread_processed += 1;
                match self.process_unread(conversation, &mut summary).await {
                    Ok(Some(record)) => ack_records.push(record),
                    Ok(None) => {}
                    Err(e) => {
                        // Per-unit recoverable: next conversation still runs.
                        error!(
                            conversation = %conversation.id,
                            error = %e,
                            "Conversation processing failed, continuing"
                        );
                    }
                }
            } else {
                debug!(conversation = %conversation.id, "No unread messages, metadata only");
            }

            self.persist_participants(conversation, &mut summary).await;
        }

        self.ctx
            .store
            .append_conversations(&metas)
            .await
            .map_err(Error::Storage)?;
        if !ack_records.is_empty() {
            self.ctx
                .store
                .append_attempts(&ack_records)
                .await
                .map_err(Error::Storage)?;
        }

        info!(
            conversations = summary.conversations,
            unread = summary.unread_processed,
            contact_facts = summary.contact_facts,
            acknowledgements = summary.acknowledgements_sent,
            participants = summary.participants_recorded,
            "Triage summary"
        );
        Ok(summary)
    }

    /// Scan every message in an unread conversation and, if any yielded
    /// contact details, send exactly one acknowledgement.
    async fn process_unread(
        &self,
        conversation: &Conversation,
        summary: &mut TriageSummary,
    ) -> Result<Option<AttemptRecord>> {
        let mut contact_found = false;

        for message in &conversation.messages {
            let details = self.extractor.extract(&message.text);
            if details.is_empty() {
                continue;
            }
            contact_found = true;

            let fact = ContactFact {
                conversation_id: conversation.id.clone(),
                message_id: message.id.clone(),
                timestamp: message.created_at,
                phone_numbers: details.phone_numbers,
                emails: details.emails,
            };
            info!(
                conversation = %conversation.id,
                message = %message.id,
                phones = fact.phone_numbers.len(),
                emails = fact.emails.len(),
                "Contact details found"
            );
            self.ctx
                .store
                .append_contact_fact(&fact)
                .await
                .map_err(Error::Storage)?;
            summary.contact_facts += 1;
        }

        if !contact_found {
            return Ok(None);
        }

        // One acknowledgement per conversation, however many messages matched.
        info!(conversation = %conversation.id, "Sending acknowledgement");
        let record = self
            .executor
            .execute(&OutboundAction::ConversationReply {
                body: self.config.ack_message.clone(),
                conversation_id: conversation.id.clone(),
            })
            .await;
        if record.success {
            summary.acknowledgements_sent += 1;
        } else {
            warn!(
                conversation = %conversation.id,
                reason = %record.reason,
                "Acknowledgement failed after retries"
            );
        }
        Ok(Some(record))
    }

    /// Persist a record per participant; individual failures are logged
    /// and skipped.
    async fn persist_participants(&self, conversation: &Conversation, summary: &mut TriageSummary) {
        for participant in &conversation.participants {
            match self.ctx.store.write_participant(participant).await {
                Ok(()) => summary.participants_recorded += 1,
                Err(e) => {
                    error!(
                        conversation = %conversation.id,
                        participant = %participant.public_id,
                        error = %e,
                        "Could not persist participant, continuing"
                    );
                }
            }
        }
    }
}
