//! Outreach campaign controller — turns discovered profiles into paced,
//! deduplicated, retried connection requests.
//!
//! Stop conditions: the campaign-wide success target, and a per-affiliation
//! attempt cap. A failure scraping one affiliation is never fatal to the
//! campaign; the loop moves on to the next one.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::config::CampaignConfig;
use crate::context::RunContext;
use crate::error::{Error, Result};
use crate::executor::{ActionExecutor, OutboundAction};
use crate::ledger::DedupLedger;
use crate::model::{AttemptRecord, CampaignSummary, Target};
use crate::platform::Discovery;

/// Ephemeral, process-lifetime campaign state. Reconstructed each run
/// from the dedup ledger and a fresh discovery pass.
struct CampaignState {
    attempts: Vec<AttemptRecord>,
    successes: u32,
}

/// Orchestrates one campaign run.
pub struct CampaignController {
    discovery: Arc<dyn Discovery>,
    executor: ActionExecutor,
    ctx: RunContext,
    config: CampaignConfig,
}

impl CampaignController {
    pub fn new(
        discovery: Arc<dyn Discovery>,
        executor: ActionExecutor,
        ctx: RunContext,
        config: CampaignConfig,
    ) -> Self {
        Self {
            discovery,
            executor,
            ctx,
            config,
        }
    }

    /// Run the campaign to completion and flush the attempt ledger.
    pub async fn run(&self) -> Result<CampaignSummary> {
        self.ctx.store.ensure_dirs().await.map_err(Error::Storage)?;

        let prior = self.ctx.store.load_attempts().await.map_err(Error::Storage)?;
        let mut ledger = DedupLedger::from_records(&prior);
        info!(
            previously_attempted = ledger.len(),
            "Loaded dedup ledger from prior runs"
        );

        // Randomized bounded pool — no fixed affiliation order across runs.
        let selected = self
            .ctx
            .pacing
            .sample(&self.config.affiliations, self.config.pool_size);
        info!(
            run_id = %self.ctx.run_id,
            selected = ?selected,
            target = self.config.target_connections,
            "Starting campaign run"
        );

        let mut state = CampaignState {
            attempts: Vec::new(),
            successes: 0,
        };

        for (index, affiliation) in selected.iter().enumerate() {
            if state.successes >= self.config.target_connections {
                info!(
                    target = self.config.target_connections,
                    "Reached success target, stopping affiliation loop"
                );
                break;
            }

            if let Err(e) = self.run_affiliation(affiliation, &mut ledger, &mut state).await {
                // Per-unit recoverable: log and move to the next affiliation.
                error!(affiliation = %affiliation, error = %e, "Affiliation failed, continuing");
            }

            let more_to_do = index + 1 < selected.len()
                && state.successes < self.config.target_connections;
            if more_to_do {
                let delay = self.ctx.pacing.inter_batch_delay();
                debug!(
                    affiliation = %affiliation,
                    delay_secs = delay.as_secs(),
                    "Waiting before next affiliation"
                );
                self.ctx.pacing.pause(delay).await;
            }
        }

        if !state.attempts.is_empty() {
            self.ctx
                .store
                .append_attempts(&state.attempts)
                .await
                .map_err(Error::Storage)?;
        }

        info!(
            successes = state.successes,
            target = self.config.target_connections,
            attempts = state.attempts.len(),
            "Connection request summary"
        );

        Ok(CampaignSummary {
            run_id: self.ctx.run_id,
            selected_affiliations: selected,
            attempts: state.attempts.len() as u32,
            successes: state.successes,
            target: self.config.target_connections,
        })
    }

    /// Scrape one affiliation and work through its shuffled batch.
    async fn run_affiliation(
        &self,
        affiliation: &str,
        ledger: &mut DedupLedger,
        state: &mut CampaignState,
    ) -> Result<()> {
        debug!(affiliation = %affiliation, "Scraping affiliation batch");
        let mut rows = self
            .discovery
            .scrape(
                affiliation,
                &self.config.role_filter,
                &self.config.location_filter,
                self.config.batch_size,
            )
            .await
            .map_err(Error::Discovery)?;

        if rows.is_empty() {
            info!(affiliation = %affiliation, "Discovery returned no profiles");
            return Ok(());
        }

        let snapshot = self
            .ctx
            .store
            .write_batch_snapshot(affiliation, &self.ctx.run_id, &rows)
            .await;
        match snapshot {
            Ok(path) => debug!(path = %path.display(), count = rows.len(), "Saved raw batch"),
            Err(e) => warn!(affiliation = %affiliation, error = %e, "Could not save raw batch"),
        }

        // No positional bias in attempt order.
        self.ctx.pacing.shuffle(&mut rows);

        let batch = self.ctx.run_id.to_string();
        let mut affiliation_attempts = 0u32;

        for row in &rows {
            if state.successes >= self.config.target_connections {
                break;
            }
            if affiliation_attempts >= self.config.max_attempts_per_affiliation {
                info!(
                    affiliation = %affiliation,
                    cap = self.config.max_attempts_per_affiliation,
                    "Reached attempt cap for affiliation"
                );
                break;
            }

            let Some(target) = Target::from_row(row, affiliation, &batch) else {
                warn!(
                    name = row.name.as_deref().unwrap_or("?"),
                    "Skipping profile with no resolvable identifier"
                );
                continue;
            };

            if ledger.contains(&target.id) {
                info!(target = %target.id, "Already attempted, skipping");
                continue;
            }

            affiliation_attempts += 1;
            info!(
                target = %target.id,
                name = %target.name,
                affiliation = %affiliation,
                "Attempting connection request"
            );

            let record = self
                .executor
                .execute(&OutboundAction::Connect {
                    target: target.clone(),
                })
                .await;
            let succeeded = record.success;

            ledger.insert(target.id.clone());
            state.attempts.push(record);

            if succeeded {
                state.successes += 1;
                info!(
                    target = %target.id,
                    successes = state.successes,
                    "Connection request sent"
                );
                // Delay only after a successful action — skips and
                // exhausted failures must not stretch the wall clock.
                let delay = self.ctx.pacing.inter_target_delay();
                debug!(delay_secs = delay.as_secs(), "Waiting before next request");
                self.ctx.pacing.pause(delay).await;
            } else {
                warn!(target = %target.id, "Connection request failed after retries");
            }
        }

        Ok(())
    }
}
