//! Leadflow — outreach orchestration engine.
//!
//! Turns a stream of discovered profile identifiers into rate-governed,
//! deduplicated, retried network actions, and mines inbound conversation
//! replies for structured contact facts. Execution is strictly sequential;
//! the pacing scheduler's waits are the only suspension points.

pub mod campaign;
pub mod config;
pub mod context;
pub mod error;
pub mod executor;
pub mod extract;
pub mod followup;
pub mod ledger;
pub mod model;
pub mod pacing;
pub mod platform;
pub mod store;
pub mod triage;
