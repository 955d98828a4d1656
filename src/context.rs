//! Run-scoped context threaded through the controllers.
//!
//! Carries the run identity, the output sinks and the pacing scheduler
//! explicitly — there is no process-global state, which keeps the
//! controllers testable in isolation.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::pacing::PacingScheduler;
use crate::store::OutputStore;

/// Shared per-run dependencies. Cheap to clone; all fields are `Arc`s
/// or small values.
#[derive(Clone)]
pub struct RunContext {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub store: Arc<OutputStore>,
    pub pacing: Arc<PacingScheduler>,
}

impl RunContext {
    pub fn new(store: Arc<OutputStore>, pacing: Arc<PacingScheduler>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            store,
            pacing,
        }
    }
}
