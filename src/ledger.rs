//! Dedup ledger — target identifiers already acted upon.
//!
//! Loaded at campaign start from all prior attempt records, grows
//! monotonically within a run, never shrinks. A ledgered identifier is
//! never submitted another outbound action in a later run, which makes
//! re-running after a kill naturally idempotent.

use std::collections::HashSet;

use crate::model::{AttemptRecord, TargetId};

/// Set of previously attempted target identifiers.
#[derive(Debug, Default)]
pub struct DedupLedger {
    attempted: HashSet<TargetId>,
}

impl DedupLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the ledger from attempt history. Every record counts —
    /// success or failure, connect or message — an attempted target is
    /// never re-approached.
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a AttemptRecord>) -> Self {
        let attempted = records
            .into_iter()
            .map(|record| record.target_id.clone())
            .collect();
        Self { attempted }
    }

    pub fn contains(&self, id: &TargetId) -> bool {
        self.attempted.contains(id)
    }

    /// Record an attempted target. Returns `false` if it was already present.
    pub fn insert(&mut self, id: TargetId) -> bool {
        self.attempted.insert(id)
    }

    pub fn len(&self) -> usize {
        self.attempted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attempted.is_empty()
    }
}
