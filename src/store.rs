//! Persisted output — append-only attempt ledger, raw batch snapshots,
//! conversation metadata, contact facts and participant records.
//!
//! Layout under the output root:
//! - `attempts.jsonl`        append-only attempt ledger (all runs)
//! - `batches/<slug>_<run>.json`  raw scrape batch per affiliation per run
//! - `conversations.jsonl`   conversation metadata per triage pass
//! - `raw/conversations_<run>.json`  full listing snapshot per triage run
//! - `contact_facts.jsonl`   extracted contact facts
//! - `participants/<id>.json`  one document per participant

use std::path::{Path, PathBuf};

use serde::Serialize;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::warn;
use uuid::Uuid;

use crate::error::StorageError;
use crate::model::{AttemptRecord, ContactFact, Conversation, ConversationMeta, Participant, TargetRow};

const ATTEMPTS_FILE: &str = "attempts.jsonl";
const CONVERSATIONS_FILE: &str = "conversations.jsonl";
const CONTACT_FACTS_FILE: &str = "contact_facts.jsonl";

/// File-backed output store rooted at one directory.
pub struct OutputStore {
    root: PathBuf,
}

impl OutputStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the output directory tree. Idempotent.
    pub async fn ensure_dirs(&self) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root).await?;
        fs::create_dir_all(self.root.join("batches")).await?;
        fs::create_dir_all(self.root.join("raw")).await?;
        fs::create_dir_all(self.root.join("participants")).await?;
        Ok(())
    }

    // ── Attempt ledger ──────────────────────────────────────────────

    /// Append terminal attempt records to the ledger file.
    pub async fn append_attempts(&self, records: &[AttemptRecord]) -> Result<(), StorageError> {
        self.append_lines(ATTEMPTS_FILE, records).await
    }

    /// Load every attempt record from all prior runs.
    ///
    /// A missing file is an empty history. Malformed lines (e.g. a write
    /// truncated by a kill) are skipped with a warning rather than
    /// poisoning the whole ledger.
    pub async fn load_attempts(&self) -> Result<Vec<AttemptRecord>, StorageError> {
        let path = self.root.join(ATTEMPTS_FILE);
        let contents = match fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut records = Vec::new();
        for (line_no, line) in contents.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<AttemptRecord>(line) {
                Ok(record) => records.push(record),
                Err(e) => {
                    warn!(
                        line = line_no + 1,
                        error = %e,
                        "Skipping malformed attempt record"
                    );
                }
            }
        }
        Ok(records)
    }

    // ── Snapshots ───────────────────────────────────────────────────

    /// Persist the raw scrape batch for one affiliation in this run.
    pub async fn write_batch_snapshot(
        &self,
        affiliation: &str,
        run_id: &Uuid,
        rows: &[TargetRow],
    ) -> Result<PathBuf, StorageError> {
        let path = self
            .root
            .join("batches")
            .join(format!("{}_{run_id}.json", slugify(affiliation)));
        let body = serde_json::to_string_pretty(rows)?;
        fs::write(&path, body).await?;
        Ok(path)
    }

    /// Persist the raw conversation listing for one triage run.
    pub async fn write_raw_conversations(
        &self,
        conversations: &[Conversation],
        run_id: &Uuid,
    ) -> Result<PathBuf, StorageError> {
        let path = self
            .root
            .join("raw")
            .join(format!("conversations_{run_id}.json"));
        let body = serde_json::to_string_pretty(conversations)?;
        fs::write(&path, body).await?;
        Ok(path)
    }

    // ── Triage outputs ──────────────────────────────────────────────

    pub async fn append_conversations(
        &self,
        metas: &[ConversationMeta],
    ) -> Result<(), StorageError> {
        self.append_lines(CONVERSATIONS_FILE, metas).await
    }

    pub async fn append_contact_fact(&self, fact: &ContactFact) -> Result<(), StorageError> {
        self.append_lines(CONTACT_FACTS_FILE, std::slice::from_ref(fact))
            .await
    }

    /// Write one participant document keyed by the URN tail.
    pub async fn write_participant(&self, participant: &Participant) -> Result<(), StorageError> {
        let key = participant.urn_tail().ok_or_else(|| {
            StorageError::UnusableRecord(format!(
                "participant has no persistable identifier: {:?}",
                participant.urn
            ))
        })?;
        let path = self
            .root
            .join("participants")
            .join(format!("{}.json", slugify(key)));
        let body = serde_json::to_string_pretty(participant)?;
        fs::write(&path, body).await?;
        Ok(())
    }

    // ── Internals ───────────────────────────────────────────────────

    async fn append_lines<T: Serialize>(
        &self,
        file: &str,
        items: &[T],
    ) -> Result<(), StorageError> {
        if items.is_empty() {
            return Ok(());
        }
        let mut buffer = String::new();
        for item in items {
            buffer.push_str(&serde_json::to_string(item)?);
            buffer.push('\n');
        }
        let mut handle = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.root.join(file))
            .await?;
        handle.write_all(buffer.as_bytes()).await?;
        handle.flush().await?;
        Ok(())
    }
}

/// Filesystem-safe slug for affiliation names and participant keys.
fn slugify(name: &str) -> String {
    let slug: String = name
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    slug.trim_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ActionKind, TargetId};
    use chrono::Utc;

    fn record(id: &str, kind: ActionKind, success: bool) -> AttemptRecord {
        AttemptRecord {
            target_id: TargetId::new(id),
            display_name: None,
            affiliation: Some("Acme".into()),
            kind,
            timestamp: Utc::now(),
            success,
            reason: "test".into(),
        }
    }

    #[tokio::test]
    async fn attempts_append_and_merge_across_writes() {
        let dir = tempfile::tempdir().unwrap();
        let store = OutputStore::new(dir.path());
        store.ensure_dirs().await.unwrap();

        store
            .append_attempts(&[record("a", ActionKind::Connect, true)])
            .await
            .unwrap();
        store
            .append_attempts(&[
                record("b", ActionKind::Connect, false),
                record("c", ActionKind::Message, true),
            ])
            .await
            .unwrap();

        let loaded = store.load_attempts().await.unwrap();
        assert_eq!(loaded.len(), 3);
        assert_eq!(loaded[0].target_id.as_str(), "a");
        assert_eq!(loaded[2].kind, ActionKind::Message);
    }

    #[tokio::test]
    async fn missing_ledger_is_empty_history() {
        let dir = tempfile::tempdir().unwrap();
        let store = OutputStore::new(dir.path());
        assert!(store.load_attempts().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn malformed_ledger_lines_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let store = OutputStore::new(dir.path());
        store.ensure_dirs().await.unwrap();
        store
            .append_attempts(&[record("a", ActionKind::Connect, true)])
            .await
            .unwrap();

        // Simulate a run killed mid-write.
        let path = dir.path().join("attempts.jsonl");
        let mut contents = std::fs::read_to_string(&path).unwrap();
        contents.push_str("{\"target_id\": \"trunc");
        std::fs::write(&path, contents).unwrap();

        let loaded = store.load_attempts().await.unwrap();
        assert_eq!(loaded.len(), 1);
    }

    #[tokio::test]
    async fn batch_snapshot_written_per_affiliation() {
        let dir = tempfile::tempdir().unwrap();
        let store = OutputStore::new(dir.path());
        store.ensure_dirs().await.unwrap();

        let rows = vec![TargetRow {
            profile_id: Some("p1".into()),
            profile_link: None,
            name: Some("P One".into()),
            current_company: Some("Acme India".into()),
        }];
        let run_id = Uuid::new_v4();
        let path = store
            .write_batch_snapshot("Acme India", &run_id, &rows)
            .await
            .unwrap();
        assert!(path.file_name().unwrap().to_string_lossy().starts_with("acme-india_"));
        let body = std::fs::read_to_string(path).unwrap();
        assert!(body.contains("p1"));
    }

    #[tokio::test]
    async fn participant_without_urn_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = OutputStore::new(dir.path());
        store.ensure_dirs().await.unwrap();

        let participant = Participant {
            urn: String::new(),
            first_name: "A".into(),
            last_name: "B".into(),
            occupation: String::new(),
            public_id: String::new(),
        };
        assert!(matches!(
            store.write_participant(&participant).await,
            Err(StorageError::UnusableRecord(_))
        ));
    }

    #[tokio::test]
    async fn participant_written_keyed_by_urn_tail() {
        let dir = tempfile::tempdir().unwrap();
        let store = OutputStore::new(dir.path());
        store.ensure_dirs().await.unwrap();

        let participant = Participant {
            urn: "urn:member:abc123".into(),
            first_name: "Asha".into(),
            last_name: "Rao".into(),
            occupation: "Engineer".into(),
            public_id: "asha-rao".into(),
        };
        store.write_participant(&participant).await.unwrap();
        assert!(dir.path().join("participants/abc123.json").exists());
    }
}
