//! Core data model: targets, attempt records, conversations, contact facts.
//!
//! Everything here is a plain typed record. Raw platform responses are
//! translated into these types at the collaborator boundary and never
//! cross into the controllers as untyped maps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ── Targets ─────────────────────────────────────────────────────────

/// Platform-unique profile identifier. The dedup key for all outbound work.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetId(String);

impl TargetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TargetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Raw discovery row as returned by the scraping collaborator.
///
/// Field presence is not guaranteed — rows with no resolvable identifier
/// are skipped by the campaign loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetRow {
    /// Platform profile id, when the scraper resolved one.
    pub profile_id: Option<String>,
    /// Public profile link; the id can be derived from its last segment.
    pub profile_link: Option<String>,
    /// Display name.
    pub name: Option<String>,
    /// Current company as reported by the scraper.
    pub current_company: Option<String>,
}

/// A discovered profile eligible for outreach. Immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    pub id: TargetId,
    pub name: String,
    pub affiliation: String,
    /// Discovery batch this target came from (one batch per affiliation per run).
    pub batch: String,
}

impl Target {
    /// Translate a raw discovery row into a typed target.
    ///
    /// Returns `None` when no identifier can be resolved — neither an
    /// explicit profile id nor a derivable link segment.
    pub fn from_row(row: &TargetRow, affiliation: &str, batch: &str) -> Option<Self> {
        let id = row
            .profile_id
            .as_deref()
            .filter(|id| !id.is_empty() && *id != "Unknown")
            .map(str::to_string)
            .or_else(|| row.profile_link.as_deref().and_then(id_from_profile_link))?;

        Some(Self {
            id: TargetId::new(id),
            name: row.name.clone().unwrap_or_else(|| "Unknown".to_string()),
            affiliation: affiliation.to_string(),
            batch: batch.to_string(),
        })
    }
}

/// Derive a profile id from the last non-empty segment of a profile link.
fn id_from_profile_link(link: &str) -> Option<String> {
    link.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty() && !segment.contains("://"))
        .map(str::to_string)
}

// ── Attempt records ─────────────────────────────────────────────────

/// Kind of outbound action taken against a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Connect,
    Message,
}

impl ActionKind {
    /// Short label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Connect => "connect",
            Self::Message => "message",
        }
    }
}

/// One terminal outbound-action outcome. Append-only; the union of all
/// records ever produced for an identifier forms that target's history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub target_id: TargetId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affiliation: Option<String>,
    pub kind: ActionKind,
    pub timestamp: DateTime<Utc>,
    pub success: bool,
    pub reason: String,
}

// ── Conversations ───────────────────────────────────────────────────

/// One inbound conversation, re-fetched in full every run — the platform
/// exposes no incremental cursor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub total_events: u64,
    pub unread_count: u64,
    pub is_group: bool,
    pub last_activity: DateTime<Utc>,
    /// Message events in chronological (insertion) order.
    pub messages: Vec<ConversationMessage>,
    pub participants: Vec<Participant>,
}

impl Conversation {
    /// Metadata view persisted for every conversation, read or unread.
    pub fn meta(&self) -> ConversationMeta {
        ConversationMeta {
            conversation_id: self.id.clone(),
            total_events: self.total_events,
            unread_count: self.unread_count,
            is_group: self.is_group,
            last_activity: self.last_activity,
        }
    }
}

/// Conversation metadata without the event bodies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationMeta {
    pub conversation_id: String,
    pub total_events: u64,
    pub unread_count: u64,
    pub is_group: bool,
    pub last_activity: DateTime<Utc>,
}

/// One message event. Owned by its conversation; extraction never mutates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub text: String,
}

/// A conversation participant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
    /// Platform URN, e.g. `urn:platform:member:abc123`.
    pub urn: String,
    pub first_name: String,
    pub last_name: String,
    pub occupation: String,
    pub public_id: String,
}

impl Participant {
    /// Tail segment of the URN, used as the persistence key.
    /// Returns `None` for an empty URN.
    pub fn urn_tail(&self) -> Option<&str> {
        self.urn
            .rsplit(':')
            .next()
            .filter(|tail| !tail.is_empty())
    }
}

// ── Contact facts ───────────────────────────────────────────────────

/// Structured contact details mined from one inbound message.
/// Created once, never mutated, written once to the persisted output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactFact {
    pub conversation_id: String,
    pub message_id: String,
    pub timestamp: DateTime<Utc>,
    pub phone_numbers: Vec<String>,
    pub emails: Vec<String>,
}

// ── Connection profiles (follow-up messaging) ───────────────────────

/// A recently connected profile, as returned by the discovery collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionProfile {
    pub id: TargetId,
    pub name: String,
    /// Restricted/anonymized profiles expose no usable facts and are skipped.
    pub restricted: bool,
    pub current_position: Option<String>,
    pub company: Option<String>,
    pub experiences: Vec<String>,
    pub skills: Vec<String>,
    pub certifications: Vec<String>,
}

/// Structured profile facts handed to the text-generation collaborator.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileFacts {
    pub name: String,
    pub current_position: String,
    pub company: String,
    pub experiences: Vec<String>,
    pub skills: Vec<String>,
    pub certifications: Vec<String>,
}

impl From<&ConnectionProfile> for ProfileFacts {
    fn from(profile: &ConnectionProfile) -> Self {
        Self {
            name: profile.name.clone(),
            current_position: profile
                .current_position
                .clone()
                .unwrap_or_else(|| "N/A".to_string()),
            company: profile.company.clone().unwrap_or_else(|| "N/A".to_string()),
            experiences: profile.experiences.clone(),
            skills: profile.skills.clone(),
            certifications: profile.certifications.clone(),
        }
    }
}

// ── Run summaries ───────────────────────────────────────────────────

/// Terminal output of a campaign run.
#[derive(Debug, Clone, Serialize)]
pub struct CampaignSummary {
    pub run_id: Uuid,
    pub selected_affiliations: Vec<String>,
    pub attempts: u32,
    pub successes: u32,
    pub target: u32,
}

/// Terminal output of a triage pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TriageSummary {
    pub conversations: u32,
    pub unread_processed: u32,
    pub contact_facts: u32,
    pub acknowledgements_sent: u32,
    pub participants_recorded: u32,
}

/// Terminal output of a follow-up messaging run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FollowUpSummary {
    pub sent: u32,
    pub skipped: u32,
    pub failed: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: Option<&str>, link: Option<&str>) -> TargetRow {
        TargetRow {
            profile_id: id.map(str::to_string),
            profile_link: link.map(str::to_string),
            name: Some("Asha Rao".into()),
            current_company: Some("Acme".into()),
        }
    }

    #[test]
    fn target_from_explicit_id() {
        let t = Target::from_row(&row(Some("asha-rao-1"), None), "Acme", "b1").unwrap();
        assert_eq!(t.id.as_str(), "asha-rao-1");
        assert_eq!(t.affiliation, "Acme");
    }

    #[test]
    fn target_id_derived_from_link() {
        let t = Target::from_row(
            &row(None, Some("https://example.com/in/asha-rao-1/")),
            "Acme",
            "b1",
        )
        .unwrap();
        assert_eq!(t.id.as_str(), "asha-rao-1");
    }

    #[test]
    fn target_unknown_id_falls_back_to_link() {
        let t = Target::from_row(
            &row(Some("Unknown"), Some("https://example.com/in/real-id")),
            "Acme",
            "b1",
        )
        .unwrap();
        assert_eq!(t.id.as_str(), "real-id");
    }

    #[test]
    fn target_unresolvable_row_is_none() {
        assert!(Target::from_row(&row(None, None), "Acme", "b1").is_none());
        assert!(Target::from_row(&row(Some(""), Some("")), "Acme", "b1").is_none());
    }

    #[test]
    fn urn_tail_takes_last_segment() {
        let p = Participant {
            urn: "urn:platform:member:abc123".into(),
            first_name: "A".into(),
            last_name: "B".into(),
            occupation: "Engineer".into(),
            public_id: "ab".into(),
        };
        assert_eq!(p.urn_tail(), Some("abc123"));
    }

    #[test]
    fn urn_tail_empty_urn_is_none() {
        let p = Participant {
            urn: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            occupation: String::new(),
            public_id: String::new(),
        };
        assert_eq!(p.urn_tail(), None);
    }

    #[test]
    fn attempt_record_roundtrips_through_json() {
        let record = AttemptRecord {
            target_id: TargetId::new("asha-rao-1"),
            display_name: Some("Asha Rao".into()),
            affiliation: Some("Acme".into()),
            kind: ActionKind::Connect,
            timestamp: Utc::now(),
            success: true,
            reason: "connection request sent".into(),
        };
        let json = serde_json::to_string(&record).unwrap();
        let back: AttemptRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.target_id, record.target_id);
        assert!(back.success);
        assert_eq!(back.kind, ActionKind::Connect);
    }
}
