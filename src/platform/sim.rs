//! In-memory simulated platform — backs the dry-run binary and the
//! integration tests. Deterministic: no network, no sleep of its own.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use crate::error::{ApiError, DiscoveryError, GenerationError};
use crate::model::{
    ConnectionProfile, Conversation, ConversationMessage, Participant, ProfileFacts, TargetId,
    TargetRow,
};
use crate::platform::{Discovery, MessageGenerator, PlatformApi, ProfileSummary};

/// Affiliations the dry-run fixture knows about.
pub const FIXTURE_AFFILIATIONS: [&str; 5] = [
    "Acme Analytics",
    "Borealis Systems",
    "Cinder Labs",
    "Delta Forge",
    "Everfield Tech",
];

#[derive(Default)]
struct SimState {
    targets: HashMap<String, Vec<TargetRow>>,
    failing_affiliations: HashSet<String>,
    connections: Vec<ConnectionProfile>,
    conversations: Vec<Conversation>,
    /// Remaining scripted failures per target id.
    connect_failures: HashMap<String, u32>,
    /// Ids whose read-only lookup reports not-found.
    missing_profiles: HashSet<String>,
    generator_failing: bool,
    connect_calls: Vec<String>,
    message_calls: Vec<(String, String)>,
    reply_calls: Vec<(String, String)>,
}

/// Simulated discovery + platform API + message generator.
pub struct SimulatedNetwork {
    state: Mutex<SimState>,
}

impl SimulatedNetwork {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SimState::default()),
        }
    }

    /// Canned data covering every engine path: scrapeable affiliations,
    /// recent connections (one restricted), and an inbox with one unread
    /// conversation carrying contact details.
    pub fn fixture() -> Self {
        let sim = Self::new();
        for (a, affiliation) in FIXTURE_AFFILIATIONS.iter().enumerate() {
            let rows = (0..10)
                .map(|i| TargetRow {
                    profile_id: Some(format!("profile-{a}-{i}")),
                    profile_link: Some(format!("https://example.com/in/profile-{a}-{i}")),
                    name: Some(format!("Member {a}-{i}")),
                    current_company: Some(affiliation.to_string()),
                })
                .collect();
            sim.add_targets(affiliation, rows);
        }

        sim.add_connection(ConnectionProfile {
            id: TargetId::new("conn-1"),
            name: "Asha Rao".into(),
            restricted: false,
            current_position: Some("Software Engineer".into()),
            company: Some("Acme Analytics".into()),
            experiences: vec!["Junior Engineer (2y)".into(), "Engineer (1y)".into()],
            skills: vec!["Rust".into(), "SQL".into()],
            certifications: vec![],
        });
        sim.add_connection(ConnectionProfile {
            id: TargetId::new("conn-2"),
            name: "Network Member".into(),
            restricted: true,
            current_position: None,
            company: None,
            experiences: vec![],
            skills: vec![],
            certifications: vec![],
        });

        let at = |secs: i64| Utc.timestamp_opt(1_737_000_000 + secs, 0).unwrap();
        sim.add_conversation(Conversation {
            id: "urn:conv:1001".into(),
            total_events: 2,
            unread_count: 1,
            is_group: false,
            last_activity: at(120),
            messages: vec![
                ConversationMessage {
                    id: "urn:msg:1".into(),
                    created_at: at(0),
                    text: "Thanks for reaching out!".into(),
                },
                ConversationMessage {
                    id: "urn:msg:2".into(),
                    created_at: at(120),
                    text: "Sure, 9876543210 or asha@example.com".into(),
                },
            ],
            participants: vec![Participant {
                urn: "urn:member:aa11".into(),
                first_name: "Asha".into(),
                last_name: "Rao".into(),
                occupation: "Software Engineer".into(),
                public_id: "asha-rao".into(),
            }],
        });
        sim.add_conversation(Conversation {
            id: "urn:conv:1002".into(),
            total_events: 3,
            unread_count: 0,
            is_group: false,
            last_activity: at(60),
            messages: vec![],
            participants: vec![Participant {
                urn: "urn:member:bb22".into(),
                first_name: "Vik".into(),
                last_name: "Shah".into(),
                occupation: "Data Engineer".into(),
                public_id: "vik-shah".into(),
            }],
        });
        sim
    }

    // ── Builders ────────────────────────────────────────────────────

    pub fn add_targets(&self, affiliation: &str, rows: Vec<TargetRow>) {
        self.state
            .lock()
            .unwrap()
            .targets
            .insert(affiliation.to_string(), rows);
    }

    pub fn fail_scrapes_for(&self, affiliation: &str) {
        self.state
            .lock()
            .unwrap()
            .failing_affiliations
            .insert(affiliation.to_string());
    }

    pub fn add_connection(&self, profile: ConnectionProfile) {
        self.state.lock().unwrap().connections.push(profile);
    }

    pub fn add_conversation(&self, conversation: Conversation) {
        self.state.lock().unwrap().conversations.push(conversation);
    }

    /// Make the next `times` connection requests for `id` fail.
    pub fn fail_connect(&self, id: &str, times: u32) {
        self.state
            .lock()
            .unwrap()
            .connect_failures
            .insert(id.to_string(), times);
    }

    pub fn mark_profile_missing(&self, id: &str) {
        self.state
            .lock()
            .unwrap()
            .missing_profiles
            .insert(id.to_string());
    }

    pub fn set_generator_failing(&self, failing: bool) {
        self.state.lock().unwrap().generator_failing = failing;
    }

    // ── Call logs ───────────────────────────────────────────────────

    pub fn connect_calls(&self) -> Vec<String> {
        self.state.lock().unwrap().connect_calls.clone()
    }

    pub fn message_calls(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().message_calls.clone()
    }

    pub fn reply_calls(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().reply_calls.clone()
    }
}

impl Default for SimulatedNetwork {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Discovery for SimulatedNetwork {
    async fn scrape(
        &self,
        affiliation: &str,
        _role_filter: &str,
        _location_filter: &str,
        max_results: u32,
    ) -> Result<Vec<TargetRow>, DiscoveryError> {
        let state = self.state.lock().unwrap();
        if state.failing_affiliations.contains(affiliation) {
            return Err(DiscoveryError::ScrapeFailed {
                affiliation: affiliation.to_string(),
                reason: "simulated scrape failure".into(),
            });
        }
        let mut rows = state
            .targets
            .get(affiliation)
            .cloned()
            .unwrap_or_default();
        rows.truncate(max_results as usize);
        Ok(rows)
    }

    async fn recent_connections(
        &self,
        max_results: u32,
    ) -> Result<Vec<ConnectionProfile>, DiscoveryError> {
        let mut connections = self.state.lock().unwrap().connections.clone();
        connections.truncate(max_results as usize);
        Ok(connections)
    }
}

#[async_trait]
impl PlatformApi for SimulatedNetwork {
    async fn lookup(&self, id: &TargetId) -> Result<Option<ProfileSummary>, ApiError> {
        let state = self.state.lock().unwrap();
        if state.missing_profiles.contains(id.as_str()) {
            return Ok(None);
        }
        Ok(Some(ProfileSummary {
            id: id.clone(),
            name: None,
            headline: None,
        }))
    }

    // Indicator polarity mirrors the live platform: `true` means the
    // connection request failed.
    async fn request_connection(&self, id: &TargetId) -> Result<bool, ApiError> {
        let mut state = self.state.lock().unwrap();
        state.connect_calls.push(id.as_str().to_string());
        if let Some(remaining) = state.connect_failures.get_mut(id.as_str()) {
            if *remaining > 0 {
                *remaining -= 1;
                return Ok(true);
            }
        }
        Ok(false)
    }

    async fn send_message(&self, body: &str, recipient: &TargetId) -> Result<bool, ApiError> {
        let mut state = self.state.lock().unwrap();
        state
            .message_calls
            .push((recipient.as_str().to_string(), body.to_string()));
        Ok(false)
    }

    async fn reply_to_conversation(
        &self,
        conversation_id: &str,
        body: &str,
    ) -> Result<bool, ApiError> {
        let mut state = self.state.lock().unwrap();
        state
            .reply_calls
            .push((conversation_id.to_string(), body.to_string()));
        Ok(false)
    }

    async fn list_conversations(&self) -> Result<Vec<Conversation>, ApiError> {
        Ok(self.state.lock().unwrap().conversations.clone())
    }
}

#[async_trait]
impl MessageGenerator for SimulatedNetwork {
    async fn generate(&self, facts: &ProfileFacts) -> Result<String, GenerationError> {
        if self.state.lock().unwrap().generator_failing {
            return Err(GenerationError::Unavailable(
                "simulated generator outage".into(),
            ));
        }
        Ok(format!(
            "Hi {}, your path to {} at {} stood out. Happy to share what \
             we are working on if you are open to it.",
            facts.name, facts.current_position, facts.company
        ))
    }
}
