//! Collaborator boundary — traits for the external systems the engine
//! orchestrates, plus the typed records that cross that boundary.
//!
//! Raw platform responses are translated into `crate::model` types inside
//! the collaborator implementations; controllers never see untyped maps.

pub mod llm;
pub mod session;
pub mod sim;

use async_trait::async_trait;

use crate::error::{ApiError, DiscoveryError, GenerationError};
use crate::model::{ConnectionProfile, Conversation, ProfileFacts, TargetId, TargetRow};

/// Minimal profile view returned by a read-only lookup.
#[derive(Debug, Clone)]
pub struct ProfileSummary {
    pub id: TargetId,
    pub name: Option<String>,
    pub headline: Option<String>,
}

/// Profile discovery collaborator (the scraping crawler).
#[async_trait]
pub trait Discovery: Send + Sync {
    /// Scrape a bounded batch of profiles for one affiliation.
    /// May return an empty batch; may fail, which the campaign treats as
    /// a non-fatal per-affiliation failure.
    async fn scrape(
        &self,
        affiliation: &str,
        role_filter: &str,
        location_filter: &str,
        max_results: u32,
    ) -> Result<Vec<TargetRow>, DiscoveryError>;

    /// List recently accepted connections, newest first.
    async fn recent_connections(
        &self,
        max_results: u32,
    ) -> Result<Vec<ConnectionProfile>, DiscoveryError>;
}

/// Mutating platform API collaborator.
///
/// The two mutating calls return the platform's raw success/error
/// indicator. Their polarities are inconsistent and unverified, so the
/// executor classifies them through a configurable `SuccessConvention`
/// rather than hardcoding either reading.
#[async_trait]
pub trait PlatformApi: Send + Sync {
    /// Read-only profile lookup. `Ok(None)` means not found / not accessible.
    async fn lookup(&self, id: &TargetId) -> Result<Option<ProfileSummary>, ApiError>;

    /// Request a connection. Returns the platform's raw indicator.
    async fn request_connection(&self, id: &TargetId) -> Result<bool, ApiError>;

    /// Send a direct message. Returns the platform's raw error indicator.
    async fn send_message(&self, body: &str, recipient: &TargetId) -> Result<bool, ApiError>;

    /// Reply into an existing conversation. Returns the raw error indicator.
    async fn reply_to_conversation(
        &self,
        conversation_id: &str,
        body: &str,
    ) -> Result<bool, ApiError>;

    /// Full conversation/participant/event tree. Re-fetched per run.
    async fn list_conversations(&self) -> Result<Vec<Conversation>, ApiError>;
}

/// Text-generation collaborator. On failure the caller skips messaging
/// the recipient — an empty or default message is never sent.
#[async_trait]
pub trait MessageGenerator: Send + Sync {
    async fn generate(&self, facts: &ProfileFacts) -> Result<String, GenerationError>;
}
