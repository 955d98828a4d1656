//! Error types for the outreach engine.

/// Top-level error type for the engine.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Discovery error: {0}")]
    Discovery(#[from] DiscoveryError),

    #[error("Platform API error: {0}")]
    Api(#[from] ApiError),

    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Session bootstrap errors. These are fatal — nothing is retried.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Missing credential: {0} is not set")]
    MissingCredentials(String),

    #[error("Session initialization failed: {0}")]
    InitFailed(String),
}

/// Discovery collaborator errors (profile scraping, connection listing).
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("Scrape failed for {affiliation}: {reason}")]
    ScrapeFailed { affiliation: String, reason: String },

    #[error("Failed to list recent connections: {0}")]
    ConnectionsFailed(String),
}

/// Mutating platform API errors.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Rate limited by the platform")]
    RateLimited,

    #[error("Invalid response from the platform: {0}")]
    InvalidResponse(String),
}

/// Text-generation collaborator errors. The caller skips the recipient —
/// a default message is never sent in place of a failed generation.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("Generation service unreachable: {0}")]
    Unavailable(String),

    #[error("Generation request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid generation response: {0}")]
    InvalidResponse(String),
}

/// Persisted-output errors.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unusable record: {0}")]
    UnusableRecord(String),
}

/// Result type alias for the engine.
pub type Result<T> = std::result::Result<T, Error>;
