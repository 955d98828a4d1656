//! Engine configuration, built from environment variables with the
//! design defaults as fallback. Env prefix: `LEADFLOW_`.

use std::path::PathBuf;
use std::time::Duration;

use crate::pacing::PacingConfig;

/// Campaign controller configuration.
#[derive(Debug, Clone)]
pub struct CampaignConfig {
    /// Affiliations (companies) available as discovery filters.
    pub affiliations: Vec<String>,
    pub role_filter: String,
    pub location_filter: String,
    /// How many affiliations one run samples from the pool.
    pub pool_size: usize,
    /// Profiles requested per affiliation batch.
    pub batch_size: u32,
    /// Campaign-wide successful-connection target.
    pub target_connections: u32,
    /// Connection attempts allowed per affiliation.
    pub max_attempts_per_affiliation: u32,
}

impl Default for CampaignConfig {
    fn default() -> Self {
        Self {
            affiliations: Vec::new(),
            role_filter: "software engineer".to_string(),
            location_filter: String::new(),
            pool_size: 3,
            batch_size: 10,
            target_connections: 15,
            max_attempts_per_affiliation: 2,
        }
    }
}

/// Inbox triage configuration.
#[derive(Debug, Clone)]
pub struct TriageConfig {
    /// Canonical acknowledgement sent once per contact-bearing conversation.
    pub ack_message: String,
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            ack_message: "Thank you for sharing your details. Someone from \
                          our team will be in touch with you shortly!"
                .to_string(),
        }
    }
}

/// Follow-up messaging configuration.
#[derive(Debug, Clone)]
pub struct FollowUpConfig {
    /// Recent connections fetched per run.
    pub max_recipients: u32,
}

impl Default for FollowUpConfig {
    fn default() -> Self {
        Self { max_recipients: 10 }
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub campaign: CampaignConfig,
    pub pacing: PacingConfig,
    pub triage: TriageConfig,
    pub followup: FollowUpConfig,
    pub output_dir: PathBuf,
    /// Fixed seed for the run's random source. Set for reproducible runs;
    /// unset in production so selection patterns differ per run.
    pub rng_seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            campaign: CampaignConfig::default(),
            pacing: PacingConfig::default(),
            triage: TriageConfig::default(),
            followup: FollowUpConfig::default(),
            output_dir: PathBuf::from("output"),
            rng_seed: None,
        }
    }
}

impl EngineConfig {
    /// Build config from environment variables. Unset variables fall back
    /// to the defaults; unparseable values fall back too.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let affiliations: Vec<String> = std::env::var("LEADFLOW_AFFILIATIONS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let campaign = CampaignConfig {
            affiliations,
            role_filter: std::env::var("LEADFLOW_ROLE_FILTER")
                .unwrap_or(defaults.campaign.role_filter),
            location_filter: std::env::var("LEADFLOW_LOCATION_FILTER")
                .unwrap_or(defaults.campaign.location_filter),
            pool_size: env_parse("LEADFLOW_POOL_SIZE", defaults.campaign.pool_size),
            batch_size: env_parse("LEADFLOW_BATCH_SIZE", defaults.campaign.batch_size),
            target_connections: env_parse(
                "LEADFLOW_TARGET_CONNECTIONS",
                defaults.campaign.target_connections,
            ),
            max_attempts_per_affiliation: env_parse(
                "LEADFLOW_MAX_ATTEMPTS_PER_AFFILIATION",
                defaults.campaign.max_attempts_per_affiliation,
            ),
        };

        let pacing = PacingConfig {
            inter_target_min: env_secs(
                "LEADFLOW_INTER_TARGET_MIN_SECS",
                defaults.pacing.inter_target_min,
            ),
            inter_target_max: env_secs(
                "LEADFLOW_INTER_TARGET_MAX_SECS",
                defaults.pacing.inter_target_max,
            ),
            inter_batch_min: env_secs(
                "LEADFLOW_INTER_BATCH_MIN_SECS",
                defaults.pacing.inter_batch_min,
            ),
            inter_batch_max: env_secs(
                "LEADFLOW_INTER_BATCH_MAX_SECS",
                defaults.pacing.inter_batch_max,
            ),
            retry_base: env_secs("LEADFLOW_RETRY_BASE_SECS", defaults.pacing.retry_base),
            retry_max: env_secs("LEADFLOW_RETRY_MAX_SECS", defaults.pacing.retry_max),
            max_attempts: env_parse("LEADFLOW_MAX_ATTEMPTS", defaults.pacing.max_attempts),
        };

        let triage = TriageConfig {
            ack_message: std::env::var("LEADFLOW_ACK_MESSAGE")
                .unwrap_or(defaults.triage.ack_message),
        };

        let followup = FollowUpConfig {
            max_recipients: env_parse(
                "LEADFLOW_FOLLOWUP_MAX_RECIPIENTS",
                defaults.followup.max_recipients,
            ),
        };

        Self {
            campaign,
            pacing,
            triage,
            followup,
            output_dir: std::env::var("LEADFLOW_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            rng_seed: std::env::var("LEADFLOW_RNG_SEED")
                .ok()
                .and_then(|s| s.parse().ok()),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn env_secs(key: &str, default: Duration) -> Duration {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_design_values() {
        let config = EngineConfig::default();
        assert_eq!(config.campaign.target_connections, 15);
        assert_eq!(config.campaign.max_attempts_per_affiliation, 2);
        assert_eq!(config.campaign.pool_size, 3);
        assert_eq!(config.campaign.batch_size, 10);
        assert_eq!(config.pacing.inter_target_min, Duration::from_secs(45));
        assert_eq!(config.pacing.inter_target_max, Duration::from_secs(90));
        assert_eq!(config.pacing.inter_batch_min, Duration::from_secs(60));
        assert_eq!(config.pacing.inter_batch_max, Duration::from_secs(180));
        assert_eq!(config.pacing.retry_base, Duration::from_secs(30));
        assert_eq!(config.pacing.retry_max, Duration::from_secs(150));
        assert_eq!(config.pacing.max_attempts, 3);
        assert!(config.rng_seed.is_none());
    }
}
