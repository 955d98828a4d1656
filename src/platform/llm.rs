//! Local text-generation client — OpenAI-compatible chat-completions
//! endpoint (e.g. a local LM Studio instance).

use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use crate::error::GenerationError;
use crate::model::ProfileFacts;
use crate::platform::MessageGenerator;

/// Text-generation service configuration.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub endpoint: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub request_timeout: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:1234/v1/chat/completions".to_string(),
            temperature: 0.3,
            max_tokens: 300,
            request_timeout: Duration::from_secs(60),
        }
    }
}

impl LlmConfig {
    /// Build config from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            endpoint: std::env::var("LEADFLOW_LLM_ENDPOINT").unwrap_or(defaults.endpoint),
            temperature: std::env::var("LEADFLOW_LLM_TEMPERATURE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.temperature),
            max_tokens: std::env::var("LEADFLOW_LLM_MAX_TOKENS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_tokens),
            request_timeout: defaults.request_timeout,
        }
    }
}

/// Generates one personalized outreach message per profile.
pub struct LocalLlmGenerator {
    client: reqwest::Client,
    config: LlmConfig,
}

impl LocalLlmGenerator {
    pub fn new(config: LlmConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait]
impl MessageGenerator for LocalLlmGenerator {
    async fn generate(&self, facts: &ProfileFacts) -> Result<String, GenerationError> {
        let prompt = build_outreach_prompt(facts);
        let payload = json!({
            "messages": [{ "role": "user", "content": prompt }],
            "temperature": self.config.temperature,
            "max_tokens": self.config.max_tokens,
            "stream": false,
        });

        let response = self
            .client
            .post(&self.config.endpoint)
            .timeout(self.config.request_timeout)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() || e.is_timeout() {
                    GenerationError::Unavailable(e.to_string())
                } else {
                    GenerationError::RequestFailed(e.to_string())
                }
            })?
            .error_for_status()
            .map_err(|e| GenerationError::RequestFailed(e.to_string()))?;

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| GenerationError::InvalidResponse(e.to_string()))?;

        let content = body["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| {
                GenerationError::InvalidResponse("missing choices[0].message.content".into())
            })?;

        let message = content.trim().to_string();
        if message.is_empty() {
            return Err(GenerationError::InvalidResponse("empty completion".into()));
        }

        debug!(chars = message.len(), "Generated outreach message");
        Ok(message)
    }
}

/// Prompt for a short personalized first message, grounded only in facts
/// present on the profile.
fn build_outreach_prompt(facts: &ProfileFacts) -> String {
    format!(
        "You write short, professional first messages for new connections \
         on a professional network.\n\
         \n\
         About them:\n\
         - Name: {name}\n\
         - Role: {position} at {company}\n\
         - Experience: {experiences}\n\
         - Key skills: {skills}\n\
         - Certifications: {certifications}\n\
         \n\
         Write a message that:\n\
         1. Opens with a specific observation about their experience so it is \
         clear you actually read their profile.\n\
         2. Mentions certifications only if they exist above. Never invent one.\n\
         3. Explains briefly why you are reaching out and invites them to reply \
         with their contact details if interested.\n\
         4. No emojis. Keep it concise, warm and professional.",
        name = facts.name,
        position = facts.current_position,
        company = facts.company,
        experiences = facts.experiences.join("; "),
        skills = facts.skills.join(", "),
        certifications = facts.certifications.join(", "),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_carries_profile_facts() {
        let facts = ProfileFacts {
            name: "Asha Rao".into(),
            current_position: "Software Engineer".into(),
            company: "Acme".into(),
            experiences: vec!["Junior Engineer (2y)".into()],
            skills: vec!["Rust".into(), "SQL".into()],
            certifications: vec![],
        };
        let prompt = build_outreach_prompt(&facts);
        assert!(prompt.contains("Asha Rao"));
        assert!(prompt.contains("Software Engineer at Acme"));
        assert!(prompt.contains("Rust, SQL"));
    }
}
