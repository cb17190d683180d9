//! AI tutor client with multi-provider failover
//!
//! Sends chat completion requests to OpenAI-compatible endpoints.
//! Providers are tried in sequence with no backoff; when every provider
//! fails, or no API key is configured, a canned offline reply keeps the
//! conversation alive.

pub mod offline;
pub mod transcript;

use anyhow::{bail, Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::types::{Message, Role};

pub use transcript::TranscriptStore;

const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Opening system message for every tutoring conversation.
pub const TUTOR_SYSTEM_PROMPT: &str = "You are a friendly AI tutor on an online learning platform. \
Explain concepts step by step, use short concrete examples, and end with one question that checks \
the learner's understanding. Keep answers under 200 words unless asked for more detail.";

/// Configuration for one chat completion provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Short label used in logs and reply attribution
    pub name: String,
    /// Base URL for the API (e.g., "https://api.groq.com/openai/v1")
    pub base_url: String,
    /// Model identifier sent in the request body
    pub model: String,
}

impl ProviderConfig {
    /// Default primary provider (Groq).
    pub fn groq() -> Self {
        Self {
            name: "groq".to_string(),
            base_url: GROQ_BASE_URL.to_string(),
            model: "llama-3.3-70b-versatile".to_string(),
        }
    }

    /// Default fallback provider (OpenRouter).
    pub fn openrouter() -> Self {
        Self {
            name: "openrouter".to_string(),
            base_url: OPENROUTER_BASE_URL.to_string(),
            model: "meta-llama/llama-3.1-8b-instruct".to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    max_tokens: u32,
    temperature: f64,
    stream: bool,
}

/// Message shape the providers expect: role and content only.
#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

impl<'a> From<&'a Message> for WireMessage<'a> {
    fn from(message: &'a Message) -> Self {
        Self {
            role: message.role.as_wire_str(),
            content: &message.content,
        }
    }
}

/// Where a reply came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplySource {
    Provider(String),
    Offline,
}

impl std::fmt::Display for ReplySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReplySource::Provider(name) => write!(f, "{}", name),
            ReplySource::Offline => write!(f, "offline"),
        }
    }
}

/// A tutor answer, attributed to the provider that produced it.
#[derive(Debug, Clone, Serialize)]
pub struct TutorReply {
    pub content: String,
    pub source: ReplySource,
}

/// Chat client that never dead-ends: providers in order, then offline.
pub struct TutorClient {
    client: Client,
    providers: Vec<ProviderConfig>,
    api_key: Option<String>,
    max_tokens: u32,
    temperature: f64,
}

impl TutorClient {
    /// Build from config. The API key comes from `LEARNCORE_TUTOR_KEY`
    /// when set (headless use), otherwise from the keyring. A missing
    /// key is not an error: the client answers offline.
    pub fn from_config(config: &crate::config::Config) -> Self {
        let api_key = std::env::var("LEARNCORE_TUTOR_KEY")
            .ok()
            .filter(|key| !key.is_empty())
            .or_else(|| crate::security::keyring::get_tutor_api_key().ok());
        if api_key.is_none() {
            debug!("No tutor API key configured, offline replies only");
        }
        Self {
            client: Client::new(),
            providers: vec![config.tutor.primary.clone(), config.tutor.fallback.clone()],
            api_key,
            max_tokens: config.tutor.max_tokens,
            temperature: config.tutor.temperature,
        }
    }

    /// Build with an explicit provider list.
    pub fn with_providers(providers: Vec<ProviderConfig>, api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            providers,
            api_key,
            max_tokens: 1024,
            temperature: 0.7,
        }
    }

    /// Ask the tutor. Providers are attempted in configured order; any
    /// failure moves on to the next, and exhausting the list produces a
    /// keyword-matched offline reply based on the last user message.
    pub async fn ask(&self, messages: &[Message]) -> TutorReply {
        if let Some(api_key) = &self.api_key {
            for provider in &self.providers {
                match self.ask_provider(provider, api_key, messages).await {
                    Ok(content) => {
                        return TutorReply {
                            content,
                            source: ReplySource::Provider(provider.name.clone()),
                        };
                    }
                    Err(e) => {
                        warn!("Tutor provider {} failed, trying next: {}", provider.name, e);
                    }
                }
            }
        }

        let prompt = messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
            .unwrap_or_default();
        TutorReply {
            content: offline::offline_reply(prompt),
            source: ReplySource::Offline,
        }
    }

    async fn ask_provider(
        &self,
        provider: &ProviderConfig,
        api_key: &str,
        messages: &[Message],
    ) -> Result<String> {
        let request = ChatRequest {
            model: &provider.model,
            messages: messages.iter().map(WireMessage::from).collect(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            stream: false,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", provider.base_url))
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&request)
            .send()
            .await
            .with_context(|| format!("Failed to reach tutor provider {}", provider.name))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            bail!("Tutor API error ({}): {}", status, body);
        }

        // Parse as raw Value first: providers disagree on optional fields
        let body = response
            .text()
            .await
            .context("Failed to read tutor response body")?;
        let raw: serde_json::Value =
            serde_json::from_str(&body).context("Failed to parse tutor response")?;

        let content = raw
            .get("choices")
            .and_then(|c| c.as_array())
            .and_then(|arr| arr.first())
            .and_then(|choice| choice.get("message"))
            .and_then(|msg| msg.get("content"))
            .and_then(|c| c.as_str())
            .unwrap_or_default()
            .to_string();

        if content.trim().is_empty() {
            bail!("Tutor provider {} returned an empty reply", provider.name);
        }
        Ok(content)
    }
}
