use crate::session::{ChatRequest, SessionConfig};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("OPENAI_API_KEY is not set on the server")]
    MissingCredential,
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("API error: {status}")]
    Api { status: u16, details: String },
    #[error("Parse error: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn new(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: content.into(),
        }
    }
}

/// Upstream conversational API.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// One chat completion. `None` when the upstream returned no text.
    async fn complete_chat(&self, request: &ChatRequest) -> Result<Option<String>, ProviderError>;

    /// Mint an ephemeral realtime session. The upstream JSON is returned as is.
    async fn create_realtime_session(
        &self,
        config: &SessionConfig,
    ) -> Result<serde_json::Value, ProviderError>;
}
