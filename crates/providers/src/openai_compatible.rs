use crate::session::{ChatRequest, SessionConfig};
use crate::traits::*;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

pub struct OpenAIProvider {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    chat_timeout: Duration,
    session_timeout: Duration,
}

impl OpenAIProvider {
    pub fn new(base_url: String, api_key: Option<String>) -> Self {
        let client = Client::builder()
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            chat_timeout: Duration::from_secs(60),
            session_timeout: Duration::from_secs(15),
        }
    }

    pub fn with_timeouts(mut self, chat: Duration, session: Duration) -> Self {
        self.chat_timeout = chat;
        self.session_timeout = session;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn authorized(&self, path: &str, timeout: Duration) -> Result<RequestBuilder, ProviderError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ProviderError::MissingCredential)?;
        Ok(self
            .client
            .post(format!("{}{}", self.base_url, path))
            .bearer_auth(api_key)
            .timeout(timeout))
    }
}

async fn read_json(response: Response) -> Result<Value, ProviderError> {
    if !response.status().is_success() {
        let status = response.status().as_u16();
        let details = response.text().await.unwrap_or_default();
        tracing::error!("Upstream returned {}: {}", status, details);
        return Err(ProviderError::Api { status, details });
    }

    response
        .json()
        .await
        .map_err(|e| ProviderError::Parse(e.to_string()))
}

#[async_trait]
impl LLMProvider for OpenAIProvider {
    async fn complete_chat(&self, request: &ChatRequest) -> Result<Option<String>, ProviderError> {
        let response = self
            .authorized("/chat/completions", self.chat_timeout)?
            .json(request)
            .send()
            .await
            .map_err(|e| ProviderError::Http(e.to_string()))?;

        let json = read_json(response).await?;

        let choice = json["choices"]
            .get(0)
            .ok_or_else(|| ProviderError::Parse("No choices in response".to_string()))?;

        Ok(choice["message"]["content"].as_str().map(|s| s.to_string()))
    }

    async fn create_realtime_session(&self, config: &SessionConfig) -> Result<Value, ProviderError> {
        let response = self
            .authorized("/realtime/sessions", self.session_timeout)?
            .header("OpenAI-Beta", "realtime=v1")
            .json(config)
            .send()
            .await
            .map_err(|e| ProviderError::Http(e.to_string()))?;

        read_json(response).await
    }
}
