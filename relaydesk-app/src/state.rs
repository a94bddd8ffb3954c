use crate::config::Config;
use relaydesk_providers::{LLMProvider, OpenAIProvider};
use relaydesk_store::JsonStore;
use relaydesk_tools::{ToolDispatcher, ToolRegistry};
use std::sync::Arc;
use std::time::Duration;

/// Shared handles injected into every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<JsonStore>,
    pub registry: Arc<ToolRegistry>,
    pub dispatcher: Arc<ToolDispatcher>,
    pub provider: Arc<dyn LLMProvider>,
}

impl AppState {
    pub fn new(store: Arc<JsonStore>, provider: Arc<dyn LLMProvider>, tool_timeout: Duration) -> Self {
        Self {
            registry: Arc::new(ToolRegistry::new(store.clone())),
            dispatcher: Arc::new(ToolDispatcher::new(store.clone(), tool_timeout)),
            store,
            provider,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let store = Arc::new(JsonStore::new(&config.data_dir).with_policy(config.store.on_corruption.into()));
        let provider = OpenAIProvider::new(config.upstream.base_url.clone(), config.api_key.clone())
            .with_timeouts(config.chat_timeout(), config.session_timeout());
        Self::new(store, Arc::new(provider), config.tool_timeout())
    }
}
