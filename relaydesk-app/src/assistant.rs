//! Assembles upstream requests from the stored settings and tools.

use crate::api_error::ApiError;
use crate::state::AppState;
use relaydesk_providers::{compose_chat_messages, resolve_prompt, ChatRequest, SessionConfig};
use relaydesk_store::Settings;
use serde_json::Value;

pub async fn session_config(state: &AppState) -> Result<SessionConfig, ApiError> {
    let settings: Settings = state.store.read().await?;
    let tools = state.registry.session_function_schemas().await?;
    tracing::debug!("Session with {} tools", tools.len());

    Ok(SessionConfig::new(
        &settings.realtime_model,
        &settings.voice,
        resolve_prompt(&settings.system_prompt),
    )
    .with_tools(tools))
}

pub async fn chat_request(
    state: &AppState,
    history: &[Value],
    message: &str,
) -> Result<ChatRequest, ApiError> {
    let settings: Settings = state.store.read().await?;
    let system_prompt = resolve_prompt(&settings.system_prompt);

    Ok(ChatRequest {
        model: settings.model,
        messages: compose_chat_messages(&system_prompt, history, message),
        temperature: settings.temperature,
    })
}
