use crate::api_error::{object_or_empty, ApiError};
use crate::assistant::{chat_request, session_config};
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use chrono::{SecondsFormat, Utc};
use relaydesk_providers::ProviderError;
use serde_json::{json, Value};

/// Mint an ephemeral realtime session for the browser.
pub async fn session(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let config = session_config(&state).await?;

    match state.provider.create_realtime_session(&config).await {
        Ok(session) => {
            tracing::info!("Realtime session created ({} tools)", config.tools.len());
            Ok(Json(session))
        }
        Err(ProviderError::Api { status, details }) => {
            Err(ApiError::bad_gateway(format!("OpenAI error: {}", status)).with_details(details))
        }
        Err(e) => Err(ApiError::internal(e.to_string())),
    }
}

pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let body = object_or_empty(payload);
    let message = body
        .get("message")
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or_default();
    if message.is_empty() {
        return Err(ApiError::bad_request("message is required"));
    }
    let history = body
        .get("history")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    let request = chat_request(&state, &history, message)
        .await
        .map_err(|e| ApiError::internal(e.message))?;
    let reply = state
        .provider
        .complete_chat(&request)
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?;

    Ok(Json(json!({
        "reply": reply,
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
    })))
}
