use crate::api_error::{form_or_default, object_or_empty, ApiError};
use crate::state::AppState;
use axum::extract::rejection::{FormRejection, JsonRejection};
use axum::extract::{Path, State};
use axum::response::Redirect;
use axum::{Form, Json};
use relaydesk_tools::{parse_curl_command, NewTool, ParsedCurl, ToolsDocument, UserTool};
use serde::Deserialize;
use serde_json::{json, Map, Value};

const TOOLS_PAGE: &str = "/tools";

#[derive(Debug, Deserialize)]
pub struct AddToolForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub enabled: Option<String>,
    #[serde(default = "empty_object_text")]
    pub endpoint: String,
    #[serde(default = "empty_object_text")]
    pub parameters: String,
}

fn empty_object_text() -> String {
    "{}".to_string()
}

impl Default for AddToolForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            enabled: None,
            endpoint: empty_object_text(),
            parameters: empty_object_text(),
        }
    }
}

impl From<AddToolForm> for NewTool {
    fn from(form: AddToolForm) -> Self {
        NewTool {
            name: form.name,
            description: form.description,
            enabled: form.enabled.as_deref() == Some("on"),
            endpoint: form.endpoint,
            parameters: form.parameters,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct EditSystemForm {
    pub name: Option<String>,
    pub description: Option<String>,
}

pub async fn list(State(state): State<AppState>) -> Result<Json<ToolsDocument>, ApiError> {
    Ok(Json(state.registry.list().await?))
}

pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UserTool>, ApiError> {
    Ok(Json(state.registry.get(&id).await?))
}

pub async fn add(
    State(state): State<AppState>,
    payload: Result<Form<AddToolForm>, FormRejection>,
) -> Redirect {
    let form = form_or_default(payload);
    if let Err(e) = state.registry.add(form.into()).await {
        tracing::warn!("Failed to add tool: {}", e);
    }
    Redirect::to(TOOLS_PAGE)
}

pub async fn edit(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let body = match payload {
        Ok(Json(body)) => body,
        Err(_) => return Err(ApiError::bad_request("Invalid JSON")),
    };
    state.registry.edit(&id, body).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Tool updated successfully"
    })))
}

/// Unknown ids are not an error here, unlike `edit`.
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> Redirect {
    if let Err(e) = state.registry.delete(&id).await {
        tracing::warn!("Failed to delete tool {}: {}", id, e);
    }
    Redirect::to(TOOLS_PAGE)
}

pub async fn toggle(State(state): State<AppState>, Path(id): Path<String>) -> Redirect {
    match state.registry.toggle(&id).await {
        Ok(Some(enabled)) => tracing::info!("Tool {} enabled={}", id, enabled),
        Ok(None) => tracing::debug!("toggle: no tool with id {}", id),
        Err(e) => tracing::warn!("Failed to toggle tool {}: {}", id, e),
    }
    Redirect::to(TOOLS_PAGE)
}

pub async fn edit_system(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Form<EditSystemForm>, FormRejection>,
) -> Redirect {
    let form = form_or_default(payload);
    if let Err(e) = state
        .registry
        .edit_system(&id, form.name.as_deref(), form.description.as_deref())
        .await
    {
        tracing::warn!("Failed to edit system tool {}: {}", id, e);
    }
    Redirect::to(TOOLS_PAGE)
}

pub async fn parse_curl(
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ParsedCurl>, ApiError> {
    let Json(body) = payload?;
    let command = body
        .get("curl_command")
        .ok_or_else(|| ApiError::bad_request("curl_command is required"))?;
    let command = command
        .as_str()
        .ok_or_else(|| ApiError::bad_request("curl_command must be a string"))?;
    Ok(Json(parse_curl_command(command)))
}

/// Enabled user tools in realtime function shape.
pub async fn active(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let tools = state.registry.active_function_schemas().await?;
    Ok(Json(json!({ "tools": tools })))
}

pub async fn execute(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let body = object_or_empty(payload);
    let tool_name = body
        .get("tool_name")
        .and_then(Value::as_str)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| ApiError::bad_request("tool_name is required").with_success_flag())?;
    let arguments = match body.get("arguments") {
        Some(Value::Object(arguments)) => arguments.clone(),
        _ => Map::new(),
    };

    let outcome = state
        .dispatcher
        .dispatch(tool_name, arguments)
        .await
        .map_err(|e| ApiError::from(e).with_success_flag())?;
    Ok(Json(outcome.into_response_body()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_form_checkbox() {
        let form: AddToolForm =
            serde_json::from_value(json!({"name": "x", "enabled": "on"})).unwrap();
        let tool: NewTool = form.into();
        assert!(tool.enabled);
        assert_eq!(tool.endpoint, "{}");

        let form: AddToolForm = serde_json::from_value(json!({"name": "x"})).unwrap();
        assert!(!NewTool::from(form).enabled);
    }
}
