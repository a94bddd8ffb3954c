use crate::api_error::{form_or_default, ApiError};
use crate::state::AppState;
use axum::extract::rejection::{FormRejection, JsonRejection};
use axum::extract::State;
use axum::response::Redirect;
use axum::{Form, Json};
use relaydesk_providers::resolve_prompt;
use relaydesk_store::{
    lenient, Settings, DEFAULT_MODEL, DEFAULT_REALTIME_MODEL, DEFAULT_SYSTEM_PROMPT, DEFAULT_TEMPERATURE,
    DEFAULT_VOICE,
};
use serde::Deserialize;
use serde_json::Value;

/// Submitted settings. Absent fields take their defaults, as do blank model
/// and voice fields. A blank prompt is kept.
#[derive(Debug, Default, Deserialize)]
pub struct SettingsForm {
    pub system_prompt: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<Value>,
    pub realtime_model: Option<String>,
    pub voice: Option<String>,
}

impl SettingsForm {
    pub fn into_settings(self) -> Settings {
        Settings {
            system_prompt: self
                .system_prompt
                .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
            model: non_blank(self.model, DEFAULT_MODEL),
            temperature: self
                .temperature
                .as_ref()
                .and_then(lenient::as_number)
                .unwrap_or(DEFAULT_TEMPERATURE),
            realtime_model: non_blank(self.realtime_model, DEFAULT_REALTIME_MODEL),
            voice: non_blank(self.voice, DEFAULT_VOICE),
        }
    }
}

fn non_blank(value: Option<String>, default: &str) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

pub async fn index() -> Redirect {
    Redirect::to("/system")
}

pub async fn system_get(State(state): State<AppState>) -> Result<Json<Settings>, ApiError> {
    Ok(Json(state.store.read().await?))
}

pub async fn system_post(
    State(state): State<AppState>,
    payload: Result<Form<SettingsForm>, FormRejection>,
) -> Redirect {
    let settings = form_or_default(payload).into_settings();
    match state.store.write(&settings).await {
        Ok(()) => tracing::info!("Settings updated (model {})", settings.model),
        Err(e) => tracing::warn!("Failed to save settings: {}", e),
    }
    Redirect::to("/system")
}

/// Settings with date placeholders in the prompt resolved.
pub async fn api_get(State(state): State<AppState>) -> Result<Json<Settings>, ApiError> {
    let mut settings: Settings = state.store.read().await?;
    settings.system_prompt = resolve_prompt(&settings.system_prompt);
    Ok(Json(settings))
}

pub async fn api_post(
    State(state): State<AppState>,
    payload: Result<Json<SettingsForm>, JsonRejection>,
) -> Result<Json<Settings>, ApiError> {
    let Json(form) = payload?;
    let settings = form.into_settings();
    state.store.write(&settings).await?;
    tracing::info!("Settings updated (model {})", settings.model);
    Ok(Json(settings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_blank_fields_fall_back() {
        let form: SettingsForm = serde_json::from_value(json!({
            "system_prompt": "",
            "model": "   ",
            "temperature": "hot",
            "voice": "alloy"
        }))
        .unwrap();
        let settings = form.into_settings();

        assert_eq!(settings.system_prompt, "");
        assert_eq!(settings.model, DEFAULT_MODEL);
        assert_eq!(settings.temperature, DEFAULT_TEMPERATURE);
        assert_eq!(settings.realtime_model, DEFAULT_REALTIME_MODEL);
        assert_eq!(settings.voice, "alloy");
    }

    #[test]
    fn test_temperature_from_text_or_number() {
        let form = SettingsForm {
            temperature: Some(json!(" 0.9 ")),
            ..Default::default()
        };
        assert_eq!(form.into_settings().temperature, 0.9);

        let form = SettingsForm {
            temperature: Some(json!(1.2)),
            ..Default::default()
        };
        assert_eq!(form.into_settings().temperature, 1.2);

        assert_eq!(SettingsForm::default().into_settings(), Settings::default());
    }
}
