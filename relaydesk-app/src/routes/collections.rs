use crate::api_error::ApiError;
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use relaydesk_store::{CollectionFields, Record};
use serde_json::{json, Value};

/// Typed fields from a JSON body. Wrong shapes are a 400, not a 422.
fn fields_from<F: CollectionFields>(
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<F, ApiError> {
    let Json(body) = payload?;
    serde_json::from_value(body).map_err(|e| ApiError::bad_request(format!("Invalid item: {}", e)))
}

pub async fn list<F: CollectionFields>(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let items = state.store.list_items::<F>().await?;
    Ok(Json(json!({ "items": items })))
}

pub async fn create<F: CollectionFields>(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Record<F>>), ApiError> {
    let fields = fields_from::<F>(payload)?;
    let record = state.store.create_item(fields).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn update<F: CollectionFields>(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Record<F>>, ApiError> {
    let fields = fields_from::<F>(payload)?;
    Ok(Json(state.store.update_item(&id, fields).await?))
}

pub async fn remove<F: CollectionFields>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state.store.delete_item::<F>(&id).await?;
    Ok(Json(json!({ "success": true })))
}
