use axum::extract::rejection::{FormRejection, JsonRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Form, Json};
use relaydesk_store::StoreError;
use relaydesk_tools::ToolError;
use serde_json::{json, Value};

/// JSON error response: `{"error": ...}` plus optional extras.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    details: Option<String>,
    success_flag: bool,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            details: None,
            success_flag: false,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Adds `"success": false`, the shape tool execution clients expect.
    pub fn with_success_flag(mut self) -> Self {
        self.success_flag = true;
        self
    }

    fn body(&self) -> Value {
        let mut body = json!({ "error": self.message });
        if self.success_flag {
            body["success"] = json!(false);
        }
        if let Some(details) = &self.details {
            body["details"] = json!(details);
        }
        body
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!("{} {}", self.status, self.message);
        }
        (self.status, Json(self.body())).into_response()
    }
}

impl From<ToolError> for ApiError {
    fn from(err: ToolError) -> Self {
        match err {
            ToolError::InvalidInput(msg) => ApiError::bad_request(msg),
            ToolError::NotFound(msg) => ApiError::not_found(msg),
            err @ ToolError::UnknownSystemTool(_) => ApiError::bad_request(err.to_string()),
            err => ApiError::internal(err.to_string()),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => ApiError::not_found("Item not found"),
            err => ApiError::internal(err.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::bad_request(format!("Invalid JSON: {}", rejection.body_text()))
    }
}

/// Lenient form read: a missing or undecodable body counts as an empty form.
pub fn form_or_default<T: Default>(payload: Result<Form<T>, FormRejection>) -> T {
    match payload {
        Ok(Form(form)) => form,
        Err(rejection) => {
            tracing::debug!("Form body ignored: {}", rejection.body_text());
            T::default()
        }
    }
}

/// Lenient body read: anything that is not a JSON object counts as `{}`.
pub fn object_or_empty(payload: Result<Json<Value>, JsonRejection>) -> serde_json::Map<String, Value> {
    match payload {
        Ok(Json(Value::Object(map))) => map,
        _ => serde_json::Map::new(),
    }
}
