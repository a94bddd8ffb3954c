use crate::error::ToolError;
use crate::system_tools::SystemAction;
use crate::types::{HttpMethod, ResolvedTool, ToolsDocument, UserTool};
use relaydesk_store::JsonStore;
use reqwest::Client;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// What a successful dispatch produced.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// Effect to be carried out by the client.
    System(SystemAction),
    /// Response of a user tool's outbound call, whatever its status.
    Http { status_code: u16, result: Value },
}

impl DispatchOutcome {
    pub fn into_response_body(self) -> Value {
        match self {
            DispatchOutcome::System(action) => {
                let mut body = json!({
                    "success": true,
                    "system_action": action.name(),
                    "result": {"message": action.message()},
                });
                match &action {
                    SystemAction::OpenUrl { url } => body["url"] = json!(url),
                    SystemAction::OpenModule { module } => body["module"] = json!(module.as_str()),
                    SystemAction::Disconnect => {}
                }
                body
            }
            DispatchOutcome::Http {
                status_code,
                result,
            } => json!({
                "success": true,
                "status_code": status_code,
                "result": result,
            }),
        }
    }
}

pub struct ToolDispatcher {
    store: Arc<JsonStore>,
    client: Client,
    timeout: Duration,
}

impl ToolDispatcher {
    pub fn new(store: Arc<JsonStore>, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            store,
            client,
            timeout,
        }
    }

    pub async fn dispatch(
        &self,
        tool_name: &str,
        arguments: Map<String, Value>,
    ) -> Result<DispatchOutcome, ToolError> {
        info!("Dispatching tool: {}", tool_name);

        let document: ToolsDocument = self.store.read().await?;
        let tool = document.resolve(tool_name).ok_or_else(|| {
            ToolError::NotFound(format!("Tool '{}' not found or disabled", tool_name))
        })?;

        match tool {
            ResolvedTool::System(tool) => {
                let action = SystemAction::from_arguments(&tool.behavior, &arguments)?;
                info!("System action {} from tool {}", action.name(), tool.name);
                Ok(DispatchOutcome::System(action))
            }
            ResolvedTool::User(tool) => self.call_endpoint(&tool, &arguments).await,
        }
    }

    async fn call_endpoint(
        &self,
        tool: &UserTool,
        arguments: &Map<String, Value>,
    ) -> Result<DispatchOutcome, ToolError> {
        let method: HttpMethod = tool.endpoint.method.parse()?;
        let reqwest_method = match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        };

        let mut request = self
            .client
            .request(reqwest_method, &tool.endpoint.url)
            .timeout(self.timeout);

        // Headers go on first so the JSON body's content type wins
        for (key, value) in &tool.endpoint.headers {
            request = request.header(key.as_str(), value.as_str());
        }

        request = if method.uses_query() {
            request.query(&query_pairs(arguments))
        } else {
            request.json(arguments)
        };

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                warn!("Tool {} timed out after {:?}", tool.name, self.timeout);
            } else {
                error!("Tool {} request failed: {}", tool.name, e);
            }
            ToolError::RequestFailed(e.to_string())
        })?;

        let status_code = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| ToolError::RequestFailed(e.to_string()))?;
        let result = serde_json::from_str::<Value>(&text).unwrap_or_else(|_| json!({"text": text}));

        info!("Tool {} returned {} ({} {})", tool.name, status_code, method, tool.endpoint.url);
        Ok(DispatchOutcome::Http {
            status_code,
            result,
        })
    }
}

/// Flatten call arguments into query pairs. Arrays repeat their key, nulls
/// are dropped, objects are sent as JSON text.
fn query_pairs(arguments: &Map<String, Value>) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for (key, value) in arguments {
        match value {
            Value::Null => {}
            Value::Array(items) => {
                for item in items {
                    if let Some(text) = scalar_text(item) {
                        pairs.push((key.clone(), text));
                    }
                }
            }
            other => {
                if let Some(text) = scalar_text(other) {
                    pairs.push((key.clone(), text));
                }
            }
        }
    }
    pairs
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(if *b { "True" } else { "False" }.to_string()),
        other => Some(other.to_string()),
    }
}
