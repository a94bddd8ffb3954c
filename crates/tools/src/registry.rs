use crate::error::ToolError;
use crate::types::{empty_parameters, EndpointSpec, ToolsDocument, UserTool};
use relaydesk_store::{short_id, JsonStore};
use serde_json::Value;
use std::sync::Arc;

/// Fields of a tool submitted from the admin form. `endpoint` and
/// `parameters` arrive as raw JSON text.
#[derive(Debug, Clone, Default)]
pub struct NewTool {
    pub name: String,
    pub description: String,
    pub enabled: bool,
    pub endpoint: String,
    pub parameters: String,
}

/// CRUD over `tools.json`.
pub struct ToolRegistry {
    store: Arc<JsonStore>,
}

impl ToolRegistry {
    pub fn new(store: Arc<JsonStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> Result<ToolsDocument, ToolError> {
        Ok(self.store.read().await?)
    }

    pub async fn get(&self, id: &str) -> Result<UserTool, ToolError> {
        let document: ToolsDocument = self.store.read().await?;
        document
            .tools
            .into_iter()
            .find(|t| t.id == id)
            .ok_or_else(|| ToolError::NotFound("Tool not found".to_string()))
    }

    /// Malformed endpoint or parameter JSON falls back to empty shapes.
    pub async fn add(&self, new_tool: NewTool) -> Result<UserTool, ToolError> {
        let endpoint = serde_json::from_str::<EndpointSpec>(&new_tool.endpoint).unwrap_or_default();
        let parameters = match serde_json::from_str::<Value>(&new_tool.parameters) {
            Ok(value) => value,
            Err(_) => empty_parameters(),
        };

        let tool = UserTool {
            id: short_id(),
            name: new_tool.name.trim().to_string(),
            description: new_tool.description.trim().to_string(),
            enabled: new_tool.enabled,
            endpoint,
            parameters,
        };

        let created = tool.clone();
        self.store
            .update(|document: &mut ToolsDocument| {
                document.tools.push(tool);
                Ok::<_, ToolError>(())
            })
            .await?;

        tracing::info!("Added tool {} ({})", created.name, created.id);
        Ok(created)
    }

    /// Replace a user tool wholesale. The path id is authoritative.
    pub async fn edit(&self, id: &str, body: Value) -> Result<UserTool, ToolError> {
        let is_empty = body.as_object().map(|o| o.is_empty()).unwrap_or(true);
        if is_empty {
            return Err(ToolError::InvalidInput("Invalid JSON".to_string()));
        }
        let mut replacement: UserTool = serde_json::from_value(body)
            .map_err(|e| ToolError::InvalidInput(format!("Invalid JSON: {}", e)))?;
        replacement.id = id.to_string();

        let updated = self
            .store
            .update(|document: &mut ToolsDocument| {
                let slot = document
                    .tools
                    .iter_mut()
                    .find(|t| t.id == id)
                    .ok_or_else(|| ToolError::NotFound("Tool not found".to_string()))?;
                *slot = replacement;
                Ok::<_, ToolError>(slot.clone())
            })
            .await?;

        tracing::info!("Edited tool {}", id);
        Ok(updated)
    }

    /// Rename or re-describe a system tool. Unknown ids are ignored.
    pub async fn edit_system(
        &self,
        id: &str,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<(), ToolError> {
        self.store
            .update(|document: &mut ToolsDocument| {
                if let Some(tool) = document.system_tools.iter_mut().find(|t| t.id == id) {
                    if let Some(name) = name {
                        tool.name = name.trim().to_string();
                    }
                    if let Some(description) = description {
                        tool.description = description.trim().to_string();
                    }
                    tracing::info!("Edited system tool {}", id);
                } else {
                    tracing::debug!("edit_system: no system tool with id {}", id);
                }
                Ok::<_, ToolError>(())
            })
            .await
    }

    /// Flip a user tool's enabled flag. Returns the new state, or `None` when
    /// the id is unknown.
    pub async fn toggle(&self, id: &str) -> Result<Option<bool>, ToolError> {
        self.store
            .update(|document: &mut ToolsDocument| {
                let state = document.tools.iter_mut().find(|t| t.id == id).map(|tool| {
                    tool.enabled = !tool.enabled;
                    tool.enabled
                });
                Ok::<_, ToolError>(state)
            })
            .await
    }

    /// Remove a user tool. Unknown ids are not an error; returns whether
    /// anything was removed.
    pub async fn delete(&self, id: &str) -> Result<bool, ToolError> {
        let removed = self
            .store
            .update(|document: &mut ToolsDocument| {
                let before = document.tools.len();
                document.tools.retain(|t| t.id != id);
                Ok::<_, ToolError>(document.tools.len() != before)
            })
            .await?;
        if removed {
            tracing::info!("Deleted tool {}", id);
        }
        Ok(removed)
    }

    /// Enabled user tools as realtime function declarations.
    pub async fn active_function_schemas(&self) -> Result<Vec<Value>, ToolError> {
        let document: ToolsDocument = self.store.read().await?;
        Ok(document
            .tools
            .iter()
            .filter(|t| t.enabled)
            .map(UserTool::function_schema)
            .collect())
    }

    /// Enabled system tools followed by enabled user tools.
    pub async fn session_function_schemas(&self) -> Result<Vec<Value>, ToolError> {
        let document: ToolsDocument = self.store.read().await?;
        let system = document
            .system_tools
            .iter()
            .filter(|t| t.enabled)
            .map(|t| t.function_schema());
        let user = document
            .tools
            .iter()
            .filter(|t| t.enabled)
            .map(|t| t.function_schema());
        Ok(system.chain(user).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn registry(dir: &std::path::Path) -> ToolRegistry {
        ToolRegistry::new(Arc::new(JsonStore::new(dir)))
    }

    fn form(name: &str) -> NewTool {
        NewTool {
            name: format!("  {}  ", name),
            description: "Buscar clientes".to_string(),
            enabled: true,
            endpoint: r#"{"url": "https://api.example.com/c", "method": "POST", "headers": {"X-Key": "k"}}"#
                .to_string(),
            parameters: r#"{"type": "object", "properties": {"q": {"type": "string"}}, "required": ["q"]}"#
                .to_string(),
        }
    }

    #[tokio::test]
    async fn test_add_and_get() {
        let temp_dir = tempfile::tempdir().unwrap();
        let registry = registry(temp_dir.path());

        let tool = registry.add(form("buscarCliente")).await.unwrap();
        assert_eq!(tool.id.len(), 8);
        assert_eq!(tool.name, "buscarCliente");
        assert_eq!(tool.endpoint.method, "POST");
        assert_eq!(tool.endpoint.headers["X-Key"], "k");
        assert_eq!(tool.parameters["required"], json!(["q"]));

        let fetched = registry.get(&tool.id).await.unwrap();
        assert_eq!(fetched, tool);
    }

    #[tokio::test]
    async fn test_add_with_malformed_json_uses_empty_shapes() {
        let temp_dir = tempfile::tempdir().unwrap();
        let registry = registry(temp_dir.path());

        let tool = registry
            .add(NewTool {
                name: "x".to_string(),
                endpoint: "{broken".to_string(),
                parameters: "".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(tool.endpoint, EndpointSpec::default());
        assert_eq!(tool.parameters, empty_parameters());
        assert!(!tool.enabled);
    }

    #[tokio::test]
    async fn test_get_unknown_is_not_found() {
        let temp_dir = tempfile::tempdir().unwrap();
        let registry = registry(temp_dir.path());

        assert!(matches!(
            registry.get("nope1234").await,
            Err(ToolError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_edit_replaces_tool() {
        let temp_dir = tempfile::tempdir().unwrap();
        let registry = registry(temp_dir.path());
        let tool = registry.add(form("buscarCliente")).await.unwrap();

        let updated = registry
            .edit(
                &tool.id,
                json!({
                    "id": "ignored",
                    "name": "buscarClientes",
                    "description": "nuevo",
                    "enabled": false,
                    "endpoint": {"url": "https://h", "method": "GET", "headers": {}},
                    "parameters": {"type": "object", "properties": {}, "required": []}
                }),
            )
            .await
            .unwrap();

        assert_eq!(updated.id, tool.id);
        assert_eq!(updated.name, "buscarClientes");
        assert!(!updated.enabled);
        assert_eq!(registry.get(&tool.id).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn test_edit_errors() {
        let temp_dir = tempfile::tempdir().unwrap();
        let registry = registry(temp_dir.path());
        let tool = registry.add(form("buscarCliente")).await.unwrap();

        assert!(matches!(
            registry.edit(&tool.id, json!({})).await,
            Err(ToolError::InvalidInput(_))
        ));
        assert!(matches!(
            registry.edit(&tool.id, json!(["buscarCliente"])).await,
            Err(ToolError::InvalidInput(_))
        ));
        assert!(matches!(
            registry.edit("unknown1", json!({"name": "x"})).await,
            Err(ToolError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_hand_edited_tools_survive_a_read() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("tools.json");
        let on_disk = json!({
            "tools": [
                {"id": "a1", "name": "buscarCliente", "description": "", "enabled": true,
                 "endpoint": {"url": "http://h/c", "method": "GET", "headers": {}},
                 "parameters": {"type": "object", "properties": {}}},
                {"id": "b2", "name": "reintentar", "description": "", "enabled": "true",
                 "endpoint": {"url": "http://h/r", "method": "POST", "headers": {"X-Retry": 3}},
                 "parameters": {"type": "object", "properties": {}}}
            ],
            "system_tools": []
        });
        std::fs::write(&path, on_disk.to_string()).unwrap();
        let registry = registry(temp_dir.path());

        let document = registry.list().await.unwrap();
        assert_eq!(document.tools.len(), 2);
        assert!(document.system_tools.is_empty());
        let retry = registry.get("b2").await.unwrap();
        assert!(retry.enabled);
        assert_eq!(retry.endpoint.headers["X-Retry"], "3");

        // A write after the read keeps both tools
        registry.toggle("a1").await.unwrap();
        let reread: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(reread["tools"].as_array().unwrap().len(), 2);
        assert_eq!(reread["tools"][1]["endpoint"]["headers"]["X-Retry"], "3");
    }

    #[tokio::test]
    async fn test_edit_accepts_loosely_typed_fields() {
        let temp_dir = tempfile::tempdir().unwrap();
        let registry = registry(temp_dir.path());
        let tool = registry.add(form("buscarCliente")).await.unwrap();

        let updated = registry
            .edit(&tool.id, json!({"name": "buscarCliente", "enabled": "yes"}))
            .await
            .unwrap();
        assert!(updated.enabled);
        assert_eq!(updated.endpoint, EndpointSpec::default());
    }

    #[tokio::test]
    async fn test_toggle_twice_restores_state() {
        let temp_dir = tempfile::tempdir().unwrap();
        let registry = registry(temp_dir.path());
        let tool = registry.add(form("buscarCliente")).await.unwrap();

        assert_eq!(registry.toggle(&tool.id).await.unwrap(), Some(false));
        assert_eq!(registry.toggle(&tool.id).await.unwrap(), Some(true));
        assert_eq!(registry.get(&tool.id).await.unwrap().enabled, tool.enabled);

        assert_eq!(registry.toggle("unknown1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete_unknown_is_noop() {
        let temp_dir = tempfile::tempdir().unwrap();
        let registry = registry(temp_dir.path());
        let tool = registry.add(form("buscarCliente")).await.unwrap();

        assert!(!registry.delete("unknown1").await.unwrap());
        assert_eq!(registry.list().await.unwrap().tools.len(), 1);

        assert!(registry.delete(&tool.id).await.unwrap());
        assert!(registry.list().await.unwrap().tools.is_empty());
    }

    #[tokio::test]
    async fn test_edit_system_only_touches_name_and_description() {
        let temp_dir = tempfile::tempdir().unwrap();
        let registry = registry(temp_dir.path());
        let before = registry.list().await.unwrap().system_tools[1].clone();

        registry
            .edit_system(&before.id, Some(" abrirPagina "), None)
            .await
            .unwrap();
        let after = registry.list().await.unwrap().system_tools[1].clone();
        assert_eq!(after.name, "abrirPagina");
        assert_eq!(after.description, before.description);
        assert_eq!(after.behavior, before.behavior);

        registry
            .edit_system("missing", Some("x"), Some("y"))
            .await
            .unwrap();
        assert_eq!(registry.list().await.unwrap().system_tools[1], after);
    }

    #[tokio::test]
    async fn test_function_schemas() {
        let temp_dir = tempfile::tempdir().unwrap();
        let registry = registry(temp_dir.path());
        let enabled = registry.add(form("buscarCliente")).await.unwrap();
        let disabled = registry.add(form("borrarCliente")).await.unwrap();
        registry.toggle(&disabled.id).await.unwrap();

        let active = registry.active_function_schemas().await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0]["type"], "function");
        assert_eq!(active[0]["name"], enabled.name);

        let session = registry.session_function_schemas().await.unwrap();
        assert_eq!(session.len(), 4);
        assert_eq!(session[0]["name"], "colgarLlamada");
        assert_eq!(session[3]["name"], "buscarCliente");
    }
}
