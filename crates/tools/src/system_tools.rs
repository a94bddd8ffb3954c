use crate::error::ToolError;
use crate::types::{SystemBehavior, SystemTool};
use serde_json::{json, Map, Value};
use std::fmt;
use std::str::FromStr;

/// Built-in tools written into a fresh `tools.json`.
pub fn seeded_system_tools() -> Vec<SystemTool> {
    vec![
        SystemTool {
            id: "sys_disconnect".to_string(),
            name: "colgarLlamada".to_string(),
            description: "Terminar la llamada cuando el usuario se despida o pida colgar"
                .to_string(),
            enabled: true,
            behavior: SystemBehavior::Disconnect,
            parameters: json!({
                "type": "object",
                "properties": {},
                "required": [],
                "additionalProperties": false
            }),
        },
        SystemTool {
            id: "sys_open_url".to_string(),
            name: "abrirUrl".to_string(),
            description: "Abrir una página web cuando el usuario lo solicite".to_string(),
            enabled: true,
            behavior: SystemBehavior::OpenUrl,
            parameters: json!({
                "type": "object",
                "properties": {
                    "url": {"type": "string", "description": "Dirección a abrir"}
                },
                "required": ["url"],
                "additionalProperties": false
            }),
        },
        SystemTool {
            id: "sys_open_module".to_string(),
            name: "abrirModulo".to_string(),
            description: "Abrir una sección de la aplicación".to_string(),
            enabled: true,
            behavior: SystemBehavior::OpenModule,
            parameters: json!({
                "type": "object",
                "properties": {
                    "module": {
                        "type": "string",
                        "description": "Módulo a abrir",
                        "enum": AppModule::ALL.iter().map(|m| m.as_str()).collect::<Vec<_>>()
                    }
                },
                "required": ["module"],
                "additionalProperties": false
            }),
        },
    ]
}

/// Sections of the browser app a tool may navigate to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppModule {
    System,
    Tools,
    Demo,
    Tablas,
}

impl AppModule {
    pub const ALL: [AppModule; 4] = [
        AppModule::System,
        AppModule::Tools,
        AppModule::Demo,
        AppModule::Tablas,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AppModule::System => "system",
            AppModule::Tools => "tools",
            AppModule::Demo => "demo",
            AppModule::Tablas => "tablas",
        }
    }
}

impl FromStr for AppModule {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AppModule::ALL
            .iter()
            .copied()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| ToolError::NotFound(format!("Module '{}' not found", s)))
    }
}

impl fmt::Display for AppModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated system tool call. The client performs the actual effect.
#[derive(Debug, Clone, PartialEq)]
pub enum SystemAction {
    Disconnect,
    OpenUrl { url: String },
    OpenModule { module: AppModule },
}

impl SystemAction {
    pub fn from_arguments(
        behavior: &SystemBehavior,
        arguments: &Map<String, Value>,
    ) -> Result<Self, ToolError> {
        match behavior {
            SystemBehavior::Disconnect => Ok(SystemAction::Disconnect),
            SystemBehavior::OpenUrl => {
                let url = string_argument(arguments, "url")
                    .ok_or_else(|| ToolError::InvalidInput("URL is required".to_string()))?;
                Ok(SystemAction::OpenUrl {
                    url: normalize_url(&url),
                })
            }
            SystemBehavior::OpenModule => {
                let module = string_argument(arguments, "module")
                    .ok_or_else(|| ToolError::InvalidInput("Module is required".to_string()))?;
                Ok(SystemAction::OpenModule {
                    module: module.parse()?,
                })
            }
            SystemBehavior::Other(tag) => Err(ToolError::UnknownSystemTool(tag.clone())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SystemAction::Disconnect => "disconnect",
            SystemAction::OpenUrl { .. } => "open_url",
            SystemAction::OpenModule { .. } => "open_module",
        }
    }

    /// Text handed back to the model as the call's output.
    pub fn message(&self) -> String {
        match self {
            SystemAction::Disconnect => "Desconectando llamada...".to_string(),
            SystemAction::OpenUrl { url } => format!("Abriendo {}...", url),
            SystemAction::OpenModule { module } => format!("Abriendo módulo {}...", module),
        }
    }
}

fn string_argument(arguments: &Map<String, Value>, key: &str) -> Option<String> {
    arguments
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Prefix `https://` unless the URL already names an http(s) scheme.
pub fn normalize_url(url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{}", url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_open_url_adds_scheme() {
        let action =
            SystemAction::from_arguments(&SystemBehavior::OpenUrl, &args(json!({"url": "example.com"})))
                .unwrap();
        assert_eq!(
            action,
            SystemAction::OpenUrl {
                url: "https://example.com".to_string()
            }
        );

        let action = SystemAction::from_arguments(
            &SystemBehavior::OpenUrl,
            &args(json!({"url": "http://example.com"})),
        )
        .unwrap();
        assert_eq!(
            action,
            SystemAction::OpenUrl {
                url: "http://example.com".to_string()
            }
        );
    }

    #[test]
    fn test_open_url_requires_url() {
        for raw in [json!({}), json!({"url": "   "}), json!({"url": 42})] {
            let result = SystemAction::from_arguments(&SystemBehavior::OpenUrl, &args(raw));
            assert!(matches!(result, Err(ToolError::InvalidInput(_))));
        }
    }

    #[test]
    fn test_open_module_allow_list() {
        let action = SystemAction::from_arguments(
            &SystemBehavior::OpenModule,
            &args(json!({"module": "tablas"})),
        )
        .unwrap();
        assert_eq!(
            action,
            SystemAction::OpenModule {
                module: AppModule::Tablas
            }
        );

        let result = SystemAction::from_arguments(
            &SystemBehavior::OpenModule,
            &args(json!({"module": "settings"})),
        );
        assert!(matches!(result, Err(ToolError::NotFound(_))));

        let result =
            SystemAction::from_arguments(&SystemBehavior::OpenModule, &args(json!({"module": ""})));
        assert!(matches!(result, Err(ToolError::InvalidInput(_))));
    }

    #[test]
    fn test_unknown_behavior() {
        let result = SystemAction::from_arguments(
            &SystemBehavior::Other("reboot".to_string()),
            &Map::new(),
        );
        match result {
            Err(e @ ToolError::UnknownSystemTool(_)) => {
                assert_eq!(e.to_string(), "Unknown system tool type: reboot")
            }
            other => panic!("Expected UnknownSystemTool, got {:?}", other),
        }
    }

    #[test]
    fn test_seeded_tools_cover_every_behavior() {
        let tools = seeded_system_tools();
        assert_eq!(tools.len(), 3);
        assert!(tools.iter().all(|t| t.enabled));
        assert!(tools.iter().any(|t| t.behavior == SystemBehavior::Disconnect));
        assert!(tools.iter().any(|t| t.behavior == SystemBehavior::OpenUrl));
        assert!(tools.iter().any(|t| t.behavior == SystemBehavior::OpenModule));
    }
}
