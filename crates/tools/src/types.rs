use crate::error::ToolError;
use crate::system_tools::seeded_system_tools;
use relaydesk_store::{lenient, Document};
use serde::de::Deserializer;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Where a user tool sends its request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointSpec {
    #[serde(default, deserialize_with = "lenient::string")]
    pub url: String,
    #[serde(default = "default_method", deserialize_with = "method_or_default")]
    pub method: String,
    /// Header values written as numbers or booleans are kept as their text.
    #[serde(default, deserialize_with = "lenient::string_map")]
    pub headers: BTreeMap<String, String>,
}

fn default_method() -> String {
    HttpMethod::Get.to_string()
}

fn method_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let method = lenient::string(deserializer)?;
    Ok(if method.trim().is_empty() {
        default_method()
    } else {
        method
    })
}

impl Default for EndpointSpec {
    fn default() -> Self {
        Self {
            url: String::new(),
            method: default_method(),
            headers: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    /// GET and DELETE carry arguments in the query string.
    pub fn uses_query(&self) -> bool {
        matches!(self, HttpMethod::Get | HttpMethod::Delete)
    }
}

impl FromStr for HttpMethod {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "DELETE" => Ok(HttpMethod::Delete),
            other => Err(ToolError::InvalidInput(format!("Unsupported method: {}", other))),
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        };
        f.write_str(name)
    }
}

/// JSON-schema object describing a tool's arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSchema {
    #[serde(rename = "type")]
    pub schema_type: String,
    #[serde(default)]
    pub properties: Map<String, Value>,
    #[serde(default)]
    pub required: Vec<String>,
    #[serde(rename = "additionalProperties", default)]
    pub additional_properties: bool,
}

impl Default for ParameterSchema {
    fn default() -> Self {
        Self {
            schema_type: "object".to_string(),
            properties: Map::new(),
            required: Vec::new(),
            additional_properties: false,
        }
    }
}

impl ParameterSchema {
    pub fn to_value(&self) -> Value {
        json!({
            "type": self.schema_type,
            "properties": self.properties,
            "required": self.required,
            "additionalProperties": self.additional_properties,
        })
    }
}

pub(crate) fn empty_parameters() -> Value {
    ParameterSchema::default().to_value()
}

/// An operator-defined HTTP tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserTool {
    #[serde(default, deserialize_with = "lenient::string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient::boolean")]
    pub enabled: bool,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub endpoint: EndpointSpec,
    #[serde(default = "empty_parameters")]
    pub parameters: Value,
}

impl UserTool {
    pub fn function_schema(&self) -> Value {
        function_schema(&self.name, &self.description, &self.parameters)
    }
}

/// Fixed behavior of a built-in tool. Tags this build does not know are kept
/// as written so the document still loads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SystemBehavior {
    Disconnect,
    OpenUrl,
    OpenModule,
    Other(String),
}

impl Default for SystemBehavior {
    fn default() -> Self {
        SystemBehavior::Other(String::new())
    }
}

impl From<String> for SystemBehavior {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "disconnect" => SystemBehavior::Disconnect,
            "open_url" => SystemBehavior::OpenUrl,
            "open_module" => SystemBehavior::OpenModule,
            _ => SystemBehavior::Other(tag),
        }
    }
}

impl From<SystemBehavior> for String {
    fn from(behavior: SystemBehavior) -> Self {
        match behavior {
            SystemBehavior::Disconnect => "disconnect".to_string(),
            SystemBehavior::OpenUrl => "open_url".to_string(),
            SystemBehavior::OpenModule => "open_module".to_string(),
            SystemBehavior::Other(tag) => tag,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemTool {
    #[serde(default, deserialize_with = "lenient::string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient::boolean")]
    pub enabled: bool,
    #[serde(rename = "type", default, deserialize_with = "behavior_tag")]
    pub behavior: SystemBehavior,
    #[serde(default = "empty_parameters")]
    pub parameters: Value,
}

fn behavior_tag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SystemBehavior, D::Error> {
    lenient::string(deserializer).map(SystemBehavior::from)
}

impl SystemTool {
    pub fn function_schema(&self) -> Value {
        function_schema(&self.name, &self.description, &self.parameters)
    }
}

/// Contents of `tools.json`. Off-type fields decode to their defaults, so one
/// bad entry never costs the others.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolsDocument {
    #[serde(default, deserialize_with = "lenient::records")]
    pub tools: Vec<UserTool>,
    #[serde(default = "seeded_system_tools", deserialize_with = "lenient::records")]
    pub system_tools: Vec<SystemTool>,
}

impl Document for ToolsDocument {
    const NAME: &'static str = "tools";

    fn default_shape() -> Self {
        Self {
            tools: Vec::new(),
            system_tools: seeded_system_tools(),
        }
    }
}

/// The tool a name resolves to at dispatch time.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedTool {
    System(SystemTool),
    User(UserTool),
}

impl ToolsDocument {
    /// Enabled system tools win over enabled user tools; within each list the
    /// first exact name match wins.
    pub fn resolve(&self, name: &str) -> Option<ResolvedTool> {
        if let Some(tool) = self
            .system_tools
            .iter()
            .find(|t| t.enabled && t.name == name)
        {
            return Some(ResolvedTool::System(tool.clone()));
        }
        self.tools
            .iter()
            .find(|t| t.enabled && t.name == name)
            .map(|t| ResolvedTool::User(t.clone()))
    }
}

/// Realtime API function declaration.
pub fn function_schema(name: &str, description: &str, parameters: &Value) -> Value {
    json!({
        "type": "function",
        "name": name,
        "description": description,
        "parameters": parameters,
    })
}
