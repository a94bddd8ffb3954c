use anyhow::{bail, Context, Result};
use relaydesk_store::CorruptionPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_FILE: &str = "relaydesk.yaml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    pub upstream: UpstreamConfig,
    pub tools: ToolsConfig,
    pub store: StoreConfig,
    /// Read from `OPENAI_API_KEY` only.
    #[serde(skip)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    pub base_url: String,
    pub chat_timeout_secs: u64,
    pub session_timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub on_corruption: OnCorruption,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnCorruption {
    #[default]
    Repair,
    Reject,
}

impl From<OnCorruption> for CorruptionPolicy {
    fn from(value: OnCorruption) -> Self {
        match value {
            OnCorruption::Repair => CorruptionPolicy::Repair,
            OnCorruption::Reject => CorruptionPolicy::Reject,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5050,
            data_dir: PathBuf::from("./data"),
            upstream: UpstreamConfig::default(),
            tools: ToolsConfig::default(),
            store: StoreConfig::default(),
            api_key: None,
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: relaydesk_providers::openai_compatible::DEFAULT_BASE_URL.to_string(),
            chat_timeout_secs: 60,
            session_timeout_secs: 15,
        }
    }
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 30,
        }
    }
}

impl Config {
    /// File (if present), then environment, then validation.
    pub fn load() -> Result<Self> {
        let path = std::env::var("RELAYDESK_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));

        let mut config = if path.exists() {
            Self::load_from(&path)?
        } else {
            Self::default()
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Overlay environment variables. `lookup` returns `None` for unset keys.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT") {
            match port.trim().parse() {
                Ok(port) => self.port = port,
                Err(_) => tracing::warn!("Ignoring invalid PORT value: {}", port),
            }
        }
        if let Some(dir) = lookup("RELAYDESK_DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(url) = lookup("OPENAI_BASE_URL") {
            self.upstream.base_url = url;
        }
        self.api_key = lookup("OPENAI_API_KEY").filter(|k| !k.trim().is_empty());
    }

    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            bail!("port must be greater than 0");
        }
        if self.upstream.base_url.trim().is_empty() {
            bail!("upstream.base_url cannot be empty");
        }
        if self.upstream.chat_timeout_secs == 0 || self.upstream.session_timeout_secs == 0 {
            bail!("upstream timeouts must be greater than 0");
        }
        if self.tools.request_timeout_secs == 0 {
            bail!("tools.request_timeout_secs must be greater than 0");
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn tool_timeout(&self) -> Duration {
        Duration::from_secs(self.tools.request_timeout_secs)
    }

    pub fn chat_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream.chat_timeout_secs)
    }

    pub fn session_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream.session_timeout_secs)
    }
}
