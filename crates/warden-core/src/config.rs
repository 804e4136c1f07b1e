use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

use crate::error::ConfigError;

pub const DEFAULT_EXEC_TIMEOUT_SECS: u64 = 30;

/// Top-level runtime config (`warden.toml` + `WARDEN_*` env overrides).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    pub workspace: PathBuf,
    #[serde(default)]
    pub bus: BusConfig,
    #[serde(default)]
    pub tools: ToolsConfig,
    #[serde(default)]
    pub heartbeat: Option<HeartbeatConfig>,
}

/// Bus queue capacities. `None` means unbounded.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BusConfig {
    pub inbound_capacity: Option<usize>,
    pub outbound_capacity: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    #[serde(default = "default_exec_timeout")]
    pub exec_timeout_secs: u64,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            exec_timeout_secs: DEFAULT_EXEC_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeartbeatConfig {
    pub interval_secs: u64,
    pub content: String,
}

fn default_exec_timeout() -> u64 {
    DEFAULT_EXEC_TIMEOUT_SECS
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            workspace: default_workspace(),
            bus: BusConfig::default(),
            tools: ToolsConfig::default(),
            heartbeat: None,
        }
    }
}

fn default_workspace() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

impl WorkspaceConfig {
    /// Load config from a TOML file with `WARDEN_*` env var overrides.
    ///
    /// Checks in order:
    ///   1. Explicit path argument
    ///   2. `WARDEN_CONFIG` env var
    ///   3. `~/.warden/warden.toml`
    ///
    /// Falls back to `WorkspaceConfig::default()` with a logged warning when
    /// extraction fails, rather than propagating the error.
    pub fn load(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let path = config_path
            .map(String::from)
            .or_else(|| std::env::var("WARDEN_CONFIG").ok())
            .unwrap_or_else(default_config_path);

        let result: Result<WorkspaceConfig, _> = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("WARDEN_").split("_"))
            .extract();

        match result {
            Ok(config) => Ok(config),
            Err(e) => {
                warn!(path = %path, error = %e, "failed to load config, falling back to defaults");
                Ok(Self::default())
            }
        }
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.warden/warden.toml", home)
}
