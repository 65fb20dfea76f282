//! Configuration for idlesync
//!
//! Config structs are plain serde types stored as TOML. Missing files are
//! created with default values on first load.
//!
//! # Example
//!
//! ```ignore
//! use serde::{Deserialize, Serialize};
//! use idlesync_core::PluginConfig;
//!
//! #[derive(Default, Serialize, Deserialize)]
//! pub struct BridgeConfig {
//!     pub port: u16,
//! }
//!
//! impl PluginConfig for BridgeConfig {
//!     const PLUGIN_NAME: &'static str = "bridge";
//! }
//!
//! let config = BridgeConfig::load().unwrap_or_default();
//! ```

mod loader;

use std::path::Path;

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::tasks::ExecutionMode;

pub use loader::{configs_dir, core_config_path, plugin_config_path, CONFIG_DIR_ENV};

/// Configuration system errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read or write config file
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse TOML content
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Failed to serialize config to TOML
    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    /// Could not determine config directory
    #[error("Config directory not available - could not resolve host path")]
    NoConfigDirectory,
}

/// Result type for config operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Read `path`, or write `T::default()` there if it does not exist yet
fn load_or_create<T>(path: &Path) -> ConfigResult<T>
where
    T: Default + Serialize + DeserializeOwned,
{
    if path.exists() {
        let content = std::fs::read_to_string(path)?;
        let config = toml::from_str(&content)?;
        tracing::debug!("Loaded config from {:?}", path);
        Ok(config)
    } else {
        let default = T::default();
        write_to(path, &default)?;
        tracing::info!("Created default config at {:?}", path);
        Ok(default)
    }
}

fn write_to<T: Serialize>(path: &Path, config: &T) -> ConfigResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    std::fs::write(path, toml::to_string_pretty(config)?)?;
    tracing::debug!("Saved config to {:?}", path);
    Ok(())
}

/// Trait for plugin configuration types.
///
/// Configs are stored at `<configs>/plugins/{PLUGIN_NAME}.toml`.
pub trait PluginConfig: Default + Serialize + DeserializeOwned + Send + Sync {
    /// The plugin name used for config file path resolution.
    const PLUGIN_NAME: &'static str;

    /// Load config from file, creating default if missing.
    fn load() -> ConfigResult<Self> {
        load_or_create(&plugin_config_path(Self::PLUGIN_NAME)?)
    }

    /// Save config to file.
    fn save(&self) -> ConfigResult<()> {
        write_to(&plugin_config_path(Self::PLUGIN_NAME)?, self)
    }

    /// Reload config from file.
    fn reload(&mut self) -> ConfigResult<()> {
        let content = std::fs::read_to_string(plugin_config_path(Self::PLUGIN_NAME)?)?;
        *self = toml::from_str(&content)?;
        Ok(())
    }
}

/// Core framework configuration.
///
/// Loaded from `<configs>/core.toml` at plugin load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Config version for future migration support
    pub version: u32,

    /// Enable debug logging
    pub debug: bool,

    /// How `schedule_or_execute` runs work
    pub mode: ExecutionMode,

    /// Attach the host idle trigger; when false, submissions never ask the
    /// host for an idle cycle and work waits for the next regular one
    pub notify_host: bool,

    /// Log failures from fire-and-forget and immediate tasks instead of
    /// dropping them silently
    pub report_discarded_failures: bool,

    /// Warn when a single drained task runs longer than this (milliseconds)
    pub slow_task_warn_ms: u64,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            version: 1,
            debug: false,
            mode: ExecutionMode::default(),
            notify_host: true,
            report_discarded_failures: false,
            slow_task_warn_ms: 16,
        }
    }
}

impl CoreConfig {
    /// Load core config from file, creating default if missing.
    pub fn load() -> ConfigResult<Self> {
        Self::load_from(&core_config_path()?)
    }

    /// Load core config from an explicit path, creating default if missing.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        load_or_create(path)
    }

    /// Save core config to file.
    pub fn save(&self) -> ConfigResult<()> {
        write_to(&core_config_path()?, self)
    }

    /// Reload core config from file.
    pub fn reload(&mut self) -> ConfigResult<()> {
        let content = std::fs::read_to_string(core_config_path()?)?;
        *self = toml::from_str(&content)?;
        tracing::debug!("Reloaded core config");
        Ok(())
    }
}
