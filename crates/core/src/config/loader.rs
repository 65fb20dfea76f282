//! Config path resolution
//!
//! Config files live next to the host executable unless the
//! `IDLESYNC_CONFIG_DIR` environment variable points elsewhere.

use std::path::{Path, PathBuf};

use super::{ConfigError, ConfigResult};

/// Environment variable overriding the config directory
pub const CONFIG_DIR_ENV: &str = "IDLESYNC_CONFIG_DIR";

/// Returns the base configs directory.
///
/// Path: `$IDLESYNC_CONFIG_DIR` if set, otherwise `<host dir>/idlesync/`
pub fn configs_dir() -> ConfigResult<PathBuf> {
    if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV) {
        return Ok(PathBuf::from(dir));
    }

    let exe = std::env::current_exe().map_err(ConfigError::IoError)?;
    configs_dir_for(&exe)
}

/// Config directory for a given host executable path
fn configs_dir_for(host_exe: &Path) -> ConfigResult<PathBuf> {
    host_exe
        .parent()
        .map(|dir| dir.join("idlesync"))
        .ok_or(ConfigError::NoConfigDirectory)
}

/// Returns the path for a plugin's config file.
///
/// Path: `<configs>/plugins/{plugin_name}.toml`
pub fn plugin_config_path(plugin_name: &str) -> ConfigResult<PathBuf> {
    Ok(plugin_config_path_in(&configs_dir()?, plugin_name))
}

/// Returns the core config path.
///
/// Path: `<configs>/core.toml`
pub fn core_config_path() -> ConfigResult<PathBuf> {
    Ok(configs_dir()?.join("core.toml"))
}

fn plugin_config_path_in(base: &Path, plugin_name: &str) -> PathBuf {
    base.join("plugins").join(format!("{}.toml", plugin_name))
}
