//! Daemon configuration loader.
//!
//! One TOML document for the daemon itself; display layouts live in
//! their own file (they are data, loadable independent of the binary)
//! and are resolved here so startup fails fast on a dangling layout
//! reference. Configuration errors are the only fatal errors in the
//! process.

use crate::schedule::ScheduleConfig;
use lcdlink_display::LayoutFile;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration loading/validation error. Fatal at startup.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A config file could not be read
    #[error("config I/O: {0}")]
    Io(String),
    /// TOML parse error
    #[error("config parse: {0}")]
    Parse(String),
    /// Structural validation error
    #[error("config validation: {0}")]
    Validation(String),
    /// Layout file failed to load or the active layout is missing
    #[error("layout config: {0}")]
    Layout(#[from] lcdlink_display::DisplayError),
}

/// Daemon settings as parsed from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct DaemonConfig {
    /// Name of the producer's shared-memory region.
    pub region_name: String,
    /// Executable name of the producer process, for the liveness probe.
    pub producer_process: String,
    /// Serial port path, or `"TEST"` for the in-process loopback sink.
    pub port: String,
    /// Tick period in milliseconds (nominal 1000).
    #[serde(default = "default_tick_ms")]
    pub tick_interval_ms: u64,
    /// Serial write timeout in milliseconds.
    #[serde(default = "default_write_timeout_ms")]
    pub write_timeout_ms: u64,
    /// Path to the layout file, relative paths resolve against this
    /// config file's directory.
    pub layout_file: String,
    /// Name of the layout to render.
    pub active_layout: String,
    /// Optional auto-connect window.
    #[serde(default)]
    pub schedule: ScheduleConfig,
}

fn default_tick_ms() -> u64 {
    1000
}

fn default_write_timeout_ms() -> u64 {
    2000
}

impl DaemonConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.region_name.is_empty() {
            return Err(ConfigError::Validation("empty region_name".to_string()));
        }
        if self.producer_process.is_empty() {
            return Err(ConfigError::Validation(
                "empty producer_process".to_string(),
            ));
        }
        if self.port.is_empty() {
            return Err(ConfigError::Validation("empty port".to_string()));
        }
        if self.tick_interval_ms < 100 {
            return Err(ConfigError::Validation(format!(
                "tick_interval_ms {} below minimum 100",
                self.tick_interval_ms
            )));
        }
        if self.write_timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "write_timeout_ms must be positive".to_string(),
            ));
        }
        self.schedule
            .validate()
            .map_err(ConfigError::Validation)?;
        Ok(())
    }
}

/// Complete validated configuration, ready for runtime use.
#[derive(Debug)]
pub struct LoadedConfig {
    /// Daemon settings.
    pub daemon: DaemonConfig,
    /// All layouts from the layout file.
    pub layouts: LayoutFile,
}

/// Load and validate the daemon configuration and its layout file.
///
/// 1. Parse `path` → `DaemonConfig`
/// 2. Validate daemon settings
/// 3. Load the referenced layout file
/// 4. Check the active layout exists
pub fn load(path: &Path) -> Result<LoadedConfig, ConfigError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::Io(format!("failed to read {}: {e}", path.display())))?;

    let daemon: DaemonConfig =
        toml::from_str(&text).map_err(|e| ConfigError::Parse(e.to_string()))?;
    daemon.validate()?;

    let layout_path = resolve_layout_path(path, &daemon.layout_file);
    let layouts = LayoutFile::load(&layout_path).map_err(|e| match e {
        lcdlink_display::DisplayError::Io { source } => {
            ConfigError::Io(format!("failed to read {}: {source}", layout_path.display()))
        }
        other => ConfigError::Layout(other),
    })?;

    // Fail fast on a dangling reference.
    layouts.get(&daemon.active_layout)?;

    Ok(LoadedConfig { daemon, layouts })
}

/// Load from TOML strings (for testing).
pub fn load_from_strings(daemon_toml: &str, layout_toml: &str) -> Result<LoadedConfig, ConfigError> {
    let daemon: DaemonConfig =
        toml::from_str(daemon_toml).map_err(|e| ConfigError::Parse(e.to_string()))?;
    daemon.validate()?;

    let layouts = LayoutFile::from_toml(layout_toml)?;
    layouts.get(&daemon.active_layout)?;

    Ok(LoadedConfig { daemon, layouts })
}

fn resolve_layout_path(config_path: &Path, layout_file: &str) -> PathBuf {
    let layout = Path::new(layout_file);
    if layout.is_absolute() {
        return layout.to_path_buf();
    }
    match config_path.parent() {
        Some(dir) => dir.join(layout),
        None => layout.to_path_buf(),
    }
}
