//! TOML-based configuration for the collector.
//!
//! Reads `AppConfig` from an explicit path or from the platform config file:
//! - Windows:  `%APPDATA%\KeycodeCollector\config.toml`
//! - Linux:    `$XDG_CONFIG_HOME/keycode-collector/config.toml` (or `~/.config/...`)
//! - macOS:    `~/Library/Application Support/KeycodeCollector/config.toml`
//!
//! Every field has a serde default, so a missing file, an empty file, and a
//! file that sets a single value are all valid:
//!
//! ```toml
//! log_level = "debug"
//!
//! [injector]
//! down_ms = 20
//! random = true
//!
//! [discovery]
//! pre_round_pause_ms = 3000
//! default_end = 127
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::collect_session::SessionDefaults;
use crate::application::discover_keycode::DiscoveryConfig;
use crate::application::inject_keys::{platform_startup_delay, InjectorConfig};

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    #[serde(default)]
    pub injector: InjectorSection,
    #[serde(default)]
    pub discovery: DiscoverySection,
    /// `tracing` filter used when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Keystroke timing and typing modes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InjectorSection {
    #[serde(default)]
    pub before_ms: u64,
    #[serde(default = "default_down_ms")]
    pub down_ms: u64,
    #[serde(default = "default_after_ms")]
    pub after_ms: u64,
    #[serde(default)]
    pub stubborn: bool,
    #[serde(default)]
    pub noisy: bool,
    #[serde(default)]
    pub random: bool,
    /// Zero disables the startup delay.
    #[serde(default = "default_startup_delay_ms")]
    pub startup_delay_ms: u64,
}

/// Discovery pauses and the range offered to the operator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiscoverySection {
    #[serde(default = "default_pause_ms")]
    pub pre_round_pause_ms: u64,
    #[serde(default = "default_pause_ms")]
    pub mid_round_pause_ms: u64,
    #[serde(default = "default_true")]
    pub offer_retype: bool,
    #[serde(default)]
    pub default_start: u16,
    #[serde(default = "default_end")]
    pub default_end: u16,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_log_level() -> String {
    "info".to_string()
}
fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
fn default_down_ms() -> u64 {
    millis(InjectorConfig::for_discovery().down)
}
fn default_after_ms() -> u64 {
    millis(InjectorConfig::for_discovery().after)
}
fn default_startup_delay_ms() -> u64 {
    platform_startup_delay().map_or(0, millis)
}
fn default_pause_ms() -> u64 {
    5000
}
fn default_true() -> bool {
    true
}
fn default_end() -> u16 {
    96
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            injector: InjectorSection::default(),
            discovery: DiscoverySection::default(),
            log_level: default_log_level(),
        }
    }
}

impl Default for InjectorSection {
    fn default() -> Self {
        Self {
            before_ms: 0,
            down_ms: default_down_ms(),
            after_ms: default_after_ms(),
            stubborn: false,
            noisy: false,
            random: false,
            startup_delay_ms: default_startup_delay_ms(),
        }
    }
}

impl Default for DiscoverySection {
    fn default() -> Self {
        Self {
            pre_round_pause_ms: default_pause_ms(),
            mid_round_pause_ms: default_pause_ms(),
            offer_retype: default_true(),
            default_start: 0,
            default_end: default_end(),
        }
    }
}

// ── Conversions ───────────────────────────────────────────────────────────────

impl InjectorSection {
    pub fn to_injector_config(&self) -> InjectorConfig {
        InjectorConfig {
            before: Duration::from_millis(self.before_ms),
            down: Duration::from_millis(self.down_ms),
            after: Duration::from_millis(self.after_ms),
            stubborn: self.stubborn,
            noisy: self.noisy,
            random: self.random,
            startup_delay: (self.startup_delay_ms > 0)
                .then(|| Duration::from_millis(self.startup_delay_ms)),
        }
    }
}

impl DiscoverySection {
    pub fn to_discovery_config(&self) -> DiscoveryConfig {
        DiscoveryConfig {
            pre_round_pause: Duration::from_millis(self.pre_round_pause_ms),
            mid_round_pause: Duration::from_millis(self.mid_round_pause_ms),
            offer_retype: self.offer_retype,
        }
    }

    pub fn session_defaults(&self) -> SessionDefaults {
        SessionDefaults {
            start: self.default_start,
            end: self.default_end,
        }
    }
}

// ── Config loading ────────────────────────────────────────────────────────────

/// Resolves the full path to the platform config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if the base directory cannot be
/// determined.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    platform_config_dir()
        .map(|dir| dir.join("config.toml"))
        .ok_or(ConfigError::NoPlatformConfigDir)
}

/// Loads `AppConfig` from the platform config file, returning defaults if
/// the file does not exist or no config directory is known.
///
/// # Errors
///
/// See [`load_config_from`].
pub fn load_config() -> Result<AppConfig, ConfigError> {
    match config_file_path() {
        Ok(path) => load_config_from(&path),
        Err(ConfigError::NoPlatformConfigDir) => Ok(AppConfig::default()),
        Err(e) => Err(e),
    }
}

/// Loads `AppConfig` from `path`, returning `AppConfig::default()` if the
/// file does not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AppConfig::default()),
        Err(source) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Resolves the platform config directory including the application subdirectory.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("KeycodeCollector"))
    }

    #[cfg(target_os = "linux")]
    {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("keycode-collector"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("KeycodeCollector")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
