//! Configuration file loading
//!
//! Converter tuning lives in an optional TOML file. Resolution priority for
//! every setting is: command-line argument → environment variable → TOML
//! config file → compiled default. This module handles the TOML tier; the
//! consuming crate layers CLI/env on top.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Raw TOML configuration
///
/// Every field is optional; absent fields fall through to env/defaults.
/// The detection and fuzzy-match thresholds are empirically tuned values,
/// deliberately exposed here rather than compiled in.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    /// Minimum detection score to accept a dialect (default 0.6)
    pub detection_floor: Option<f32>,
    /// Required lead over the runner-up dialect (default 0.2)
    pub detection_margin: Option<f32>,
    /// Minimum fuzzy score to accept a set-name correction (default 0.7)
    pub set_acceptance: Option<f32>,
    /// Minimum delay between consecutive card-database requests, in ms
    pub rate_limit_ms: Option<u64>,
    /// Maximum identifiers per batch lookup request
    pub batch_size: Option<usize>,
    /// Card database base URL
    pub card_api_base: Option<String>,
    /// HTTP User-Agent header
    pub user_agent: Option<String>,
    /// HTTP request timeout, in seconds
    pub request_timeout_secs: Option<u64>,
}

impl TomlConfig {
    /// Load configuration from an explicit path
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Invalid config file {}: {}", path.display(), e)))
    }

    /// Load configuration from the default platform location, if present
    ///
    /// Missing config file is not an error; it yields defaults.
    pub fn load_default() -> Result<Self> {
        match default_config_path() {
            Some(path) if path.exists() => {
                tracing::info!(path = %path.display(), "Loading config file");
                Self::load(&path)
            }
            _ => Ok(Self::default()),
        }
    }
}

/// Default configuration file path for the platform
///
/// Linux: `~/.config/deckport/config.toml` (falling back to
/// `/etc/deckport/config.toml`); macOS/Windows: the platform config dir.
pub fn default_config_path() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("deckport").join("config.toml"));

    if cfg!(target_os = "linux") {
        if let Some(path) = &user_config {
            if path.exists() {
                return user_config;
            }
        }
        let system_config = PathBuf::from("/etc/deckport/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
        return user_config;
    }

    user_config
}
