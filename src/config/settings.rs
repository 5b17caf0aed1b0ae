//! Application settings loaded from `config.toml`.
//!
//! Every section is optional; a missing file yields the defaults so a fresh checkout
//! starts without any configuration.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

/// Default location of the settings file
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Default, Clone, Deserialize)]
pub struct Settings {
    /// Settlement calculation options
    #[serde(default)]
    pub settlement: SettlementSettings,
    /// Bot front-end options
    #[serde(default)]
    pub bot: BotSettings,
}

/// `[settlement]` section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct SettlementSettings {
    /// Give contributors who ate nothing in the period a balance row too.
    /// Off by default, which keeps them out of the balance sheet.
    #[serde(default)]
    pub include_non_eating_contributors: bool,
}

/// `[bot]` section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct BotSettings {
    /// Register commands in this guild only (instant updates while developing)
    pub dev_guild_id: Option<u64>,
}

/// Loads settings from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path_ref = path.as_ref();
    debug!("Loading settings from {path_ref:?}");
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {path_ref:?}: {e}"),
    })?;

    parse_settings(&contents)
}

/// Parses settings from TOML text
pub fn parse_settings(contents: &str) -> Result<Settings> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads settings from `CONFIG_PATH` (or `./config.toml`), falling back to defaults
/// when the file does not exist. A file that exists but does not parse is an error.
pub fn load_default_settings() -> Result<Settings> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    if Path::new(&path).exists() {
        load_settings(&path)
    } else {
        info!("No settings file at {path}, using defaults");
        Ok(Settings::default())
    }
}
