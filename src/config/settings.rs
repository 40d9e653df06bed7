//! Ledger settings loading from config.toml and the environment.
//!
//! The `group_id` names the shared data "room": every client using the same id
//! reads and writes the same ledger. A missing `.env` file is not an error.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

/// Room used when nothing else is configured.
pub const DEFAULT_GROUP_ID: &str = "lunch-group-01";

fn default_group_id() -> String {
    DEFAULT_GROUP_ID.to_string()
}

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LedgerConfig {
    /// Shared data room identifier
    #[serde(default = "default_group_id")]
    pub group_id: String,
    /// Optional database URL for the local cache
    #[serde(default)]
    pub database_url: Option<String>,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            group_id: default_group_id(),
            database_url: None,
        }
    }
}

impl LedgerConfig {
    /// Applies `LEDGER_GROUP_ID` from the environment, if set.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(group_id) = std::env::var("LEDGER_GROUP_ID")
            && !group_id.trim().is_empty()
        {
            self.group_id = group_id.trim().to_string();
        }
        self
    }
}

/// Parses settings from TOML text.
pub fn parse_config(contents: &str) -> Result<LedgerConfig> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads settings from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<LedgerConfig> {
    let path_ref = path.as_ref();
    debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;
    parse_config(&contents)
}

/// Loads `.env`, then ./config.toml if present, then environment overrides.
///
/// A missing config.toml falls back to the defaults; a malformed one is an error.
pub fn load_app_configuration() -> Result<LedgerConfig> {
    dotenvy::dotenv().ok();

    let path = Path::new("config.toml");
    let config = if path.exists() {
        load_config(path)?
    } else {
        debug!("No config.toml found, using defaults");
        LedgerConfig::default()
    };

    let config = config.with_env_overrides();
    info!("Using ledger group '{}'", config.group_id);
    Ok(config)
}
