//! Application settings loading from config.toml
//!
//! Every field has a default, so a missing file or a partial file is fine.
//! Only a file that exists but cannot be read or parsed is an error.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

/// Tunables for listings, suggestions and password hashing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Rows per page on the pantry listing
    pub page_size: u64,
    /// Upper bound applied to any caller-supplied page size
    pub max_page_size: u64,
    /// Number of autocomplete suggestions
    pub suggestion_limit: u64,
    /// bcrypt work factor
    pub password_cost: u32,
    /// Connection pool settings
    pub database: DatabaseSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            page_size: 10,
            max_page_size: 100,
            suggestion_limit: 5,
            password_cost: bcrypt::DEFAULT_COST,
            database: DatabaseSettings::default(),
        }
    }
}

impl Settings {
    /// Clamps a requested page size into `1..=max_page_size`.
    #[must_use]
    pub fn clamp_page_size(&self, requested: u64) -> u64 {
        requested.clamp(1, self.max_page_size.max(1))
    }
}

/// Connection pool bounds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// Upper bound on open connections
    pub max_connections: u32,
    /// Connections kept warm
    pub min_connections: u32,
    /// Seconds an idle connection is kept
    pub idle_timeout_secs: u64,
    /// Seconds before a connection is recycled
    pub max_lifetime_secs: u64,
    /// Seconds to wait when acquiring a connection
    pub connect_timeout_secs: u64,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 1,
            idle_timeout_secs: 180,
            max_lifetime_secs: 180,
            connect_timeout_secs: 5,
        }
    }
}

/// Loads settings from a TOML file
///
/// # Errors
/// Returns an error if the file cannot be read or the TOML is invalid.
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path = path.as_ref();
    debug!("Loading settings from {}", path.display());
    let contents = std::fs::read_to_string(path).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path.display()),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse {}: {e}", path.display()),
    })
}

/// Loads `./config.toml` if present, defaults otherwise.
pub fn load_default_settings() -> Result<Settings> {
    let path = Path::new("config.toml");
    if path.exists() {
        load_settings(path)
    } else {
        info!("No config.toml found, using default settings");
        Ok(Settings::default())
    }
}
