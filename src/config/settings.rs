//! Farm settings loading from config.toml
//!
//! The settings name the farm the command line tools act for and the default
//! per-unit courier costs that entry forms pre-fill. Both sections are optional
//! except `[farm]`.

use crate::core::classifier::CostDefaults;
use crate::core::context::FarmContext;
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Deserialize)]
pub struct Settings {
    /// The farm this installation manages
    pub farm: FarmSettings,
    /// Default courier costs; falls back to [`CostDefaults::default`]
    #[serde(default)]
    pub costs: CostDefaults,
}

/// The `[farm]` table
#[derive(Debug, Deserialize, Clone)]
pub struct FarmSettings {
    /// Farm (tenant) id used to scope every query
    pub id: i64,
    /// Display name, only used in log output
    #[serde(default)]
    pub name: Option<String>,
}

impl Settings {
    /// Builds the request context for the configured farm.
    #[must_use]
    pub const fn farm_context(&self) -> FarmContext {
        FarmContext::new(self.farm.id)
    }
}

/// Loads settings from a TOML file
///
/// # Errors
/// Returns [`Error::Config`] if the file cannot be read, the TOML syntax is invalid
/// or the `[farm]` table is missing.
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path_ref = path.as_ref();
    debug!("Loading settings from {}", path_ref.display());

    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;

    let settings: Settings = toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse {}: {e}", path_ref.display()),
    })?;

    info!(
        farm_id = settings.farm.id,
        farm_name = settings.farm.name.as_deref().unwrap_or("-"),
        "Settings loaded"
    );
    Ok(settings)
}

/// Loads settings from the default location (./config.toml)
pub fn load_default_settings() -> Result<Settings> {
    load_settings("config.toml")
}
