//! Configuration loading functionality.
//!
//! Resolves the config path, writes a default file on first run, and parses
//! and validates the TOML.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use super::Config;
use super::validation::validate_config;
use crate::constants::*;

/// Global configuration directory, set once at startup
static CONFIG_DIR: OnceLock<Option<PathBuf>> = OnceLock::new();

/// Set the configuration directory for the current process.
/// This can only be called once, typically at startup.
pub fn set_config_dir(dir: Option<String>) -> Result<()> {
    CONFIG_DIR
        .set(dir.map(PathBuf::from))
        .map_err(|_| anyhow::anyhow!("Configuration directory already set"))
}

/// Get the custom configuration directory if one was set.
pub fn get_custom_config_dir() -> Option<PathBuf> {
    CONFIG_DIR.get().and_then(|d| d.clone())
}

/// Path of `stargaze.toml`, honoring `--config`.
pub fn get_config_path() -> Result<PathBuf> {
    if let Some(custom_dir) = get_custom_config_dir() {
        return Ok(custom_dir.join(CONFIG_FILE_NAME));
    }
    let config_dir = dirs::config_dir().context("Could not determine config directory")?;
    Ok(config_dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Load configuration, creating a default file if none exists.
pub fn load() -> Result<Config> {
    let config_path = get_config_path()?;

    if !config_path.exists() {
        create_default_config(&config_path)
            .context("Failed to create default config during load")?;
    }

    load_from_path(&config_path)
        .with_context(|| format!("Failed to load configuration from {}", config_path.display()))
}

/// Load configuration from a specific path. Does not create missing files.
pub fn load_from_path(path: &Path) -> Result<Config> {
    if !path.exists() {
        anyhow::bail!("Configuration file not found at {}", path.display());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config from {}", path.display()))?;

    validate_config(&config)?;

    Ok(config)
}

/// Write a commented default configuration to `path`.
pub fn create_default_config(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| {
            format!("Failed to create config directory {}", parent.display())
        })?;
    }

    fs::write(path, default_config_contents())
        .with_context(|| format!("Failed to write default config to {}", path.display()))?;

    log_block_start!("Created default configuration");
    log_indented!("{}", path.display());
    Ok(())
}

fn default_config_contents() -> String {
    format!(
        "#[Observing site]\n\
         # latitude = 39.7392        # Decimal degrees ({MINIMUM_LATITUDE} to {MAXIMUM_LATITUDE})\n\
         # longitude = -104.9903     # Decimal degrees ({MINIMUM_LONGITUDE} to {MAXIMUM_LONGITUDE})\n\
         # bortle_class = 4          # Sky darkness at the site ({MINIMUM_BORTLE_CLASS}-{MAXIMUM_BORTLE_CLASS})\n\
         \n\
         #[Forecast cache]\n\
         cache_ttl_minutes = {DEFAULT_CACHE_TTL_MINUTES}     # Minutes a fetched forecast stays fresh ({MINIMUM_CACHE_TTL_MINUTES}-{MAXIMUM_CACHE_TTL_MINUTES})\n\
         # cache_dir = \"/path\"       # Defaults to $XDG_CACHE_HOME/{APP_DIR_NAME}\n\
         \n\
         #[Output]\n\
         best_hours_count = {DEFAULT_BEST_HOURS_COUNT}        # Best hours listed per night ({MINIMUM_BEST_HOURS_COUNT}-{MAXIMUM_BEST_HOURS_COUNT})\n\
         coordinate_decimals = {DEFAULT_COORDINATE_DECIMALS}     # Precision when printing coordinates (0-{MAXIMUM_COORDINATE_DECIMALS})\n"
    )
}

#[cfg(test)]
pub(crate) fn default_config_for_tests() -> String {
    default_config_contents()
}
