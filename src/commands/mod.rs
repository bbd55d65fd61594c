//! Command-line command handlers for stargaze.
//!
//! Each command lives in its own submodule. Handlers return `anyhow::Result`
//! and report through the logger; none of them touch the network.

pub mod cache;
pub mod distance;
pub mod help;
pub mod parse;
pub mod score;
pub mod twilight;

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::cache::{FileStore, ForecastCache};
use crate::config::Config;
use crate::constants::CONFIG_FILE_NAME;
use crate::geo::{Coordinates, parse_coordinates};
use crate::weather::Forecast;

/// Parse a `lat,lon` argument, naming the argument in the error.
pub(crate) fn coordinates_arg(text: &str, what: &str) -> Result<Coordinates> {
    parse_coordinates(text).with_context(|| format!("Invalid {what} '{text}'"))
}

/// A `lat,lon` argument, or the configured site when it was left out.
pub(crate) fn site_arg(text: Option<&str>, what: &str, config: &Config) -> Result<Coordinates> {
    match text {
        Some(text) => coordinates_arg(text, what),
        None => config.coordinates().with_context(|| {
            format!(
                "No {what} given and no site configured (set latitude and longitude in {CONFIG_FILE_NAME})"
            )
        }),
    }
}

/// The on-disk forecast cache in the configured directory, with the
/// configured freshness window.
pub(crate) fn open_forecast_cache(config: &Config) -> Result<ForecastCache<Forecast, FileStore>> {
    let dir = config.cache_dir()?;
    let store = FileStore::open(&dir)
        .with_context(|| format!("Failed to open cache at {}", dir.display()))?;
    Ok(ForecastCache::new(Arc::new(store)).with_ttl(config.cache_ttl()))
}
