//! Configuration for the stargaze CLI.
//!
//! Settings live in `stargaze.toml` under `$XDG_CONFIG_HOME/stargaze/`, or in
//! the directory given with `--config`. A commented default file is written
//! on first load.
//!
//! ```toml
//! #[Observing site]
//! latitude = 39.7392        # Decimal degrees (-90 to 90)
//! longitude = -104.9903     # Decimal degrees (-180 to 180)
//! bortle_class = 4          # Sky darkness at the site (1-9), omit if unknown
//!
//! #[Forecast cache]
//! cache_ttl_minutes = 120   # How long a fetched forecast stays fresh (1-1440)
//! cache_dir = "/path"       # Defaults to $XDG_CACHE_HOME/stargaze
//!
//! #[Output]
//! best_hours_count = 3      # Number of best hours listed per night (1-24)
//! coordinate_decimals = 4   # Precision when printing coordinates (0-8)
//! ```
//!
//! Validation rejects out-of-range values with a message naming the field;
//! a latitude without a longitude (or the reverse) is also an error.

pub mod loading;
pub mod validation;

use anyhow::Result;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::constants::*;
use crate::geo::Coordinates;
use crate::provider::KnownSiteSky;

pub use loading::{
    create_default_config, get_config_path, get_custom_config_dir, load, load_from_path,
    set_config_dir,
};

/// Settings loaded from `stargaze.toml`. Every field is optional.
#[derive(Debug, Default, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Default observing site latitude
    pub latitude: Option<f64>,
    /// Default observing site longitude
    pub longitude: Option<f64>,
    /// Bortle class of the default site
    pub bortle_class: Option<u8>,
    pub cache_ttl_minutes: Option<u64>,
    pub cache_dir: Option<PathBuf>,
    pub best_hours_count: Option<usize>,
    pub coordinate_decimals: Option<u8>,
}

impl Config {
    /// Load from the default or `--config` location.
    pub fn load() -> Result<Self> {
        loading::load()
    }

    /// The configured site, if both halves are present.
    pub fn coordinates(&self) -> Option<Coordinates> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Coordinates::new(lat, lon).ok(),
            _ => None,
        }
    }

    /// Light-pollution lookup for the configured Bortle class. The class
    /// describes the configured site, so it is trusted only near it.
    pub fn light_pollution(&self) -> Option<KnownSiteSky> {
        self.bortle_class.map(|bortle_class| KnownSiteSky {
            bortle_class,
            site: self.coordinates(),
            radius_km: CONFIGURED_SITE_RADIUS_KM,
        })
    }

    pub fn cache_ttl(&self) -> Duration {
        let minutes = self.cache_ttl_minutes.unwrap_or(DEFAULT_CACHE_TTL_MINUTES);
        Duration::minutes(minutes as i64)
    }

    pub fn best_hours_count(&self) -> usize {
        self.best_hours_count.unwrap_or(DEFAULT_BEST_HOURS_COUNT)
    }

    pub fn coordinate_decimals(&self) -> u8 {
        self.coordinate_decimals
            .unwrap_or(DEFAULT_COORDINATE_DECIMALS)
    }

    /// Cache directory, falling back to `$XDG_CACHE_HOME/stargaze`.
    pub fn cache_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.cache_dir {
            return Ok(dir.clone());
        }
        dirs::cache_dir()
            .map(|d| d.join(APP_DIR_NAME))
            .ok_or_else(|| anyhow::anyhow!("Could not determine cache directory"))
    }

    /// Log the effective settings as an indented block.
    pub fn log_config(&self) {
        log_block_start!("Loaded configuration");
        match self.coordinates() {
            Some(c) => log_indented!("Site: {}", c.format(self.coordinate_decimals())),
            None => log_indented!("Site: not configured"),
        }
        match self.bortle_class {
            Some(class) => log_indented!("Bortle class: {class}"),
            None => log_indented!("Bortle class: unknown (neutral light-pollution score)"),
        }
        log_indented!("Cache TTL: {} minutes", self.cache_ttl().num_minutes());
        log_indented!("Best hours listed: {}", self.best_hours_count());
    }
}
