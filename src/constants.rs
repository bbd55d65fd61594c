//! Application-wide constants and default values.
//!
//! Grouped by the module that consumes them. Scoring weights and twilight
//! model parameters live here so tests and the config layer share one source.

// # Application Metadata

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;

pub const CONFIG_FILE_NAME: &str = "stargaze.toml";
pub const APP_DIR_NAME: &str = "stargaze";

// # Geographic

pub const MINIMUM_LATITUDE: f64 = -90.0;
pub const MAXIMUM_LATITUDE: f64 = 90.0;
pub const MINIMUM_LONGITUDE: f64 = -180.0;
pub const MAXIMUM_LONGITUDE: f64 = 180.0;

/// Mean Earth radius used by the haversine distance.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

pub const DEFAULT_COORDINATE_DECIMALS: u8 = 4;
pub const MAXIMUM_COORDINATE_DECIMALS: u8 = 8;

// # Twilight Model

/// Base length of each twilight phase before latitude/season scaling.
pub const TWILIGHT_BASE_MINUTES: f64 = 30.0;

/// Day of year of the June solstice (northern summer).
pub const NORTHERN_SOLSTICE_DAY: i64 = 172;
/// Day of year of the December solstice (southern summer).
pub const SOUTHERN_SOLSTICE_DAY: i64 = 355;

pub const DAYS_PER_YEAR: i64 = 365;
pub const HALF_YEAR_DAYS: f64 = 182.0;

/// Maximum fractional shortening of twilight at the winter solstice.
pub const SEASONAL_TWILIGHT_SWING: f64 = 0.2;

pub const AXIAL_TILT_DEGREES: f64 = 23.45;
/// Day-of-year offset that puts the March equinox at zero declination.
pub const EQUINOX_DAY_OFFSET: f64 = 81.0;

pub const CIVIL_DEPRESSION_DEGREES: f64 = 6.0;
pub const NAUTICAL_DEPRESSION_DEGREES: f64 = 12.0;
pub const ASTRONOMICAL_DEPRESSION_DEGREES: f64 = 18.0;

// # Condition Scoring

pub const WEIGHT_CLOUD: f64 = 0.35;
pub const WEIGHT_MOON: f64 = 0.25;
pub const WEIGHT_HUMIDITY: f64 = 0.15;
pub const WEIGHT_VISIBILITY: f64 = 0.15;
pub const WEIGHT_LIGHT_POLLUTION: f64 = 0.10;

pub const DEEP_SKY_WEIGHT_CLOUD: f64 = 0.40;
pub const DEEP_SKY_WEIGHT_MOON: f64 = 0.35;
pub const DEEP_SKY_WEIGHT_LIGHT_POLLUTION: f64 = 0.15;
pub const DEEP_SKY_WEIGHT_VISIBILITY: f64 = 0.10;

pub const PLANETARY_WEIGHT_CLOUD: f64 = 0.50;
pub const PLANETARY_WEIGHT_VISIBILITY: f64 = 0.30;
pub const PLANETARY_WEIGHT_HUMIDITY: f64 = 0.20;

/// Light-pollution score used when no Bortle class is known.
pub const NEUTRAL_LIGHT_POLLUTION_SCORE: f64 = 50.0;

pub const EXCELLENT_THRESHOLD: f64 = 85.0;
pub const GOOD_THRESHOLD: f64 = 70.0;
pub const FAIR_THRESHOLD: f64 = 50.0;

pub const MINIMUM_BORTLE_CLASS: u8 = 1;
pub const MAXIMUM_BORTLE_CLASS: u8 = 9;

/// How far from the configured site its Bortle class is still trusted.
pub const CONFIGURED_SITE_RADIUS_KM: f64 = 25.0;

pub const DEFAULT_BEST_HOURS_COUNT: usize = 3;
pub const MINIMUM_BEST_HOURS_COUNT: usize = 1;
pub const MAXIMUM_BEST_HOURS_COUNT: usize = 24;

// # Forecast Cache

pub const DEFAULT_CACHE_TTL_MINUTES: u64 = 120;
pub const MINIMUM_CACHE_TTL_MINUTES: u64 = 1;
pub const MAXIMUM_CACHE_TTL_MINUTES: u64 = 1440;

/// Prefix separating this cache's entries from foreign keys in a shared store.
pub const FORECAST_CACHE_NAMESPACE: &str = "stargaze.forecast.";

// # Providers

/// Location searches shorter than this never reach the provider.
pub const MINIMUM_SEARCH_QUERY_LEN: usize = 2;

// # Test Constants

#[cfg(any(test, feature = "testing-support"))]
pub mod test_constants {
    pub const DENVER: (f64, f64) = (39.7392, -104.9903);
    pub const NEW_YORK: (f64, f64) = (40.7128, -74.0060);
    pub const LONDON: (f64, f64) = (51.5074, -0.1278);
    pub const TOKYO: (f64, f64) = (35.6762, 139.6503);
    pub const SYDNEY: (f64, f64) = (-33.8688, 151.2093);
}
