//! # Stargaze Library
//!
//! Observing-conditions advisor for amateur astronomers: validates site
//! coordinates, derives the night's twilight boundaries, scores hourly
//! weather for stargazing, and caches forecasts with TTL and calendar-date
//! staleness.
//!
//! ## Architecture
//!
//! - **Pure core**: `geo` (coordinate parsing and distance), `twilight`
//!   (boundary instants and phase classification) and `scoring` (weighted
//!   recommendations). No I/O, no logging, no shared state.
//! - **Data model**: `weather` holds the provider-shaped forecast records.
//! - **Caching**: `cache` wraps a pluggable key-value store; `forecast`
//!   applies the cache-first refresh and stale-fallback rules around a
//!   `provider::WeatherProvider`.
//! - **Infrastructure**: `config`, `time_source`, `logger`, and the CLI
//!   pieces (`args`, `commands`) used by the binary.

// Import macros from logger module for use in all submodules
#[macro_use]
pub mod logger;

pub mod args;
pub mod cache;
pub mod commands;
pub mod config;
pub mod constants;
pub mod forecast;
pub mod geo;
pub mod provider;
pub mod scoring;
pub mod time_source;
pub mod twilight;
pub mod weather;

pub use cache::{CacheLookup, ForecastCache};
pub use forecast::{ForecastError, ForecastService};
pub use geo::Coordinates;
pub use scoring::{Rating, Recommendation, calculate_recommendation};
pub use twilight::{TwilightBoundaries, TwilightPhase};
