//! Cache-first forecast retrieval.
//!
//! [`ForecastService`] applies the refresh rules around the provider:
//!
//! - fresh hit: serve from cache, no network call
//! - miss or stale hit: refresh; on success store and serve the new value
//! - transient failure: serve the stale value if there is one, otherwise
//!   report the forecast as unavailable
//! - authorization failure: always an error, even with a stale value at hand
//!
//! Concurrent misses for the same key are not coalesced; two callers may
//! both refresh.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use crate::cache::{CacheLookup, ForecastCache, KeyValueStore};
use crate::provider::{LocationQuery, ProviderError, WeatherProvider};
use crate::weather::Forecast;

#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("weather provider credentials were rejected")]
    Unauthorized(#[source] ProviderError),
    #[error("forecast for '{key}' is unavailable: {reason}")]
    Unavailable { key: String, reason: String },
}

/// Where a served forecast came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ForecastSource {
    Cache,
    Network,
    /// A stale cached value served because the refresh failed.
    StaleFallback,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastResponse {
    pub forecast: Forecast,
    pub source: ForecastSource,
}

pub struct ForecastService<P: WeatherProvider, S: KeyValueStore> {
    provider: P,
    cache: ForecastCache<Forecast, S>,
}

impl<P: WeatherProvider, S: KeyValueStore> ForecastService<P, S> {
    pub fn new(provider: P, cache: ForecastCache<Forecast, S>) -> Self {
        Self { provider, cache }
    }

    /// Convenience constructor with a default cache over `store`.
    pub fn with_store(provider: P, store: Arc<S>) -> Self {
        Self::new(provider, ForecastCache::new(store))
    }

    pub fn cache(&self) -> &ForecastCache<Forecast, S> {
        &self.cache
    }

    pub fn forecast(&self, query: &LocationQuery) -> Result<ForecastResponse, ForecastError> {
        let key = query.cache_key();

        let stale = match self.cache.get(&key) {
            CacheLookup::HitFresh(forecast) => {
                return Ok(ForecastResponse {
                    forecast,
                    source: ForecastSource::Cache,
                });
            }
            CacheLookup::HitStale(forecast) => Some(forecast),
            CacheLookup::Miss => None,
        };

        match self.provider.fetch_forecast(query) {
            Ok(forecast) => {
                if let Err(e) = self.cache.set(&key, forecast.clone()) {
                    log_warning!("Could not cache forecast for '{}': {}", key, e);
                }
                Ok(ForecastResponse {
                    forecast,
                    source: ForecastSource::Network,
                })
            }
            Err(error) if error.is_authorization() => {
                log_error!("Weather provider rejected credentials: {}", error);
                Err(ForecastError::Unauthorized(error))
            }
            Err(error) => match stale {
                Some(forecast) => {
                    log_warning!("Refresh failed for '{}', serving stale forecast: {}", key, error);
                    Ok(ForecastResponse {
                        forecast,
                        source: ForecastSource::StaleFallback,
                    })
                }
                None => Err(ForecastError::Unavailable {
                    key,
                    reason: error.to_string(),
                }),
            },
        }
    }
}
