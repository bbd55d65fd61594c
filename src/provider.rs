//! Seams for the external data providers.
//!
//! Transport (HTTP, retries, API keys) lives outside this crate. What lives
//! here is the contract: how provider failures are classified, how location
//! input is routed, and the short-circuit for too-short search queries.

use thiserror::Error;

use crate::constants::MINIMUM_SEARCH_QUERY_LEN;
use crate::geo::{Coordinates, looks_like_coordinates, parse_coordinates};
use crate::weather::{Forecast, Location};

/// Provider failure classes.
///
/// Authorization failures are configuration errors and must reach the
/// caller; everything else is transient and may be papered over with a
/// stale cached value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("provider rejected the credentials (HTTP {status})")]
    Authorization { status: u16 },
    #[error("provider request failed: {reason}")]
    Transient { reason: String },
}

impl ProviderError {
    /// Classify an HTTP status. `Ok` for 2xx.
    pub fn check_status(status: u16) -> Result<(), ProviderError> {
        match status {
            200..=299 => Ok(()),
            401 | 403 => Err(ProviderError::Authorization { status }),
            other => Err(ProviderError::Transient {
                reason: format!("unexpected HTTP status {other}"),
            }),
        }
    }

    pub fn transient(reason: impl Into<String>) -> Self {
        ProviderError::Transient {
            reason: reason.into(),
        }
    }

    pub fn is_authorization(&self) -> bool {
        matches!(self, ProviderError::Authorization { .. })
    }
}

/// What the user asked a forecast for.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationQuery {
    Coordinates(Coordinates),
    Text(String),
}

impl LocationQuery {
    /// Route free text: a valid coordinate pair becomes coordinates, anything
    /// else (place names, postal codes) is passed to the provider as text.
    pub fn from_input(input: &str) -> Self {
        if looks_like_coordinates(input)
            && let Ok(coordinates) = parse_coordinates(input)
        {
            return LocationQuery::Coordinates(coordinates);
        }
        LocationQuery::Text(input.trim().to_string())
    }

    /// Stable cache key. Coordinates are rounded to ~1 km so nearby lookups share an entry.
    pub fn cache_key(&self) -> String {
        match self {
            LocationQuery::Coordinates(c) => {
                format!("{:.2},{:.2}", c.latitude(), c.longitude())
            }
            LocationQuery::Text(text) => text.to_lowercase(),
        }
    }
}

/// Fetches a multi-day forecast.
#[cfg_attr(test, mockall::automock)]
pub trait WeatherProvider {
    fn fetch_forecast(&self, query: &LocationQuery) -> Result<Forecast, ProviderError>;
}

/// Looks up the Bortle class for a site. `None` when unavailable, which
/// never blocks scoring.
pub trait LightPollutionProvider {
    fn bortle_class(&self, coordinates: Coordinates) -> Option<u8>;
}

/// Light-pollution lookup that only knows one site.
///
/// Answers with the known class within `radius_km` of `site`, and with
/// nothing farther out. Without a site the class applies everywhere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KnownSiteSky {
    pub bortle_class: u8,
    pub site: Option<Coordinates>,
    pub radius_km: f64,
}

impl LightPollutionProvider for KnownSiteSky {
    fn bortle_class(&self, coordinates: Coordinates) -> Option<u8> {
        match self.site {
            Some(site) if site.distance_km(&coordinates) > self.radius_km => None,
            _ => Some(self.bortle_class),
        }
    }
}

/// Location autocomplete.
pub trait LocationSearch {
    fn search(&self, query: &str) -> Result<Vec<Location>, ProviderError>;
}

/// Search for locations, skipping the provider entirely for queries shorter
/// than two characters.
pub fn search_locations(
    search: &dyn LocationSearch,
    query: &str,
) -> Result<Vec<Location>, ProviderError> {
    let query = query.trim();
    if query.chars().count() < MINIMUM_SEARCH_QUERY_LEN {
        return Ok(Vec::new());
    }
    search.search(query)
}

/// Decode a provider response body. Empty or malformed bodies are transient failures.
pub fn parse_forecast_payload(body: &str) -> Result<Forecast, ProviderError> {
    if body.trim().is_empty() {
        return Err(ProviderError::transient("empty response body"));
    }
    let forecast: Forecast = serde_json::from_str(body)
        .map_err(|e| ProviderError::transient(format!("malformed response: {e}")))?;
    if forecast.days.is_empty() {
        return Err(ProviderError::transient("response contained no forecast days"));
    }
    Ok(forecast)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct CountingSearch {
        calls: Cell<usize>,
    }

    impl LocationSearch for CountingSearch {
        fn search(&self, query: &str) -> Result<Vec<Location>, ProviderError> {
            self.calls.set(self.calls.get() + 1);
            Ok(vec![Location {
                id: Some(1),
                name: query.to_string(),
                region: String::new(),
                country: String::new(),
                lat: 0.0,
                lon: 0.0,
            }])
        }
    }

    #[test]
    fn test_status_classification() {
        assert_eq!(ProviderError::check_status(200), Ok(()));
        assert!(ProviderError::check_status(401).unwrap_err().is_authorization());
        assert!(ProviderError::check_status(403).unwrap_err().is_authorization());
        assert!(!ProviderError::check_status(404).unwrap_err().is_authorization());
        assert!(!ProviderError::check_status(503).unwrap_err().is_authorization());
    }

    #[test]
    fn test_short_queries_never_reach_provider() {
        let search = CountingSearch { calls: Cell::new(0) };

        assert!(search_locations(&search, "").unwrap().is_empty());
        assert!(search_locations(&search, " a ").unwrap().is_empty());
        assert_eq!(search.calls.get(), 0);

        assert_eq!(search_locations(&search, "Bo").unwrap().len(), 1);
        assert_eq!(search.calls.get(), 1);
    }

    #[test]
    fn test_location_query_routing() {
        assert!(matches!(
            LocationQuery::from_input("39.7392, -104.9903"),
            LocationQuery::Coordinates(_)
        ));
        // Out-of-range pairs fall through to text rather than failing
        assert_eq!(
            LocationQuery::from_input("200,-104"),
            LocationQuery::Text("200,-104".to_string())
        );
        assert_eq!(
            LocationQuery::from_input(" 80302 "),
            LocationQuery::Text("80302".to_string())
        );
    }

    #[test]
    fn test_cache_key_normalizes() {
        assert_eq!(
            LocationQuery::from_input("39.73921,-104.99031").cache_key(),
            "39.74,-104.99"
        );
        assert_eq!(LocationQuery::Text("Denver".into()).cache_key(), "denver");
    }

    #[test]
    fn test_known_site_sky_only_answers_near_its_site() {
        let denver = Coordinates::new(39.7392, -104.9903).unwrap();
        let boulder = Coordinates::new(40.0150, -105.2705).unwrap();
        let new_york = Coordinates::new(40.7128, -74.0060).unwrap();

        let sky = KnownSiteSky {
            bortle_class: 6,
            site: Some(denver),
            radius_km: 50.0,
        };
        assert_eq!(sky.bortle_class(denver), Some(6));
        assert_eq!(sky.bortle_class(boulder), Some(6));
        assert_eq!(sky.bortle_class(new_york), None);

        let anywhere = KnownSiteSky { site: None, ..sky };
        assert_eq!(anywhere.bortle_class(new_york), Some(6));
    }

    #[test]
    fn test_payload_errors_are_transient() {
        assert!(!parse_forecast_payload("").unwrap_err().is_authorization());
        assert!(!parse_forecast_payload("{oops").unwrap_err().is_authorization());
        assert!(
            parse_forecast_payload(r#"{"location":{"name":"x","lat":0,"lon":0},"days":[]}"#)
                .is_err()
        );
    }
}
