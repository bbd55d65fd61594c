//! Score command: assess a night from a provider-format forecast.
//!
//! A forecast file given on the command line is the provider response: it is
//! stored in the forecast cache and scored. Without a file the forecast comes
//! from the cache through [`ForecastService`]; since this build has no network
//! client, a stale entry is served with a warning and a missing one is an error.

use anyhow::{Context, Result};
use std::fs;

use crate::config::Config;
use crate::constants::{MAXIMUM_BORTLE_CLASS, MINIMUM_BORTLE_CLASS};
use crate::forecast::{ForecastService, ForecastSource};
use crate::provider::{
    LightPollutionProvider, LocationQuery, ProviderError, WeatherProvider, parse_forecast_payload,
};
use crate::scoring::Recommendation;
use crate::scoring::night::assess_night;
use crate::twilight::display::{format_boundary, log_twilight_summary};
use crate::weather::Forecast;

/// Stand-in for the network provider: every refresh fails transiently.
struct NoTransport;

impl WeatherProvider for NoTransport {
    fn fetch_forecast(&self, query: &LocationQuery) -> Result<Forecast, ProviderError> {
        Err(ProviderError::transient(format!(
            "no forecast file given for '{}'",
            query.cache_key()
        )))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ForecastOrigin {
    File,
    Service(ForecastSource),
}

/// Handle the score command.
///
/// # Arguments
/// * `forecast_path` - JSON file in the provider's forecast shape; `None` reads the cache
/// * `location` - Cache key to store or read under (default: the file's own site, else the configured site)
/// * `bortle_class` - Overrides the configured light-pollution lookup when given
/// * `day_index` - Which forecast day's night to assess (0 = first)
pub fn handle_score_command(
    forecast_path: Option<&str>,
    location: Option<&str>,
    bortle_class: Option<u8>,
    day_index: usize,
    config: &Config,
) -> Result<()> {
    if let Some(class) = bortle_class
        && !(MINIMUM_BORTLE_CLASS..=MAXIMUM_BORTLE_CLASS).contains(&class)
    {
        anyhow::bail!("Bortle class must be between 1 and 9 (got {class})");
    }

    let (forecast, origin) = load_forecast(forecast_path, location, config)?;

    let day = forecast.day(day_index).with_context(|| {
        format!(
            "Forecast has {} day(s); day {} is out of range",
            forecast.days.len(),
            day_index
        )
    })?;
    let coordinates = forecast
        .location
        .coordinates()
        .context("Forecast location has invalid coordinates")?;

    let bortle_class = bortle_class.or_else(|| {
        config
            .light_pollution()
            .and_then(|sky| sky.bortle_class(coordinates))
    });

    let assessment = assess_night(
        coordinates,
        day,
        forecast.day(day_index + 1),
        bortle_class,
        config.best_hours_count(),
    );

    log_block_start!(
        "{} ({})",
        forecast.location.display_name(),
        coordinates.format(config.coordinate_decimals())
    );
    match origin {
        ForecastOrigin::File => log_indented!(
            "Forecast: {} (cached for {} minutes)",
            forecast_path.unwrap_or_default(),
            config.cache_ttl().num_minutes()
        ),
        ForecastOrigin::Service(ForecastSource::StaleFallback) => {
            log_indented!("Forecast: stale cache entry, pass a forecast file to refresh")
        }
        ForecastOrigin::Service(_) => log_indented!("Forecast: cached"),
    }
    log_indented!(
        "Moon: {}, {:.0}% illuminated",
        day.astronomy.moon_phase,
        day.astronomy.moon_illumination
    );
    if bortle_class.is_none() {
        log_indented!("Bortle class unknown, light pollution scored as neutral");
    }

    log_twilight_summary(&assessment.twilight, None);

    match &assessment.overview {
        Some(overview) => {
            log_block_start!(
                "Tonight: {} ({:.0}/100)",
                overview.rating,
                overview.overall_score
            );
            log_indented!("{}", overview.summary);
            log_indented!(
                "Deep sky {:.0} · Planetary {:.0}",
                overview.deep_sky_score,
                overview.planetary_score
            );
        }
        None => log_warning!("No night hours in the forecast for {}", day.date),
    }

    if !assessment.best_hours.is_empty() {
        log_block_start!("Best hours:");
        for hour in &assessment.best_hours {
            let sky = if assessment.twilight.phase_at(hour.computed_for).is_dark() {
                "dark"
            } else {
                "twilight"
            };
            log_indented!(
                "{}  {:>3.0}  {:<9}  {:<8}  {}",
                format_boundary(&assessment.twilight, hour.computed_for),
                hour.overall_score,
                hour.rating.as_str(),
                sky,
                hour.summary
            );
            log_factor_breakdown(hour);
        }
    }

    log_end!();
    Ok(())
}

fn load_forecast(
    forecast_path: Option<&str>,
    location: Option<&str>,
    config: &Config,
) -> Result<(Forecast, ForecastOrigin)> {
    let cache = super::open_forecast_cache(config)?;

    match forecast_path {
        Some(path) => {
            let body = fs::read_to_string(path)
                .with_context(|| format!("Failed to read forecast from {path}"))?;
            let forecast = parse_forecast_payload(&body)
                .with_context(|| format!("Failed to decode forecast in {path}"))?;

            let query = match location {
                Some(text) => LocationQuery::from_input(text),
                None => LocationQuery::Coordinates(
                    forecast
                        .location
                        .coordinates()
                        .context("Forecast location has invalid coordinates")?,
                ),
            };
            let key = query.cache_key();
            match cache.set(&key, forecast.clone()) {
                Ok(()) => log_debug!("Cached forecast under '{}'", key),
                Err(e) => log_warning!("Could not cache forecast for '{}': {}", key, e),
            }
            Ok((forecast, ForecastOrigin::File))
        }
        None => {
            let query = match location {
                Some(text) => LocationQuery::from_input(text),
                None => LocationQuery::Coordinates(super::site_arg(None, "forecast file or location", config)?),
            };
            let response = ForecastService::new(NoTransport, cache).forecast(&query)?;
            Ok((response.forecast, ForecastOrigin::Service(response.source)))
        }
    }
}

fn log_factor_breakdown(recommendation: &Recommendation) {
    for factor in &recommendation.factor_scores {
        log_debug!(
            "  {:<16} {:>5.1} × {:.2} = {:>5.1}  ({})",
            factor.name(),
            factor.normalized_score,
            factor.weight,
            factor.weighted(),
            factor.label
        );
    }
}

pub fn display_help() {
    log_version!();
    log_block_start!("score - Score a night from a forecast");
    log_block_start!(
        "Usage: stargaze score [forecast.json] [--location L] [--bortle N] [--day N]"
    );
    log_block_start!("Options:");
    log_indented!("--location <L>   Site or place name the forecast is cached under");
    log_indented!("--bortle <1-9>   Bortle class of the site (overrides config)");
    log_indented!("--day <N>        Forecast day to assess, 0 = first (default 0)");
    log_pipe!();
    log_info!("A forecast file is cached; without one the cached forecast is scored.");
    log_info!("Use --debug to see the per-factor breakdown for each hour.");
    log_end!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::ForecastError;
    use tempfile::tempdir;

    const FIXTURE: &str = concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/tests/fixtures/forecast_denver.json"
    );

    fn config_in(dir: &std::path::Path) -> Config {
        Config {
            cache_dir: Some(dir.to_path_buf()),
            ..Config::default()
        }
    }

    #[test]
    fn test_forecast_file_is_cached_for_later_runs() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());

        let (forecast, origin) = load_forecast(Some(FIXTURE), None, &config).unwrap();
        assert_eq!(origin, ForecastOrigin::File);
        assert_eq!(forecast.location.name, "Denver");

        // Nearby coordinates share the cache entry
        let (cached, origin) = load_forecast(None, Some("39.7401,-104.9911"), &config).unwrap();
        assert_eq!(origin, ForecastOrigin::Service(ForecastSource::Cache));
        assert_eq!(cached, forecast);
    }

    #[test]
    fn test_named_location_keys_the_cache() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());

        load_forecast(Some(FIXTURE), Some("Denver"), &config).unwrap();
        let (_, origin) = load_forecast(None, Some("denver"), &config).unwrap();
        assert_eq!(origin, ForecastOrigin::Service(ForecastSource::Cache));
    }

    #[test]
    fn test_configured_site_reads_cache_without_arguments() {
        let dir = tempdir().unwrap();
        let config = Config {
            latitude: Some(39.7392),
            longitude: Some(-104.9903),
            ..config_in(dir.path())
        };

        load_forecast(Some(FIXTURE), None, &config).unwrap();
        assert!(load_forecast(None, None, &config).is_ok());
    }

    #[test]
    fn test_nothing_cached_is_unavailable() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());

        let err = load_forecast(None, Some("Boulder"), &config).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ForecastError>(),
            Some(ForecastError::Unavailable { .. })
        ));

        // No file, no location and no configured site
        assert!(load_forecast(None, None, &config).is_err());
    }

    #[test]
    fn test_out_of_range_bortle_rejected_before_reading() {
        let dir = tempdir().unwrap();
        let err = handle_score_command(None, None, Some(10), 0, &config_in(dir.path())).unwrap_err();
        assert!(err.to_string().contains("Bortle"));
    }
}
