//! Configuration validation.

use anyhow::Result;

use super::Config;
use crate::constants::*;
use crate::geo::{is_valid_latitude, is_valid_longitude};

/// Reject out-of-range or half-specified settings.
pub fn validate_config(config: &Config) -> Result<()> {
    match (config.latitude, config.longitude) {
        (Some(_), None) => anyhow::bail!("latitude is set but longitude is missing"),
        (None, Some(_)) => anyhow::bail!("longitude is set but latitude is missing"),
        _ => {}
    }

    if let Some(lat) = config.latitude
        && !is_valid_latitude(lat)
    {
        anyhow::bail!("latitude must be between -90 and 90 degrees (got {})", lat);
    }

    if let Some(lon) = config.longitude
        && !is_valid_longitude(lon)
    {
        anyhow::bail!(
            "longitude must be between -180 and 180 degrees (got {})",
            lon
        );
    }

    if let Some(class) = config.bortle_class
        && !(MINIMUM_BORTLE_CLASS..=MAXIMUM_BORTLE_CLASS).contains(&class)
    {
        anyhow::bail!(
            "bortle_class ({}) must be between {} and {}",
            class,
            MINIMUM_BORTLE_CLASS,
            MAXIMUM_BORTLE_CLASS
        );
    }

    if let Some(ttl) = config.cache_ttl_minutes
        && !(MINIMUM_CACHE_TTL_MINUTES..=MAXIMUM_CACHE_TTL_MINUTES).contains(&ttl)
    {
        anyhow::bail!(
            "cache_ttl_minutes ({}) must be between {} and {} minutes",
            ttl,
            MINIMUM_CACHE_TTL_MINUTES,
            MAXIMUM_CACHE_TTL_MINUTES
        );
    }

    if let Some(count) = config.best_hours_count
        && !(MINIMUM_BEST_HOURS_COUNT..=MAXIMUM_BEST_HOURS_COUNT).contains(&count)
    {
        anyhow::bail!(
            "best_hours_count ({}) must be between {} and {}",
            count,
            MINIMUM_BEST_HOURS_COUNT,
            MAXIMUM_BEST_HOURS_COUNT
        );
    }

    if let Some(decimals) = config.coordinate_decimals
        && decimals > MAXIMUM_COORDINATE_DECIMALS
    {
        anyhow::bail!(
            "coordinate_decimals ({}) must be at most {}",
            decimals,
            MAXIMUM_COORDINATE_DECIMALS
        );
    }

    Ok(())
}
