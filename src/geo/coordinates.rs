//! Validated geographic coordinates and free-text input classification.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::constants::*;

/// Two signed decimal numbers separated by a comma, comma+space, or whitespace.
static COORDINATE_PAIR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([-+]?\d+(?:\.\d+)?)\s*(?:,\s*|\s+)([-+]?\d+(?:\.\d+)?)\s*$")
        .expect("coordinate pattern is a valid regex")
});

/// US ZIP (5 or 5+4), UK outward+inward codes, Canadian A1A 1A1.
static POSTAL_CODE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?ix)^\s*(?:
            \d{5}(?:-\d{4})?
          | [a-z]{1,2}\d[a-z\d]?\s*\d[a-z]{2}
          | [a-z]\d[a-z]\s?\d[a-z]\d
        )\s*$",
    )
    .expect("postal code pattern is a valid regex")
});

/// Reasons a piece of coordinate text was rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordinateError {
    #[error("no coordinates given")]
    Empty,
    #[error("'{0}' is not a latitude,longitude pair")]
    Malformed(String),
    #[error("latitude must be between -90 and 90 degrees (got {0})")]
    LatitudeOutOfRange(f64),
    #[error("longitude must be between -180 and 180 degrees (got {0})")]
    LongitudeOutOfRange(f64),
}

/// A latitude/longitude pair known to be within range.
///
/// Fields are private so every instance has passed [`Coordinates::new`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    latitude: f64,
    longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinateError> {
        if !is_valid_latitude(latitude) {
            return Err(CoordinateError::LatitudeOutOfRange(latitude));
        }
        if !is_valid_longitude(longitude) {
            return Err(CoordinateError::LongitudeOutOfRange(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn distance_km(&self, other: &Coordinates) -> f64 {
        super::distance::distance_km(
            self.latitude,
            self.longitude,
            other.latitude,
            other.longitude,
        )
    }

    pub fn format(&self, decimals: u8) -> String {
        super::display::format_coordinates(self.latitude, self.longitude, decimals)
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format(DEFAULT_COORDINATE_DECIMALS))
    }
}

impl FromStr for Coordinates {
    type Err = CoordinateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_coordinates(s)
    }
}

// Deserialization goes through `new` so out-of-range values in files are rejected.
impl<'de> Deserialize<'de> for Coordinates {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            latitude: f64,
            longitude: f64,
        }

        let raw = Raw::deserialize(deserializer)?;
        Coordinates::new(raw.latitude, raw.longitude).map_err(serde::de::Error::custom)
    }
}

pub fn is_valid_latitude(latitude: f64) -> bool {
    (MINIMUM_LATITUDE..=MAXIMUM_LATITUDE).contains(&latitude)
}

pub fn is_valid_longitude(longitude: f64) -> bool {
    (MINIMUM_LONGITUDE..=MAXIMUM_LONGITUDE).contains(&longitude)
}

/// Parse `"lat,lon"`, `"lat, lon"` or `"lat lon"` into validated coordinates.
///
/// Never panics; every rejection is reported through [`CoordinateError`].
pub fn parse_coordinates(text: &str) -> Result<Coordinates, CoordinateError> {
    if text.trim().is_empty() {
        return Err(CoordinateError::Empty);
    }

    let (latitude, longitude) =
        split_pair(text).ok_or_else(|| CoordinateError::Malformed(text.trim().to_string()))?;

    Coordinates::new(latitude, longitude)
}

/// Whether the text has the shape of a coordinate pair, ignoring ranges.
///
/// Used to route search input before deciding on a geocoding call.
pub fn looks_like_coordinates(text: &str) -> bool {
    COORDINATE_PAIR.is_match(text)
}

/// Whether the text has the shape of a US, UK or Canadian postal code.
pub fn looks_like_postal_code(text: &str) -> bool {
    POSTAL_CODE.is_match(text)
}

fn split_pair(text: &str) -> Option<(f64, f64)> {
    let captures = COORDINATE_PAIR.captures(text)?;
    let latitude = captures.get(1)?.as_str().parse::<f64>().ok()?;
    let longitude = captures.get(2)?.as_str().parse::<f64>().ok()?;
    Some((latitude, longitude))
}
