//! Solar-declination twilight model.
//!
//! Computes the hour angle at which the sun reaches a given depression below
//! the horizon. Kept independent of the multiplier model in the parent module
//! so polar day and polar night can be checked against physical behaviour.

use crate::constants::*;

/// The three standard solar depression thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Depression {
    Civil,
    Nautical,
    Astronomical,
}

impl Depression {
    pub fn degrees(&self) -> f64 {
        match self {
            Depression::Civil => CIVIL_DEPRESSION_DEGREES,
            Depression::Nautical => NAUTICAL_DEPRESSION_DEGREES,
            Depression::Astronomical => ASTRONOMICAL_DEPRESSION_DEGREES,
        }
    }
}

/// Approximate solar declination in degrees for a day of the year.
///
/// `23.45° × sin(360/365 × (day − 81))`
pub fn solar_declination(day_of_year: u32) -> f64 {
    let angle = (360.0 / DAYS_PER_YEAR as f64) * (f64::from(day_of_year) - EQUINOX_DAY_OFFSET);
    AXIAL_TILT_DEGREES * angle.to_radians().sin()
}

/// Hours of hour angle until the sun reaches `depression_degrees` below the horizon.
///
/// `H = acos[(sin(−depression) − sin(lat)·sin(dec)) / (cos(lat)·cos(dec))]`,
/// returned as `H / 15`. Saturates instead of returning NaN: a cosine
/// argument above 1 yields 0 and one below −1 yields 24.
pub fn twilight_hours(latitude: f64, day_of_year: u32, depression_degrees: f64) -> f64 {
    let lat = latitude.to_radians();
    let dec = solar_declination(day_of_year).to_radians();
    let altitude = (-depression_degrees).to_radians();

    let cos_h = (altitude.sin() - lat.sin() * dec.sin()) / (lat.cos() * dec.cos());

    if cos_h.is_nan() || cos_h > 1.0 {
        0.0
    } else if cos_h < -1.0 {
        24.0
    } else {
        cos_h.acos().to_degrees() / 15.0
    }
}

/// Convenience wrapper over [`twilight_hours`] for a named threshold.
pub fn depression_hours(latitude: f64, day_of_year: u32, depression: Depression) -> f64 {
    twilight_hours(latitude, day_of_year, depression.degrees())
}
