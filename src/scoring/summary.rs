//! Human-readable summaries.
//!
//! The hourly summary branches on the rating tier first, then refines on the
//! moon or cloud sub-score. The night summary is driven by raw night-wide
//! figures instead of one representative hour.

use super::Rating;

/// Moon sub-score at or above which moonlight is no obstacle to faint targets.
const DARK_MOON_SCORE: f64 = 75.0;
/// Cloud sub-score at or above which the sky is mostly open.
const OPEN_SKY_SCORE: f64 = 60.0;

pub fn hourly_summary(rating: Rating, moon_score: f64, cloud_score: f64) -> String {
    let text = match rating {
        Rating::Excellent if moon_score >= DARK_MOON_SCORE => {
            "Excellent conditions for deep sky imaging and faint galaxies"
        }
        Rating::Excellent => "Excellent transparency, ideal for planetary and lunar observation",
        Rating::Good if moon_score >= DARK_MOON_SCORE => {
            "Good conditions for most targets, including brighter deep sky objects"
        }
        Rating::Good => "Good conditions, though moonlight favors planets and double stars",
        Rating::Fair if cloud_score >= OPEN_SKY_SCORE => {
            "Fair conditions; haze or moonlight limits faint targets"
        }
        Rating::Fair => "Fair conditions; passing clouds may interrupt observing",
        Rating::Poor if cloud_score < OPEN_SKY_SCORE => "Poor conditions; heavy cloud cover expected",
        Rating::Poor => "Poor conditions for observing",
    };
    text.to_string()
}

/// Summary for a whole night from average and minimum cloud cover (percent)
/// and moon illumination (percent).
pub fn night_summary(average_cloud: f64, minimum_cloud: f64, moon_illumination: f64) -> String {
    let bright_moon = moon_illumination > 50.0;

    let text = if minimum_cloud > 80.0 {
        "Overcast all night; no clear windows expected"
    } else if average_cloud <= 20.0 && !bright_moon {
        "Clear, dark night: excellent for deep sky targets"
    } else if average_cloud <= 20.0 {
        "Clear night, but a bright moon will wash out faint targets"
    } else if minimum_cloud <= 30.0 {
        "Variable cloud with clear windows during the night"
    } else if average_cloud <= 60.0 {
        "Partly cloudy night; bright targets only"
    } else {
        "Mostly cloudy night; limited observing opportunities"
    };
    text.to_string()
}
