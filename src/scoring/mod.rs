//! Weighted observing-condition scores.
//!
//! [`calculate_recommendation`] turns one hour of weather, the day's
//! astronomy and an optional Bortle class into a [`Recommendation`]. It is a
//! pure function: identical inputs give identical output, which is what lets
//! callers cache the underlying forecast and recompute scores freely.
//!
//! ## Weighting
//!
//! | factor          | overall | deep sky | planetary |
//! |-----------------|---------|----------|-----------|
//! | cloud cover     | 0.35    | 0.40     | 0.50      |
//! | moon            | 0.25    | 0.35     | -         |
//! | humidity        | 0.15    | -        | 0.20      |
//! | visibility      | 0.15    | 0.10     | 0.30      |
//! | light pollution | 0.10    | 0.15     | -         |
//!
//! Without a Bortle class the light-pollution term keeps its weight and uses
//! a neutral score of 50; weights are not redistributed.

pub mod night;
pub mod summary;
pub mod tables;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::*;
use crate::weather::{AstronomicalContext, HourlyObservation};

pub use night::{NightAssessment, assess_night, best_hours, night_hours, night_overview};
pub use tables::{
    score_cloud, score_humidity, score_light_pollution, score_moon, score_visibility,
};

/// Overall verdict tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rating {
    Poor,
    Fair,
    Good,
    Excellent,
}

impl Rating {
    pub fn from_score(score: f64) -> Self {
        if score >= EXCELLENT_THRESHOLD {
            Rating::Excellent
        } else if score >= GOOD_THRESHOLD {
            Rating::Good
        } else if score >= FAIR_THRESHOLD {
            Rating::Fair
        } else {
            Rating::Poor
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Rating::Excellent => "Excellent",
            Rating::Good => "Good",
            Rating::Fair => "Fair",
            Rating::Poor => "Poor",
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shorthand kept for callers that think in terms of a rating lookup.
pub fn get_rating(score: f64) -> Rating {
    Rating::from_score(score)
}

/// Which reading a factor score was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Factor {
    CloudCover,
    Moon,
    Humidity,
    Visibility,
    LightPollution,
}

impl Factor {
    pub fn name(&self) -> &'static str {
        match self {
            Factor::CloudCover => "Cloud Cover",
            Factor::Moon => "Moon",
            Factor::Humidity => "Humidity",
            Factor::Visibility => "Visibility",
            Factor::LightPollution => "Light Pollution",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorScore {
    pub factor: Factor,
    pub raw_value: f64,
    pub normalized_score: f64,
    pub weight: f64,
    pub label: String,
}

impl FactorScore {
    pub fn name(&self) -> &'static str {
        self.factor.name()
    }

    /// Contribution of this factor to the overall score.
    pub fn weighted(&self) -> f64 {
        self.normalized_score * self.weight
    }
}

/// Scored verdict for one hour. Derived on demand, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub overall_score: f64,
    pub rating: Rating,
    pub summary: String,
    pub factor_scores: Vec<FactorScore>,
    pub deep_sky_score: f64,
    pub planetary_score: f64,
    pub computed_for: NaiveDateTime,
}

impl Recommendation {
    /// Copy with a different summary; the original is left untouched.
    pub fn with_summary(&self, summary: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            ..self.clone()
        }
    }

    pub fn factor(&self, factor: Factor) -> Option<&FactorScore> {
        self.factor_scores.iter().find(|f| f.factor == factor)
    }
}

/// Score one hour of weather.
///
/// `computed_for` is taken from the observation's own timestamp so the
/// result depends on nothing but the arguments.
pub fn calculate_recommendation(
    observation: &HourlyObservation,
    astronomy: &AstronomicalContext,
    bortle_class: Option<u8>,
) -> Recommendation {
    let cloud = score_cloud(observation.cloud_cover);
    let moon = score_moon(astronomy.moon_illumination, astronomy.is_moon_up);
    let humidity = score_humidity(observation.humidity);
    let visibility = score_visibility(observation.visibility_km);
    let pollution = bortle_class
        .map(score_light_pollution)
        .unwrap_or(NEUTRAL_LIGHT_POLLUTION_SCORE);

    let overall = WEIGHT_CLOUD * cloud
        + WEIGHT_MOON * moon
        + WEIGHT_HUMIDITY * humidity
        + WEIGHT_VISIBILITY * visibility
        + WEIGHT_LIGHT_POLLUTION * pollution;

    let deep_sky = DEEP_SKY_WEIGHT_CLOUD * cloud
        + DEEP_SKY_WEIGHT_MOON * moon
        + DEEP_SKY_WEIGHT_LIGHT_POLLUTION * pollution
        + DEEP_SKY_WEIGHT_VISIBILITY * visibility;

    let planetary = PLANETARY_WEIGHT_CLOUD * cloud
        + PLANETARY_WEIGHT_VISIBILITY * visibility
        + PLANETARY_WEIGHT_HUMIDITY * humidity;

    let rating = Rating::from_score(overall);

    let mut factor_scores = vec![
        FactorScore {
            factor: Factor::CloudCover,
            raw_value: observation.cloud_cover,
            normalized_score: cloud,
            weight: WEIGHT_CLOUD,
            label: format!("{:.0}% cloud cover", observation.cloud_cover),
        },
        FactorScore {
            factor: Factor::Moon,
            raw_value: astronomy.moon_illumination,
            normalized_score: moon,
            weight: WEIGHT_MOON,
            label: if astronomy.is_moon_up {
                format!("{:.0}% illuminated, above horizon", astronomy.moon_illumination)
            } else {
                "Below horizon".to_string()
            },
        },
        FactorScore {
            factor: Factor::Humidity,
            raw_value: observation.humidity,
            normalized_score: humidity,
            weight: WEIGHT_HUMIDITY,
            label: format!("{:.0}% humidity", observation.humidity),
        },
        FactorScore {
            factor: Factor::Visibility,
            raw_value: observation.visibility_km,
            normalized_score: visibility,
            weight: WEIGHT_VISIBILITY,
            label: format!("{:.0} km visibility", observation.visibility_km),
        },
    ];

    if let Some(class) = bortle_class {
        factor_scores.push(FactorScore {
            factor: Factor::LightPollution,
            raw_value: f64::from(class),
            normalized_score: pollution,
            weight: WEIGHT_LIGHT_POLLUTION,
            label: format!("Bortle class {class}"),
        });
    }

    Recommendation {
        overall_score: overall,
        rating,
        summary: summary::hourly_summary(rating, moon, cloud),
        factor_scores,
        deep_sky_score: deep_sky,
        planetary_score: planetary,
        computed_for: observation.time,
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::weather::{AstronomicalContext, Condition, HourlyObservation};
    use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

    pub fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 10, 1)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    pub fn observation(hour: u32, cloud: f64, humidity: f64, visibility: f64) -> HourlyObservation {
        HourlyObservation {
            time: at(hour),
            cloud_cover: cloud,
            humidity,
            visibility_km: visibility,
            temperature_c: 12.0,
            wind_kph: 8.0,
            precipitation_mm: 0.0,
            condition: Condition::default(),
        }
    }

    pub fn astronomy(illumination: f64, moon_up: bool) -> AstronomicalContext {
        AstronomicalContext {
            sunrise: NaiveTime::from_hms_opt(7, 5, 0).unwrap(),
            sunset: NaiveTime::from_hms_opt(18, 45, 0).unwrap(),
            moonrise: None,
            moonset: None,
            moon_phase: "Waxing Gibbous".to_string(),
            moon_illumination: illumination,
            is_moon_up: moon_up,
            is_sun_up: false,
        }
    }
}
