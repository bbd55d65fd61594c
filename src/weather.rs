//! Forecast records as delivered by the weather provider.
//!
//! These types are read-only inputs to the scorer and the twilight engine.
//! Clock times use the provider's 12-hour format (`"07:12 PM"`) on the wire;
//! a missing moonrise or moonset (`"No moonrise"`) becomes `None`.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::geo::{CoordinateError, Coordinates};
use crate::twilight::TwilightBoundaries;

/// A place returned by the provider or by location search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default)]
    pub id: Option<u64>,
    pub name: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub country: String,
    pub lat: f64,
    pub lon: f64,
}

impl Location {
    pub fn coordinates(&self) -> Result<Coordinates, CoordinateError> {
        Coordinates::new(self.lat, self.lon)
    }

    /// "Name, Region, Country" skipping empty parts.
    pub fn display_name(&self) -> String {
        [
            self.name.as_str(),
            self.region.as_str(),
            self.country.as_str(),
        ]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
    }
}

/// One hour of forecast weather.
///
/// The scorer reads cloud cover, humidity and visibility; the remaining
/// fields are carried through for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyObservation {
    #[serde(with = "provider_datetime")]
    pub time: NaiveDateTime,
    /// Percent, 0-100
    pub cloud_cover: f64,
    /// Percent, 0-100
    pub humidity: f64,
    pub visibility_km: f64,
    #[serde(default)]
    pub temperature_c: f64,
    #[serde(default)]
    pub wind_kph: f64,
    #[serde(default)]
    pub precipitation_mm: f64,
    #[serde(default)]
    pub condition: Condition,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub text: String,
    pub icon: String,
    pub code: u32,
}

/// Sun and moon data for one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AstronomicalContext {
    #[serde(with = "clock_time")]
    pub sunrise: NaiveTime,
    #[serde(with = "clock_time")]
    pub sunset: NaiveTime,
    #[serde(with = "optional_clock_time", default)]
    pub moonrise: Option<NaiveTime>,
    #[serde(with = "optional_clock_time", default)]
    pub moonset: Option<NaiveTime>,
    pub moon_phase: String,
    /// Percent, 0-100
    pub moon_illumination: f64,
    pub is_moon_up: bool,
    #[serde(default)]
    pub is_sun_up: bool,
}

/// One forecast day: its astronomy block and hourly records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    pub date: NaiveDate,
    pub astronomy: AstronomicalContext,
    pub hours: Vec<HourlyObservation>,
}

impl ForecastDay {
    /// Whether an hour lies outside daylight on this calendar date: before
    /// its sunrise or at/after its sunset. The two sides belong to different
    /// nights; see [`evening_hours`](Self::evening_hours) and
    /// [`pre_dawn_hours`](Self::pre_dawn_hours).
    pub fn is_night_hour(&self, hour: &HourlyObservation) -> bool {
        let clock = hour.time.time();
        clock < self.astronomy.sunrise || clock >= self.astronomy.sunset
    }

    /// Hours from this day's sunset on; the first half of the night that
    /// starts on this date.
    pub fn evening_hours(&self) -> impl Iterator<Item = &HourlyObservation> {
        self.hours
            .iter()
            .filter(|h| self.is_night_hour(h) && h.time.time() >= self.astronomy.sunrise)
    }

    /// Hours before this day's sunrise; the tail of the night that started
    /// the previous evening.
    pub fn pre_dawn_hours(&self) -> impl Iterator<Item = &HourlyObservation> {
        self.hours
            .iter()
            .filter(|h| self.is_night_hour(h) && h.time.time() < self.astronomy.sunrise)
    }

    /// Twilight boundaries for the night starting on this day.
    ///
    /// Uses the next day's sunrise when available, otherwise assumes the
    /// same sunrise clock time tomorrow.
    pub fn twilight(
        &self,
        coordinates: Coordinates,
        next_day: Option<&ForecastDay>,
    ) -> TwilightBoundaries {
        let next_sunrise = next_day
            .map(|d| d.astronomy.sunrise)
            .unwrap_or(self.astronomy.sunrise);
        TwilightBoundaries::compute(coordinates, self.date, self.astronomy.sunset, next_sunrise)
    }
}

/// A full provider response: location plus up to three forecast days.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub location: Location,
    pub days: Vec<ForecastDay>,
}

impl Forecast {
    pub fn day(&self, index: usize) -> Option<&ForecastDay> {
        self.days.get(index)
    }
}

mod provider_datetime {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d %H:%M";

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&value.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveDateTime::parse_from_str(raw.trim(), FORMAT)
            .or_else(|_| NaiveDateTime::parse_from_str(raw.trim(), "%Y-%m-%dT%H:%M:%S"))
            .map_err(serde::de::Error::custom)
    }
}

/// Parse provider clock text. Accepts `"07:12 PM"` and 24-hour `"19:12"`.
pub fn parse_clock_time(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%I:%M %p")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .ok()
}

mod clock_time {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&value.format("%I:%M %p").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse_clock_time(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid clock time '{raw}'")))
    }
}

mod optional_clock_time {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<NaiveTime>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(time) => s.serialize_str(&time.format("%I:%M %p").to_string()),
            None => s.serialize_none(),
        }
    }

    // Providers report "No moonrise" / "No moonset" instead of omitting the field.
    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveTime>, D::Error> {
        let raw = Option::<String>::deserialize(d)?;
        Ok(raw.as_deref().and_then(super::parse_clock_time))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY_JSON: &str = r#"{
        "date": "2024-10-01",
        "astronomy": {
            "sunrise": "07:05 AM",
            "sunset": "06:45 PM",
            "moonrise": "No moonrise",
            "moonset": "04:10 PM",
            "moon_phase": "Waning Crescent",
            "moon_illumination": 4,
            "is_moon_up": false,
            "is_sun_up": true
        },
        "hours": [
            {"time": "2024-10-01 03:00", "cloud_cover": 5, "humidity": 40, "visibility_km": 16},
            {"time": "2024-10-01 12:00", "cloud_cover": 20, "humidity": 30, "visibility_km": 10},
            {"time": "2024-10-01 21:00", "cloud_cover": 10, "humidity": 55, "visibility_km": 14}
        ]
    }"#;

    #[test]
    fn test_parse_clock_time_formats() {
        assert_eq!(parse_clock_time("07:12 PM"), NaiveTime::from_hms_opt(19, 12, 0));
        assert_eq!(parse_clock_time("19:12"), NaiveTime::from_hms_opt(19, 12, 0));
        assert_eq!(parse_clock_time("No moonrise"), None);
    }

    #[test]
    fn test_day_deserializes_with_missing_moonrise() {
        let day: ForecastDay = serde_json::from_str(DAY_JSON).unwrap();
        assert_eq!(day.astronomy.moonrise, None);
        assert_eq!(day.astronomy.moonset, NaiveTime::from_hms_opt(16, 10, 0));
        assert_eq!(day.astronomy.sunset, NaiveTime::from_hms_opt(18, 45, 0).unwrap());
        assert_eq!(day.hours.len(), 3);
        assert_eq!(day.hours[0].condition, Condition::default());
    }

    #[test]
    fn test_night_hour_halves_exclude_daytime() {
        let day: ForecastDay = serde_json::from_str(DAY_JSON).unwrap();
        let hour = |h: &HourlyObservation| h.time.format("%H").to_string();

        let night: Vec<_> = day.hours.iter().filter(|h| day.is_night_hour(h)).map(hour).collect();
        assert_eq!(night, vec!["03", "21"]);
        assert_eq!(day.pre_dawn_hours().map(hour).collect::<Vec<_>>(), vec!["03"]);
        assert_eq!(day.evening_hours().map(hour).collect::<Vec<_>>(), vec!["21"]);
    }

    #[test]
    fn test_location_display_name_skips_empty_parts() {
        let loc = Location {
            id: None,
            name: "Boulder".into(),
            region: String::new(),
            country: "USA".into(),
            lat: 40.0,
            lon: -105.3,
        };
        assert_eq!(loc.display_name(), "Boulder, USA");
    }
}
