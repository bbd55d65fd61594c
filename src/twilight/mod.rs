//! Evening and morning twilight boundaries for a night of observing.
//!
//! Boundaries are derived from the provider's sunset and sunrise clock times
//! with a latitude- and season-scaled phase length. This is a deliberate
//! approximation; [`analytical`] holds an independent solar-declination model
//! used to sanity-check polar behaviour. The two are not expected to agree.
//!
//! All instants are naive local times at the observing site. Sunset falls on
//! the requested date and sunrise on the following morning, so comparisons
//! across midnight need no special handling.

pub mod analytical;
pub mod display;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::*;
use crate::geo::Coordinates;

/// Where a timestamp falls within the day/twilight/night cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TwilightPhase {
    Day,
    CivilEvening,
    NauticalEvening,
    AstronomicalEvening,
    Night,
    AstronomicalMorning,
    NauticalMorning,
    CivilMorning,
}

impl TwilightPhase {
    pub fn label(&self) -> &'static str {
        match self {
            TwilightPhase::Day => "Day",
            TwilightPhase::CivilEvening => "Civil twilight (evening)",
            TwilightPhase::NauticalEvening => "Nautical twilight (evening)",
            TwilightPhase::AstronomicalEvening => "Astronomical twilight (evening)",
            TwilightPhase::Night => "Astronomical night",
            TwilightPhase::AstronomicalMorning => "Astronomical twilight (morning)",
            TwilightPhase::NauticalMorning => "Nautical twilight (morning)",
            TwilightPhase::CivilMorning => "Civil twilight (morning)",
        }
    }

    /// Fully dark sky, the only phase suited to faint deep-sky targets.
    pub fn is_dark(&self) -> bool {
        matches!(self, TwilightPhase::Night)
    }
}

impl fmt::Display for TwilightPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Scale factor applied to the 30-minute base phase length.
///
/// Grows with latitude (`1 + |lat|/90`) and shrinks by up to 20% away from
/// the local summer solstice (June in the north, December in the south).
pub fn twilight_multiplier(latitude: f64, date: NaiveDate) -> f64 {
    let lat_factor = 1.0 + latitude.abs() / 90.0;

    let solstice_day = if latitude >= 0.0 {
        NORTHERN_SOLSTICE_DAY
    } else {
        SOUTHERN_SOLSTICE_DAY
    };
    let offset = (i64::from(date.ordinal()) - solstice_day).abs();
    let days_from_solstice = offset.min(DAYS_PER_YEAR - offset);

    let seasonal_factor =
        1.0 - SEASONAL_TWILIGHT_SWING * days_from_solstice as f64 / HALF_YEAR_DAYS;

    lat_factor * seasonal_factor
}

/// Length of one twilight phase. Civil, nautical and astronomical are equal.
pub fn phase_duration(latitude: f64, date: NaiveDate) -> Duration {
    let minutes = TWILIGHT_BASE_MINUTES * twilight_multiplier(latitude, date);
    Duration::seconds((minutes * 60.0).round() as i64)
}

/// The eight ordered instants bounding one night's twilight phases.
///
/// Immutable once computed; a new date or location means a new value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TwilightBoundaries {
    pub date: NaiveDate,
    pub latitude: f64,
    pub longitude: f64,

    pub sunset: NaiveDateTime,
    pub civil_dusk: NaiveDateTime,
    pub nautical_dusk: NaiveDateTime,
    pub astronomical_dusk: NaiveDateTime,
    pub astronomical_dawn: NaiveDateTime,
    pub nautical_dawn: NaiveDateTime,
    pub civil_dawn: NaiveDateTime,
    pub sunrise: NaiveDateTime,
}

impl TwilightBoundaries {
    /// Compute boundaries for the night starting on `date`.
    ///
    /// `sunset` is placed on `date`; `next_sunrise` is the clock time of the
    /// following morning's sunrise and is placed on `date + 1`.
    pub fn compute(
        coordinates: Coordinates,
        date: NaiveDate,
        sunset: NaiveTime,
        next_sunrise: NaiveTime,
    ) -> Self {
        let latitude = coordinates.latitude();
        let phase = phase_duration(latitude, date);

        let sunset_at = date.and_time(sunset);
        let sunrise_at = (date + Duration::days(1)).and_time(next_sunrise);

        let civil_dusk = sunset_at + phase;
        let nautical_dusk = civil_dusk + phase;
        let astronomical_dusk = nautical_dusk + phase;

        let civil_dawn = sunrise_at - phase;
        let nautical_dawn = civil_dawn - phase;
        let astronomical_dawn = nautical_dawn - phase;

        Self {
            date,
            latitude,
            longitude: coordinates.longitude(),
            sunset: sunset_at,
            civil_dusk,
            nautical_dusk,
            astronomical_dusk,
            astronomical_dawn,
            nautical_dawn,
            civil_dawn,
            sunrise: sunrise_at,
        }
    }

    /// All boundaries in chronological order for a non-degenerate night.
    pub fn instants(&self) -> [NaiveDateTime; 8] {
        [
            self.sunset,
            self.civil_dusk,
            self.nautical_dusk,
            self.astronomical_dusk,
            self.astronomical_dawn,
            self.nautical_dawn,
            self.civil_dawn,
            self.sunrise,
        ]
    }

    /// True when evening and morning twilight overlap, so the night never
    /// gets fully dark (short summer nights at high latitude).
    pub fn is_degenerate(&self) -> bool {
        self.astronomical_dusk > self.astronomical_dawn
    }

    /// Length of full darkness between astronomical dusk and dawn.
    ///
    /// Zero for a degenerate night rather than a negative duration.
    pub fn optimal_viewing_duration(&self) -> Duration {
        let window = self.astronomical_dawn - self.astronomical_dusk;
        window.max(Duration::zero())
    }

    /// Time from sunset to the next sunrise.
    pub fn night_length(&self) -> Duration {
        self.sunrise - self.sunset
    }

    /// Classify a local timestamp.
    ///
    /// Intervals are half-open on the side away from the night, with
    /// `[astronomical_dusk, astronomical_dawn]` inclusive on both ends.
    /// When the night is degenerate, evening phases take precedence.
    pub fn phase_at(&self, timestamp: NaiveDateTime) -> TwilightPhase {
        if timestamp < self.sunset || timestamp > self.sunrise {
            return TwilightPhase::Day;
        }

        if timestamp < self.civil_dusk {
            TwilightPhase::CivilEvening
        } else if timestamp < self.nautical_dusk {
            TwilightPhase::NauticalEvening
        } else if timestamp < self.astronomical_dusk {
            TwilightPhase::AstronomicalEvening
        } else if timestamp <= self.astronomical_dawn {
            TwilightPhase::Night
        } else if timestamp < self.nautical_dawn {
            TwilightPhase::AstronomicalMorning
        } else if timestamp < self.civil_dawn {
            TwilightPhase::NauticalMorning
        } else {
            TwilightPhase::CivilMorning
        }
    }
}
