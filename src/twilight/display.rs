//! Display helpers for twilight boundaries.
//!
//! Rendering is kept out of the boundary computation so the engine stays pure.

use chrono::{Duration, NaiveDateTime};

use super::{TwilightBoundaries, TwilightPhase};

/// `HH:MM`, with a `(+1)` marker when the instant falls on the following day.
pub fn format_boundary(boundaries: &TwilightBoundaries, instant: NaiveDateTime) -> String {
    let clock = instant.format("%H:%M").to_string();
    if instant.date() > boundaries.date {
        format!("{clock} (+1)")
    } else {
        clock
    }
}

/// `Xh YYm` for a non-negative duration.
pub fn format_duration(duration: Duration) -> String {
    let minutes = duration.num_minutes().max(0);
    format!("{}h {:02}m", minutes / 60, minutes % 60)
}

/// Labelled rows in chronological order, ready for any renderer.
pub fn boundary_rows(boundaries: &TwilightBoundaries) -> Vec<(&'static str, String)> {
    [
        ("Sunset", boundaries.sunset),
        ("Civil dusk", boundaries.civil_dusk),
        ("Nautical dusk", boundaries.nautical_dusk),
        ("Astronomical dusk", boundaries.astronomical_dusk),
        ("Astronomical dawn", boundaries.astronomical_dawn),
        ("Nautical dawn", boundaries.nautical_dawn),
        ("Civil dawn", boundaries.civil_dawn),
        ("Sunrise", boundaries.sunrise),
    ]
    .into_iter()
    .map(|(label, instant)| (label, format_boundary(boundaries, instant)))
    .collect()
}

/// Log the boundary table and darkness window as one block.
pub fn log_twilight_summary(boundaries: &TwilightBoundaries, now: Option<NaiveDateTime>) {
    log_block_start!("Twilight for the night of {}", boundaries.date.format("%Y-%m-%d"));
    for (label, value) in boundary_rows(boundaries) {
        log_indented!("{label:<18} {value}");
    }

    if boundaries.is_degenerate() {
        log_decorated!("No astronomical darkness tonight (twilight overlaps)");
    } else {
        log_decorated!(
            "Optimal viewing window: {} ({} to {})",
            format_duration(boundaries.optimal_viewing_duration()),
            format_boundary(boundaries, boundaries.astronomical_dusk),
            format_boundary(boundaries, boundaries.astronomical_dawn)
        );
    }

    if let Some(now) = now {
        let phase: TwilightPhase = boundaries.phase_at(now);
        log_decorated!("Current phase: {phase}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Coordinates;
    use chrono::{NaiveDate, NaiveTime};

    #[test]
    fn test_rows_mark_next_day() {
        let coords = Coordinates::new(39.7392, -104.9903).unwrap();
        let b = TwilightBoundaries::compute(
            coords,
            NaiveDate::from_ymd_opt(2024, 10, 1).unwrap(),
            NaiveTime::from_hms_opt(18, 45, 0).unwrap(),
            NaiveTime::from_hms_opt(7, 5, 0).unwrap(),
        );

        let rows = boundary_rows(&b);
        assert_eq!(rows.len(), 8);
        assert_eq!(rows[0], ("Sunset", "18:45".to_string()));
        assert_eq!(rows[7], ("Sunrise", "07:05 (+1)".to_string()));
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::minutes(395)), "6h 35m");
        assert_eq!(format_duration(Duration::minutes(-5)), "0h 00m");
    }
}
