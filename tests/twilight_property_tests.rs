use chrono::{Duration, NaiveDate, NaiveTime};
use proptest::prelude::*;
use stargaze::geo::Coordinates;
use stargaze::twilight::analytical::twilight_hours;
use stargaze::twilight::{TwilightBoundaries, TwilightPhase, twilight_multiplier};

fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    (0i64..366).prop_map(|offset| NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Duration::days(offset))
}

/// Nights of at least nine hours at mid latitudes, which never overlap.
fn ordinary_night() -> impl Strategy<Value = (Coordinates, NaiveDate, NaiveTime, NaiveTime)> {
    (
        -60.0f64..=60.0,
        -180.0f64..=180.0,
        date_strategy(),
        17u32..21,
        0u32..60,
        5u32..8,
        0u32..60,
    )
        .prop_map(|(lat, lon, date, sh, sm, rh, rm)| {
            (
                Coordinates::new(lat, lon).unwrap(),
                date,
                NaiveTime::from_hms_opt(sh, sm, 0).unwrap(),
                NaiveTime::from_hms_opt(rh, rm, 0).unwrap(),
            )
        })
}

proptest! {
    #[test]
    fn test_boundaries_strictly_increase((coords, date, sunset, sunrise) in ordinary_night()) {
        let b = TwilightBoundaries::compute(coords, date, sunset, sunrise);
        prop_assert!(!b.is_degenerate());
        for pair in b.instants().windows(2) {
            prop_assert!(pair[0] < pair[1], "{:?} !< {:?}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_viewing_window_is_nested((coords, date, sunset, sunrise) in ordinary_night()) {
        let b = TwilightBoundaries::compute(coords, date, sunset, sunrise);
        prop_assert!(b.optimal_viewing_duration() < b.night_length());
        prop_assert!(b.optimal_viewing_duration() > Duration::zero());
    }

    #[test]
    fn test_phase_sequence_is_ordered((coords, date, sunset, sunrise) in ordinary_night()) {
        let b = TwilightBoundaries::compute(coords, date, sunset, sunrise);
        let expected = [
            TwilightPhase::CivilEvening,
            TwilightPhase::NauticalEvening,
            TwilightPhase::AstronomicalEvening,
            TwilightPhase::Night,
            TwilightPhase::AstronomicalMorning,
            TwilightPhase::NauticalMorning,
            TwilightPhase::CivilMorning,
        ];
        // Sample just after each boundary except the last
        for (instant, phase) in b.instants().iter().zip(expected) {
            let sample = *instant + Duration::seconds(1);
            let got = b.phase_at(sample);
            // Night includes its start; the dawn boundary itself is still Night
            if phase == TwilightPhase::AstronomicalMorning {
                prop_assert_eq!(b.phase_at(*instant), TwilightPhase::Night);
            }
            prop_assert_eq!(got, phase);
        }
        prop_assert_eq!(b.phase_at(b.sunset - Duration::seconds(1)), TwilightPhase::Day);
        prop_assert_eq!(b.phase_at(b.sunrise + Duration::seconds(1)), TwilightPhase::Day);
    }

    #[test]
    fn test_multiplier_is_bounded(lat in -90.0f64..=90.0, date in date_strategy()) {
        let m = twilight_multiplier(lat, date);
        prop_assert!(m >= 0.8 - 1e-9);
        prop_assert!(m <= 2.0 + 1e-9);
    }

    #[test]
    fn test_multiplier_is_symmetric_in_hemisphere(lat in 0.0f64..=90.0, date in date_strategy()) {
        // Same distance from the pole gives the same latitude factor; only the
        // seasonal reference differs, so the values stay within the seasonal swing
        let north = twilight_multiplier(lat, date);
        let south = twilight_multiplier(-lat, date);
        let lat_factor = 1.0 + lat / 90.0;
        prop_assert!((north - south).abs() <= lat_factor * 0.2 + 1e-9);
    }

    #[test]
    fn test_analytical_hours_are_bounded(
        lat in -90.0f64..=90.0,
        doy in 1u32..=365,
        depression in prop_oneof![Just(6.0), Just(12.0), Just(18.0)],
    ) {
        let hours = twilight_hours(lat, doy, depression);
        prop_assert!(!hours.is_nan());
        prop_assert!((0.0..=24.0).contains(&hours));
    }

    #[test]
    fn test_deeper_depression_never_shortens_hour_angle(
        lat in -65.0f64..=65.0,
        doy in 1u32..=365,
    ) {
        let civil = twilight_hours(lat, doy, 6.0);
        let astronomical = twilight_hours(lat, doy, 18.0);
        prop_assert!(astronomical >= civil);
    }
}
