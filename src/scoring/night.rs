//! Whole-night aggregation over hourly recommendations.
//!
//! A night runs from one day's sunset to the next day's sunrise, so its
//! hours come from two forecast days: the evening of `day` and the pre-dawn
//! hours of `next_day`. Each hour is scored against the astronomy block of
//! its own date.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::{Recommendation, calculate_recommendation, summary};
use crate::geo::Coordinates;
use crate::twilight::TwilightBoundaries;
use crate::weather::{AstronomicalContext, ForecastDay, HourlyObservation};

/// Hours of the night starting on `day`, in chronological order.
///
/// `next_day` only contributes when it is the following calendar date;
/// without it the night is cut off at midnight.
pub fn night_hours<'a>(
    day: &'a ForecastDay,
    next_day: Option<&'a ForecastDay>,
) -> Vec<(&'a HourlyObservation, &'a AstronomicalContext)> {
    let evening = day.evening_hours().map(|hour| (hour, &day.astronomy));
    let morning = next_day
        .filter(|next| day.date.succ_opt() == Some(next.date))
        .into_iter()
        .flat_map(|next| next.pre_dawn_hours().map(|hour| (hour, &next.astronomy)));
    evening.chain(morning).collect()
}

/// The `count` best hours of the night starting on `day`, highest score first.
///
/// The sort is stable, so equal scores keep chronological order.
pub fn best_hours(
    day: &ForecastDay,
    next_day: Option<&ForecastDay>,
    bortle_class: Option<u8>,
    count: usize,
) -> Vec<Recommendation> {
    let mut scored: Vec<Recommendation> = night_hours(day, next_day)
        .into_iter()
        .map(|(hour, astronomy)| calculate_recommendation(hour, astronomy, bortle_class))
        .collect();

    scored.sort_by(|a, b| {
        b.overall_score
            .partial_cmp(&a.overall_score)
            .unwrap_or(Ordering::Equal)
    });
    scored.truncate(count);
    scored
}

/// One recommendation standing for the whole night.
///
/// The representative hour is the night hour with the least cloud (earliest
/// wins a tie). Its summary is replaced by one derived from the night-wide
/// average and minimum cloud cover and the evening's moon illumination.
pub fn night_overview(
    day: &ForecastDay,
    next_day: Option<&ForecastDay>,
    bortle_class: Option<u8>,
) -> Option<Recommendation> {
    let night = night_hours(day, next_day);

    let (representative, astronomy) = night.iter().copied().reduce(|best, candidate| {
        if candidate.0.cloud_cover < best.0.cloud_cover {
            candidate
        } else {
            best
        }
    })?;

    let average_cloud = night.iter().map(|(h, _)| h.cloud_cover).sum::<f64>() / night.len() as f64;
    let minimum_cloud = representative.cloud_cover;

    let recommendation = calculate_recommendation(representative, astronomy, bortle_class);
    Some(recommendation.with_summary(summary::night_summary(
        average_cloud,
        minimum_cloud,
        day.astronomy.moon_illumination,
    )))
}

/// Everything the advisor reports for one night.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NightAssessment {
    pub twilight: TwilightBoundaries,
    pub overview: Option<Recommendation>,
    pub best_hours: Vec<Recommendation>,
}

/// Combine twilight boundaries with the night overview and best hours.
pub fn assess_night(
    coordinates: Coordinates,
    day: &ForecastDay,
    next_day: Option<&ForecastDay>,
    bortle_class: Option<u8>,
    best_count: usize,
) -> NightAssessment {
    NightAssessment {
        twilight: day.twilight(coordinates, next_day),
        overview: night_overview(day, next_day, bortle_class),
        best_hours: best_hours(day, next_day, bortle_class, best_count),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::test_support::*;
    use crate::twilight::TwilightPhase;
    use chrono::{Duration, NaiveDate};

    fn day_on(date: NaiveDate, hours: Vec<HourlyObservation>) -> ForecastDay {
        ForecastDay {
            date,
            astronomy: astronomy(10.0, false),
            hours,
        }
    }

    fn evening(hours: Vec<HourlyObservation>) -> ForecastDay {
        day_on(NaiveDate::from_ymd_opt(2024, 10, 1).unwrap(), hours)
    }

    fn following(hours: Vec<HourlyObservation>) -> ForecastDay {
        day_on(NaiveDate::from_ymd_opt(2024, 10, 2).unwrap(), hours)
    }

    /// An observation at `hour` on the morning after `at`'s date.
    fn next_morning(hour: u32, cloud: f64, humidity: f64, visibility: f64) -> HourlyObservation {
        HourlyObservation {
            time: at(hour) + Duration::days(1),
            ..observation(hour, cloud, humidity, visibility)
        }
    }

    #[test]
    fn test_best_hours_span_evening_and_next_morning() {
        // 02:00 and noon on the first date belong to the previous night and
        // to daytime; noon on the second date is daytime too
        let day = evening(vec![
            observation(2, 0.0, 30.0, 20.0),
            observation(12, 0.0, 30.0, 20.0),
            observation(21, 20.0, 50.0, 12.0),
        ]);
        let next = following(vec![
            next_morning(3, 50.0, 60.0, 10.0),
            next_morning(12, 0.0, 30.0, 20.0),
        ]);

        let best = best_hours(&day, Some(&next), None, 5);
        let times: Vec<_> = best.iter().map(|r| r.computed_for).collect();
        assert_eq!(times, vec![at(21), at(3) + Duration::days(1)]);
    }

    #[test]
    fn test_without_next_day_only_evening_counts() {
        let day = evening(vec![
            observation(2, 0.0, 30.0, 20.0),
            observation(21, 20.0, 50.0, 12.0),
        ]);
        let best = best_hours(&day, None, None, 5);
        assert_eq!(best.len(), 1);
        assert_eq!(best[0].computed_for, at(21));

        // A day that does not follow on is not this night's morning
        let later = day_on(
            NaiveDate::from_ymd_opt(2024, 10, 5).unwrap(),
            vec![observation(3, 0.0, 30.0, 20.0)],
        );
        assert_eq!(night_hours(&day, Some(&later)).len(), 1);
    }

    #[test]
    fn test_best_hours_ties_keep_chronological_order() {
        let day = evening(vec![
            observation(20, 10.0, 40.0, 16.0),
            observation(22, 50.0, 40.0, 16.0),
        ]);
        let next = following(vec![
            next_morning(1, 10.0, 40.0, 16.0),
            next_morning(3, 10.0, 40.0, 16.0),
        ]);

        let best = best_hours(&day, Some(&next), Some(3), 3);
        let times: Vec<_> = best.iter().map(|r| r.computed_for).collect();
        assert_eq!(
            times,
            vec![at(20), at(1) + Duration::days(1), at(3) + Duration::days(1)]
        );
    }

    #[test]
    fn test_night_overview_uses_clearest_hour_and_night_summary() {
        let day = evening(vec![
            observation(12, 0.0, 30.0, 20.0),
            observation(22, 70.0, 60.0, 10.0),
        ]);
        let next = following(vec![
            next_morning(1, 40.0, 60.0, 10.0),
            next_morning(4, 25.0, 60.0, 10.0),
        ]);

        let overview = night_overview(&day, Some(&next), None).unwrap();
        assert_eq!(overview.computed_for, at(4) + Duration::days(1));
        // average of 70, 40, 25 is 45; minimum 25 => clear windows
        assert_eq!(
            overview.summary,
            summary::night_summary(45.0, 25.0, 10.0)
        );
    }

    #[test]
    fn test_morning_hours_use_their_own_moon() {
        let day = evening(vec![observation(21, 5.0, 40.0, 16.0)]);
        let mut next = following(vec![next_morning(2, 5.0, 40.0, 16.0)]);
        next.astronomy = astronomy(100.0, true);

        let best = best_hours(&day, Some(&next), Some(1), 2);
        assert_eq!(best[0].computed_for, at(21));
        assert!(best[0].overall_score > best[1].overall_score);
    }

    #[test]
    fn test_night_overview_empty_when_no_night_hours() {
        let day = evening(vec![observation(12, 0.0, 30.0, 20.0)]);
        assert!(night_overview(&day, None, None).is_none());
        assert!(best_hours(&day, None, None, 3).is_empty());
    }

    #[test]
    fn test_assessed_hours_fall_inside_the_assessed_night() {
        let day = evening(vec![
            observation(2, 0.0, 30.0, 20.0),
            observation(21, 30.0, 50.0, 12.0),
        ]);
        let next = following(vec![
            next_morning(2, 10.0, 40.0, 16.0),
            next_morning(12, 0.0, 30.0, 20.0),
        ]);
        let coords = Coordinates::new(39.7392, -104.9903).unwrap();

        let assessment = assess_night(coords, &day, Some(&next), Some(2), 5);
        assert_eq!(assessment.twilight.date, day.date);
        assert_eq!(assessment.best_hours.len(), 2);

        let overview = assessment.overview.unwrap();
        assert_eq!(overview.computed_for, at(2) + Duration::days(1));
        for hour in assessment.best_hours.iter().chain([&overview]) {
            assert_ne!(
                assessment.twilight.phase_at(hour.computed_for),
                TwilightPhase::Day,
                "{} is outside the night",
                hour.computed_for
            );
        }
    }
}
