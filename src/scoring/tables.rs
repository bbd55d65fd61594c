//! Breakpoint tables mapping raw readings to 0-100 factor scores.
//!
//! Each table pairs a threshold with the score awarded when the reading
//! passes it. Tables are scanned in order; the first match wins, and the
//! fallback covers everything past the last breakpoint.

/// How a reading is compared against a breakpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// `value <= threshold` (lower readings are better)
    AtMost,
    /// `value > threshold` (higher readings are better)
    Above,
}

#[derive(Debug, Clone, Copy)]
pub struct StepTable {
    pub bound: Bound,
    pub steps: &'static [(f64, f64)],
    pub fallback: f64,
}

impl StepTable {
    pub fn score(&self, value: f64) -> f64 {
        self.steps
            .iter()
            .find(|(threshold, _)| match self.bound {
                Bound::AtMost => value <= *threshold,
                Bound::Above => value > *threshold,
            })
            .map(|(_, score)| *score)
            .unwrap_or(self.fallback)
    }
}

/// Cloud cover percent.
pub const CLOUD_COVER: StepTable = StepTable {
    bound: Bound::AtMost,
    steps: &[
        (10.0, 100.0),
        (20.0, 90.0),
        (30.0, 75.0),
        (40.0, 60.0),
        (50.0, 50.0),
        (60.0, 35.0),
        (70.0, 20.0),
        (80.0, 10.0),
    ],
    fallback: 0.0,
};

/// Moon illumination percent, applied only while the moon is above the horizon.
pub const MOON_ILLUMINATION: StepTable = StepTable {
    bound: Bound::AtMost,
    steps: &[
        (5.0, 100.0),
        (10.0, 95.0),
        (20.0, 85.0),
        (30.0, 75.0),
        (40.0, 60.0),
        (50.0, 50.0),
        (60.0, 35.0),
        (75.0, 25.0),
        (85.0, 15.0),
    ],
    fallback: 10.0,
};

/// Relative humidity percent.
pub const HUMIDITY: StepTable = StepTable {
    bound: Bound::AtMost,
    steps: &[
        (40.0, 100.0),
        (50.0, 90.0),
        (60.0, 75.0),
        (70.0, 60.0),
        (75.0, 50.0),
        (80.0, 35.0),
        (85.0, 20.0),
        (90.0, 10.0),
    ],
    fallback: 0.0,
};

/// Visibility in kilometres.
pub const VISIBILITY: StepTable = StepTable {
    bound: Bound::Above,
    steps: &[
        (15.0, 100.0),
        (12.0, 90.0),
        (10.0, 80.0),
        (8.0, 70.0),
        (6.0, 55.0),
        (5.0, 45.0),
        (4.0, 30.0),
        (3.0, 15.0),
    ],
    fallback: 0.0,
};

/// Bortle class to score. Classes outside 1-8 score zero.
pub const BORTLE: &[(u8, f64)] = &[
    (1, 100.0),
    (2, 95.0),
    (3, 85.0),
    (4, 70.0),
    (5, 50.0),
    (6, 30.0),
    (7, 15.0),
    (8, 5.0),
];

pub fn score_cloud(cloud_cover: f64) -> f64 {
    CLOUD_COVER.score(cloud_cover)
}

/// A moon below the horizon never costs anything, whatever its phase.
pub fn score_moon(illumination: f64, moon_up: bool) -> f64 {
    if moon_up {
        MOON_ILLUMINATION.score(illumination)
    } else {
        100.0
    }
}

pub fn score_humidity(humidity: f64) -> f64 {
    HUMIDITY.score(humidity)
}

pub fn score_visibility(visibility_km: f64) -> f64 {
    VISIBILITY.score(visibility_km)
}

pub fn score_light_pollution(bortle_class: u8) -> f64 {
    BORTLE
        .iter()
        .find(|(class, _)| *class == bortle_class)
        .map(|(_, score)| *score)
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_table(table: &StepTable, cases: &[(f64, f64)]) {
        for (input, expected) in cases {
            assert_eq!(table.score(*input), *expected, "input {input}");
        }
    }

    #[test]
    fn test_breakpoints_are_inclusive_upper_bounds() {
        // Every breakpoint scores its own row; a hair above falls to the next row
        for table in [&CLOUD_COVER, &MOON_ILLUMINATION, &HUMIDITY] {
            for (i, (threshold, score)) in table.steps.iter().enumerate() {
                assert_eq!(table.score(*threshold), *score);
                let next = table.steps.get(i + 1).map(|s| s.1).unwrap_or(table.fallback);
                assert_eq!(table.score(threshold + 0.001), next);
            }
        }
    }

    #[test]
    fn test_visibility_breakpoints_are_exclusive_lower_bounds() {
        assert_table(
            &VISIBILITY,
            &[
                (16.0, 100.0),
                (15.0, 90.0),
                (12.5, 90.0),
                (12.0, 80.0),
                (10.0, 70.0),
                (3.5, 15.0),
                (3.0, 0.0),
                (0.0, 0.0),
            ],
        );
    }

    #[test]
    fn test_cloud_anchor_values() {
        assert_eq!(score_cloud(10.0), 100.0);
        assert_eq!(score_cloud(85.0), 0.0);
        assert_eq!(score_cloud(0.0), 100.0);
        assert_eq!(score_cloud(100.0), 0.0);
    }

    #[test]
    fn test_moon_below_horizon_always_scores_full() {
        for illumination in [0.0, 50.0, 100.0] {
            assert_eq!(score_moon(illumination, false), 100.0);
        }
        assert_eq!(score_moon(5.0, true), 100.0);
        assert_eq!(score_moon(100.0, true), 10.0);
    }

    #[test]
    fn test_bortle_table() {
        let expected = [100.0, 95.0, 85.0, 70.0, 50.0, 30.0, 15.0, 5.0, 0.0];
        for (class, score) in (1..=9).zip(expected) {
            assert_eq!(score_light_pollution(class), score, "class {class}");
        }
        assert_eq!(score_light_pollution(0), 0.0);
    }
}
