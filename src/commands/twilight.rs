//! Twilight command: boundaries and darkness window from clock times.

use anyhow::Result;
use chrono::{Datelike, Duration, NaiveDate, NaiveTime};

use crate::config::Config;
use crate::twilight::TwilightBoundaries;
use crate::twilight::analytical::{Depression, depression_hours};
use crate::twilight::display::{format_duration, log_twilight_summary};

/// Handle the twilight command. `location` falls back to the configured site.
pub fn handle_twilight_command(
    location: Option<&str>,
    date: Option<NaiveDate>,
    sunset: NaiveTime,
    sunrise: NaiveTime,
    config: &Config,
) -> Result<()> {
    let coordinates = super::site_arg(location, "location", config)?;
    let now = crate::time_source::now().naive_local();
    let date = date.unwrap_or(now.date());

    log_block_start!("Site: {}", coordinates.format(config.coordinate_decimals()));

    let boundaries = TwilightBoundaries::compute(coordinates, date, sunset, sunrise);
    log_debug!(
        "Phase length {} at latitude {:.2}",
        format_duration(boundaries.civil_dusk - boundaries.sunset),
        coordinates.latitude()
    );

    // Only report the current phase when the night shown includes now
    let current = (now >= boundaries.sunset - Duration::hours(12) && now <= boundaries.sunrise)
        .then_some(now);
    log_twilight_summary(&boundaries, current);

    log_block_start!("Solar-declination hour angles (day {})", date.ordinal());
    for depression in [
        Depression::Civil,
        Depression::Nautical,
        Depression::Astronomical,
    ] {
        let hours = depression_hours(coordinates.latitude(), date.ordinal(), depression);
        log_indented!(
            "{:<13} {:>2}°  {}",
            format!("{depression:?}"),
            depression.degrees(),
            format_duration(Duration::seconds((hours * 3600.0).round() as i64))
        );
    }
    log_end!();
    Ok(())
}

pub fn display_help() {
    log_version!();
    log_block_start!("twilight - Twilight boundaries and darkness window");
    log_block_start!("Usage: stargaze twilight [lat,lon] --sunset HH:MM --sunrise HH:MM [--date YYYY-MM-DD]");
    log_indented!("Without a location the site from the configuration file is used.");
    log_block_start!("Options:");
    log_indented!("--sunset <time>    Sunset on the given date (HH:MM or hh:mm AM/PM)");
    log_indented!("--sunrise <time>   Sunrise on the following morning");
    log_indented!("--date <date>      Date of the evening (default: today, see --at)");
    log_block_start!("Example:");
    log_indented!("stargaze twilight 39.7392,-104.9903 --sunset 18:45 --sunrise 07:05");
    log_end!();
}
