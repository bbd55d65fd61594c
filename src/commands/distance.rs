//! Distance command: great-circle distance between two sites.

use anyhow::Result;

use crate::config::Config;

/// Handle the distance command. Without `from` the distance is measured
/// from the configured site.
pub fn handle_distance_command(from: Option<&str>, to: &str, config: &Config) -> Result<()> {
    let a = super::site_arg(from, "first location", config)?;
    let b = super::coordinates_arg(to, "second location")?;
    let decimals = config.coordinate_decimals();

    log_block_start!("Distance");
    log_indented!("From: {}", a.format(decimals));
    log_indented!("To:   {}", b.format(decimals));
    log_decorated!("{:.1} km", a.distance_km(&b));
    log_end!();
    Ok(())
}

pub fn display_help() {
    log_version!();
    log_block_start!("distance - Great-circle distance between two sites");
    log_block_start!("Usage: stargaze distance [lat,lon] <lat,lon>");
    log_indented!("With a single location the distance is measured from the configured site.");
    log_block_start!("Examples:");
    log_indented!("stargaze distance 39.7392,-104.9903 40.7128,-74.0060");
    log_indented!("stargaze distance 40.7128,-74.0060");
    log_end!();
}
