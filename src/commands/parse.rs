//! Parse command: show how free-text location input would be routed.

use anyhow::Result;

use crate::config::Config;
use crate::geo::{CoordinateError, looks_like_coordinates, looks_like_postal_code, parse_coordinates};

pub fn handle_parse_command(input: &str, config: &Config) -> Result<()> {
    log_block_start!("Input: \"{}\"", input.trim());

    if looks_like_coordinates(input) {
        match parse_coordinates(input) {
            Ok(coords) => {
                log_decorated!("Coordinates: {}", coords.format(config.coordinate_decimals()));
            }
            Err(CoordinateError::LatitudeOutOfRange(lat)) => {
                log_warning!("Coordinate pair with latitude {} outside -90..90", lat);
            }
            Err(CoordinateError::LongitudeOutOfRange(lon)) => {
                log_warning!("Coordinate pair with longitude {} outside -180..180", lon);
            }
            Err(e) => log_warning!("Not a usable coordinate pair: {}", e),
        }
    } else if looks_like_postal_code(input) {
        log_decorated!("Postal code (US, UK or Canadian format)");
    } else {
        log_decorated!("Place name, passed to location search as text");
    }

    log_end!();
    Ok(())
}

pub fn display_help() {
    log_version!();
    log_block_start!("parse - Classify and validate location input");
    log_block_start!("Usage: stargaze parse <text>");
    log_block_start!("Examples:");
    log_indented!("stargaze parse \"39.7392, -104.9903\"");
    log_indented!("stargaze parse \"SW1A 1AA\"");
    log_indented!("stargaze parse Denver");
    log_end!();
}
