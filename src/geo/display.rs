//! Coordinate formatting for display.

use crate::constants::MAXIMUM_COORDINATE_DECIMALS;

/// Format as absolute degrees with hemisphere letters, e.g. `39.7392°N, 104.9903°W`.
///
/// Zero latitude is reported as north and zero longitude as east.
pub fn format_coordinates(latitude: f64, longitude: f64, decimals: u8) -> String {
    let precision = usize::from(decimals.min(MAXIMUM_COORDINATE_DECIMALS));
    let lat_dir = if latitude >= 0.0 { 'N' } else { 'S' };
    let lon_dir = if longitude >= 0.0 { 'E' } else { 'W' };

    format!(
        "{:.precision$}°{lat_dir}, {:.precision$}°{lon_dir}",
        latitude.abs(),
        longitude.abs(),
    )
}
