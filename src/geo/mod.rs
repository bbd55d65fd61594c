//! Coordinate parsing, validation, distance and display.
//!
//! Everything here is pure: no I/O, no logging, no shared state.
//!
//! ## Module Structure
//!
//! - [`coordinates`]: the validated [`Coordinates`] value, text parsing and
//!   input classification (coordinate pair vs. postal code vs. free text)
//! - [`distance`]: great-circle distance on a spherical Earth
//! - [`display`]: hemisphere-lettered formatting

pub mod coordinates;
pub mod display;
pub mod distance;

pub use coordinates::{
    CoordinateError, Coordinates, is_valid_latitude, is_valid_longitude, looks_like_coordinates,
    looks_like_postal_code, parse_coordinates,
};
pub use display::format_coordinates;
pub use distance::distance_km;
