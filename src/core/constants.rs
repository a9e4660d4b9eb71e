//! Projection constants shared across the crate.
//! Keeping them in a single place makes it easier to tweak engine-wide magic numbers.

use std::f64::consts::PI;

/// WGS84 equatorial radius in meters, the sphere EPSG:3857 projects onto.
pub const EARTH_RADIUS: f64 = 6378137.0;

/// Latitude at which the square Web Mercator world is cut off.
/// Latitudes beyond this are clamped, never rejected.
pub const MAX_LATITUDE: f64 = 85.0511287798;

/// Projected meters per degree of longitude at the equator.
pub const METERS_PER_DEGREE: f64 = EARTH_RADIUS * PI / 180.0;

/// Degrees-to-radians factor used throughout the Mercator math.
pub const RAD: f64 = PI / 180.0;
