//! Geographic projections assembled from small, independently testable strategies.
//!
//! A [`Projection`] pairs a planar [`CoordTransform`] with a geodesic
//! [`DistanceMeasurer`]; [`Projection::epsg3857`] builds the Web Mercator
//! projection used by virtually every slippy map.

use crate::core::constants::{EARTH_RADIUS, MAX_LATITUDE, METERS_PER_DEGREE, RAD};
use crate::core::geo::{wrap, LatLng, Point};
use std::f64::consts::FRAC_PI_2;
use std::fmt;

/// Converts between geographic coordinates and a planar projected space.
///
/// Implementations must be pure and total: any finite input yields a finite
/// output, out-of-range latitudes are clamped rather than rejected.
pub trait CoordTransform {
    fn project(&self, coord: &LatLng) -> Point;
    fn unproject(&self, point: &Point) -> LatLng;
}

/// Measures distance in meters between two geographic coordinates.
pub trait DistanceMeasurer {
    fn distance(&self, a: &LatLng, b: &LatLng) -> f64;
}

/// Spherical Mercator transform (EPSG:3857), meters on the projected plane.
#[derive(Debug, Clone, Copy, Default)]
pub struct SphericalMercator;

impl CoordTransform for SphericalMercator {
    fn project(&self, coord: &LatLng) -> Point {
        let lat = LatLng::clamp_lat(coord.lat);
        // The equator maps to exactly zero; taking the closed form avoids
        // trig round-off polluting the y == 0 invariant.
        let c = if lat == 0.0 {
            0.0
        } else {
            ((90.0 + lat) * RAD / 2.0).tan().ln() / RAD
        };
        Point::new(coord.lng * METERS_PER_DEGREE, c * METERS_PER_DEGREE)
    }

    fn unproject(&self, point: &Point) -> LatLng {
        let lat = if point.y == 0.0 {
            0.0
        } else {
            let c = point.y / METERS_PER_DEGREE;
            (2.0 * (c * RAD).exp().atan() - FRAC_PI_2) / RAD
        };
        LatLng::new(
            wrap(lat, -MAX_LATITUDE, MAX_LATITUDE),
            wrap(point.x / METERS_PER_DEGREE, -180.0, 180.0),
        )
    }
}

/// Great-circle distance on the WGS84 sphere using the Haversine formula.
#[derive(Debug, Clone, Copy, Default)]
pub struct Wgs84Sphere;

impl DistanceMeasurer for Wgs84Sphere {
    fn distance(&self, a: &LatLng, b: &LatLng) -> f64 {
        let lat1_rad = a.lat.to_radians();
        let lat2_rad = b.lat.to_radians();
        let delta_lat = (b.lat - a.lat).to_radians();
        let delta_lng = (b.lng - a.lng).to_radians();

        let h = (delta_lat / 2.0).sin().powi(2)
            + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
        let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

        EARTH_RADIUS * c
    }
}

/// A named projection composed of a coordinate transform and a distance
/// measurer chosen at construction time.
pub struct Projection {
    code: &'static str,
    transform: Box<dyn CoordTransform + Send + Sync>,
    measurer: Box<dyn DistanceMeasurer + Send + Sync>,
}

impl Projection {
    /// Composes a projection from its two strategies
    pub fn new(
        code: &'static str,
        transform: impl CoordTransform + Send + Sync + 'static,
        measurer: impl DistanceMeasurer + Send + Sync + 'static,
    ) -> Self {
        Self {
            code,
            transform: Box::new(transform),
            measurer: Box::new(measurer),
        }
    }

    /// The standard Web Mercator projection with spherical distances
    pub fn epsg3857() -> Self {
        Self::new("EPSG:3857", SphericalMercator, Wgs84Sphere)
    }

    /// Well-known code of the projection, e.g. `"EPSG:3857"`
    pub fn code(&self) -> &str {
        self.code
    }

    /// Projects a geographic coordinate onto the planar space (meters)
    pub fn project(&self, coord: &LatLng) -> Point {
        self.transform.project(coord)
    }

    /// Like [`project`](Self::project) but writes into a caller-owned slot,
    /// the loop-friendly shape for hosts projecting long coordinate runs
    pub fn project_into(&self, coord: &LatLng, out: &mut Point) {
        *out = self.transform.project(coord);
    }

    /// Recovers the geographic coordinate for a projected point
    pub fn unproject(&self, point: &Point) -> LatLng {
        self.transform.unproject(point)
    }

    /// Slot-writing variant of [`unproject`](Self::unproject)
    pub fn unproject_into(&self, point: &Point, out: &mut LatLng) {
        *out = self.transform.unproject(point);
    }

    /// Geodesic distance in meters between two coordinates
    pub fn distance(&self, a: &LatLng, b: &LatLng) -> f64 {
        self.measurer.distance(a, b)
    }
}

impl Default for Projection {
    fn default() -> Self {
        Self::epsg3857()
    }
}

impl fmt::Debug for Projection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Projection").field("code", &self.code).finish()
    }
}
