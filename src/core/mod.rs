pub mod bounds;
pub mod constants;
pub mod geo;
pub mod projection;

// Re-export main types
pub use bounds::Bounds;
pub use geo::{wrap, LatLng, Point};
pub use projection::{CoordTransform, DistanceMeasurer, Projection, SphericalMercator, Wgs84Sphere};
