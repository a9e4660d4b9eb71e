//! # mapstamp
//!
//! The projection and marker-rasterization core of a Rust map engine.
//!
//! This library provides the two halves every slippy-map renderer needs:
//! deterministic Web Mercator coordinate conversion, and rasterization of
//! image markers onto an abstract drawing surface with cached-resource
//! reuse, alignment, rotation, opacity blending and per-pixel recoloring.

pub mod core;
pub mod prelude;
pub mod rendering;
pub mod style;

pub use crate::core::constants;

// Re-export public API
pub use crate::core::{
    bounds::Bounds,
    geo::{wrap, LatLng, Point},
    projection::{CoordTransform, DistanceMeasurer, Projection, SphericalMercator, Wgs84Sphere},
};

pub use crate::rendering::{
    context::{DrawCommand, DrawSurface, RenderContext},
    marker::{AnchorPoint, ImageMarkerSymbolizer, MarkerPainter},
    raster::{Raster, ScratchRaster},
    resources::{ResourceCache, ResourceKey},
};

pub use crate::style::{
    color::{parse_color, ParsedColor},
    marker::{
        align_offset, ColorSpec, HorizontalAlignment, MarkerKind, MarkerPlacement,
        MarkerRenderStyle, MarkerSymbol, VerticalAlignment,
    },
};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, MapError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("Render error: {0}")]
    Render(String),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Error type alias for convenience
pub type Error = MapError;
