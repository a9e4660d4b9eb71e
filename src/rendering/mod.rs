pub mod context;
pub mod marker;
pub mod raster;
pub mod resources;

// Re-export main types
pub use context::{DrawCommand, DrawSurface, RenderContext};
pub use marker::{AnchorPoint, ImageMarkerSymbolizer, MarkerPainter};
pub use raster::{Raster, ScratchRaster};
pub use resources::{ResourceCache, ResourceKey};
