//! Prelude module for common mapstamp types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use mapstamp::prelude::*;`

pub use crate::core::{
    bounds::Bounds,
    geo::{wrap, LatLng, Point},
    projection::{CoordTransform, DistanceMeasurer, Projection},
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
        ColorSpec, HorizontalAlignment, MarkerKind, MarkerPlacement, MarkerSymbol,
        VerticalAlignment,
    },
};

pub use crate::{Error as MapError, Result};

pub use std::sync::Arc;

pub use fxhash::FxHashMap as HashMap;
