//! Image marker rendering.
//!
//! [`ImageMarkerSymbolizer`] turns one resolved marker symbol into draw
//! calls against a [`DrawSurface`], using rasters served by a
//! [`ResourceCache`] and anchor points served by the owning painter. It
//! never loads resources and treats every style problem as a reason to
//! draw less, not to fail.

use crate::core::{bounds::Bounds, geo::Point};
use crate::prelude::Arc;
use crate::rendering::context::DrawSurface;
use crate::rendering::raster::{Raster, ScratchRaster};
use crate::rendering::resources::{ResourceCache, ResourceKey};
use crate::style::marker::{
    align_offset, ColorSpec, MarkerKind, MarkerPlacement, MarkerRenderStyle, MarkerSymbol,
};
use crate::Result;

/// A device-space point the painter wants a marker drawn at, with an
/// optional extra rotation in radians (e.g. to follow a line's direction).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnchorPoint {
    pub point: Point,
    pub rotation: Option<f64>,
}

impl AnchorPoint {
    pub fn new(point: Point) -> Self {
        Self {
            point,
            rotation: None,
        }
    }

    pub fn with_rotation(mut self, radians: f64) -> Self {
        self.rotation = Some(radians);
        self
    }
}

/// The symbolizer's view of the painter that owns it: where markers go and
/// which rendering mode the painter is currently in.
pub trait MarkerPainter {
    /// Device-space anchor points for the requested placement
    fn render_points(&mut self, placement: MarkerPlacement) -> Vec<AnchorPoint>;

    /// Whether this pass probes geometry under the cursor instead of
    /// producing visible output
    fn is_hit_testing(&self) -> bool {
        false
    }

    /// Whether draws are being collected into a sprite atlas, deferring
    /// cache invalidation to the batch
    fn is_spriting(&self) -> bool {
        false
    }

    /// Drops any geometry-level caches derived from the symbol's size
    fn invalidate_cache(&mut self) {}
}

/// Renders one image marker symbol onto a draw surface.
///
/// Holds the raw symbol, the style resolved from it at construction, and a
/// private scratch buffer so recoloring never touches cached rasters.
#[derive(Debug, Clone)]
pub struct ImageMarkerSymbolizer {
    symbol: MarkerSymbol,
    style: MarkerRenderStyle,
    scratch: ScratchRaster,
}

impl ImageMarkerSymbolizer {
    pub fn new(symbol: MarkerSymbol) -> Self {
        let style = symbol.translate();
        Self {
            symbol,
            style,
            scratch: ScratchRaster::new(),
        }
    }

    /// Whether this symbolizer can draw the given symbol
    pub fn test(symbol: &MarkerSymbol) -> bool {
        !symbol.source.is_empty()
    }

    /// The resolved style the renderer draws with
    pub fn style(&self) -> &MarkerRenderStyle {
        &self.style
    }

    /// Placement hint for the anchor provider, straight from the symbol
    pub fn placement(&self) -> MarkerPlacement {
        self.symbol.placement
    }

    /// Styled rotation as surface radians, `None` when the symbol's
    /// rotation is not a finite number
    pub fn rotation(&self) -> Option<f64> {
        let r = self.style.rotation;
        if !r.is_finite() {
            return None;
        }
        Some(-r.to_radians())
    }

    /// Resolved pixel offset of the marker from its anchor
    pub fn dx_dy(&self) -> Point {
        Point::new(self.style.dx, self.style.dy)
    }

    /// Key this symbolizer's raster is looked up under. Styled sizes are
    /// rounded to whole pixels; unset sizes key the natural-size binding.
    pub fn resource_key(&self) -> ResourceKey {
        ResourceKey::new(
            self.style.source.clone(),
            self.style.width.map(|w| w.round() as u32),
            self.style.height.map(|h| h.round() as u32),
        )
    }

    /// Pixel-space footprint of one rendered marker relative to its anchor,
    /// after alignment, offset and the symbol's own rotation.
    ///
    /// Falls back to the natural raster size per axis while the styled size
    /// is unset, or zero if the raster is not cached yet.
    pub fn fixed_extent(&self, resources: &ResourceCache) -> Bounds {
        let natural =
            resources.get_image(&ResourceKey::new(self.style.source.clone(), None, None));
        let width = self
            .style
            .width
            .unwrap_or_else(|| natural.as_ref().map_or(0.0, |img| img.width() as f64));
        let height = self
            .style
            .height
            .unwrap_or_else(|| natural.as_ref().map_or(0.0, |img| img.height() as f64));

        let dxdy = self.dx_dy();
        let offset = align_offset(
            width,
            height,
            self.style.horizontal_alignment,
            self.style.vertical_alignment,
        );
        let aligned = Bounds::new(dxdy, dxdy.add(&Point::new(width, height))).translated(&offset);
        match self.rotation() {
            Some(rotation) if rotation != 0.0 => aligned.rotated(rotation),
            _ => aligned,
        }
    }

    /// Draws the marker at every anchor the painter provides.
    ///
    /// Skips quietly when there is nothing to draw: invisible style, no
    /// anchors, or no cached raster. The only errors that surface are the
    /// draw surface's own.
    pub fn symbolize(
        &mut self,
        surface: &mut dyn DrawSurface,
        painter: &mut dyn MarkerPainter,
        resources: &mut ResourceCache,
    ) -> Result<()> {
        // Hit-testing draws even invisible markers so they stay probeable.
        if !painter.is_hit_testing()
            && (self.style.width == Some(0.0)
                || self.style.height == Some(0.0)
                || self.style.opacity == 0.0)
        {
            return Ok(());
        }

        let anchors = painter.render_points(self.placement());
        if anchors.is_empty() {
            return Ok(());
        }

        let image = match resources.get_image(&self.resource_key()) {
            Some(image) => image,
            None => {
                log::warn!("no image found for marker source '{}'", self.style.source);
                return Ok(());
            }
        };

        // Recolor into the scratch buffer; the cached raster is never written.
        let mut alpha_override = None;
        let mut recolored = false;
        if let Some(color) = self.style.replace_color.as_ref().and_then(ColorSpec::resolve) {
            self.scratch.load_from(&image).multiply_rgb(color.rgb);
            alpha_override = color.alpha;
            recolored = true;
        }

        // First resolution of an auto-sized marker: adopt the natural size,
        // register the fully-keyed binding and drop stale geometry caches.
        let (width, height) = match (self.style.width, self.style.height) {
            (Some(width), Some(height)) => (width, height),
            _ => {
                let width = image.width() as f64;
                let height = image.height() as f64;
                self.style.width = Some(width);
                self.style.height = Some(height);
                let key = self.resource_key();
                if !resources.is_resource_loaded(&key) {
                    resources.add_resource(key, Arc::clone(&image));
                }
                if !painter.is_spriting() {
                    painter.invalidate_cache();
                }
                (width, height)
            }
        };

        // Vector path sources carry their opacity in the source itself.
        let opacity = alpha_override.unwrap_or(self.style.opacity);
        let mut saved_alpha = None;
        if self.symbol.kind != MarkerKind::VectorPath && opacity < 1.0 {
            let current = surface.global_alpha();
            saved_alpha = Some(current);
            surface.set_global_alpha(current * opacity);
        }

        let offset = align_offset(
            width,
            height,
            self.style.horizontal_alignment,
            self.style.vertical_alignment,
        )
        .add(&self.dx_dy());
        let draw_source: &Raster = if recolored {
            self.scratch.raster()
        } else {
            &image
        };

        let mut result = Ok(());
        for anchor in &anchors {
            let rotation = self.rotation_at(anchor);
            if let Some(angle) = rotation {
                surface.save();
                surface.rotate_at(angle, anchor.point);
            }
            let outcome = surface.draw_image(
                draw_source,
                anchor.point.x + offset.x,
                anchor.point.y + offset.y,
                width,
                height,
            );
            if rotation.is_some() {
                surface.restore();
            }
            if let Err(err) = outcome {
                result = Err(err);
                break;
            }
        }

        if let Some(alpha) = saved_alpha {
            surface.set_global_alpha(alpha);
        }
        result
    }

    /// Combined rotation for one anchor: the symbol's own plus the
    /// placement's, `None` when nothing rotates
    fn rotation_at(&self, anchor: &AnchorPoint) -> Option<f64> {
        let base = self.rotation().unwrap_or(0.0);
        let total = base + anchor.rotation.unwrap_or(0.0);
        if total == 0.0 {
            None
        } else {
            Some(total)
        }
    }
}
