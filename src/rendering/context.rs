use crate::core::{bounds::Bounds, geo::Point};
use crate::rendering::raster::Raster;
use crate::{MapError, Result};

/// Abstract 2D raster surface symbolizers draw onto.
///
/// Mirrors the small slice of a canvas-style API the marker pipeline needs:
/// transformed image blits, a save/restore transform stack, and a global
/// alpha that multiplies into every draw.
pub trait DrawSurface {
    /// Blits `image` scaled into the `width` x `height` box at `(x, y)`.
    /// Zero sizes are legal; hit-testing issues them for invisible markers.
    fn draw_image(
        &mut self,
        image: &Raster,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) -> Result<()>;

    /// Pushes the current transform onto the state stack
    fn save(&mut self);

    /// Pops the most recently saved transform; no-op on an empty stack
    fn restore(&mut self);

    /// Composes a rotation about `center` onto the current transform
    fn rotate_at(&mut self, radians: f64, center: Point);

    /// Current global alpha in [0, 1]
    fn global_alpha(&self) -> f64;

    /// Replaces the global alpha, clamped to [0, 1]
    fn set_global_alpha(&mut self, alpha: f64);
}

/// Identity matrix in the (a, b, c, d, e, f) affine layout
pub fn identity() -> [f64; 6] {
    [1.0, 0.0, 0.0, 1.0, 0.0, 0.0]
}

/// Matrix product `first * second`; the combined transform applies `second`
/// before `first`
pub fn multiply(first: &[f64; 6], second: &[f64; 6]) -> [f64; 6] {
    [
        first[0] * second[0] + first[2] * second[1],
        first[1] * second[0] + first[3] * second[1],
        first[0] * second[2] + first[2] * second[3],
        first[1] * second[2] + first[3] * second[3],
        first[0] * second[4] + first[2] * second[5] + first[4],
        first[1] * second[4] + first[3] * second[5] + first[5],
    ]
}

/// Rotation about an arbitrary center point, screen-space convention
pub fn rotation_about(radians: f64, center: Point) -> [f64; 6] {
    let (sin, cos) = radians.sin_cos();
    [
        cos,
        sin,
        -sin,
        cos,
        center.x - cos * center.x + sin * center.y,
        center.y - sin * center.x - cos * center.y,
    ]
}

/// Applies an affine matrix to a point
pub fn transform_point(matrix: &[f64; 6], point: Point) -> Point {
    Point::new(
        matrix[0] * point.x + matrix[2] * point.y + matrix[4], // a*x + c*y + e
        matrix[1] * point.x + matrix[3] * point.y + matrix[5], // b*x + d*y + f
    )
}

/// Commands that can be issued to the render context
#[derive(Debug, Clone)]
pub enum DrawCommand {
    /// An image blit: `dest` in untransformed surface coordinates, with the
    /// transform and global alpha captured at issue time
    Image {
        image: Raster,
        dest: Bounds,
        transform: [f64; 6],
        alpha: f64,
    },
}

/// Recording implementation of [`DrawSurface`].
///
/// Commands are queued rather than rasterized; the owning host replays the
/// queue against its actual backend at the end of the frame.
#[derive(Debug, Clone)]
pub struct RenderContext {
    pub width: u32,
    pub height: u32,
    drawing_queue: Vec<DrawCommand>,
    transform: [f64; 6],
    saved: Vec<[f64; 6]>,
    alpha: f64,
}

impl RenderContext {
    /// Create a new render context
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            drawing_queue: Vec::new(),
            transform: identity(),
            saved: Vec::new(),
            alpha: 1.0,
        }
    }

    /// Begin a frame: clears the queue and resets transform state and alpha
    pub fn begin_frame(&mut self) {
        self.drawing_queue.clear();
        self.saved.clear();
        self.transform = identity();
        self.alpha = 1.0;
    }

    /// Get the current drawing queue
    pub fn drawing_queue(&self) -> &[DrawCommand] {
        &self.drawing_queue
    }

    /// Clear the drawing queue
    pub fn clear_queue(&mut self) {
        self.drawing_queue.clear();
    }

    /// Current accumulated transform
    pub fn transform(&self) -> &[f64; 6] {
        &self.transform
    }
}

impl DrawSurface for RenderContext {
    fn draw_image(
        &mut self,
        image: &Raster,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) -> Result<()> {
        if !(x.is_finite() && y.is_finite() && width.is_finite() && height.is_finite()) {
            return Err(MapError::Render(format!(
                "non-finite draw_image arguments: ({}, {}) {}x{}",
                x, y, width, height
            )));
        }
        if width < 0.0 || height < 0.0 {
            return Err(MapError::Render(format!(
                "negative draw_image size: {}x{}",
                width, height
            )));
        }

        self.drawing_queue.push(DrawCommand::Image {
            image: image.clone(),
            dest: Bounds::from_coords(x, y, x + width, y + height),
            transform: self.transform,
            alpha: self.alpha,
        });
        Ok(())
    }

    fn save(&mut self) {
        self.saved.push(self.transform);
    }

    fn restore(&mut self) {
        if let Some(previous) = self.saved.pop() {
            self.transform = previous;
        }
    }

    fn rotate_at(&mut self, radians: f64, center: Point) {
        self.transform = multiply(&self.transform, &rotation_about(radians, center));
    }

    fn global_alpha(&self) -> f64 {
        self.alpha
    }

    fn set_global_alpha(&mut self, alpha: f64) {
        self.alpha = alpha.clamp(0.0, 1.0);
    }
}
