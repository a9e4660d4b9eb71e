use crate::Result;
use image::RgbaImage;

/// A decoded RGBA raster, row-major, 8 bits per channel.
///
/// This is the unit the resource cache stores and the draw surface blits.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    image: RgbaImage,
}

impl Raster {
    /// Creates a fully transparent raster of the given size
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
        }
    }

    /// Wraps an already decoded image buffer
    pub fn from_image(image: RgbaImage) -> Self {
        Self { image }
    }

    /// Decodes encoded image bytes (PNG, JPEG, ...) into an RGBA raster
    pub fn decode(data: &[u8]) -> Result<Self> {
        let image = image::load_from_memory(data)?.to_rgba8();
        Ok(Self { image })
    }

    /// Natural width in pixels
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Natural height in pixels
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Raw RGBA bytes
    pub fn data(&self) -> &[u8] {
        &self.image
    }

    /// Raw RGBA bytes, mutable
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.image
    }

    /// Multiplies every pixel's color channels by `rgb / 255`, leaving the
    /// alpha channel untouched. This is the tint step of marker recoloring.
    pub fn multiply_rgb(&mut self, rgb: [u8; 3]) {
        let factors = [
            rgb[0] as f32 / 255.0,
            rgb[1] as f32 / 255.0,
            rgb[2] as f32 / 255.0,
        ];
        for pixel in self.image.pixels_mut() {
            for (channel, factor) in pixel.0[..3].iter_mut().zip(factors) {
                *channel = (*channel as f32 * factor).round() as u8;
            }
        }
    }
}

/// Reusable scratch buffer for pixel work that must not touch cached rasters.
///
/// The allocation is kept across loads of same-sized sources; loading
/// overwrites every pixel, which doubles as the reset between reuses.
#[derive(Debug, Clone)]
pub struct ScratchRaster {
    raster: Raster,
}

impl ScratchRaster {
    pub fn new() -> Self {
        Self {
            raster: Raster::new(0, 0),
        }
    }

    /// Copies `source` into the scratch buffer and hands it out for mutation
    pub fn load_from(&mut self, source: &Raster) -> &mut Raster {
        if self.raster.width() != source.width() || self.raster.height() != source.height() {
            self.raster = Raster::new(source.width(), source.height());
        }
        self.raster.data_mut().copy_from_slice(source.data());
        &mut self.raster
    }

    /// The scratch contents as last written
    pub fn raster(&self) -> &Raster {
        &self.raster
    }
}

impl Default for ScratchRaster {
    fn default() -> Self {
        Self::new()
    }
}
