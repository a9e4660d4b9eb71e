use crate::core::geo::Point;
use crate::style::color::{parse_color, ParsedColor};
use crate::Result;
use serde::{Deserialize, Serialize};

/// What the marker source describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MarkerKind {
    /// A raster image loaded from the source
    Image,
    /// A vector path pre-rendered into a raster; opacity is baked into the
    /// source itself, so the renderer must not apply it again
    VectorPath,
}

impl Default for MarkerKind {
    fn default() -> Self {
        MarkerKind::Image
    }
}

/// Where markers are placed on the carrying geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MarkerPlacement {
    Center,
    Point,
    Vertex,
    Line,
    VertexFirst,
    VertexLast,
}

impl Default for MarkerPlacement {
    fn default() -> Self {
        MarkerPlacement::Center
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HorizontalAlignment {
    Left,
    Middle,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VerticalAlignment {
    Top,
    Middle,
    Bottom,
}

/// Recolor specification as it appears in a resolved style sheet: either raw
/// channel values or a color string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorSpec {
    Channels(Vec<f64>),
    Text(String),
}

impl ColorSpec {
    /// Resolves to concrete channels; `None` means "do not recolor"
    pub fn resolve(&self) -> Option<ParsedColor> {
        match self {
            ColorSpec::Channels(values) => {
                if values.len() != 3 && values.len() != 4 {
                    return None;
                }
                let channel = |v: f64| -> Option<u8> {
                    if v.is_finite() && (0.0..=255.0).contains(&v) {
                        Some(v.round() as u8)
                    } else {
                        None
                    }
                };
                let rgb = [channel(values[0])?, channel(values[1])?, channel(values[2])?];
                let alpha = if values.len() == 4 {
                    let a = values[3];
                    if !a.is_finite() || a < 0.0 {
                        return None;
                    }
                    Some(a.min(1.0))
                } else {
                    None
                };
                Some(ParsedColor { rgb, alpha })
            }
            ColorSpec::Text(text) => parse_color(text),
        }
    }
}

/// An image marker symbol as resolved from a style sheet.
///
/// All fields are optional on the wire; [`translate`](Self::translate)
/// resolves them to the defaults the renderer draws with.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerSymbol {
    pub source: String,
    pub kind: MarkerKind,
    pub opacity: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    /// Clockwise degrees
    pub rotation: Option<f64>,
    pub dx: Option<f64>,
    pub dy: Option<f64>,
    pub horizontal_alignment: Option<HorizontalAlignment>,
    pub vertical_alignment: Option<VerticalAlignment>,
    pub placement: MarkerPlacement,
    pub replace_color: Option<ColorSpec>,
}

impl MarkerSymbol {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            ..Default::default()
        }
    }

    /// Parses a symbol from style-sheet JSON
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_kind(mut self, kind: MarkerKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = Some(opacity);
        self
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_rotation(mut self, degrees: f64) -> Self {
        self.rotation = Some(degrees);
        self
    }

    pub fn with_offset(mut self, dx: f64, dy: f64) -> Self {
        self.dx = Some(dx);
        self.dy = Some(dy);
        self
    }

    pub fn with_alignment(
        mut self,
        horizontal: HorizontalAlignment,
        vertical: VerticalAlignment,
    ) -> Self {
        self.horizontal_alignment = Some(horizontal);
        self.vertical_alignment = Some(vertical);
        self
    }

    pub fn with_placement(mut self, placement: MarkerPlacement) -> Self {
        self.placement = placement;
        self
    }

    pub fn with_replace_color(mut self, color: ColorSpec) -> Self {
        self.replace_color = Some(color);
        self
    }

    /// Resolves raw symbol fields into render defaults, exactly once per
    /// symbolizer. Non-finite numbers count as unset; rotation is kept raw
    /// so a non-numeric value can still surface as "no rotation".
    pub fn translate(&self) -> MarkerRenderStyle {
        MarkerRenderStyle {
            source: self.source.clone(),
            opacity: finite_or(self.opacity, 1.0),
            width: self.width.filter(|w| w.is_finite()),
            height: self.height.filter(|h| h.is_finite()),
            rotation: self.rotation.unwrap_or(0.0),
            dx: finite_or(self.dx, 0.0),
            dy: finite_or(self.dy, 0.0),
            horizontal_alignment: self
                .horizontal_alignment
                .unwrap_or(HorizontalAlignment::Middle),
            vertical_alignment: self.vertical_alignment.unwrap_or(VerticalAlignment::Top),
            replace_color: self.replace_color.clone(),
        }
    }
}

fn finite_or(value: Option<f64>, default: f64) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(default)
}

/// Marker style with every default resolved, the form the renderer reads.
///
/// `width`/`height` stay unset until the raster's natural size is known;
/// placement and kind are not part of the drawn style and remain on the
/// symbol itself.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerRenderStyle {
    pub source: String,
    pub opacity: f64,
    pub width: Option<f64>,
    pub height: Option<f64>,
    /// Clockwise degrees, raw: non-finite when the symbol carried one
    pub rotation: f64,
    pub dx: f64,
    pub dy: f64,
    pub horizontal_alignment: HorizontalAlignment,
    pub vertical_alignment: VerticalAlignment,
    pub replace_color: Option<ColorSpec>,
}

/// Offset of the marker box's top-left corner from the anchor point for the
/// given alignment, in pixels
pub fn align_offset(
    width: f64,
    height: f64,
    horizontal: HorizontalAlignment,
    vertical: VerticalAlignment,
) -> Point {
    let x = match horizontal {
        HorizontalAlignment::Left => 0.0,
        HorizontalAlignment::Middle => -width / 2.0,
        HorizontalAlignment::Right => -width,
    };
    let y = match vertical {
        VerticalAlignment::Top => 0.0,
        VerticalAlignment::Middle => -height / 2.0,
        VerticalAlignment::Bottom => -height,
    };
    Point::new(x, y)
}
