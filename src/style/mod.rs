pub mod color;
pub mod marker;

// Re-export main types
pub use color::{parse_color, ParsedColor};
pub use marker::{
    align_offset, ColorSpec, HorizontalAlignment, MarkerKind, MarkerPlacement, MarkerRenderStyle,
    MarkerSymbol, VerticalAlignment,
};
