use crate::prelude::HashMap;
use once_cell::sync::Lazy;

/// Outcome of a successful color parse: the color channels plus whatever
/// alpha the notation carried.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParsedColor {
    pub rgb: [u8; 3],
    /// Alpha in [0, 1] when the notation spelled one out (`#RRGGBBAA`,
    /// `rgba()`, `transparent`), otherwise `None`
    pub alpha: Option<f64>,
}

/// Color keywords accepted by marker styles: the CSS basic palette plus the
/// extended names that show up in real style sheets.
static NAMED_COLORS: Lazy<HashMap<&'static str, [u8; 3]>> = Lazy::new(|| {
    let mut names = HashMap::default();
    names.insert("black", [0, 0, 0]);
    names.insert("silver", [192, 192, 192]);
    names.insert("gray", [128, 128, 128]);
    names.insert("white", [255, 255, 255]);
    names.insert("maroon", [128, 0, 0]);
    names.insert("red", [255, 0, 0]);
    names.insert("purple", [128, 0, 128]);
    names.insert("fuchsia", [255, 0, 255]);
    names.insert("green", [0, 128, 0]);
    names.insert("lime", [0, 255, 0]);
    names.insert("olive", [128, 128, 0]);
    names.insert("yellow", [255, 255, 0]);
    names.insert("navy", [0, 0, 128]);
    names.insert("blue", [0, 0, 255]);
    names.insert("teal", [0, 128, 128]);
    names.insert("aqua", [0, 255, 255]);
    names.insert("orange", [255, 165, 0]);
    names.insert("brown", [165, 42, 42]);
    names.insert("pink", [255, 192, 203]);
    names.insert("gold", [255, 215, 0]);
    names.insert("indigo", [75, 0, 130]);
    names.insert("violet", [238, 130, 238]);
    names.insert("coral", [255, 127, 80]);
    names.insert("salmon", [250, 128, 114]);
    names.insert("khaki", [240, 230, 140]);
    names.insert("plum", [221, 160, 221]);
    names.insert("orchid", [218, 112, 214]);
    names.insert("tan", [210, 180, 140]);
    names.insert("turquoise", [64, 224, 208]);
    names.insert("chocolate", [210, 105, 30]);
    names.insert("crimson", [220, 20, 60]);
    names.insert("skyblue", [135, 206, 235]);
    names
});

/// Parses a marker color string: `#RRGGBB`/`#RRGGBBAA` hex, `rgb()`/`rgba()`
/// with integer channels, or a color keyword.
///
/// Returns `None` for anything it does not understand. Callers treat an
/// unparsed color as "leave the marker untinted", never as an error.
pub fn parse_color(input: &str) -> Option<ParsedColor> {
    let trimmed = input.trim();
    if let Some(hex) = trimmed.strip_prefix('#') {
        return parse_hex(hex);
    }

    let lower = trimmed.to_ascii_lowercase();
    if let Some(args) = strip_function(&lower, "rgba").or_else(|| strip_function(&lower, "rgb")) {
        return parse_functional(args);
    }

    // The one keyword with its own alpha; everything else is opaque.
    if lower == "transparent" {
        return Some(ParsedColor {
            rgb: [0, 0, 0],
            alpha: Some(0.0),
        });
    }
    NAMED_COLORS
        .get(lower.as_str())
        .map(|&rgb| ParsedColor { rgb, alpha: None })
}

fn parse_hex(hex: &str) -> Option<ParsedColor> {
    if hex.len() != 6 && hex.len() != 8 {
        return None;
    }
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }

    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    let rgb = [channel(0)?, channel(2)?, channel(4)?];
    let alpha = if hex.len() == 8 {
        // Alpha byte, kept to two decimals like the rest of the style sheet.
        Some((channel(6)? as f64 / 255.0 * 100.0).round() / 100.0)
    } else {
        None
    };
    Some(ParsedColor { rgb, alpha })
}

fn strip_function<'a>(input: &'a str, name: &str) -> Option<&'a str> {
    input
        .strip_prefix(name)?
        .strip_suffix(')')?
        .strip_prefix('(')
}

fn parse_functional(args: &str) -> Option<ParsedColor> {
    let parts: Vec<&str> = args.split(',').map(str::trim).collect();
    if parts.len() != 3 && parts.len() != 4 {
        return None;
    }

    let mut rgb = [0u8; 3];
    for (slot, part) in rgb.iter_mut().zip(&parts) {
        *slot = part.parse::<u8>().ok()?;
    }

    let alpha = if parts.len() == 4 {
        let a = parts[3].parse::<f64>().ok()?;
        if !a.is_finite() || a < 0.0 {
            return None;
        }
        Some(a.min(1.0))
    } else {
        None
    };
    Some(ParsedColor { rgb, alpha })
}
