use crate::document::Element;
use crate::error::MapError;
use macroquad::color::Color;

/// Parse a Tiled color: `#RRGGBB` or `#AARRGGBB`, the `#` optional.
pub fn parse_color(raw: &str) -> Option<Color> {
    let hex = raw.trim().trim_start_matches('#');
    if !hex.is_ascii() {
        return None;
    }
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();

    match hex.len() {
        6 => Some(Color::from_rgba(byte(0)?, byte(2)?, byte(4)?, 255)),
        8 => Some(Color::from_rgba(byte(2)?, byte(4)?, byte(6)?, byte(0)?)),
        _ => None,
    }
}

pub(crate) fn color_attr(e: &Element, key: &str) -> Result<Option<Color>, MapError> {
    match e.attr(key) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => parse_color(raw).map(Some).ok_or_else(|| e.invalid(key, raw)),
    }
}
