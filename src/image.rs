use crate::color::color_attr;
use crate::document::Element;
use crate::error::MapError;
use macroquad::color::Color;
use std::path::{Path, PathBuf};

/// An `<image>` reference. Pixels are never loaded here; `source` is the
/// path joined onto the directory of the document that referenced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    /// Image path joined to the directory of the document that named it.
    pub source: PathBuf,
    /// Declared width in pixels.
    pub width: Option<u32>,
    /// Declared height in pixels.
    pub height: Option<u32>,
    /// Color to treat as transparent (`trans`).
    pub transparent: Option<Color>,
}

impl Image {
    /// Read an `<image>` element; `source` is required.
    pub fn from_element(e: &Element, base_dir: &Path) -> Result<Self, MapError> {
        let source = e.required_str("source")?;
        Ok(Image {
            source: base_dir.join(source),
            width: e.parse_attr("width")?,
            height: e.parse_attr("height")?,
            transparent: color_attr(e, "trans")?,
        })
    }
}
