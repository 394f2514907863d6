use std::path::PathBuf;
use std::{error, fmt, io};

/// Error type for TMX/TSX decoding
///
/// Fields of the struct variants are the element, attribute, path or
/// value the message names.
#[derive(Debug)]
#[allow(missing_docs)]
pub enum MapError {
    /// File I/O error while reading a map or an external tileset
    Io { path: PathBuf, source: io::Error },
    /// Malformed XML document
    Xml { path: Option<PathBuf>, message: String },
    /// Malformed JSON tileset document
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    /// Base64 tile data could not be decoded
    Base64(base64::DecodeError),
    /// A required attribute is absent
    MissingAttribute {
        element: String,
        attribute: String,
    },
    /// An attribute is present but does not parse as the expected type
    InvalidAttribute {
        element: String,
        attribute: String,
        value: String,
    },
    /// A required child element is absent
    MissingElement { parent: String, child: String },
    /// A CSV cell is not an unsigned integer
    InvalidTileData(String),
    /// `<data encoding="...">` holds something other than csv/base64
    UnknownEncoding(String),
    /// Compressed base64 data is not decoded by this crate
    UnsupportedCompression(String),
    /// Tile data does not hold exactly `expected` cells
    InvalidLayerSize {
        layer: String,
        expected: usize,
        found: usize,
    },
    /// A tile's terrain string is malformed or points past the terrain list
    InvalidTerrain { tile: u32, value: String },
    /// A `<property>` carries a type we do not know about
    UnsupportedPropertyType { name: String, kind: String },
    /// Document extension is neither XML nor JSON
    UnsupportedFormat(PathBuf),
    /// Structurally invalid map
    InvalidMap(String),
}

impl MapError {
    pub(crate) fn xml(message: impl fmt::Display) -> Self {
        MapError::Xml {
            path: None,
            message: message.to_string(),
        }
    }

    pub(crate) fn with_path(self, path: &std::path::Path) -> Self {
        match self {
            MapError::Xml {
                path: None,
                message,
            } => MapError::Xml {
                path: Some(path.to_path_buf()),
                message,
            },
            other => other,
        }
    }
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapError::Io { path, source } => {
                write!(f, "I/O error reading {}: {}", path.display(), source)
            }
            MapError::Xml {
                path: Some(path),
                message,
            } => write!(f, "Failed to parse XML in {}: {}", path.display(), message),
            MapError::Xml {
                path: None,
                message,
            } => write!(f, "Failed to parse XML: {}", message),
            MapError::Json { path, source } => {
                write!(f, "Failed to parse JSON in {}: {}", path.display(), source)
            }
            MapError::Base64(err) => write!(f, "Invalid base64 tile data: {}", err),
            MapError::MissingAttribute { element, attribute } => {
                write!(f, "<{}> is missing required attribute '{}'", element, attribute)
            }
            MapError::InvalidAttribute {
                element,
                attribute,
                value,
            } => write!(
                f,
                "<{}> attribute '{}' has invalid value '{}'",
                element, attribute, value
            ),
            MapError::MissingElement { parent, child } => {
                write!(f, "<{}> is missing required child <{}>", parent, child)
            }
            MapError::InvalidTileData(cell) => write!(f, "Invalid tile data cell: '{}'", cell),
            MapError::UnknownEncoding(enc) => write!(f, "Unknown tile data encoding: {}", enc),
            MapError::UnsupportedCompression(c) => {
                write!(f, "Compressed tile data is not supported: {}", c)
            }
            MapError::InvalidLayerSize {
                layer,
                expected,
                found,
            } => write!(
                f,
                "Invalid layer size for layer '{}': expected {} cells, found {}",
                layer, expected, found
            ),
            MapError::InvalidTerrain { tile, value } => {
                write!(f, "Invalid terrain '{}' on tile {}", value, tile)
            }
            MapError::UnsupportedPropertyType { name, kind } => {
                write!(f, "Property '{}' has unsupported type '{}'", name, kind)
            }
            MapError::UnsupportedFormat(path) => {
                write!(f, "Unsupported file format: {}", path.display())
            }
            MapError::InvalidMap(msg) => write!(f, "Invalid map: {}", msg),
        }
    }
}

impl error::Error for MapError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            MapError::Io { source, .. } => Some(source),
            MapError::Json { source, .. } => Some(source),
            MapError::Base64(err) => Some(err),
            _ => None,
        }
    }
}

impl From<base64::DecodeError> for MapError {
    fn from(err: base64::DecodeError) -> Self {
        MapError::Base64(err)
    }
}
