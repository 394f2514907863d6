//! Readers that turn TMX/TSX (XML) and TSJ (JSON) documents into an
//! [`Element`](crate::Element) tree.

pub mod json_loader;
pub mod xml_loader;

use crate::document::Element;
use crate::error::MapError;
use std::path::Path;

/// Resolves a path to a parsed element tree.
///
/// External tilesets are pulled in through this, so callers that keep their
/// assets somewhere other than the filesystem (embedded, packed archives)
/// implement it themselves.
pub trait DocumentLoader {
    fn load(&self, path: &Path) -> Result<Element, MapError>;
}

/// Reads documents from disk, picking the reader from the file extension.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsLoader;

impl DocumentLoader for FsLoader {
    fn load(&self, path: &Path) -> Result<Element, MapError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        let json = match ext.as_deref() {
            Some("tmx") | Some("tsx") | Some("xml") => false,
            Some("tsj") | Some("json") => true,
            _ => return Err(MapError::UnsupportedFormat(path.to_path_buf())),
        };

        log::debug!("Reading document {}", path.display());
        let txt = std::fs::read_to_string(path).map_err(|source| MapError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if json {
            json_loader::parse_json_tileset(&txt, path)
        } else {
            xml_loader::parse_xml(&txt).map_err(|e| e.with_path(path))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unknown_extensions_before_touching_disk() {
        let err = FsLoader.load(Path::new("nowhere/tiles.png")).unwrap_err();
        assert!(matches!(err, MapError::UnsupportedFormat(p) if p.ends_with("tiles.png")));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = FsLoader
            .load(Path::new("definitely/not/here.tsx"))
            .unwrap_err();
        assert!(matches!(err, MapError::Io { .. }));
    }
}
