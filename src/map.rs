use crate::color::color_attr;
use crate::document::Element;
use crate::error::MapError;
use crate::gid::TileRef;
use crate::group::Group;
use crate::layer::{ImageLayer, Layer, TileLayer};
use crate::loader::xml_loader::parse_xml;
use crate::loader::{DocumentLoader, FsLoader};
use crate::object::ObjectLayer;
use crate::properties::Properties;
use crate::tileset::{Tileset, Tilesets};
use anyhow::Context;
use macroquad::color::Color;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Map projection from the `orientation` attribute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum Orientation {
    #[default]
    Orthogonal,
    Isometric,
    Staggered,
    Hexagonal,
}

impl FromStr for Orientation {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "orthogonal" => Ok(Orientation::Orthogonal),
            "isometric" => Ok(Orientation::Isometric),
            "staggered" => Ok(Orientation::Staggered),
            "hexagonal" => Ok(Orientation::Hexagonal),
            _ => Err(()),
        }
    }
}

/// A decoded `<map>`.
#[derive(Debug, Clone, PartialEq)]
pub struct TiledMap {
    /// TMX format version.
    pub version: String,
    /// Map projection.
    pub orientation: Orientation,
    /// Width in cells.
    pub width: u32,
    /// Height in cells.
    pub height: u32,
    /// Cell width in pixels.
    pub tile_width: u32,
    /// Cell height in pixels.
    pub tile_height: u32,
    /// Whether tile layers are stored as chunks.
    pub infinite: bool,
    /// Background fill, if set.
    pub background_color: Option<Color>,
    /// Tilesets ordered by `first_gid`.
    pub tilesets: Tilesets,
    /// Top-level layers. Its header is read from `<map>` itself, so it
    /// also holds the map-level properties.
    pub root: Group,
    /// Directory relative paths were resolved against.
    pub base_dir: PathBuf,
}

impl TiledMap {
    /// Build a map from an already parsed `<map>` element. External
    /// tilesets are fetched through `loader`, relative to `base_dir`.
    pub fn from_element(
        e: &Element,
        base_dir: &Path,
        loader: &dyn DocumentLoader,
    ) -> Result<Self, MapError> {
        if e.name != "map" {
            return Err(MapError::InvalidMap(format!(
                "root element is <{}>, expected <map>",
                e.name
            )));
        }

        let width: u32 = e.required_attr("width")?;
        let height: u32 = e.required_attr("height")?;

        let tilesets = e
            .children_named("tileset")
            .map(|t| Tileset::from_map_element(t, base_dir, loader))
            .collect::<Result<Vec<_>, _>>()?;

        let root = Group::compose(e, width, height, base_dir)?;

        let orientation = match e.attr("orientation") {
            Some(raw) => raw.parse().map_err(|_| e.invalid("orientation", raw))?,
            None => Orientation::default(),
        };

        log::debug!(
            "Decoded {}x{} map: {} tilesets, {} top-level layers",
            width,
            height,
            tilesets.len(),
            root.layers().len()
        );

        Ok(TiledMap {
            version: e.attr("version").unwrap_or_default().to_owned(),
            orientation,
            width,
            height,
            tile_width: e.required_attr("tilewidth")?,
            tile_height: e.required_attr("tileheight")?,
            infinite: e.bool_attr("infinite", false)?,
            background_color: color_attr(e, "backgroundcolor")?,
            tilesets: Tilesets::new(tilesets),
            root,
            base_dir: base_dir.to_path_buf(),
        })
    }

    /// Parse TMX text.
    pub fn parse_str(
        tmx: &str,
        base_dir: &Path,
        loader: &dyn DocumentLoader,
    ) -> Result<Self, MapError> {
        let root = parse_xml(tmx)?;
        Self::from_element(&root, base_dir, loader)
    }

    /// Load a map through `loader`; relative paths resolve against the
    /// map's own directory.
    pub fn load_with(path: &Path, loader: &dyn DocumentLoader) -> Result<Self, MapError> {
        let root = loader.load(path)?;
        let map_dir = path
            .parent()
            .map(|d| d.to_path_buf())
            .unwrap_or_else(|| PathBuf::from("./"));
        Self::from_element(&root, &map_dir, loader)
    }

    /// Load a `.tmx` file from disk.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if path.extension().and_then(|e| e.to_str()) != Some("tmx") {
            anyhow::bail!("Map file must be a TMX file: {}", path.display());
        }
        Self::load_with(path, &FsLoader).with_context(|| format!("Loading map {}", path.display()))
    }

    /// Map-level custom properties.
    pub fn properties(&self) -> &Properties {
        &self.root.header.properties
    }

    /// Top-level layers in document order.
    pub fn layers(&self) -> &[Layer] {
        self.root.layers()
    }

    /// Top-level tile layers.
    pub fn tile_layers(&self) -> impl Iterator<Item = &TileLayer> + '_ {
        self.root.tile_layers()
    }

    /// Top-level object layers.
    pub fn object_layers(&self) -> impl Iterator<Item = &ObjectLayer> + '_ {
        self.root.object_layers()
    }

    /// Top-level image layers.
    pub fn image_layers(&self) -> impl Iterator<Item = &ImageLayer> + '_ {
        self.root.image_layers()
    }

    /// Top-level groups.
    pub fn groups(&self) -> impl Iterator<Item = &Group> + '_ {
        self.root.groups()
    }

    /// Look up a layer by name at any depth.
    pub fn layer(&self, name: &str) -> Option<&Layer> {
        self.root.find(name)
    }

    /// The cell at `(x, y)` on `layer`, with its owning tileset and local id
    /// when the gid resolves. Empty and unknown gids come back with `None`.
    pub fn tile<'a>(
        &'a self,
        layer: &TileLayer,
        x: i32,
        y: i32,
    ) -> Option<(TileRef, Option<(&'a Tileset, u32)>)> {
        let tile = layer.tile_at(x, y)?;
        Some((tile, self.tilesets.resolve(tile.gid)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// In-memory documents keyed by path.
    struct MemLoader(HashMap<PathBuf, String>);

    impl DocumentLoader for MemLoader {
        fn load(&self, path: &Path) -> Result<Element, MapError> {
            let txt = self.0.get(path).ok_or_else(|| MapError::Io {
                path: path.to_path_buf(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            })?;
            parse_xml(txt)
        }
    }

    const MAP: &str = r##"<?xml version="1.0" encoding="UTF-8"?>
<map version="1.10" orientation="isometric" width="2" height="2" tilewidth="16" tileheight="16"
     infinite="0" backgroundcolor="#102030">
  <properties><property name="is_night" type="bool" value="true"/></properties>
  <tileset firstgid="1" name="inline" tilewidth="16" tileheight="16" columns="2" tilecount="4">
    <image source="inline.png" width="32" height="32"/>
  </tileset>
  <tileset firstgid="5" source="tilesets/ext.tsx"/>
  <layer name="ground"><data encoding="csv">1,6,0,2147483653</data></layer>
</map>"##;

    const EXT: &str = r#"<tileset name="ext" tilewidth="16" tileheight="16" columns="1" tilecount="2">
  <image source="../img/ext.png"/>
  <tile id="1" class="lava"/>
</tileset>"#;

    fn loader() -> MemLoader {
        MemLoader(HashMap::from([(PathBuf::from("maps/tilesets/ext.tsx"), EXT.to_owned())]))
    }

    #[test]
    fn decodes_map_with_inline_and_external_tilesets() {
        let map = TiledMap::parse_str(MAP, Path::new("maps"), &loader()).expect("map");

        assert_eq!(map.version, "1.10");
        assert_eq!(map.orientation, Orientation::Isometric);
        assert_eq!((map.width, map.height, map.tile_width), (2, 2, 16));
        assert_eq!(map.background_color, Some(Color::from_rgba(0x10, 0x20, 0x30, 255)));
        assert_eq!(map.properties().get_bool("is_night"), Some(true));
        assert_eq!(map.tilesets.len(), 2);

        let ext = map.tilesets.by_name("ext").unwrap();
        assert_eq!(ext.first_gid, 5);
        assert_eq!(ext.source.as_deref(), Some(Path::new("maps/tilesets/ext.tsx")));
        assert_eq!(
            ext.image.as_ref().unwrap().source,
            Path::new("maps/tilesets/../img/ext.png")
        );

        let ground = map.tile_layers().next().unwrap();
        let (tile, owner) = map.tile(ground, 1, 0).unwrap();
        assert_eq!(tile.gid, 6);
        let (ts, local) = owner.unwrap();
        assert_eq!((ts.name.as_str(), local), ("ext", 1));
        assert_eq!(ts.tile(local).unwrap().class, "lava");

        let (tile, owner) = map.tile(ground, 1, 1).unwrap();
        assert!(tile.flip_h);
        assert_eq!(owner.map(|(ts, l)| (ts.first_gid, l)), Some((5, 0)));

        let (empty, owner) = map.tile(ground, 0, 1).unwrap();
        assert!(empty.is_empty() && owner.is_none());
        assert!(map.tile(ground, 5, 5).is_none());
    }

    #[test]
    fn failed_external_load_fails_the_map() {
        let empty = MemLoader(HashMap::new());
        let err = TiledMap::parse_str(MAP, Path::new("maps"), &empty).unwrap_err();
        assert!(matches!(err, MapError::Io { .. }));
    }

    #[test]
    fn external_document_must_be_a_tileset() {
        let wrong = MemLoader(HashMap::from([(
            PathBuf::from("maps/tilesets/ext.tsx"),
            "<map/>".to_owned(),
        )]));
        let err = TiledMap::parse_str(MAP, Path::new("maps"), &wrong).unwrap_err();
        assert!(matches!(err, MapError::InvalidMap(_)));
    }

    #[test]
    fn rejects_non_map_root_and_bad_orientation() {
        let err = TiledMap::parse_str("<tileset/>", Path::new(""), &FsLoader).unwrap_err();
        assert!(matches!(err, MapError::InvalidMap(_)));

        let xml = r#"<map orientation="spherical" width="1" height="1" tilewidth="1" tileheight="1"/>"#;
        let err = TiledMap::parse_str(xml, Path::new(""), &FsLoader).unwrap_err();
        assert!(matches!(err, MapError::InvalidAttribute { ref attribute, .. } if attribute == "orientation"));
    }

    #[test]
    fn tileset_entry_without_firstgid_is_fatal() {
        let xml = r#"<map width="1" height="1" tilewidth="1" tileheight="1">
  <tileset source="a.tsx"/>
</map>"#;
        let err = TiledMap::parse_str(xml, Path::new(""), &FsLoader).unwrap_err();
        assert!(matches!(err, MapError::MissingAttribute { ref attribute, .. } if attribute == "firstgid"));
    }
}
