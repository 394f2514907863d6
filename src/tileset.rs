use crate::document::Element;
use crate::error::MapError;
use crate::gid::GID_MASK;
use crate::image::Image;
use crate::loader::DocumentLoader;
use crate::object::ObjectLayer;
use crate::properties::Properties;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Pixel offset applied when drawing this tileset's tiles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TileOffset {
    /// Horizontal offset in pixels.
    pub x: i32,
    /// Vertical offset in pixels.
    pub y: i32,
}

/// A terrain type from `<terraintypes>`.
#[derive(Debug, Clone, PartialEq)]
pub struct Terrain {
    /// Terrain name.
    pub name: String,
    /// Local id of the tile that represents this terrain, -1 for none.
    pub tile: i64,
    /// Custom properties.
    pub properties: Properties,
}

/// One frame of a tile animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationFrame {
    /// Local tile id within the same tileset.
    pub tile_id: u32,
    /// Frame length in milliseconds.
    pub duration_ms: u32,
}

/// Corner order used by [`TilesetTile::terrain`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum Corner {
    TopLeft = 0,
    TopRight = 1,
    BottomLeft = 2,
    BottomRight = 3,
}

/// Per-tile metadata from a tileset's `<tile>` entry.
#[derive(Debug, Clone, PartialEq)]
pub struct TilesetTile {
    /// Local id within the tileset.
    pub id: u32,
    /// Indices into the owning tileset's terrain list, in [`Corner`] order.
    pub terrain: [Option<usize>; 4],
    /// Weight used by the editor's random mode.
    pub probability: f32,
    /// `class`, or the legacy `type` attribute.
    pub class: String,
    /// The tile's own image, or the tileset image it shares.
    pub image: Option<Arc<Image>>,
    /// Collision shapes.
    pub object_groups: Vec<ObjectLayer>,
    /// Animation frames, empty for static tiles.
    pub animation: Vec<AnimationFrame>,
    /// Custom properties.
    pub properties: Properties,
}

impl TilesetTile {
    /// A tile with no metadata of its own.
    pub fn plain(id: u32, image: Option<Arc<Image>>) -> Self {
        TilesetTile {
            id,
            terrain: [None; 4],
            probability: 1.0,
            class: String::new(),
            image,
            object_groups: Vec::new(),
            animation: Vec::new(),
            properties: Properties::new(),
        }
    }

    /// Read a `<tile>` entry. Terrain indices are checked against `terrain_count`; tiles without their own image share `tileset_image`.
    pub fn from_element(
        e: &Element,
        terrain_count: usize,
        base_dir: &Path,
        tileset_image: Option<&Arc<Image>>,
    ) -> Result<Self, MapError> {
        let id: u32 = e.required_attr("id")?;
        let terrain = parse_terrain(e.attr("terrain").unwrap_or(",,,"), id, terrain_count)?;

        // `class` replaced `type` in Tiled 1.9
        let class = e
            .attr("class")
            .or_else(|| e.attr("type"))
            .unwrap_or_default()
            .to_owned();

        let image = match e.child("image") {
            Some(img) => Some(Arc::new(Image::from_element(img, base_dir)?)),
            None => tileset_image.cloned(),
        };

        let object_groups = e
            .children_named("objectgroup")
            .map(ObjectLayer::from_element)
            .collect::<Result<Vec<_>, _>>()?;

        let animation = match e.child("animation") {
            Some(anim) => anim
                .children_named("frame")
                .map(|f| {
                    Ok(AnimationFrame {
                        tile_id: f.required_attr("tileid")?,
                        duration_ms: f.required_attr("duration")?,
                    })
                })
                .collect::<Result<Vec<_>, MapError>>()?,
            None => Vec::new(),
        };

        Ok(TilesetTile {
            id,
            terrain,
            probability: e.attr_or("probability", 1.0)?,
            class,
            image,
            object_groups,
            animation,
            properties: Properties::from_parent(e)?,
        })
    }

    /// The terrain index at one corner.
    pub fn corner(&self, corner: Corner) -> Option<usize> {
        self.terrain[corner as usize]
    }

    /// Whether the tile has animation frames.
    pub fn is_animated(&self) -> bool {
        !self.animation.is_empty()
    }

    /// Sum of all frame durations.
    pub fn animation_length_ms(&self) -> u32 {
        self.animation.iter().map(|f| f.duration_ms).sum()
    }
}

/// Parse a `"tl,tr,bl,br"` terrain string. Each field is empty (no terrain)
/// or an index into the terrain list.
fn parse_terrain(raw: &str, tile: u32, terrain_count: usize) -> Result<[Option<usize>; 4], MapError> {
    let bad = || MapError::InvalidTerrain {
        tile,
        value: raw.to_owned(),
    };

    let mut corners = [None; 4];
    let mut n = 0;
    for field in raw.split(',') {
        if n == corners.len() {
            return Err(bad());
        }
        let field = field.trim();
        if !field.is_empty() {
            let idx: usize = field.parse().map_err(|_| bad())?;
            if idx >= terrain_count {
                return Err(bad());
            }
            corners[n] = Some(idx);
        }
        n += 1;
    }
    if n != corners.len() {
        return Err(bad());
    }
    Ok(corners)
}

/// A tileset as seen from a map: either parsed inline or pulled from an
/// external TSX/TSJ document, keeping the map's own `firstgid`.
#[derive(Debug, Clone, PartialEq)]
pub struct Tileset {
    /// First global id owned by this tileset.
    pub first_gid: u32,
    /// Resolved path of the external document, if this came from one.
    pub source: Option<PathBuf>,
    /// Tileset name.
    pub name: String,
    /// Tile width in pixels.
    pub tile_width: u32,
    /// Tile height in pixels.
    pub tile_height: u32,
    /// Pixels between tiles in the image.
    pub spacing: u32,
    /// Pixels around the image border.
    pub margin: u32,
    /// Tiles per image row.
    pub columns: u32,
    /// Number of tiles.
    pub tile_count: u32,
    /// Drawing offset.
    pub tile_offset: TileOffset,
    /// The tileset image, shared with its tiles.
    pub image: Option<Arc<Image>>,
    /// Terrain types, indexed by tile corners.
    pub terrains: Vec<Terrain>,
    /// Keyed by local tile id.
    pub tiles: BTreeMap<u32, TilesetTile>,
    /// Custom properties.
    pub properties: Properties,
}

impl Tileset {
    /// A `<tileset>` entry inside a map: `firstgid` is required, and a
    /// `source` attribute pulls the rest from an external document.
    pub fn from_map_element(
        e: &Element,
        base_dir: &Path,
        loader: &dyn DocumentLoader,
    ) -> Result<Self, MapError> {
        let first_gid: u32 = e.required_attr("firstgid")?;
        match e.attr("source") {
            Some(source) => Self::load_external(first_gid, &base_dir.join(source), loader),
            None => Self::from_element(e, base_dir),
        }
    }

    /// Load an external tileset document and wrap it with `first_gid`.
    pub fn load_external(
        first_gid: u32,
        path: &Path,
        loader: &dyn DocumentLoader,
    ) -> Result<Self, MapError> {
        log::debug!("Loading external tileset {} (firstgid {})", path.display(), first_gid);
        let root = loader.load(path)?;
        if root.name != "tileset" {
            return Err(MapError::InvalidMap(format!(
                "{} does not hold a <tileset> (found <{}>)",
                path.display(),
                root.name
            )));
        }
        let dir = path.parent().unwrap_or_else(|| Path::new(""));
        let external = Self::from_element(&root, dir)?;

        Ok(Tileset {
            first_gid,
            source: Some(path.to_path_buf()),
            ..external
        })
    }

    /// Parse a tileset whose fields are all present on `e`. `firstgid`
    /// is optional here since standalone documents never carry one.
    pub fn from_element(e: &Element, base_dir: &Path) -> Result<Self, MapError> {
        let first_gid = e.attr_or("firstgid", 0)?;
        let tile_count: u32 = e.required_attr("tilecount")?;

        let tile_offset = match e.child("tileoffset") {
            Some(o) => TileOffset {
                x: o.attr_or("x", 0)?,
                y: o.attr_or("y", 0)?,
            },
            None => TileOffset::default(),
        };

        let image = match e.child("image") {
            Some(img) => Some(Arc::new(Image::from_element(img, base_dir)?)),
            None => None,
        };

        let terrains = match e.child("terraintypes") {
            Some(types) => types
                .children_named("terrain")
                .map(|t| {
                    Ok(Terrain {
                        name: t.attr("name").unwrap_or_default().to_owned(),
                        tile: t.attr_or("tile", -1)?,
                        properties: Properties::from_parent(t)?,
                    })
                })
                .collect::<Result<Vec<_>, MapError>>()?,
            None => Vec::new(),
        };

        let mut tiles = BTreeMap::new();
        for t in e.children_named("tile") {
            let tile = TilesetTile::from_element(t, terrains.len(), base_dir, image.as_ref())?;
            tiles.insert(tile.id, tile);
        }
        if tiles.is_empty() {
            tiles = (0..tile_count)
                .map(|id| (id, TilesetTile::plain(id, image.clone())))
                .collect();
        }

        Ok(Tileset {
            first_gid,
            source: None,
            name: e.required_str("name")?.to_owned(),
            tile_width: e.required_attr("tilewidth")?,
            tile_height: e.required_attr("tileheight")?,
            spacing: e.attr_or("spacing", 0)?,
            margin: e.attr_or("margin", 0)?,
            columns: e.required_attr("columns")?,
            tile_count,
            tile_offset,
            image,
            terrains,
            tiles,
            properties: Properties::from_parent(e)?,
        })
    }

    /// Whether `gid` (flags ignored) falls in this tileset's id range.
    pub fn contains_gid(&self, gid: u32) -> bool {
        let gid = gid & GID_MASK;
        gid >= self.first_gid && gid - self.first_gid < self.tile_count
    }

    /// Metadata for a local tile id.
    pub fn tile(&self, local_id: u32) -> Option<&TilesetTile> {
        self.tiles.get(&local_id)
    }

    /// Terrain by index.
    pub fn terrain(&self, index: usize) -> Option<&Terrain> {
        self.terrains.get(index)
    }

    /// The terrains a tile's four corners refer to.
    pub fn corner_terrains(&self, tile: &TilesetTile) -> [Option<&Terrain>; 4] {
        tile.terrain.map(|c| c.and_then(|i| self.terrains.get(i)))
    }

    /// Source rectangle `(x, y, w, h)` of a tile in the tileset image.
    /// `None` for ids out of range or a rectangle past `u32::MAX`.
    pub fn tile_rect(&self, local_id: u32) -> Option<(u32, u32, u32, u32)> {
        if local_id >= self.tile_count || self.columns == 0 {
            return None;
        }
        let col = local_id % self.columns;
        let row = local_id / self.columns;
        let step_x = self.tile_width.checked_add(self.spacing)?;
        let step_y = self.tile_height.checked_add(self.spacing)?;
        let sx = col.checked_mul(step_x)?.checked_add(self.margin)?;
        let sy = row.checked_mul(step_y)?.checked_add(self.margin)?;
        Some((sx, sy, self.tile_width, self.tile_height))
    }
}

/// All tilesets of a map, ordered by `first_gid`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tilesets {
    sets: Vec<Tileset>,
}

impl Tilesets {
    /// Collect tilesets, sorting them by `first_gid`.
    pub fn new(mut sets: Vec<Tileset>) -> Self {
        sets.sort_by_key(|t| t.first_gid);
        Tilesets { sets }
    }

    /// Find the tileset owning `gid` and the tile's local id in it.
    ///
    /// Flip flags are ignored. Ids past the end of the best candidate's
    /// range, and id 0, are not owned by anything.
    pub fn resolve(&self, gid: u32) -> Option<(&Tileset, u32)> {
        let gid = gid & GID_MASK;
        if gid == 0 {
            return None;
        }
        let idx = self.sets.partition_point(|t| t.first_gid <= gid);
        let ts = self.sets.get(idx.checked_sub(1)?)?;
        let local = gid - ts.first_gid;
        (local < ts.tile_count).then_some((ts, local))
    }

    /// Metadata for `gid`, if its tileset has an entry for it.
    pub fn tile(&self, gid: u32) -> Option<(&Tileset, &TilesetTile)> {
        let (ts, local) = self.resolve(gid)?;
        Some((ts, ts.tile(local)?))
    }

    /// First tileset named `name`.
    pub fn by_name(&self, name: &str) -> Option<&Tileset> {
        self.sets.iter().find(|t| t.name == name)
    }

    /// Tileset by position in `first_gid` order.
    pub fn get(&self, index: usize) -> Option<&Tileset> {
        self.sets.get(index)
    }

    /// Tilesets in `first_gid` order.
    pub fn iter(&self) -> std::slice::Iter<'_, Tileset> {
        self.sets.iter()
    }

    /// Number of tilesets.
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    /// Whether the map has no tilesets.
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}

impl<'a> IntoIterator for &'a Tilesets {
    type Item = &'a Tileset;
    type IntoIter = std::slice::Iter<'a, Tileset>;

    fn into_iter(self) -> Self::IntoIter {
        self.sets.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::xml_loader::parse_xml;

    fn bare(first_gid: u32, tile_count: u32) -> Tileset {
        let e = Element::new("tileset")
            .with_attr("firstgid", first_gid)
            .with_attr("name", format!("ts{first_gid}"))
            .with_attr("tilewidth", 16)
            .with_attr("tileheight", 16)
            .with_attr("columns", 1)
            .with_attr("tilecount", tile_count);
        Tileset::from_element(&e, Path::new("")).unwrap()
    }

    #[test]
    fn resolves_gid_to_owning_tileset() {
        // Deliberately unsorted.
        let sets = Tilesets::new(vec![bare(120, 30), bare(1, 49), bare(50, 70)]);

        assert!(sets.resolve(0).is_none());
        let (ts, local) = sets.resolve(1).unwrap();
        assert_eq!((ts.first_gid, local), (1, 0));
        let (ts, local) = sets.resolve(49).unwrap();
        assert_eq!((ts.first_gid, local), (1, 48));
        let (ts, local) = sets.resolve(50).unwrap();
        assert_eq!((ts.first_gid, local), (50, 0));
        let (ts, local) = sets.resolve(149).unwrap();
        assert_eq!((ts.first_gid, local), (120, 29));
        assert!(sets.resolve(150).is_none());
        assert!(sets.resolve(200).is_none());
    }

    #[test]
    fn resolve_ignores_flip_flags_and_gaps() {
        let sets = Tilesets::new(vec![bare(1, 4), bare(10, 4)]);
        let (ts, local) = sets.resolve(0x8000_0000 | 11).unwrap();
        assert_eq!((ts.first_gid, local), (10, 1));
        // 5..=9 sits between the two ranges
        assert!(sets.resolve(7).is_none());
        assert!(Tilesets::default().resolve(1).is_none());
    }

    #[test]
    fn synthesized_tiles_are_keyed_by_local_id() {
        let ts = bare(100, 3);
        assert_eq!(ts.tiles.keys().copied().collect::<Vec<_>>(), vec![0, 1, 2]);
        let tile = ts.tile(2).unwrap();
        assert_eq!(tile.terrain, [None; 4]);
        assert_eq!(tile.probability, 1.0);

        let sets = Tilesets::new(vec![ts]);
        let (_, tile) = sets.tile(102).unwrap();
        assert_eq!(tile.id, 2);
    }

    #[test]
    fn terrain_corners_index_into_terrain_list() {
        assert_eq!(
            parse_terrain("0,,2,3", 7, 4).unwrap(),
            [Some(0), None, Some(2), Some(3)]
        );
        assert_eq!(parse_terrain(",,,", 7, 0).unwrap(), [None; 4]);
        assert!(matches!(
            parse_terrain("0,1,2,3,0", 7, 4),
            Err(MapError::InvalidTerrain { tile: 7, .. })
        ));
        assert!(parse_terrain("0,1,2", 7, 4).is_err());
        assert!(parse_terrain("0,1,2,4", 7, 4).is_err());
        assert!(parse_terrain("a,,,", 7, 4).is_err());
    }

    #[test]
    fn builds_inline_tileset_with_tile_metadata() {
        let xml = r#"<tileset firstgid="5" name="terrain" tilewidth="32" tileheight="16"
                spacing="2" margin="1" columns="4" tilecount="8">
  <tileoffset x="0" y="8"/>
  <image source="terrain.png" width="138" height="36"/>
  <terraintypes>
    <terrain name="grass" tile="0"/>
    <terrain name="sand" tile="1"/>
    <terrain name="water" tile="2"/>
    <terrain name="rock" tile="3"/>
  </terraintypes>
  <tile id="1" terrain="0,,2,3" probability="0.25" type="legacy">
    <properties><property name="solid" type="bool" value="true"/></properties>
  </tile>
  <tile id="3" class="door" type="ignored">
    <image source="door.png"/>
    <objectgroup draworder="index">
      <object id="1" x="2" y="2" width="4" height="4"/>
    </objectgroup>
    <animation>
      <frame tileid="3" duration="100"/>
      <frame tileid="4" duration="250"/>
    </animation>
  </tile>
  <properties><property name="biome" value="forest"/></properties>
</tileset>"#;
        let ts = Tileset::from_element(&parse_xml(xml).unwrap(), Path::new("assets")).unwrap();

        assert_eq!(ts.first_gid, 5);
        assert_eq!((ts.spacing, ts.margin, ts.columns, ts.tile_count), (2, 1, 4, 8));
        assert_eq!(ts.tile_offset, TileOffset { x: 0, y: 8 });
        assert_eq!(ts.terrains.len(), 4);
        assert_eq!(ts.properties.get_string("biome"), Some("forest"));
        // only explicit entries, nothing synthesized
        assert_eq!(ts.tiles.len(), 2);

        let t1 = ts.tile(1).unwrap();
        assert_eq!(t1.probability, 0.25);
        assert_eq!(t1.class, "legacy");
        assert_eq!(t1.corner(Corner::TopRight), None);
        let corners = ts.corner_terrains(t1);
        assert_eq!(corners[0].map(|t| t.name.as_str()), Some("grass"));
        assert_eq!(corners[2].map(|t| t.name.as_str()), Some("water"));
        assert_eq!(corners[3].map(|t| t.name.as_str()), Some("rock"));
        assert_eq!(t1.properties.get_bool("solid"), Some(true));
        assert!(Arc::ptr_eq(t1.image.as_ref().unwrap(), ts.image.as_ref().unwrap()));

        let t3 = ts.tile(3).unwrap();
        assert_eq!(t3.class, "door");
        assert_eq!(t3.image.as_ref().unwrap().source, Path::new("assets/door.png"));
        assert_eq!(t3.object_groups.len(), 1);
        assert_eq!(t3.object_groups[0].objects.len(), 1);
        assert_eq!(
            t3.animation,
            vec![
                AnimationFrame { tile_id: 3, duration_ms: 100 },
                AnimationFrame { tile_id: 4, duration_ms: 250 },
            ]
        );
        assert_eq!(t3.animation_length_ms(), 350);

        assert_eq!(ts.tile_rect(5), Some((1 + 34, 1 + 18, 32, 16)));
        assert_eq!(ts.tile_rect(8), None);
    }

    #[test]
    fn missing_required_fields_are_fatal() {
        let no_width = Element::new("tileset")
            .with_attr("name", "x")
            .with_attr("tileheight", 8)
            .with_attr("columns", 1)
            .with_attr("tilecount", 1);
        assert!(matches!(
            Tileset::from_element(&no_width, Path::new("")),
            Err(MapError::MissingAttribute { ref attribute, .. }) if attribute == "tilewidth"
        ));

        let frame_without_duration = parse_xml(
            r#"<tile id="0"><animation><frame tileid="0"/></animation></tile>"#,
        )
        .unwrap();
        assert!(TilesetTile::from_element(&frame_without_duration, 0, Path::new(""), None).is_err());

        let tile_without_id = Element::new("tile");
        assert!(TilesetTile::from_element(&tile_without_id, 0, Path::new(""), None).is_err());
    }
    #[test]
    fn tile_rect_past_u32_range_is_none() {
        let e = Element::new("tileset")
            .with_attr("name", "huge")
            .with_attr("tilewidth", 3_000_000_000u32)
            .with_attr("tileheight", 8)
            .with_attr("spacing", 2_000_000_000u32)
            .with_attr("columns", 2)
            .with_attr("tilecount", 2);
        let ts = Tileset::from_element(&e, Path::new("")).unwrap();
        assert_eq!(ts.tile_rect(0), None);

        let wide = Element::new("tileset")
            .with_attr("name", "wide")
            .with_attr("tilewidth", 3_000_000_000u32)
            .with_attr("tileheight", 8)
            .with_attr("margin", 2_000_000_000u32)
            .with_attr("columns", 2)
            .with_attr("tilecount", 2);
        let ts = Tileset::from_element(&wide, Path::new("")).unwrap();
        assert_eq!(
            ts.tile_rect(0),
            Some((2_000_000_000, 2_000_000_000, 3_000_000_000, 8))
        );
        assert_eq!(ts.tile_rect(1), None);
    }
}
