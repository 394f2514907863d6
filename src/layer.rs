use crate::color::color_attr;
use crate::data::decode_layer_data;
use crate::document::Element;
use crate::error::MapError;
use crate::gid::TileRef;
use crate::group::Group;
use crate::image::Image;
use crate::object::ObjectLayer;
use crate::properties::Properties;
use crate::spatial::TileGrid;
use macroquad::color::Color;
use macroquad::math::{vec2, Vec2};
use std::path::Path;
use std::sync::Arc;

/// Attributes shared by every layer kind.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerHeader {
    /// Unique layer id, when the document carries one.
    pub id: Option<u32>,
    /// Layer name, empty if unset.
    pub name: String,
    /// Custom class, empty if unset.
    pub class: String,
    /// Opacity in `0.0..=1.0`.
    pub opacity: f32,
    /// Whether the layer is shown.
    pub visible: bool,
    /// Pixel offset.
    pub offset: Vec2,
    /// Parallax factor, 1.0 by default.
    pub parallax: Vec2,
    /// Custom properties.
    pub properties: Properties,
}

impl Default for LayerHeader {
    fn default() -> Self {
        LayerHeader {
            id: None,
            name: String::new(),
            class: String::new(),
            opacity: 1.0,
            visible: true,
            offset: Vec2::ZERO,
            parallax: Vec2::ONE,
            properties: Properties::new(),
        }
    }
}

impl LayerHeader {
    /// Read the shared attributes of any layer element.
    pub fn from_element(e: &Element) -> Result<Self, MapError> {
        Ok(LayerHeader {
            id: e.parse_attr("id")?,
            name: e.attr("name").unwrap_or_default().to_owned(),
            class: e.attr("class").unwrap_or_default().to_owned(),
            opacity: e.attr_or("opacity", 1.0)?,
            visible: e.bool_attr("visible", true)?,
            offset: vec2(e.attr_or("offsetx", 0.0)?, e.attr_or("offsety", 0.0)?),
            parallax: vec2(e.attr_or("parallaxx", 1.0)?, e.attr_or("parallaxy", 1.0)?),
            properties: Properties::from_parent(e)?,
        })
    }
}

/// A `<layer>` of tiles.
#[derive(Debug, Clone, PartialEq)]
pub struct TileLayer {
    /// Shared layer attributes.
    pub header: LayerHeader,
    /// Width in cells.
    pub width: u32,
    /// Height in cells.
    pub height: u32,
    /// Tint multiplied into the layer's tiles.
    pub tint: Option<Color>,
    /// Decoded cells.
    pub tiles: TileGrid,
}

impl TileLayer {
    /// `width`/`height` are the map's; the layer's own attributes win when
    /// present.
    pub fn from_element(e: &Element, width: u32, height: u32) -> Result<Self, MapError> {
        let header = LayerHeader::from_element(e)?;
        let width = e.attr_or("width", width)?;
        let height = e.attr_or("height", height)?;
        let data = e.required_child("data")?;
        let tiles = decode_layer_data(data, width, height, &header.name)?;

        Ok(TileLayer {
            header,
            width,
            height,
            tint: color_attr(e, "tint")?,
            tiles,
        })
    }

    /// The decoded cell at `(x, y)`, `None` outside the decoded area.
    pub fn tile_at(&self, x: i32, y: i32) -> Option<TileRef> {
        self.tiles.get(x, y)
    }
}

/// An `<imagelayer>`.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageLayer {
    /// Shared layer attributes.
    pub header: LayerHeader,
    /// The layer's image, if it has one.
    pub image: Option<Arc<Image>>,
    /// Repeat along the x axis.
    pub repeat_x: bool,
    /// Repeat along the y axis.
    pub repeat_y: bool,
}

impl ImageLayer {
    /// Read an `<imagelayer>`; the image path resolves against `base_dir`.
    pub fn from_element(e: &Element, base_dir: &Path) -> Result<Self, MapError> {
        let image = match e.child("image") {
            Some(img) => Some(Arc::new(Image::from_element(img, base_dir)?)),
            None => None,
        };
        Ok(ImageLayer {
            header: LayerHeader::from_element(e)?,
            image,
            repeat_x: e.bool_attr("repeatx", false)?,
            repeat_y: e.bool_attr("repeaty", false)?,
        })
    }
}

/// The element tags that become layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
    /// `<layer>`
    Tiles,
    /// `<objectgroup>`
    Objects,
    /// `<imagelayer>`
    Image,
    /// `<group>`
    Group,
}

impl LayerKind {
    /// The layer kind for an element tag, `None` for non-layer tags.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "layer" => Some(LayerKind::Tiles),
            "objectgroup" => Some(LayerKind::Objects),
            "imagelayer" => Some(LayerKind::Image),
            "group" => Some(LayerKind::Group),
            _ => None,
        }
    }
}

/// Any layer that can appear in a map or group.
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum Layer {
    Tiles(TileLayer),
    Objects(ObjectLayer),
    Image(ImageLayer),
    Group(Group),
}

impl Layer {
    /// Attributes shared by every kind.
    pub fn header(&self) -> &LayerHeader {
        match self {
            Layer::Tiles(l) => &l.header,
            Layer::Objects(l) => &l.header,
            Layer::Image(l) => &l.header,
            Layer::Group(l) => &l.header,
        }
    }

    /// Which variant this is.
    pub fn kind(&self) -> LayerKind {
        match self {
            Layer::Tiles(_) => LayerKind::Tiles,
            Layer::Objects(_) => LayerKind::Objects,
            Layer::Image(_) => LayerKind::Image,
            Layer::Group(_) => LayerKind::Group,
        }
    }

    /// Name of this layer.
    pub fn name(&self) -> &str {
        &self.header().name
    }

    /// Whether this layer is shown.
    pub fn visible(&self) -> bool {
        self.header().visible
    }

    /// Opacity of this layer.
    pub fn opacity(&self) -> f32 {
        self.header().opacity
    }

    /// Pixel offset of this layer.
    pub fn offset(&self) -> Vec2 {
        self.header().offset
    }

    /// Custom properties of this layer.
    pub fn properties(&self) -> &Properties {
        &self.header().properties
    }

    /// The tile layer, if this is one.
    pub fn as_tiles(&self) -> Option<&TileLayer> {
        match self {
            Layer::Tiles(l) => Some(l),
            _ => None,
        }
    }

    /// The object layer, if this is one.
    pub fn as_objects(&self) -> Option<&ObjectLayer> {
        match self {
            Layer::Objects(l) => Some(l),
            _ => None,
        }
    }

    /// The image layer, if this is one.
    pub fn as_image(&self) -> Option<&ImageLayer> {
        match self {
            Layer::Image(l) => Some(l),
            _ => None,
        }
    }

    /// The group, if this is one.
    pub fn as_group(&self) -> Option<&Group> {
        match self {
            Layer::Group(l) => Some(l),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::xml_loader::parse_xml;

    #[test]
    fn header_defaults() {
        let h = LayerHeader::from_element(&Element::new("layer")).unwrap();
        assert_eq!(h, LayerHeader::default());
    }

    #[test]
    fn tile_layer_with_attributes() {
        let xml = r##"<layer id="3" name="ground" opacity="0.5" visible="0" offsetx="4" offsety="-2.5"
                tint="#80ff0000" parallaxx="0.5">
  <data encoding="csv">1,2,0,3</data>
</layer>"##;
        let layer = TileLayer::from_element(&parse_xml(xml).unwrap(), 2, 2).unwrap();
        assert_eq!(layer.header.id, Some(3));
        assert_eq!(layer.header.name, "ground");
        assert_eq!(layer.header.opacity, 0.5);
        assert!(!layer.header.visible);
        assert_eq!(layer.header.offset, vec2(4.0, -2.5));
        assert_eq!(layer.header.parallax, vec2(0.5, 1.0));
        assert_eq!(layer.tint, Some(Color::from_rgba(255, 0, 0, 128)));

        assert_eq!(layer.tile_at(0, 0).map(|t| t.gid), Some(1));
        assert_eq!(layer.tile_at(1, 0).map(|t| t.gid), Some(2));
        assert_eq!(layer.tile_at(0, 1).map(|t| t.gid), Some(0));
        assert_eq!(layer.tile_at(1, 1).map(|t| t.gid), Some(3));
        assert_eq!(layer.tile_at(2, 0), None);
    }

    #[test]
    fn layer_size_attributes_override_map_size() {
        let e = Element::new("layer")
            .with_attr("width", 3)
            .with_attr("height", 1)
            .with_child(Element::new("data").with_attr("encoding", "csv").with_text("1,1,1"));
        let layer = TileLayer::from_element(&e, 10, 10).unwrap();
        assert_eq!((layer.width, layer.height), (3, 1));
        assert_eq!(layer.tiles.len(), 3);
    }

    #[test]
    fn tile_layer_without_data_is_an_error() {
        assert!(matches!(
            TileLayer::from_element(&Element::new("layer"), 1, 1),
            Err(MapError::MissingElement { .. })
        ));
    }

    #[test]
    fn image_layer() {
        let e = Element::new("imagelayer")
            .with_attr("name", "sky")
            .with_attr("repeatx", 1)
            .with_child(Element::new("image").with_attr("source", "sky.png"));
        let layer = ImageLayer::from_element(&e, Path::new("maps")).unwrap();
        assert_eq!(layer.header.name, "sky");
        assert!(layer.repeat_x && !layer.repeat_y);
        assert_eq!(layer.image.unwrap().source, Path::new("maps/sky.png"));
    }
}
