use crate::document::Element;
use crate::error::MapError;
use crate::layer::{ImageLayer, Layer, LayerHeader, LayerKind, TileLayer};
use crate::object::ObjectLayer;
use std::path::Path;

/// A layer container: `<group>`, or the `<map>` itself at the root.
///
/// Children are owned once, in document order. The per-kind accessors
/// (`tile_layers`, `groups`, ...) filter that same list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Group {
    /// Attributes read from the container element.
    pub header: LayerHeader,
    layers: Vec<Layer>,
}

impl Group {
    /// Build a group from `e`, recursing into nested `<group>`s. Children
    /// that are not layers are skipped.
    pub fn compose(e: &Element, width: u32, height: u32, base_dir: &Path) -> Result<Self, MapError> {
        let header = LayerHeader::from_element(e)?;
        let mut layers = Vec::new();

        for (child, kind) in e
            .children
            .iter()
            .filter_map(|c| LayerKind::from_tag(&c.name).map(|k| (c, k)))
        {
            let layer = match kind {
                LayerKind::Tiles => Layer::Tiles(TileLayer::from_element(child, width, height)?),
                LayerKind::Objects => Layer::Objects(ObjectLayer::from_element(child)?),
                LayerKind::Image => Layer::Image(ImageLayer::from_element(child, base_dir)?),
                LayerKind::Group => Layer::Group(Group::compose(child, width, height, base_dir)?),
            };
            layers.push(layer);
        }

        Ok(Group { header, layers })
    }

    /// Direct children, in document order.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Direct tile-layer children.
    pub fn tile_layers(&self) -> impl Iterator<Item = &TileLayer> + '_ {
        self.layers.iter().filter_map(Layer::as_tiles)
    }

    /// Direct object-layer children.
    pub fn object_layers(&self) -> impl Iterator<Item = &ObjectLayer> + '_ {
        self.layers.iter().filter_map(Layer::as_objects)
    }

    /// Direct image-layer children.
    pub fn image_layers(&self) -> impl Iterator<Item = &ImageLayer> + '_ {
        self.layers.iter().filter_map(Layer::as_image)
    }

    /// Direct group children.
    pub fn groups(&self) -> impl Iterator<Item = &Group> + '_ {
        self.layers.iter().filter_map(Layer::as_group)
    }

    /// Every layer below this group, depth-first, each group before its
    /// children.
    pub fn walk(&self) -> Vec<&Layer> {
        let mut out = Vec::new();
        self.walk_into(&mut out);
        out
    }

    fn walk_into<'a>(&'a self, out: &mut Vec<&'a Layer>) {
        for layer in &self.layers {
            out.push(layer);
            if let Layer::Group(g) = layer {
                g.walk_into(out);
            }
        }
    }

    /// First layer named `name` anywhere below this group.
    pub fn find(&self, name: &str) -> Option<&Layer> {
        self.walk().into_iter().find(|l| l.name() == name)
    }
}
