#![warn(missing_docs)]

//! Tiled TMX map decoder for Macroquad.
//!
//! Turns a TMX document into layers (nested groups included), decoded tile
//! cells with their flip flags, and tilesets that resolve global tile ids.

mod color;
mod data;
mod document;
mod error;
mod gid;
mod group;
mod image;
mod layer;
pub mod loader;
mod map;
mod object;
mod properties;
mod spatial;
mod tileset;

pub use color::parse_color;
pub use data::{decode_layer_data, decode_tiles, Encoding, Region};
pub use document::Element;
pub use error::MapError;
pub use gid::{decode_gid, TileId, TileRef, FLIP_D, FLIP_H, FLIP_V, GID_MASK};
pub use group::Group;
pub use image::Image;
pub use layer::{ImageLayer, Layer, LayerHeader, LayerKind, TileLayer};
pub use loader::{DocumentLoader, FsLoader};
pub use map::{Orientation, TiledMap};
pub use object::{MapObject, ObjectLayer, ObjectShape};
pub use properties::{Properties, PropertyValue};
pub use spatial::{ChunkCoord, TileGrid, CHUNK_SIZE};
pub use tileset::{AnimationFrame, Corner, Terrain, TileOffset, Tileset, TilesetTile, Tilesets};
