mod index;

pub use index::{ChunkCoord, TileGrid, CHUNK_SIZE};
