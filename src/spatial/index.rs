use crate::gid::TileRef;
use std::collections::HashMap;

/// Side length, in cells, of one storage bucket.
pub const CHUNK_SIZE: i32 = 16;

/// Bucket coordinate of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoord {
    /// Bucket column.
    pub x: i32,
    /// Bucket row.
    pub y: i32,
}

/// Bucket holding cell `(x, y)`.
#[inline]
pub fn cell_to_chunk(x: i32, y: i32) -> ChunkCoord {
    ChunkCoord {
        x: x.div_euclid(CHUNK_SIZE),
        y: y.div_euclid(CHUNK_SIZE),
    }
}

/// Index of a cell inside its bucket.
#[inline]
pub fn rel(x: i32, y: i32) -> usize {
    (y.rem_euclid(CHUNK_SIZE) * CHUNK_SIZE + x.rem_euclid(CHUNK_SIZE)) as usize
}

/// Sparse cell storage for one tile layer.
///
/// Cells are bucketed into `CHUNK_SIZE`² blocks so finite and infinite
/// layers share one representation and lookups stay O(1) however the
/// source chunks were laid out.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TileGrid {
    buckets: HashMap<ChunkCoord, Box<[Option<TileRef>]>>,
    len: usize,
}

impl TileGrid {
    /// An empty grid.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a decoded cell, replacing whatever was at its coordinate.
    pub fn insert(&mut self, tile: TileRef) {
        let cc = cell_to_chunk(tile.x, tile.y);
        let bucket = self
            .buckets
            .entry(cc)
            .or_insert_with(|| vec![None; (CHUNK_SIZE * CHUNK_SIZE) as usize].into_boxed_slice());
        let slot = &mut bucket[rel(tile.x, tile.y)];
        if slot.is_none() {
            self.len += 1;
        }
        *slot = Some(tile);
    }

    /// The cell at `(x, y)`, if one was decoded there.
    pub fn get(&self, x: i32, y: i32) -> Option<TileRef> {
        self.buckets
            .get(&cell_to_chunk(x, y))
            .and_then(|b| b[rel(x, y)])
    }

    /// Number of decoded cells, empty (gid 0) cells included.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether no cell was decoded.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// All decoded cells, bucket by bucket; no particular global order.
    pub fn iter(&self) -> impl Iterator<Item = &TileRef> + '_ {
        self.buckets.values().flat_map(|b| b.iter().flatten())
    }

    /// Cells holding an actual tile.
    pub fn occupied(&self) -> impl Iterator<Item = &TileRef> + '_ {
        self.iter().filter(|t| !t.is_empty())
    }

    /// Inclusive `(min_x, min_y, max_x, max_y)` over decoded cells.
    pub fn bounds(&self) -> Option<(i32, i32, i32, i32)> {
        self.iter().fold(None, |acc, t| {
            Some(match acc {
                None => (t.x, t.y, t.x, t.y),
                Some((x0, y0, x1, y1)) => (x0.min(t.x), y0.min(t.y), x1.max(t.x), y1.max(t.y)),
            })
        })
    }
}

impl Extend<TileRef> for TileGrid {
    fn extend<I: IntoIterator<Item = TileRef>>(&mut self, iter: I) {
        for t in iter {
            self.insert(t);
        }
    }
}

impl FromIterator<TileRef> for TileGrid {
    fn from_iter<I: IntoIterator<Item = TileRef>>(iter: I) -> Self {
        let mut grid = TileGrid::new();
        grid.extend(iter);
        grid
    }
}
