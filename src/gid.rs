/// Horizontal flip flag.
pub const FLIP_H: u32 = 0x8000_0000; // bit 31
/// Vertical flip flag.
pub const FLIP_V: u32 = 0x4000_0000; // bit 30
/// Diagonal flip flag.
pub const FLIP_D: u32 = 0x2000_0000; // bit 29
/// Mask for the tile id bits.
pub const GID_MASK: u32 = 0x1FFF_FFFF; // keep lower 29 bits

/// Raw 32-bit cell value as stored in tile data, flip flags included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileId(pub u32);

impl TileId {
    /// The value as stored.
    #[inline] pub fn raw(self) -> u32 { self.0 }
    /// The tile id without flip flags.
    #[inline] pub fn clean(self) -> u32 { self.0 & GID_MASK }
    /// Horizontal flip flag.
    #[inline] pub fn flip_h(self) -> bool { (self.0 & FLIP_H) != 0 }
    /// Vertical flip flag.
    #[inline] pub fn flip_v(self) -> bool { (self.0 & FLIP_V) != 0 }
    /// Diagonal flip flag.
    #[inline] pub fn flip_d(self) -> bool { (self.0 & FLIP_D) != 0 }
}

/// Split a raw cell value into `(gid, flip_h, flip_v, flip_d)`.
#[inline]
pub fn decode_gid(raw: u32) -> (u32, bool, bool, bool) {
    let id = TileId(raw);
    (id.clean(), id.flip_h(), id.flip_v(), id.flip_d())
}

/// One decoded cell of a tile layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileRef {
    /// Global tile id with the flip flags stripped; 0 is an empty cell.
    pub gid: u32,
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
    /// Flipped horizontally.
    pub flip_h: bool,
    /// Flipped vertically.
    pub flip_v: bool,
    /// Flipped along the anti-diagonal.
    pub flip_d: bool,
}

impl TileRef {
    /// Decode a raw cell value at `(x, y)`.
    pub fn new(raw: u32, x: i32, y: i32) -> Self {
        let (gid, flip_h, flip_v, flip_d) = decode_gid(raw);
        TileRef {
            gid,
            x,
            y,
            flip_h,
            flip_v,
            flip_d,
        }
    }

    /// Whether this cell holds no tile.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.gid == 0
    }
}
