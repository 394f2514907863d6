//! Tile data decoding: `<data>` blocks in csv, base64 or inline `<tile>`
//! form, whole-layer or chunked.

use crate::document::Element;
use crate::error::MapError;
use crate::gid::TileRef;
use crate::spatial::TileGrid;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

/// `<data encoding="...">`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// No encoding attribute: one `<tile gid=".."/>` element per cell.
    Xml,
    /// Comma-separated ids.
    Csv,
    /// Little-endian u32 per cell. Compressed payloads are rejected.
    Base64,
}

impl Encoding {
    /// Map the raw `encoding` attribute; absent means inline `<tile>` elements.
    pub fn from_attr(raw: Option<&str>) -> Result<Self, MapError> {
        match raw {
            None => Ok(Encoding::Xml),
            Some("csv") => Ok(Encoding::Csv),
            Some("base64") => Ok(Encoding::Base64),
            Some(other) => Err(MapError::UnknownEncoding(other.to_owned())),
        }
    }
}

/// The rectangle of cells a data block covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    /// Column of the first cell.
    pub x: i32,
    /// Row of the first cell.
    pub y: i32,
    /// Cells per row.
    pub width: u32,
    /// Number of rows.
    pub height: u32,
}

impl Region {
    /// A `width` x `height` block whose first cell sits at `(x, y)`.
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Region {
            x,
            y,
            width,
            height,
        }
    }

    /// Number of cells the block covers.
    pub fn cells(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Coordinate of the `k`-th cell in row-major order, `None` when it
    /// falls outside the `i32` range.
    #[inline]
    fn cell(&self, k: usize) -> Option<(i32, i32)> {
        let w = self.width as usize;
        let dx = i32::try_from(k % w).ok()?;
        let dy = i32::try_from(k / w).ok()?;
        Some((self.x.checked_add(dx)?, self.y.checked_add(dy)?))
    }
}

/// Decode one data block (`<data>` or `<chunk>`) into row-major cells.
///
/// `encoding` is the raw value of the `encoding` attribute. csv and inline
/// blocks must hold exactly `region.cells()` values; base64 blocks must hold
/// at least that many, and trailing cells are ignored.
pub fn decode_tiles(
    encoding: Option<&str>,
    block: &Element,
    region: Region,
) -> Result<Vec<TileRef>, MapError> {
    let raw = match Encoding::from_attr(encoding)? {
        Encoding::Base64 => {
            let mut cells = base64_cells(block.text())?;
            if cells.len() > region.cells() {
                log::debug!(
                    "Ignoring {} trailing base64 cells",
                    cells.len() - region.cells()
                );
                cells.truncate(region.cells());
            }
            cells
        }
        Encoding::Csv => csv_cells(block.text())?,
        Encoding::Xml => block
            .children_named("tile")
            .map(|t| t.attr_or::<u32>("gid", 0))
            .collect::<Result<Vec<_>, _>>()?,
    };

    if raw.len() != region.cells() {
        return Err(MapError::InvalidLayerSize {
            layer: String::new(),
            expected: region.cells(),
            found: raw.len(),
        });
    }

    raw.into_iter()
        .enumerate()
        .map(|(k, v)| {
            let (x, y) = region.cell(k).ok_or_else(|| {
                MapError::InvalidTileData(format!(
                    "cell {} of the block at ({}, {}) is out of coordinate range",
                    k, region.x, region.y
                ))
            })?;
            Ok(TileRef::new(v, x, y))
        })
        .collect()
}

fn base64_cells(text: &str) -> Result<Vec<u32>, MapError> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD.decode(compact.as_bytes())?;
    if bytes.len() % 4 != 0 {
        return Err(MapError::InvalidTileData(format!(
            "{} base64 bytes is not a whole number of cells",
            bytes.len()
        )));
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect())
}

fn csv_cells(text: &str) -> Result<Vec<u32>, MapError> {
    text.split([',', '\n'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u32>()
                .map_err(|_| MapError::InvalidTileData(s.to_owned()))
        })
        .collect()
}

/// Decode a layer's `<data>` element, whole-rectangle or chunked, into one
/// addressable grid.
pub fn decode_layer_data(
    data: &Element,
    width: u32,
    height: u32,
    layer: &str,
) -> Result<TileGrid, MapError> {
    let encoding = data.attr("encoding");
    if let Some(compression) = data.attr("compression") {
        return Err(MapError::UnsupportedCompression(compression.to_owned()));
    }
    let named = |e: MapError| match e {
        MapError::InvalidLayerSize {
            expected, found, ..
        } => MapError::InvalidLayerSize {
            layer: layer.to_owned(),
            expected,
            found,
        },
        other => other,
    };

    let mut grid = TileGrid::new();
    let mut chunks = data.children_named("chunk").peekable();
    if chunks.peek().is_none() {
        let tiles = decode_tiles(encoding, data, Region::new(0, 0, width, height)).map_err(named)?;
        grid.extend(tiles);
        return Ok(grid);
    }

    for chunk in chunks {
        let region = Region::new(
            chunk.required_attr("x")?,
            chunk.required_attr("y")?,
            chunk.required_attr("width")?,
            chunk.required_attr("height")?,
        );
        log::trace!(
            "Layer '{}': chunk {}x{} at ({}, {})",
            layer,
            region.width,
            region.height,
            region.x,
            region.y
        );
        grid.extend(decode_tiles(encoding, chunk, region).map_err(named)?);
    }
    Ok(grid)
}
