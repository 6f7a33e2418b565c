use std::path::Path;

use serde::{Deserialize, Serialize};

use trot_core::geom::Bounds;

/// Grid code for empty space.
pub const EMPTY_CODE: i32 = -1;

/// Atlas source offsets, indexed by terrain code. Codes without an entry are
/// empty space.
const ATLAS_OFFSETS: [(i32, (u32, u32)); 6] = [
    (0, (0, 0)),
    (1, (96, 0)),
    (2, (192, 0)),
    (5, (0, 96)),
    (6, (96, 96)),
    (7, (192, 96)),
];

/// Which sub-rectangle of the shared terrain atlas a tile draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TerrainVariant {
    code: u8,
}

impl TerrainVariant {
    /// Map a grid code to a variant. Unknown codes (and `-1`) are empty.
    pub fn from_code(code: i32) -> Option<Self> {
        if code == EMPTY_CODE {
            return None;
        }
        ATLAS_OFFSETS
            .iter()
            .any(|&(c, _)| c == code)
            .then_some(Self { code: code as u8 })
    }

    pub fn code(&self) -> u8 {
        self.code
    }

    /// Top-left corner of this variant's sub-rectangle in the atlas.
    pub fn atlas_offset(&self) -> (u32, u32) {
        ATLAS_OFFSETS
            .iter()
            .find(|&&(c, _)| c == i32::from(self.code))
            .map(|&(_, offset)| offset)
            .unwrap_or((0, 0))
    }
}

/// A solid, positioned piece of terrain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub bounds: Bounds,
    pub variant: TerrainVariant,
}

#[derive(Debug)]
pub enum MapError {
    Io(std::io::Error),
    MalformedMap { row: usize, reason: String },
}

impl std::fmt::Display for MapError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "failed to read map: {e}"),
            Self::MalformedMap { row, reason } => {
                write!(f, "malformed map at row {row}: {reason}")
            },
        }
    }
}

impl std::error::Error for MapError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::MalformedMap { .. } => None,
        }
    }
}

impl From<std::io::Error> for MapError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

/// Level terrain built from a grid of codes.
#[derive(Debug, Clone)]
pub struct TileMap {
    tile_size: f32,
    columns: usize,
    rows: usize,
    /// Tiles in row-major order.
    tiles: Vec<Tile>,
    /// Grid lookup (row * columns + col) into `tiles`.
    index: Vec<Option<usize>>,
}

impl TileMap {
    /// Build from rows of codes. Every row must have the same column count.
    pub fn from_grid(grid: &[Vec<i32>], tile_size: f32) -> Result<Self, MapError> {
        let Some(first) = grid.first() else {
            return Err(MapError::MalformedMap {
                row: 0,
                reason: "map has no rows".to_string(),
            });
        };
        let columns = first.len();
        if columns == 0 {
            return Err(MapError::MalformedMap {
                row: 0,
                reason: "map has no columns".to_string(),
            });
        }

        let rows = grid.len();
        let mut tiles = Vec::new();
        let mut index = vec![None; rows * columns];

        for (row, codes) in grid.iter().enumerate() {
            if codes.len() != columns {
                return Err(MapError::MalformedMap {
                    row,
                    reason: format!("expected {columns} columns, found {}", codes.len()),
                });
            }
            for (col, &code) in codes.iter().enumerate() {
                let Some(variant) = TerrainVariant::from_code(code) else {
                    continue;
                };
                index[row * columns + col] = Some(tiles.len());
                tiles.push(Tile {
                    bounds: Bounds::new(
                        col as f32 * tile_size,
                        row as f32 * tile_size,
                        tile_size,
                        tile_size,
                    ),
                    variant,
                });
            }
        }

        Ok(Self {
            tile_size,
            columns,
            rows,
            tiles,
            index,
        })
    }

    /// Parse the plain-text level format: one row per line, comma-separated
    /// integer codes.
    pub fn parse(text: &str, tile_size: f32) -> Result<Self, MapError> {
        let lines: Vec<&str> = text.trim_end().lines().collect();
        let mut grid = Vec::with_capacity(lines.len());
        for (row, line) in lines.iter().enumerate() {
            let codes = line
                .split(',')
                .enumerate()
                .map(|(col, token)| {
                    let token = token.trim();
                    token.parse::<i32>().map_err(|_| MapError::MalformedMap {
                        row,
                        reason: format!("column {col}: {token:?} is not an integer code"),
                    })
                })
                .collect::<Result<Vec<i32>, MapError>>()?;
            grid.push(codes);
        }
        Self::from_grid(&grid, tile_size)
    }

    /// Read and parse a map file.
    pub fn load(path: impl AsRef<Path>, tile_size: f32) -> Result<Self, MapError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let map = Self::parse(&text, tile_size)?;
        tracing::info!(
            path = %path.display(),
            tiles = map.tiles.len(),
            columns = map.columns,
            rows = map.rows,
            "Loaded tile map"
        );
        Ok(map)
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn map_width(&self) -> f32 {
        self.columns as f32 * self.tile_size
    }

    pub fn map_height(&self) -> f32 {
        self.rows as f32 * self.tile_size
    }

    pub fn tile_at(&self, col: i64, row: i64) -> Option<&Tile> {
        if col < 0 || row < 0 || col >= self.columns as i64 || row >= self.rows as i64 {
            return None;
        }
        self.index[row as usize * self.columns + col as usize].map(|i| &self.tiles[i])
    }

    /// Tiles whose box strictly intersects `bounds`, in row-major order.
    pub fn tiles_overlapping(&self, bounds: &Bounds) -> Vec<&Tile> {
        self.tile_indices_overlapping(bounds)
            .into_iter()
            .map(|i| &self.tiles[i])
            .collect()
    }

    /// Like [`TileMap::tiles_overlapping`] but yields indices into [`TileMap::tiles`].
    pub fn tile_indices_overlapping(&self, bounds: &Bounds) -> Vec<usize> {
        let min_col = (bounds.left() / self.tile_size).floor() as i64;
        let max_col = (bounds.right() / self.tile_size).ceil() as i64;
        let min_row = (bounds.top() / self.tile_size).floor() as i64;
        let max_row = (bounds.bottom() / self.tile_size).ceil() as i64;

        let mut found = Vec::new();
        for row in min_row.max(0)..max_row.min(self.rows as i64) {
            for col in min_col.max(0)..max_col.min(self.columns as i64) {
                if let Some(i) = self.index[row as usize * self.columns + col as usize]
                    && self.tiles[i].bounds.intersects(bounds)
                {
                    found.push(i);
                }
            }
        }
        found
    }
}
