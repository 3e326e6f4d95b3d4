//! Tile-map level records
//!
//! A level is a fixed-size three-dimensional grid of tile identifiers
//! (sectors x rows x columns) followed by the list of spawn slots placed in
//! it. The grid dimensions are compile-time constants, so the grid needs no
//! length prefix on the wire; the parser checks the remaining stream length
//! against the full grid size before reading a single tile.

use crate::pff::error::{Category, PffError, Result};
use crate::pff::reader::SliceReader;

/// Number of sectors per level
pub const NUM_SECTORS: usize = 4;

/// Rows per sector
pub const SECTOR_MAX_Y: usize = 120;

/// Columns per sector
pub const SECTOR_MAX_X: usize = 120;

/// Total tile count of one level grid
pub const GRID_TILES: usize = NUM_SECTORS * SECTOR_MAX_Y * SECTOR_MAX_X;

/// Index into the sprite/tile atlas consumed by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TileId(pub u8);

/// One tile-map level: the full grid plus its spawn placements
///
/// `spawn_indices` reference entries in the archive-wide spawn table; every
/// index is validated against the archive's spawn count at parse time, so a
/// loaded level can never dangle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelRecord {
    /// Tile grid in `[sector][row][column]` order, exactly [`GRID_TILES`] long
    pub tiles: Vec<TileId>,

    /// Spawn-table indices populated in this level
    pub spawn_indices: Vec<u16>,
}

impl LevelRecord {
    /// Create a level with an all-zero tile grid and no spawns
    pub fn empty() -> Self {
        Self {
            tiles: vec![TileId(0); GRID_TILES],
            spawn_indices: Vec::new(),
        }
    }

    /// Number of populated spawn slots
    pub fn spawn_count(&self) -> u16 {
        self.spawn_indices.len() as u16
    }

    /// Tile at the given grid coordinate, or `None` when out of bounds
    pub fn tile(&self, sector: usize, row: usize, column: usize) -> Option<TileId> {
        self.tiles.get(Self::tile_index(sector, row, column)?).copied()
    }

    /// Overwrite the tile at the given grid coordinate
    ///
    /// Returns `false` when the coordinate is out of bounds.
    pub fn set_tile(&mut self, sector: usize, row: usize, column: usize, tile: TileId) -> bool {
        match Self::tile_index(sector, row, column) {
            Some(index) if index < self.tiles.len() => {
                self.tiles[index] = tile;
                true
            }
            _ => false,
        }
    }

    fn tile_index(sector: usize, row: usize, column: usize) -> Option<usize> {
        if sector >= NUM_SECTORS || row >= SECTOR_MAX_Y || column >= SECTOR_MAX_X {
            return None;
        }
        Some((sector * SECTOR_MAX_Y + row) * SECTOR_MAX_X + column)
    }

    /// Check grid size and spawn references against the archive spawn count
    pub fn validate(&self, level_index: usize, numspawns: u16) -> Result<()> {
        if self.tiles.len() != GRID_TILES {
            return Err(PffError::Corrupt {
                category: Category::Levels,
                offset: 0,
                reason: format!(
                    "level {level_index} grid has {} tiles, expected {GRID_TILES}",
                    self.tiles.len()
                ),
            });
        }
        if self.spawn_indices.len() > usize::from(u16::MAX) {
            return Err(PffError::TooManyRecords {
                category: Category::Levels,
                count: self.spawn_indices.len(),
                max: usize::from(u16::MAX),
            });
        }
        for &index in &self.spawn_indices {
            if index >= numspawns {
                return Err(PffError::SpawnIndexOutOfRange {
                    level: level_index,
                    index,
                    spawn_count: numspawns,
                });
            }
        }
        Ok(())
    }

    pub(crate) fn read(
        reader: &mut SliceReader<'_>,
        level_index: usize,
        numspawns: u16,
    ) -> Result<Self> {
        let grid = reader.take(GRID_TILES, Category::Levels)?;
        let tiles = grid.iter().map(|&byte| TileId(byte)).collect();

        let spawncount = reader.read_u16(Category::Levels)?;
        let mut spawn_indices = Vec::with_capacity(usize::from(spawncount));
        for _ in 0..spawncount {
            let index = reader.read_u16(Category::Levels)?;
            if index >= numspawns {
                return Err(PffError::SpawnIndexOutOfRange {
                    level: level_index,
                    index,
                    spawn_count: numspawns,
                });
            }
            spawn_indices.push(index);
        }

        Ok(Self {
            tiles,
            spawn_indices,
        })
    }

    pub(crate) fn write(&self, out: &mut Vec<u8>) {
        out.reserve(GRID_TILES + 2 + self.spawn_indices.len() * 2);
        out.extend(self.tiles.iter().map(|tile| tile.0));
        out.extend_from_slice(&self.spawn_count().to_le_bytes());
        for index in &self.spawn_indices {
            out.extend_from_slice(&index.to_le_bytes());
        }
    }
}
