//! Tile grid and location model.
//!
//! A location is one fixed-size grid of tiles. Cells start uninitialized
//! (`None`) and are filled by the generators; anything outside the grid or
//! still uninitialized reads as solid.

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};

use crate::constants::TILE_SIZE;

/// Terrain type of a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    OpenGround,
    Dirt,
    SolidWall,
    Mountain,
    Water,
    Crop,
    DungeonEntrance,
    MineEntrance,
    TownEntrance,
    StairsDown,
    PortalOut,
    ShopFloor,
}

impl TileKind {
    /// Passability implied by the terrain type alone
    pub fn default_passable(&self) -> bool {
        !matches!(self, Self::SolidWall | Self::Mountain | Self::Water)
    }

    /// Tiles that move the player to another location when stepped on
    pub fn is_transition(&self) -> bool {
        matches!(
            self,
            Self::DungeonEntrance
                | Self::MineEntrance
                | Self::TownEntrance
                | Self::StairsDown
                | Self::PortalOut
        )
    }
}

/// Optional per-tile payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileMeta {
    /// Deepest level reachable through this entrance
    Entrance { max_depth: u32 },
    /// Crop growth stage
    Growth { stage: u8 },
}

/// One grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub x: usize,
    pub y: usize,
    pub kind: TileKind,
    pub passable: bool,
    pub meta: Option<TileMeta>,
}

impl Tile {
    pub fn new(x: usize, y: usize, kind: TileKind) -> Self {
        Self {
            x,
            y,
            kind,
            passable: kind.default_passable(),
            meta: None,
        }
    }

    /// Forced-passable tile (corridors, spawn patch-fixes)
    pub fn carved(x: usize, y: usize, kind: TileKind) -> Self {
        Self {
            passable: true,
            ..Self::new(x, y, kind)
        }
    }

    pub fn with_meta(mut self, meta: TileMeta) -> Self {
        self.meta = Some(meta);
        self
    }
}

/// Integer tile coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TilePos {
    pub x: usize,
    pub y: usize,
}

impl TilePos {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Squared euclidean distance in tiles
    pub fn distance_sq(&self, other: TilePos) -> f32 {
        let dx = self.x as f32 - other.x as f32;
        let dy = self.y as f32 - other.y as f32;
        dx * dx + dy * dy
    }

    pub fn distance(&self, other: TilePos) -> f32 {
        self.distance_sq(other).sqrt()
    }

    /// World-space center of this tile
    pub fn center_px(&self) -> Vec2 {
        Vec2::new(
            (self.x as f32 + 0.5) * TILE_SIZE,
            (self.y as f32 + 0.5) * TILE_SIZE,
        )
    }

    /// Tile containing a world-space point (None when negative)
    pub fn from_px(p: Vec2) -> Option<TilePos> {
        if p.x < 0.0 || p.y < 0.0 || !p.x.is_finite() || !p.y.is_finite() {
            return None;
        }
        Some(TilePos::new(
            (p.x / TILE_SIZE) as usize,
            (p.y / TILE_SIZE) as usize,
        ))
    }
}

/// Fixed-size tile grid, row-major
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileGrid {
    pub width: usize,
    pub height: usize,
    cells: Vec<Option<Tile>>,
}

impl TileGrid {
    /// Grid with every cell uninitialized
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![None; width * height],
        }
    }

    /// Grid with every cell set to `kind`
    pub fn filled(width: usize, height: usize, kind: TileKind) -> Self {
        let mut grid = Self::new(width, height);
        for y in 0..height {
            for x in 0..width {
                grid.set(Tile::new(x, y, kind));
            }
        }
        grid
    }

    pub fn area(&self) -> usize {
        self.width * self.height
    }

    pub fn in_bounds(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    /// True for cells not on the outer ring
    pub fn is_interior(&self, x: usize, y: usize) -> bool {
        x > 0 && y > 0 && x + 1 < self.width && y + 1 < self.height
    }

    pub fn get(&self, x: usize, y: usize) -> Option<&Tile> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.cells[y * self.width + x].as_ref()
    }

    /// Store a tile at its own coordinate; out-of-range tiles are dropped
    pub fn set(&mut self, tile: Tile) {
        if tile.x < self.width && tile.y < self.height {
            self.cells[tile.y * self.width + tile.x] = Some(tile);
        }
    }

    /// Solid, out-of-bounds and uninitialized cells all block
    pub fn is_solid(&self, x: i64, y: i64) -> bool {
        if !self.in_bounds(x, y) {
            return true;
        }
        match self.get(x as usize, y as usize) {
            Some(tile) => !tile.passable,
            None => true,
        }
    }

    /// Solidity of the tile under a world-space point
    pub fn is_solid_px(&self, p: Vec2) -> bool {
        if p.x < 0.0 || p.y < 0.0 {
            return true;
        }
        self.is_solid(
            (p.x / TILE_SIZE).floor() as i64,
            (p.y / TILE_SIZE).floor() as i64,
        )
    }

    pub fn is_passable(&self, pos: TilePos) -> bool {
        !self.is_solid(pos.x as i64, pos.y as i64)
    }

    pub fn kind_at(&self, pos: TilePos) -> Option<TileKind> {
        self.get(pos.x, pos.y).map(|t| t.kind)
    }

    /// Number of passable cells
    pub fn passable_count(&self) -> usize {
        self.cells.iter().flatten().filter(|t| t.passable).count()
    }

    pub fn count_kind(&self, kind: TileKind) -> usize {
        self.cells.iter().flatten().filter(|t| t.kind == kind).count()
    }

    /// Positions of every tile of the given kind
    pub fn find_kind(&self, kind: TileKind) -> Vec<TilePos> {
        self.cells
            .iter()
            .flatten()
            .filter(|t| t.kind == kind)
            .map(|t| TilePos::new(t.x, t.y))
            .collect()
    }

    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.cells.iter().flatten()
    }

    /// Solid mask, true = blocks (uninitialized counts as solid)
    pub fn solid_mask(&self) -> Vec<bool> {
        self.cells
            .iter()
            .map(|c| c.map_or(true, |t| !t.passable))
            .collect()
    }

    /// World-space size of the whole grid
    pub fn size_px(&self) -> Vec2 {
        Vec2::new(
            self.width as f32 * TILE_SIZE,
            self.height as f32 * TILE_SIZE,
        )
    }
}

/// The active macro-area
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Location {
    Town,
    World { chunk_x: i32, chunk_y: i32 },
    Dungeon { level: u32, max_depth: u32, id: u64 },
    Mine { level: u32, max_depth: u32 },
}

impl Default for Location {
    fn default() -> Self {
        Self::World {
            chunk_x: 0,
            chunk_y: 0,
        }
    }
}

impl Location {
    /// Label shown by the presentation layer
    pub fn label(&self) -> String {
        match self {
            Self::Town => "Town".into(),
            Self::World { chunk_x, chunk_y } => format!("Wilds ({chunk_x}, {chunk_y})"),
            Self::Dungeon {
                level, max_depth, ..
            } => format!("Dungeon B{level}/{max_depth}"),
            Self::Mine { level, max_depth } => format!("Mine B{level}/{max_depth}"),
        }
    }

    pub fn is_world(&self) -> bool {
        matches!(self, Self::World { .. })
    }

    /// Depth level, 0 for surface locations
    pub fn depth(&self) -> u32 {
        match self {
            Self::Dungeon { level, .. } | Self::Mine { level, .. } => *level,
            Self::Town | Self::World { .. } => 0,
        }
    }

    /// True on the deepest level of a dungeon or mine
    pub fn is_bottom(&self) -> bool {
        match self {
            Self::Dungeon {
                level, max_depth, ..
            }
            | Self::Mine { level, max_depth } => level >= max_depth,
            Self::Town | Self::World { .. } => false,
        }
    }

    /// Next level down, if any
    pub fn descend(&self) -> Option<Location> {
        match *self {
            Self::Dungeon {
                level,
                max_depth,
                id,
            } if level < max_depth => Some(Self::Dungeon {
                level: level + 1,
                max_depth,
                id,
            }),
            Self::Mine { level, max_depth } if level < max_depth => Some(Self::Mine {
                level: level + 1,
                max_depth,
            }),
            _ => None,
        }
    }
}
