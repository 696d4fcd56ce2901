//! Procedural location generation.
//!
//! Four modes (overworld, cave, dungeon, town) each turn a seeded RNG into a
//! tile grid, a spawn point, an optional boss spawn and the seed entities for
//! the location. Every retry loop is bounded; the only failure surfaced to the
//! caller is a dungeon in which no room could be placed.

pub mod cave;
pub mod dungeon;
pub mod overworld;
pub mod town;

use rand::Rng;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Sha3_256};

use crate::constants::{CHEST_MAX, CHEST_MIN, CHEST_RETRY_CAP, MIN_MAP_SIZE};
use crate::entity::IdGen;
use crate::harvest::ResourceNode;
use crate::logging::TimingSpan;
use crate::loot::Chest;
use crate::npc::Npc;
use crate::world::{Location, TileGrid, TilePos};

/// Session seed, the root of all procedural generation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldSeed {
    pub seed: u64,
}

impl Default for WorldSeed {
    fn default() -> Self {
        Self { seed: 42 }
    }
}

impl WorldSeed {
    /// Deterministic hash of the seed and a location's identity
    pub fn location_hash(&self, location: &Location) -> u64 {
        let mut hasher = Sha3_256::new();
        hasher.update(self.seed.to_le_bytes());
        match *location {
            Location::Town => hasher.update([0u8]),
            Location::World { chunk_x, chunk_y } => {
                hasher.update([1u8]);
                hasher.update(chunk_x.to_le_bytes());
                hasher.update(chunk_y.to_le_bytes());
            }
            Location::Dungeon {
                level,
                max_depth,
                id,
            } => {
                hasher.update([2u8]);
                hasher.update(level.to_le_bytes());
                hasher.update(max_depth.to_le_bytes());
                hasher.update(id.to_le_bytes());
            }
            Location::Mine { level, max_depth } => {
                hasher.update([3u8]);
                hasher.update(level.to_le_bytes());
                hasher.update(max_depth.to_le_bytes());
            }
        }
        let result = hasher.finalize();
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&result[0..8]);
        u64::from_le_bytes(bytes)
    }

    /// Seeded RNG for one location
    pub fn rng_for(&self, location: &Location) -> Xoshiro256PlusPlus {
        Xoshiro256PlusPlus::seed_from_u64(self.location_hash(location))
    }
}

/// Grid dimensions for a generation pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapParams {
    pub width: usize,
    pub height: usize,
}

impl MapParams {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> TilePos {
        TilePos::new(self.width / 2, self.height / 2)
    }

    pub fn area(&self) -> usize {
        self.width * self.height
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("No dungeon room could be placed after {attempts} attempts")]
    NoRoomsPlaced { attempts: u32 },
    #[error("Map size {width}x{height} is too small")]
    InvalidMapSize { width: usize, height: usize },
}

/// Output of one generation pass, before enemies are populated
#[derive(Debug, Clone)]
pub struct GeneratedLocation {
    pub location: Location,
    pub grid: TileGrid,
    pub spawn: TilePos,
    pub boss_spawn: Option<TilePos>,
    pub chests: Vec<Chest>,
    pub npcs: Vec<Npc>,
    pub resources: Vec<ResourceNode>,
}

/// Generate any location kind
pub fn generate(
    location: Location,
    params: MapParams,
    ids: &mut IdGen,
    rng: &mut impl Rng,
) -> Result<GeneratedLocation, GenerationError> {
    if params.width < MIN_MAP_SIZE || params.height < MIN_MAP_SIZE {
        return Err(GenerationError::InvalidMapSize {
            width: params.width,
            height: params.height,
        });
    }
    let _timing = TimingSpan::new("generate_location");

    let mut generated = match location {
        Location::World { .. } => overworld::generate(location, params, ids, rng),
        Location::Mine { .. } => cave::generate(location, params, ids, rng),
        Location::Dungeon { .. } => {
            let rooms = dungeon::room_target(rng);
            dungeon::generate(location, params, rng, rooms)?
        }
        Location::Town => town::generate(location, params, ids, rng),
    };
    generated.chests = scatter_chests(&generated.grid, generated.spawn, ids, rng);

    tracing::info!(
        location = %location.label(),
        floor = generated.grid.passable_count(),
        chests = generated.chests.len(),
        resources = generated.resources.len(),
        npcs = generated.npcs.len(),
        boss = generated.boss_spawn.is_some(),
        "Location generated"
    );
    Ok(generated)
}

/// Random non-solid interior cell, bounded by `attempts`
pub fn random_open_cell(grid: &TileGrid, attempts: u32, rng: &mut impl Rng) -> Option<TilePos> {
    if grid.width < 3 || grid.height < 3 {
        return None;
    }
    for _ in 0..attempts {
        let pos = TilePos::new(
            rng.gen_range(1..grid.width - 1),
            rng.gen_range(1..grid.height - 1),
        );
        if grid.is_passable(pos) {
            return Some(pos);
        }
    }
    None
}

/// 2-4 chests on open, non-transition cells away from the spawn tile
pub fn scatter_chests(
    grid: &TileGrid,
    spawn: TilePos,
    ids: &mut IdGen,
    rng: &mut impl Rng,
) -> Vec<Chest> {
    let count = rng.gen_range(CHEST_MIN..=CHEST_MAX);
    let mut taken: Vec<TilePos> = Vec::with_capacity(count);
    for _ in 0..count {
        let mut placed = false;
        for _ in 0..CHEST_RETRY_CAP {
            let Some(pos) = random_open_cell(grid, 1, rng) else {
                continue;
            };
            let on_transition = grid.kind_at(pos).is_some_and(|k| k.is_transition());
            if pos != spawn && !on_transition && !taken.contains(&pos) {
                taken.push(pos);
                placed = true;
                break;
            }
        }
        if !placed {
            tracing::warn!("Chest placement retries exhausted, skipping one chest");
        }
    }
    taken.into_iter().map(|pos| Chest::at_tile(ids, pos)).collect()
}
