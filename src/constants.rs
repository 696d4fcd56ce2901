//! Centralized tuning constants for the realm simulation core.
//!
//! Per-module tables (enemy templates, skill catalog, shop stock) stay in
//! their respective modules as the single source of truth.

// =====================================================
// Grid
// =====================================================

/// Edge length of one tile in world pixels
pub const TILE_SIZE: f32 = 32.0;

/// Default map width in tiles
pub const MAP_WIDTH: usize = 64;

/// Default map height in tiles
pub const MAP_HEIGHT: usize = 64;

/// Smallest map either axis may be configured to
pub const MIN_MAP_SIZE: usize = 24;

// =====================================================
// Overworld generation
// =====================================================

/// Fraction of the grid area the random walk must open up
pub const OVERWORLD_FLOOR_TARGET: f32 = 0.60;

/// Random-walk step budget, as a multiple of grid area
pub const OVERWORLD_STEP_BUDGET_FACTOR: usize = 100;

pub const TREE_CHANCE: f32 = 0.10;
pub const ROCK_OUTCROP_CHANCE: f32 = 0.03;

/// Independent special-entrance rolls (last success wins)
pub const TOWN_ENTRANCE_CHANCE: f32 = 0.15;
pub const DUNGEON_ENTRANCE_CHANCE: f32 = 0.35;
pub const MINE_ENTRANCE_CHANCE: f32 = 0.30;

/// Minimum tile distance between spawn and the special entrance
pub const ENTRANCE_MIN_DISTANCE: f32 = 12.0;
pub const ENTRANCE_RETRY_CAP: u32 = 200;

// =====================================================
// Cave generation
// =====================================================

pub const CAVE_FLOOR_CHANCE: f32 = 0.40;
pub const CAVE_SMOOTHING_PASSES: usize = 4;
/// A cell with at least this many solid neighbors becomes wall
pub const CAVE_WALL_THRESHOLD: usize = 5;
/// A cell with at most this many solid neighbors becomes floor
pub const CAVE_FLOOR_THRESHOLD: usize = 3;

pub const ORE_GOLD_CHANCE: f32 = 0.015;
pub const ORE_IRON_CHANCE: f32 = 0.05;
pub const ORE_ROCK_CHANCE: f32 = 0.06;
/// Gold only appears at this mine level or deeper
pub const GOLD_MIN_DEPTH: u32 = 3;

pub const FAR_POINT_SAMPLES: u32 = 300;

// =====================================================
// Dungeon generation
// =====================================================

pub const DUNGEON_MIN_ROOMS: usize = 8;
pub const DUNGEON_MAX_ROOMS: usize = 12;
pub const ROOM_MIN_SIZE: usize = 4;
pub const ROOM_MAX_SIZE: usize = 9;
pub const ROOM_ATTEMPTS: u32 = 50;
/// Empty tiles kept between any two rooms
pub const ROOM_BUFFER: usize = 2;

// =====================================================
// Scatter
// =====================================================

pub const CHEST_MIN: usize = 2;
pub const CHEST_MAX: usize = 4;
pub const CHEST_RETRY_CAP: u32 = 30;

// =====================================================
// Combat
// =====================================================

/// Per-level damage scaling: raw *= 1 + level * LEVEL_DAMAGE_SCALE
pub const LEVEL_DAMAGE_SCALE: f32 = 0.1;

/// Critical damage multiplier (1.5x)
pub const CRIT_DAMAGE_MULT: f32 = 1.5;

/// Ranged mode stretches the weapon reach and softens the hit
pub const RANGED_RANGE_MULT: f32 = 3.0;
pub const RANGED_DAMAGE_MULT: f32 = 0.8;
pub const RANGED_LINE_WIDTH: f32 = 16.0;

/// Seconds the attack animation stays up after a swing
pub const ATTACK_ANIM_SECS: f32 = 0.25;

pub const XP_PER_TARGET_LEVEL: u64 = 20;
pub const GOLD_PER_TARGET_LEVEL: u64 = 5;

/// Tool bonus against the matching harvest kind
pub const TOOL_MATCH_MULT: f32 = 3.0;
/// Harvesting with a weapon that is not a tool at all
pub const NO_TOOL_MULT: f32 = 0.5;

// =====================================================
// AI
// =====================================================

pub const WANDER_CHANCE: f32 = 0.02;
pub const WANDER_JITTER: f32 = 8.0;

/// Contact damage coefficients
pub const CONTACT_ATTACK_COEFF: f32 = 0.1;
pub const CONTACT_DEFENSE_COEFF: f32 = 0.05;
pub const BOSS_CONTACT_MULT: f32 = 1.5;
/// Seconds between two contact hits from the same enemy
pub const CONTACT_COOLDOWN: f32 = 0.5;

pub const COMPANION_FOLLOW_TILES: f32 = 1.5;
pub const COMPANION_REACH_TILES: f32 = 1.2;
pub const COMPANION_ATTACK_SECS: f32 = 1.0;

// =====================================================
// Update loop
// =====================================================

pub const PICKUP_RADIUS: f32 = 24.0;
pub const INTERACT_RADIUS: f32 = 48.0;

pub const WORLD_ENEMY_FLOOR: usize = 6;
pub const WORLD_SPAWN_CHANCE: f32 = 0.02;
/// Minimum tile distance between a maintenance spawn and the player
pub const WORLD_SPAWN_MIN_TILES: f32 = 8.0;
pub const SPAWN_RETRY_CAP: u32 = 50;

/// Initial dungeon/mine batch: BASE + PER_LEVEL * level
pub const DEPTH_ENEMY_BASE: usize = 4;
pub const DEPTH_ENEMY_PER_LEVEL: usize = 2;

/// Compact arenas when at least this share of slots is removed
pub const COMPACTION_RATIO: f32 = 0.25;
/// ...or unconditionally every this many ticks
pub const COMPACTION_INTERVAL: u64 = 120;

pub const HOTBAR_SLOTS: usize = 5;
