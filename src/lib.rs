//! Realm - Simulation Core Library
//!
//! Deterministic simulation for a top-down action RPG:
//! - Seeded procedural generation (overworld, town, caves, dungeons)
//! - Tile grid with axis-separated collision
//! - Real-time combat (arc and line sweeps, crits, knockback)
//! - Enemy AI, companions and contact damage
//! - Skills, hotbar and mp gating
//! - Harvesting, crafting, shops and services
//! - Loot drops and chests
//! - Per-tick session pipeline with a bevy plugin on top
//! - JSON save snapshots

pub mod abilities;
pub mod combat;
pub mod constants;
pub mod economy;
pub mod engine;
pub mod entity;
pub mod generation;
pub mod harvest;
pub mod logging;
pub mod loot;
pub mod monster;
pub mod movement;
pub mod npc;
pub mod persistence;
pub mod player;
pub mod world;
