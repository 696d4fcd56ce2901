//! Ground drops and chests.
//!
//! Enemy kills roll a drop-rate check; a successful roll picks one entry from
//! a weighted loot table scaled by the enemy level. Chests roll the same table
//! two or three times with a depth bonus.

use bevy::math::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::combat::weapons;
use crate::entity::{ArenaEntity, Body, EntityId, IdGen};
use crate::player::inventory::{Item, Material, Potion};
use crate::world::TilePos;

const DROP_SIZE: f32 = 12.0;
const CHEST_SIZE: f32 = 24.0;

/// What lies on the ground
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DropPayload {
    Gold(u64),
    Item(Item),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DroppedItem {
    pub id: EntityId,
    pub body: Body,
    pub payload: DropPayload,
}

impl DroppedItem {
    pub fn spawn(ids: &mut IdGen, at: Vec2, payload: DropPayload) -> Self {
        Self {
            id: ids.next_id(),
            body: Body::centered(at, Vec2::splat(DROP_SIZE), 1.0, 0.0),
            payload,
        }
    }
}

impl ArenaEntity for DroppedItem {
    fn id(&self) -> EntityId {
        self.id
    }

    fn is_removed(&self) -> bool {
        self.body.removed
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chest {
    pub id: EntityId,
    pub body: Body,
    pub opened: bool,
}

impl Chest {
    pub fn at_tile(ids: &mut IdGen, tile: TilePos) -> Self {
        Self {
            id: ids.next_id(),
            body: Body::centered(tile.center_px(), Vec2::splat(CHEST_SIZE), 1.0, 0.0),
            opened: false,
        }
    }
}

impl ArenaEntity for Chest {
    fn id(&self) -> EntityId {
        self.id
    }

    fn is_removed(&self) -> bool {
        self.body.removed
    }
}

#[derive(Debug, Clone, Copy)]
enum LootCategory {
    Gold,
    Material,
    Potion,
    Weapon,
}

/// Loot table entry
#[derive(Debug, Clone, Copy)]
struct LootTableEntry {
    category: LootCategory,
    weight: f32,
}

fn build_loot_table(level: u32) -> Vec<LootTableEntry> {
    let mut table = vec![
        LootTableEntry {
            category: LootCategory::Gold,
            weight: 45.0,
        },
        LootTableEntry {
            category: LootCategory::Material,
            weight: 30.0,
        },
        LootTableEntry {
            category: LootCategory::Potion,
            weight: 20.0,
        },
    ];
    // weapons start showing up past the first few levels
    if level >= 3 {
        table.push(LootTableEntry {
            category: LootCategory::Weapon,
            weight: 5.0 + level as f32,
        });
    }
    table
}

/// One weighted pick from the loot table
pub fn roll_loot(level: u32, rng: &mut impl Rng) -> DropPayload {
    let table = build_loot_table(level);
    let total: f32 = table.iter().map(|e| e.weight).sum();
    let roll = rng.gen::<f32>() * total;

    let mut accumulated = 0.0;
    let mut category = LootCategory::Gold;
    for entry in &table {
        accumulated += entry.weight;
        if roll <= accumulated {
            category = entry.category;
            break;
        }
    }

    match category {
        LootCategory::Gold => DropPayload::Gold(rng.gen_range(3..=8) * level.max(1) as u64),
        LootCategory::Material => {
            let material = match rng.gen_range(0..4) {
                0 => Material::Hide,
                1 => Material::Wood,
                2 => Material::Stone,
                _ => Material::IronOre,
            };
            DropPayload::Item(Item::material(material))
        }
        LootCategory::Potion => {
            let potion = if rng.gen_bool(0.6) {
                Potion::Health
            } else {
                Potion::Mana
            };
            DropPayload::Item(Item::potion(potion))
        }
        LootCategory::Weapon => {
            let stats = match rng.gen_range(0..3) {
                0 => weapons::iron_spear(),
                1 => weapons::war_hammer(),
                _ => weapons::woodcutter_axe(),
            };
            DropPayload::Item(Item::weapon(stats))
        }
    }
}

/// Drop-rate check for a kill; None when nothing drops
pub fn roll_drop(drop_rate: f32, level: u32, rng: &mut impl Rng) -> Option<DropPayload> {
    if rng.gen::<f32>() < drop_rate {
        Some(roll_loot(level, rng))
    } else {
        None
    }
}

/// Contents of a freshly opened chest
pub fn chest_loot(depth: u32, rng: &mut impl Rng) -> Vec<DropPayload> {
    let rolls = rng.gen_range(2..=3);
    (0..rolls).map(|_| roll_loot(depth + 2, rng)).collect()
}
