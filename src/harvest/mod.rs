//! Resource nodes and harvesting.
//!
//! Harvesting uses a plain distance check against the weapon's reach (no hit
//! shape). The matching tool category triples the damage; hitting a node with
//! something that is not a tool at all halves it.

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};

use crate::combat::hitbox::within_range;
use crate::combat::weapons::{ToolCategory, WeaponStats};
use crate::constants::{NO_TOOL_MULT, TILE_SIZE, TOOL_MATCH_MULT};
use crate::entity::{Arena, ArenaEntity, Body, EntityId, IdGen};
use crate::player::inventory::{Item, Material};
use crate::world::TilePos;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HarvestKind {
    Tree,
    Rock,
    IronOre,
    GoldOre,
}

impl HarvestKind {
    pub fn preferred_tool(&self) -> ToolCategory {
        match self {
            Self::Tree => ToolCategory::Axe,
            Self::Rock | Self::IronOre | Self::GoldOre => ToolCategory::Pickaxe,
        }
    }

    pub fn material(&self) -> Material {
        match self {
            Self::Tree => Material::Wood,
            Self::Rock => Material::Stone,
            Self::IronOre => Material::IronOre,
            Self::GoldOre => Material::GoldOre,
        }
    }

    /// (hp, tier)
    fn durability(&self) -> (f32, u32) {
        match self {
            Self::Tree => (30.0, 1),
            Self::Rock => (40.0, 1),
            Self::IronOre => (60.0, 2),
            Self::GoldOre => (90.0, 3),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceNode {
    pub id: EntityId,
    pub body: Body,
    pub kind: HarvestKind,
    pub tier: u32,
}

impl ResourceNode {
    pub fn at_tile(ids: &mut IdGen, kind: HarvestKind, tile: TilePos) -> Self {
        let (hp, tier) = kind.durability();
        Self {
            id: ids.next_id(),
            body: Body::centered(tile.center_px(), Vec2::splat(TILE_SIZE - 4.0), hp, 0.0),
            kind,
            tier,
        }
    }

    /// Materials dropped when depleted
    pub fn drops(&self) -> Vec<Item> {
        (0..self.tier).map(|_| Item::material(self.kind.material())).collect()
    }
}

impl ArenaEntity for ResourceNode {
    fn id(&self) -> EntityId {
        self.id
    }

    fn is_removed(&self) -> bool {
        self.body.removed
    }
}

/// Damage multiplier for a tool against a harvest kind
pub fn tool_multiplier(tool: ToolCategory, kind: HarvestKind) -> f32 {
    if tool == ToolCategory::None {
        NO_TOOL_MULT
    } else if tool == kind.preferred_tool() {
        TOOL_MATCH_MULT
    } else {
        1.0
    }
}

/// `max(1, (mining power or weapon damage) * tool multiplier)`
pub fn harvest_damage(weapon: &WeaponStats, kind: HarvestKind) -> f32 {
    let power = weapon.mining_power.unwrap_or_else(|| weapon.damage_sum());
    (power * tool_multiplier(weapon.tool, kind)).max(1.0)
}

#[derive(Debug, Clone, PartialEq)]
pub struct HarvestHit {
    pub node: EntityId,
    pub at: Vec2,
    pub damage: f32,
    pub depleted: bool,
    pub drops: Vec<Item>,
}

/// Hit the nearest live node within the weapon's reach of `origin`
pub fn harvest_nearest(
    origin: Vec2,
    weapon: &WeaponStats,
    nodes: &mut Arena<ResourceNode>,
) -> Option<HarvestHit> {
    let reach = weapon.range_px();
    let node = nodes
        .iter_mut()
        .filter(|n| n.body.is_alive() && within_range(origin, n.body.center(), reach))
        .min_by(|a, b| {
            let da = origin.distance_squared(a.body.center());
            let db = origin.distance_squared(b.body.center());
            da.total_cmp(&db)
        })?;

    let damage = harvest_damage(weapon, node.kind);
    let depleted = node.body.take_damage(damage);
    let drops = if depleted {
        node.body.removed = true;
        node.drops()
    } else {
        Vec::new()
    };
    Some(HarvestHit {
        node: node.id,
        at: node.body.center(),
        damage,
        depleted,
        drops,
    })
}
