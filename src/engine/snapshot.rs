//! Read-only views handed to the presentation layer.

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};

use crate::abilities;
use crate::constants::HOTBAR_SLOTS;
use crate::player::Player;
use crate::world::{Location, TileGrid};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotbarSlot {
    pub skill_id: u32,
    pub name: String,
    /// Off cooldown at the snapshot's session time
    pub ready: bool,
}

/// Computed UI fields for one tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HudSnapshot {
    pub hp: f32,
    pub max_hp: f32,
    pub mp: f32,
    pub max_mp: f32,
    pub level: u32,
    pub xp: u64,
    pub xp_to_next: u64,
    pub gold: u64,
    pub location: String,
    pub hotbar: [Option<HotbarSlot>; HOTBAR_SLOTS],
    pub party_size: usize,
}

impl HudSnapshot {
    pub fn capture(player: &Player, location: &Location, party_size: usize, now: f64) -> Self {
        let hotbar = std::array::from_fn(|slot| {
            let skill_id = player.hotbar[slot]?;
            let skill = abilities::find(skill_id)?;
            let ready = player
                .skills
                .iter()
                .find(|s| s.skill_id == skill_id)
                .is_some_and(|s| s.ready_at(skill, now));
            Some(HotbarSlot {
                skill_id,
                name: skill.name.into(),
                ready,
            })
        });
        Self {
            hp: player.body.hp,
            max_hp: player.body.max_hp,
            mp: player.mp,
            max_mp: player.stats.max_mp,
            level: player.level,
            xp: player.xp,
            xp_to_next: player.xp_to_next,
            gold: player.gold,
            location: location.label(),
            hotbar,
            party_size,
        }
    }
}

/// Top-left of the visible area, centered on `focus` and clamped to the map
pub fn camera_offset(focus: Vec2, viewport: Vec2, grid: &TileGrid) -> Vec2 {
    let max = (grid.size_px() - viewport).max(Vec2::ZERO);
    (focus - viewport / 2.0).clamp(Vec2::ZERO, max)
}
