//! Weapon stat blocks and templates.
//!
//! A weapon defines its damage split, swing interval, reach and hit shape.
//! Tool weapons (pickaxe, axe) also harvest resource nodes.

use serde::{Deserialize, Serialize};

use crate::constants::TILE_SIZE;

/// Geometric pattern an attack sweeps
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum HitShape {
    /// Straight thrust; `width` is the full lateral extent in pixels
    Line { width: f32 },
    /// Swing; `angle` is the full angular width in radians
    Arc { angle: f32 },
}

/// What the weapon is good at harvesting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToolCategory {
    None,
    Pickaxe,
    Axe,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponStats {
    pub name: String,
    pub slash: f32,
    pub blunt: f32,
    pub pierce: f32,
    /// Seconds between swings
    pub attack_speed: f32,
    /// Reach in tiles
    pub range: f32,
    pub shape: HitShape,
    /// Push distance in pixels
    pub knockback: f32,
    /// Chance a swing connects (0-1)
    pub hit_rate: f32,
    /// Chance a connecting swing crits (0-1)
    pub crit_rate: f32,
    pub tool: ToolCategory,
    pub mining_power: Option<f32>,
}

impl WeaponStats {
    pub fn damage_sum(&self) -> f32 {
        self.slash + self.blunt + self.pierce
    }

    /// Reach in pixels
    pub fn range_px(&self) -> f32 {
        self.range * TILE_SIZE
    }
}

/// Bare hands, used when nothing is equipped
pub fn fists() -> WeaponStats {
    WeaponStats {
        name: "Fists".into(),
        slash: 0.0,
        blunt: 2.0,
        pierce: 0.0,
        attack_speed: 0.5,
        range: 1.0,
        shape: HitShape::Arc {
            angle: 60f32.to_radians(),
        },
        knockback: 2.0,
        hit_rate: 0.95,
        crit_rate: 0.02,
        tool: ToolCategory::None,
        mining_power: None,
    }
}

pub fn short_sword() -> WeaponStats {
    WeaponStats {
        name: "Short Sword".into(),
        slash: 8.0,
        blunt: 0.0,
        pierce: 2.0,
        attack_speed: 0.45,
        range: 1.5,
        shape: HitShape::Arc {
            angle: 90f32.to_radians(),
        },
        knockback: 6.0,
        hit_rate: 0.95,
        crit_rate: 0.05,
        tool: ToolCategory::None,
        mining_power: None,
    }
}

pub fn iron_spear() -> WeaponStats {
    WeaponStats {
        name: "Iron Spear".into(),
        slash: 0.0,
        blunt: 0.0,
        pierce: 12.0,
        attack_speed: 0.6,
        range: 2.0,
        shape: HitShape::Line { width: 24.0 },
        knockback: 10.0,
        hit_rate: 0.9,
        crit_rate: 0.08,
        tool: ToolCategory::None,
        mining_power: None,
    }
}

pub fn war_hammer() -> WeaponStats {
    WeaponStats {
        name: "War Hammer".into(),
        slash: 0.0,
        blunt: 18.0,
        pierce: 0.0,
        attack_speed: 0.9,
        range: 1.5,
        shape: HitShape::Arc {
            angle: 120f32.to_radians(),
        },
        knockback: 16.0,
        hit_rate: 0.85,
        crit_rate: 0.1,
        tool: ToolCategory::None,
        mining_power: None,
    }
}

pub fn pickaxe() -> WeaponStats {
    WeaponStats {
        name: "Pickaxe".into(),
        slash: 0.0,
        blunt: 3.0,
        pierce: 3.0,
        attack_speed: 0.6,
        range: 1.5,
        shape: HitShape::Line { width: 38.0 },
        knockback: 3.0,
        hit_rate: 0.9,
        crit_rate: 0.03,
        tool: ToolCategory::Pickaxe,
        mining_power: Some(6.0),
    }
}

pub fn woodcutter_axe() -> WeaponStats {
    WeaponStats {
        name: "Woodcutter Axe".into(),
        slash: 6.0,
        blunt: 1.0,
        pierce: 0.0,
        attack_speed: 0.6,
        range: 1.5,
        shape: HitShape::Arc {
            angle: 70f32.to_radians(),
        },
        knockback: 4.0,
        hit_rate: 0.9,
        crit_rate: 0.04,
        tool: ToolCategory::Axe,
        mining_power: Some(6.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_damage_sum() {
        let spear = iron_spear();
        assert!((spear.damage_sum() - 12.0).abs() < f32::EPSILON);
        assert!((short_sword().damage_sum() - 10.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_range_in_pixels() {
        let sword = short_sword();
        assert!((sword.range_px() - 48.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_tools_have_mining_power() {
        assert_eq!(pickaxe().tool, ToolCategory::Pickaxe);
        assert!(pickaxe().mining_power.is_some());
        assert_eq!(short_sword().tool, ToolCategory::None);
        assert!(short_sword().mining_power.is_none());
    }
}
