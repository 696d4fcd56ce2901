//! Combat resolution.
//!
//! Damage: `raw = (weapon damage + base attack) * (1 + level * 0.1)`,
//! `net = max(1, raw * multiplier - defense)`. Strikes sweep a hit shape over
//! the enemy arena and report every connecting hit back to the caller, which
//! owns reward bookkeeping.

use bevy::math::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants::{
    CRIT_DAMAGE_MULT, GOLD_PER_TARGET_LEVEL, LEVEL_DAMAGE_SCALE, XP_PER_TARGET_LEVEL,
};
use crate::entity::{Arena, EntityId};
use crate::monster::{Enemy, Rank};
use crate::movement;
use crate::world::TileGrid;

pub mod hitbox;
pub mod weapons;

use hitbox::{facing_vector, shape_hit};
use weapons::HitShape;

/// Offensive numbers of whoever is attacking
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttackProfile {
    pub weapon_damage: f32,
    pub base_attack: f32,
    pub level: u32,
}

impl AttackProfile {
    pub fn raw_damage(&self) -> f32 {
        (self.weapon_damage + self.base_attack) * (1.0 + self.level as f32 * LEVEL_DAMAGE_SCALE)
    }
}

/// Net damage after multiplier and defense, never below 1
pub fn compute_damage(profile: &AttackProfile, multiplier: f32, defense: f32) -> f32 {
    (profile.raw_damage() * multiplier - defense).max(1.0)
}

/// Result of the hit/crit rolls for one target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwingOutcome {
    Miss,
    Hit,
    Crit,
}

impl SwingOutcome {
    pub fn multiplier(&self) -> f32 {
        match self {
            Self::Miss => 0.0,
            Self::Hit => 1.0,
            Self::Crit => CRIT_DAMAGE_MULT,
        }
    }
}

pub fn roll_swing(rng: &mut impl Rng, hit_rate: f32, crit_rate: f32) -> SwingOutcome {
    if rng.gen::<f32>() >= hit_rate {
        SwingOutcome::Miss
    } else if rng.gen::<f32>() < crit_rate {
        SwingOutcome::Crit
    } else {
        SwingOutcome::Hit
    }
}

/// XP and gold granted for a kill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KillReward {
    pub xp: u64,
    pub gold: u64,
}

pub fn kill_reward(target_level: u32, rank: Rank) -> KillReward {
    let factor = rank.reward_factor();
    KillReward {
        xp: XP_PER_TARGET_LEVEL * target_level as u64 * factor,
        gold: GOLD_PER_TARGET_LEVEL * target_level as u64 * factor,
    }
}

/// One resolved attack sweep
#[derive(Debug, Clone)]
pub struct Strike {
    pub origin: Vec2,
    pub facing: f32,
    /// Reach in pixels
    pub range: f32,
    pub shape: HitShape,
    pub multiplier: f32,
    pub profile: AttackProfile,
    pub hit_rate: f32,
    pub crit_rate: f32,
    /// Push distance in pixels
    pub knockback: f32,
}

/// A target the strike connected with
#[derive(Debug, Clone, PartialEq)]
pub struct StrikeHit {
    pub target: EntityId,
    pub at: Vec2,
    pub damage: f32,
    pub crit: bool,
    pub killed: bool,
    pub target_level: u32,
    pub rank: Rank,
    pub drop_rate: f32,
}

/// True when some live enemy stands inside the strike's shape, hit or miss
pub fn strike_reaches_any(strike: &Strike, enemies: &Arena<Enemy>) -> bool {
    enemies.iter().any(|enemy| {
        enemy.body.is_alive()
            && shape_hit(
                strike.origin,
                strike.facing,
                enemy.body.center(),
                strike.range,
                strike.shape,
            )
    })
}

/// Sweep the strike over all live enemies and apply damage
pub fn resolve_strike(
    strike: &Strike,
    enemies: &mut Arena<Enemy>,
    grid: &TileGrid,
    rng: &mut impl Rng,
) -> Vec<StrikeHit> {
    let mut hits = Vec::new();
    let push = facing_vector(strike.facing) * strike.knockback;

    for enemy in enemies.iter_mut().filter(|e| e.body.is_alive()) {
        let center = enemy.body.center();
        if !shape_hit(strike.origin, strike.facing, center, strike.range, strike.shape) {
            continue;
        }

        let outcome = roll_swing(rng, strike.hit_rate, strike.crit_rate);
        if outcome == SwingOutcome::Miss {
            continue;
        }

        let damage = compute_damage(
            &strike.profile,
            strike.multiplier * outcome.multiplier(),
            enemy.defense,
        );
        let killed = enemy.body.take_damage(damage);
        if !killed && strike.knockback > 0.0 {
            movement::try_move(&mut enemy.body, push, grid);
        }

        hits.push(StrikeHit {
            target: enemy.id,
            at: center,
            damage,
            crit: outcome == SwingOutcome::Crit,
            killed,
            target_level: enemy.level,
            rank: enemy.rank,
            drop_rate: enemy.drop_rate,
        });
    }

    hits
}
