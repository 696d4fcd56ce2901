//! Enemy definitions and spawn templates.
//!
//! Enemy = Race x Rank x Level. Race sets the base stat line, rank scales it
//! (elites and bosses), level scales hp and attack.

use bevy::math::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::entity::{ArenaEntity, Body, EntityId, IdGen};
use crate::world::Location;

pub mod ai;

/// Creature family, sets the base stat line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Race {
    Slime,
    Goblin,
    Wolf,
    Skeleton,
    Bat,
    Golem,
    Lich,
}

/// Base stat line for a race at level 1
#[derive(Debug, Clone, Copy)]
pub struct RaceStats {
    pub max_hp: f32,
    pub attack: f32,
    pub defense: f32,
    /// Pixels per second
    pub speed: f32,
    /// Sight radius in tiles
    pub sight: f32,
    pub drop_rate: f32,
    pub size: f32,
}

impl Race {
    pub fn stats(&self) -> RaceStats {
        let (max_hp, attack, defense, speed, sight, drop_rate, size) = match self {
            Self::Slime => (20.0, 6.0, 1.0, 40.0, 5.0, 0.30, 18.0),
            Self::Goblin => (35.0, 10.0, 3.0, 60.0, 7.0, 0.40, 20.0),
            Self::Wolf => (30.0, 12.0, 2.0, 80.0, 8.0, 0.25, 22.0),
            Self::Skeleton => (45.0, 14.0, 5.0, 50.0, 7.0, 0.45, 20.0),
            Self::Bat => (15.0, 8.0, 0.0, 90.0, 6.0, 0.20, 14.0),
            Self::Golem => (90.0, 20.0, 12.0, 30.0, 5.0, 0.60, 28.0),
            Self::Lich => (70.0, 24.0, 8.0, 45.0, 9.0, 0.70, 22.0),
        };
        RaceStats {
            max_hp,
            attack,
            defense,
            speed,
            sight,
            drop_rate,
            size,
        }
    }
}

/// Rank tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rank {
    Normal,
    Elite,
    Boss,
}

impl Rank {
    pub fn hp_mult(&self) -> f32 {
        match self {
            Self::Normal => 1.0,
            Self::Elite => 2.0,
            Self::Boss => 6.0,
        }
    }

    pub fn attack_mult(&self) -> f32 {
        match self {
            Self::Normal => 1.0,
            Self::Elite => 1.5,
            Self::Boss => 2.5,
        }
    }

    pub fn size_mult(&self) -> f32 {
        match self {
            Self::Normal => 1.0,
            Self::Elite => 1.25,
            Self::Boss => 2.0,
        }
    }

    /// XP/gold multiplier on kill
    pub fn reward_factor(&self) -> u64 {
        match self {
            Self::Normal => 1,
            Self::Elite => 2,
            Self::Boss => 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: EntityId,
    pub body: Body,
    pub race: Race,
    pub rank: Rank,
    pub level: u32,
    /// Tiles
    pub sight_radius: f32,
    pub drop_rate: f32,
    pub attack: f32,
    pub defense: f32,
    /// Seconds until this enemy may deal contact damage again
    pub contact_timer: f32,
}

impl Enemy {
    pub fn is_boss(&self) -> bool {
        self.rank == Rank::Boss
    }
}

impl ArenaEntity for Enemy {
    fn id(&self) -> EntityId {
        self.id
    }

    fn is_removed(&self) -> bool {
        self.body.removed
    }
}

/// Build an enemy centered on `center`; `hp_mult` comes from difficulty
pub fn spawn_enemy(
    ids: &mut IdGen,
    race: Race,
    rank: Rank,
    level: u32,
    center: Vec2,
    hp_mult: f32,
) -> Enemy {
    let base = race.stats();
    let level_steps = level.saturating_sub(1) as f32;
    let max_hp = base.max_hp * (1.0 + 0.2 * level_steps) * rank.hp_mult() * hp_mult;
    let attack = base.attack * (1.0 + 0.15 * level_steps) * rank.attack_mult();
    let defense = base.defense * (1.0 + 0.1 * level_steps);
    let size = Vec2::splat(base.size * rank.size_mult());

    Enemy {
        id: ids.next_id(),
        body: Body::centered(center, size, max_hp, base.speed),
        race,
        rank,
        level: level.max(1),
        sight_radius: base.sight,
        drop_rate: base.drop_rate,
        attack,
        defense,
        contact_timer: 0.0,
    }
}

/// Races that roam a location (empty for safe zones)
pub fn races_for(location: &Location) -> &'static [Race] {
    match location {
        Location::Town => &[],
        Location::World { .. } => &[Race::Slime, Race::Goblin, Race::Wolf],
        Location::Dungeon { .. } => &[Race::Goblin, Race::Skeleton, Race::Bat],
        Location::Mine { .. } => &[Race::Bat, Race::Slime, Race::Golem],
    }
}

/// Boss race guarding the bottom of a dungeon or mine
pub fn boss_race_for(location: &Location) -> Race {
    match location {
        Location::Mine { .. } => Race::Golem,
        _ => Race::Lich,
    }
}

/// Enemy level for a location
pub fn level_for(location: &Location) -> u32 {
    match location {
        Location::Town => 1,
        Location::World { chunk_x, chunk_y } => 1 + chunk_x.unsigned_abs() + chunk_y.unsigned_abs(),
        Location::Dungeon { level, .. } | Location::Mine { level, .. } => 1 + level * 2,
    }
}

/// Elite 10%, otherwise normal
pub fn roll_rank(rng: &mut impl Rng) -> Rank {
    if rng.gen::<f32>() < 0.1 {
        Rank::Elite
    } else {
        Rank::Normal
    }
}

/// Random roaming enemy for a location, None in safe zones
pub fn roll_enemy(
    ids: &mut IdGen,
    location: &Location,
    center: Vec2,
    hp_mult: f32,
    rng: &mut impl Rng,
) -> Option<Enemy> {
    let races = races_for(location);
    if races.is_empty() {
        return None;
    }
    let race = races[rng.gen_range(0..races.len())];
    let rank = roll_rank(rng);
    Some(spawn_enemy(ids, race, rank, level_for(location), center, hp_mult))
}
