//! Companions recruited at the guild.

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};

use super::{Job, Stats};
use crate::combat::AttackProfile;
use crate::entity::{Body, EntityId, IdGen};

/// Party size cap, not counting the player
pub const MAX_PARTY: usize = 3;

const COMPANION_SIZE: f32 = 18.0;
const COMPANION_SPEED: f32 = 110.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Companion {
    pub id: EntityId,
    pub body: Body,
    pub name: String,
    pub job: Job,
    pub level: u32,
    pub stats: Stats,
    /// Downed companions neither move nor take damage
    pub downed: bool,
    /// Seconds until the next strike
    pub attack_timer: f32,
}

impl Companion {
    pub fn recruit(ids: &mut IdGen, name: &str, job: Job, level: u32, center: Vec2) -> Self {
        let mut stats = job.base_stats();
        let growth = job.growth();
        let steps = level.saturating_sub(1) as f32;
        stats.max_hp += growth.max_hp * steps;
        stats.attack += growth.attack * steps;
        stats.defense += growth.defense * steps;
        Self {
            id: ids.next_id(),
            body: Body::centered(
                center,
                Vec2::splat(COMPANION_SIZE),
                stats.max_hp,
                COMPANION_SPEED,
            ),
            name: name.into(),
            job,
            level: level.max(1),
            stats,
            downed: false,
            attack_timer: 0.0,
        }
    }

    /// Companions fight with a job-typical weapon
    pub fn weapon_damage(&self) -> f32 {
        match self.job {
            Job::Warrior => 8.0,
            Job::Mage => 10.0,
            Job::Ranger => 7.0,
            Job::Cleric => 4.0,
        }
    }

    pub fn attack_profile(&self) -> AttackProfile {
        AttackProfile {
            weapon_damage: self.weapon_damage(),
            base_attack: self.stats.attack,
            level: self.level,
        }
    }

    /// Full heal, clears downed
    pub fn revive(&mut self) {
        self.downed = false;
        self.body.hp = self.body.max_hp;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recruit_scales_with_level() {
        let mut ids = IdGen::default();
        let low = Companion::recruit(&mut ids, "Ada", Job::Ranger, 1, Vec2::ZERO);
        let high = Companion::recruit(&mut ids, "Bo", Job::Ranger, 4, Vec2::ZERO);
        assert!(high.body.max_hp > low.body.max_hp);
        assert!(high.attack_profile().raw_damage() > low.attack_profile().raw_damage());
        assert_ne!(low.id, high.id);
    }

    #[test]
    fn test_revive() {
        let mut ids = IdGen::default();
        let mut c = Companion::recruit(&mut ids, "Ada", Job::Cleric, 1, Vec2::ZERO);
        c.body.hp = 0.0;
        c.downed = true;
        c.revive();
        assert!(!c.downed);
        assert!(c.body.is_alive());
    }
}
