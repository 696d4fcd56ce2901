//! Active skills and their activation gating.
//!
//! A skill fires only when the caster has the mp, the cooldown window since
//! its last use has elapsed, the caster's level meets the unlock level and the
//! caster's job is eligible. Activation debits mp and stamps the use time;
//! applying the effect (self buff/heal or a line/arc sweep) is left to the
//! caller.
//!
//! Failed activations are ordinary mis-timing, not faults: `try_activate`
//! reports them as a [`SkillBlock`] and leaves all state untouched.

use std::f32::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::player::Job;

/// Immediate effect of a self-cast skill
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SelfEffect {
    /// Heal a fraction of max hp
    Heal { fraction: f32 },
    /// Multiply base attack for `duration` seconds
    Buff { attack_mult: f32, duration: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TargetMode {
    SelfCast(SelfEffect),
    /// Line sweep along the facing
    Directional { width: f32 },
    /// Arc sweep around the facing; TAU hits all around
    Area { angle: f32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Skill {
    pub id: u32,
    pub name: &'static str,
    /// Mp cost
    pub cost: f32,
    /// Seconds between uses
    pub cooldown: f64,
    pub target: TargetMode,
    pub multiplier: f32,
    /// Reach in tiles, overrides the weapon range
    pub range: Option<f32>,
    pub unlock_level: u32,
    /// Empty = every job
    pub jobs: &'static [Job],
}

impl Skill {
    pub fn allows(&self, job: Job) -> bool {
        self.jobs.is_empty() || self.jobs.contains(&job)
    }
}

pub const POWER_STRIKE: u32 = 1;
pub const WHIRLWIND: u32 = 2;
pub const HEAL: u32 = 3;
pub const WAR_CRY: u32 = 4;
pub const FIRE_BOLT: u32 = 5;
pub const PIERCING_SHOT: u32 = 6;
pub const FLAME_NOVA: u32 = 7;

static CATALOG: [Skill; 7] = [
    Skill {
        id: POWER_STRIKE,
        name: "Power Strike",
        cost: 10.0,
        cooldown: 3.0,
        target: TargetMode::Directional { width: 32.0 },
        multiplier: 2.0,
        range: Some(2.0),
        unlock_level: 1,
        jobs: &[],
    },
    Skill {
        id: WHIRLWIND,
        name: "Whirlwind",
        cost: 20.0,
        cooldown: 8.0,
        target: TargetMode::Area { angle: TAU },
        multiplier: 1.5,
        range: Some(2.0),
        unlock_level: 3,
        jobs: &[Job::Warrior],
    },
    Skill {
        id: HEAL,
        name: "Heal",
        cost: 15.0,
        cooldown: 5.0,
        target: TargetMode::SelfCast(SelfEffect::Heal { fraction: 0.3 }),
        multiplier: 0.0,
        range: None,
        unlock_level: 1,
        jobs: &[],
    },
    Skill {
        id: WAR_CRY,
        name: "War Cry",
        cost: 12.0,
        cooldown: 20.0,
        target: TargetMode::SelfCast(SelfEffect::Buff {
            attack_mult: 1.5,
            duration: 10.0,
        }),
        multiplier: 0.0,
        range: None,
        unlock_level: 2,
        jobs: &[Job::Warrior, Job::Cleric],
    },
    Skill {
        id: FIRE_BOLT,
        name: "Fire Bolt",
        cost: 14.0,
        cooldown: 2.5,
        target: TargetMode::Directional { width: 20.0 },
        multiplier: 1.8,
        range: Some(6.0),
        unlock_level: 1,
        jobs: &[Job::Mage],
    },
    Skill {
        id: PIERCING_SHOT,
        name: "Piercing Shot",
        cost: 12.0,
        cooldown: 4.0,
        target: TargetMode::Directional { width: 14.0 },
        multiplier: 1.6,
        range: Some(7.0),
        unlock_level: 2,
        jobs: &[Job::Ranger],
    },
    Skill {
        id: FLAME_NOVA,
        name: "Flame Nova",
        cost: 30.0,
        cooldown: 10.0,
        target: TargetMode::Area { angle: TAU },
        multiplier: 2.2,
        range: Some(3.0),
        unlock_level: 5,
        jobs: &[Job::Mage],
    },
];

pub fn catalog() -> &'static [Skill] {
    &CATALOG
}

pub fn find(id: u32) -> Option<&'static Skill> {
    CATALOG.iter().find(|s| s.id == id)
}

/// Skills a job can ever learn
pub fn skills_for(job: Job) -> impl Iterator<Item = &'static Skill> {
    CATALOG.iter().filter(move |s| s.allows(job))
}

/// Per-caster cooldown bookkeeping for one skill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillState {
    pub skill_id: u32,
    /// Session time of the last successful use
    pub last_used: Option<f64>,
}

impl SkillState {
    pub fn new(skill_id: u32) -> Self {
        Self {
            skill_id,
            last_used: None,
        }
    }

    pub fn ready_at(&self, skill: &Skill, now: f64) -> bool {
        self.last_used
            .is_none_or(|last| now - last >= skill.cooldown)
    }
}

/// Why an activation did nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkillBlock {
    NotEnoughMp,
    OnCooldown,
    LevelTooLow,
    WrongJob,
}

/// Who is casting
#[derive(Debug, Clone, Copy)]
pub struct Caster {
    pub level: u32,
    pub job: Job,
}

/// Gate and, on success, pay for one activation
pub fn try_activate(
    skill: &Skill,
    state: &mut SkillState,
    mp: &mut f32,
    caster: Caster,
    now: f64,
) -> Result<(), SkillBlock> {
    if !skill.allows(caster.job) {
        return Err(SkillBlock::WrongJob);
    }
    if caster.level < skill.unlock_level {
        return Err(SkillBlock::LevelTooLow);
    }
    if *mp < skill.cost {
        return Err(SkillBlock::NotEnoughMp);
    }
    if !state.ready_at(skill, now) {
        return Err(SkillBlock::OnCooldown);
    }
    *mp -= skill.cost;
    state.last_used = Some(now);
    Ok(())
}
