//! Player character state.
//!
//! The player is plain data owned by the session: body, stat block,
//! progression, equipment, skill states and the hotbar. Systems mutate it
//! through the engine tick; nothing here reads input directly.

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};

use crate::abilities::{self, SkillState};
use crate::combat::weapons::{self, WeaponStats};
use crate::combat::AttackProfile;
use crate::constants::HOTBAR_SLOTS;
use crate::entity::{Body, EntityId};

pub mod inventory;
pub mod party;

use inventory::{Inventory, Item, ItemKind, Potion};

/// Player and companion class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Job {
    Warrior,
    Mage,
    Ranger,
    Cleric,
}

impl Job {
    /// Level 1 stat block
    pub fn base_stats(&self) -> Stats {
        let (max_hp, max_mp, attack, defense) = match self {
            Self::Warrior => (120.0, 30.0, 12.0, 6.0),
            Self::Mage => (80.0, 70.0, 8.0, 3.0),
            Self::Ranger => (95.0, 40.0, 10.0, 4.0),
            Self::Cleric => (100.0, 55.0, 7.0, 5.0),
        };
        Stats {
            max_hp,
            max_mp,
            attack,
            defense,
        }
    }

    /// Per-level stat growth
    pub fn growth(&self) -> Stats {
        let (max_hp, max_mp, attack, defense) = match self {
            Self::Warrior => (14.0, 3.0, 2.5, 1.5),
            Self::Mage => (8.0, 8.0, 1.5, 0.5),
            Self::Ranger => (10.0, 4.0, 2.0, 1.0),
            Self::Cleric => (10.0, 6.0, 1.5, 1.0),
        };
        Stats {
            max_hp,
            max_mp,
            attack,
            defense,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub max_hp: f32,
    pub max_mp: f32,
    pub attack: f32,
    pub defense: f32,
}

/// Held-attack resolution mode, toggled from the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AttackMode {
    #[default]
    Melee,
    Ranged,
}

impl AttackMode {
    pub fn toggled(&self) -> Self {
        match self {
            Self::Melee => Self::Ranged,
            Self::Ranged => Self::Melee,
        }
    }
}

/// Temporary attack multiplier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Buff {
    pub attack_mult: f32,
    pub remaining: f32,
}

/// XP required to advance from `level` (100 * level^1.5)
pub fn xp_for_level(level: u32) -> u64 {
    (100.0 * (level.max(1) as f64).powf(1.5)) as u64
}

pub const PLAYER_SIZE: f32 = 20.0;
pub const PLAYER_SPEED: f32 = 120.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: EntityId,
    pub body: Body,
    pub job: Job,
    pub stats: Stats,
    pub level: u32,
    pub xp: u64,
    pub xp_to_next: u64,
    pub gold: u64,
    pub mp: f32,
    pub inventory: Inventory,
    /// None = bare fists
    pub equipped: Option<WeaponStats>,
    pub skills: Vec<SkillState>,
    /// Slot -> skill id
    pub hotbar: [Option<u32>; HOTBAR_SLOTS],
    /// Seconds the attack animation remains visible
    pub attack_anim: f32,
    /// Seconds until the next held attack may fire
    pub attack_cooldown: f32,
    /// Radians, x right / y down
    pub facing: f32,
    pub attack_mode: AttackMode,
    pub buffs: Vec<Buff>,
}

impl Player {
    pub fn new(id: EntityId, job: Job, center: Vec2) -> Self {
        let stats = job.base_stats();
        let mut player = Self {
            id,
            body: Body::centered(center, Vec2::splat(PLAYER_SIZE), stats.max_hp, PLAYER_SPEED),
            job,
            stats,
            level: 1,
            xp: 0,
            xp_to_next: xp_for_level(1),
            gold: 50,
            mp: stats.max_mp,
            inventory: Inventory::default(),
            equipped: Some(weapons::short_sword()),
            skills: abilities::skills_for(job)
                .map(|s| SkillState::new(s.id))
                .collect(),
            hotbar: [None; HOTBAR_SLOTS],
            attack_anim: 0.0,
            attack_cooldown: 0.0,
            facing: 0.0,
            attack_mode: AttackMode::Melee,
            buffs: Vec::new(),
        };
        for (slot, skill) in player.skills.iter().take(HOTBAR_SLOTS).enumerate() {
            player.hotbar[slot] = Some(skill.skill_id);
        }
        player.inventory.add(Item::weapon(weapons::pickaxe()));
        player.inventory.add(Item::potion(Potion::Health));
        player
    }

    pub fn weapon(&self) -> WeaponStats {
        self.equipped.clone().unwrap_or_else(weapons::fists)
    }

    /// Base attack with active buffs applied
    pub fn effective_attack(&self) -> f32 {
        self.buffs
            .iter()
            .fold(self.stats.attack, |atk, b| atk * b.attack_mult)
    }

    pub fn attack_profile(&self) -> AttackProfile {
        AttackProfile {
            weapon_damage: self.weapon().damage_sum(),
            base_attack: self.effective_attack(),
            level: self.level,
        }
    }

    pub fn skill_state_mut(&mut self, skill_id: u32) -> Option<&mut SkillState> {
        self.skills.iter_mut().find(|s| s.skill_id == skill_id)
    }

    pub fn knows_skill(&self, skill_id: u32) -> bool {
        self.skills.iter().any(|s| s.skill_id == skill_id)
    }

    /// Add XP and apply every level-up it pays for; returns levels gained
    pub fn gain_xp(&mut self, amount: u64) -> u32 {
        self.xp += amount;
        let mut gained = 0;
        while self.xp >= self.xp_to_next {
            self.xp -= self.xp_to_next;
            self.level += 1;
            self.xp_to_next = xp_for_level(self.level);
            let growth = self.job.growth();
            self.stats.max_hp += growth.max_hp;
            self.stats.max_mp += growth.max_mp;
            self.stats.attack += growth.attack;
            self.stats.defense += growth.defense;
            gained += 1;
        }
        if gained > 0 {
            self.body.max_hp = self.stats.max_hp;
            self.restore();
        }
        gained
    }

    /// Refill hp and mp
    pub fn restore(&mut self) {
        self.body.hp = self.body.max_hp;
        self.mp = self.stats.max_mp;
    }

    pub fn restore_mp(&mut self, amount: f32) {
        self.mp = (self.mp + amount).min(self.stats.max_mp);
    }

    /// Count buff timers down and drop expired ones
    pub fn tick_buffs(&mut self, dt: f32) {
        for buff in &mut self.buffs {
            buff.remaining -= dt;
        }
        self.buffs.retain(|b| b.remaining > 0.0);
    }

    /// Swap the weapon at `index` into the hand; the previous weapon goes back
    /// into its slot. False when the slot is not a weapon.
    pub fn equip(&mut self, index: usize) -> bool {
        let is_weapon = matches!(
            self.inventory.get(index).map(|i| &i.kind),
            Some(ItemKind::Weapon(_))
        );
        if !is_weapon {
            return false;
        }
        let Some(Item {
            kind: ItemKind::Weapon(stats),
            ..
        }) = self.inventory.remove(index)
        else {
            return false;
        };
        if let Some(previous) = self.equipped.replace(stats) {
            self.inventory.add(Item::weapon(previous));
        }
        true
    }

    /// Drink the potion at `index`. False when the slot is not a potion.
    pub fn use_item(&mut self, index: usize) -> bool {
        let potion = match self.inventory.get(index).map(|i| &i.kind) {
            Some(ItemKind::Potion(p)) => *p,
            _ => return false,
        };
        self.inventory.remove(index);
        match potion {
            Potion::Health => self.body.heal(self.body.max_hp * 0.4),
            Potion::Mana => self.restore_mp(self.stats.max_mp * 0.4),
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player() -> Player {
        Player::new(EntityId(1), Job::Warrior, Vec2::new(100.0, 100.0))
    }

    #[test]
    fn test_xp_curve() {
        assert_eq!(xp_for_level(1), 100);
        assert_eq!(xp_for_level(4), 800);
    }

    #[test]
    fn test_level_up_raises_stats_and_refills() {
        let mut p = player();
        p.body.hp = 10.0;
        let before = p.stats;
        let gained = p.gain_xp(150);
        assert_eq!(gained, 1);
        assert_eq!(p.level, 2);
        assert_eq!(p.xp, 50);
        assert!(p.stats.attack > before.attack);
        assert!((p.body.hp - p.body.max_hp).abs() < f32::EPSILON);
    }

    #[test]
    fn test_multi_level_gain() {
        let mut p = player();
        // 100 (lvl 1) + 282 (lvl 2) = 382
        assert_eq!(p.gain_xp(400), 2);
        assert_eq!(p.level, 3);
    }

    #[test]
    fn test_buffs_expire() {
        let mut p = player();
        let base = p.effective_attack();
        p.buffs.push(Buff {
            attack_mult: 1.5,
            remaining: 1.0,
        });
        assert!((p.effective_attack() - base * 1.5).abs() < 1e-4);
        p.tick_buffs(0.6);
        assert_eq!(p.buffs.len(), 1);
        p.tick_buffs(0.6);
        assert!(p.buffs.is_empty());
    }

    #[test]
    fn test_equip_swaps_weapon() {
        let mut p = player();
        let pick_index = p
            .inventory
            .items()
            .iter()
            .position(|i| i.name == "Pickaxe")
            .unwrap();
        assert!(p.equip(pick_index));
        assert_eq!(p.weapon().name, "Pickaxe");
        assert!(p.inventory.items().iter().any(|i| i.name == "Short Sword"));
    }

    #[test]
    fn test_equip_rejects_non_weapon() {
        let mut p = player();
        let potion_index = p
            .inventory
            .items()
            .iter()
            .position(|i| matches!(i.kind, ItemKind::Potion(_)))
            .unwrap();
        assert!(!p.equip(potion_index));
        assert!(!p.equip(99));
    }

    #[test]
    fn test_use_potion_heals() {
        let mut p = player();
        p.body.hp = 20.0;
        let potion_index = p
            .inventory
            .items()
            .iter()
            .position(|i| matches!(i.kind, ItemKind::Potion(_)))
            .unwrap();
        let before = p.inventory.len();
        assert!(p.use_item(potion_index));
        assert!(p.body.hp > 20.0);
        assert_eq!(p.inventory.len(), before - 1);
    }

    #[test]
    fn test_fists_when_unequipped() {
        let mut p = player();
        p.equipped = None;
        assert_eq!(p.weapon().name, "Fists");
    }

    #[test]
    fn test_hotbar_prefilled() {
        let p = player();
        assert!(p.hotbar[0].is_some());
        assert!(p.hotbar.iter().flatten().all(|id| p.knows_skill(*id)));
    }
}
