//! Shared entity building blocks.
//!
//! Every entity kind is its own struct carrying an [`EntityId`] and a
//! [`Body`]. Live entities sit in an index-addressed [`Arena`]; removal only
//! flags the body, and the arena is compacted in place by the purge stage.

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};

use crate::constants::{COMPACTION_INTERVAL, COMPACTION_RATIO};

/// Stable identity of an entity within a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

/// Monotonic id source owned by the session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdGen {
    next: u64,
}

impl IdGen {
    pub fn starting_at(next: u64) -> Self {
        Self { next }
    }

    pub fn next_id(&mut self) -> EntityId {
        self.next += 1;
        EntityId(self.next)
    }
}

/// Position, extent and vitals shared by all entity kinds.
/// `pos` is the top-left corner of the bounding box in world pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub pos: Vec2,
    pub size: Vec2,
    pub hp: f32,
    pub max_hp: f32,
    /// Pixels per second
    pub speed: f32,
    pub removed: bool,
}

impl Body {
    pub fn new(pos: Vec2, size: Vec2, max_hp: f32, speed: f32) -> Self {
        Self {
            pos,
            size,
            hp: max_hp,
            max_hp,
            speed,
            removed: false,
        }
    }

    /// Body whose center sits on `center`
    pub fn centered(center: Vec2, size: Vec2, max_hp: f32, speed: f32) -> Self {
        Self::new(center - size / 2.0, size, max_hp, speed)
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }

    pub fn set_center(&mut self, center: Vec2) {
        self.pos = center - self.size / 2.0;
    }

    pub fn is_alive(&self) -> bool {
        !self.removed && self.hp > 0.0
    }

    /// Axis-aligned bounding-box overlap
    pub fn overlaps(&self, other: &Body) -> bool {
        self.pos.x < other.pos.x + other.size.x
            && other.pos.x < self.pos.x + self.size.x
            && self.pos.y < other.pos.y + other.size.y
            && other.pos.y < self.pos.y + self.size.y
    }

    /// Apply damage, returns true when this hit was lethal
    pub fn take_damage(&mut self, amount: f32) -> bool {
        if !self.is_alive() {
            return false;
        }
        self.hp = (self.hp - amount).max(0.0);
        self.hp <= 0.0
    }

    pub fn heal(&mut self, amount: f32) {
        if self.removed {
            return;
        }
        self.hp = (self.hp + amount).min(self.max_hp);
    }
}

/// Anything stored in an [`Arena`]
pub trait ArenaEntity {
    fn id(&self) -> EntityId;
    fn is_removed(&self) -> bool;
}

/// Index-addressed entity storage with in-place compaction.
///
/// Removed entities stay in their slot (and are skipped by every iterator)
/// until [`Arena::compact`] drops them without reallocating.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Arena<T> {
    slots: Vec<T>,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self { slots: Vec::new() }
    }
}

impl<T: ArenaEntity> Arena<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_vec(slots: Vec<T>) -> Self {
        Self { slots }
    }

    /// Insert and return the slot index
    pub fn push(&mut self, item: T) -> usize {
        self.slots.push(item);
        self.slots.len() - 1
    }

    /// Raw slot count, removed slots included
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn live_count(&self) -> usize {
        self.slots.iter().filter(|e| !e.is_removed()).count()
    }

    pub fn removed_count(&self) -> usize {
        self.slots.len() - self.live_count()
    }

    pub fn is_empty(&self) -> bool {
        self.live_count() == 0
    }

    /// Slot access, removed entities included
    pub fn slot(&self, index: usize) -> Option<&T> {
        self.slots.get(index)
    }

    pub fn slot_mut(&mut self, index: usize) -> Option<&mut T> {
        self.slots.get_mut(index)
    }

    pub fn index_of(&self, id: EntityId) -> Option<usize> {
        self.slots.iter().position(|e| e.id() == id)
    }

    /// Live entity by id
    pub fn get(&self, id: EntityId) -> Option<&T> {
        self.slots.iter().find(|e| e.id() == id && !e.is_removed())
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut T> {
        self.slots
            .iter_mut()
            .find(|e| e.id() == id && !e.is_removed())
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.slots.iter().filter(|e| !e.is_removed())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.slots.iter_mut().filter(|e| !e.is_removed())
    }

    /// Drop removed slots in place, returns how many were dropped
    pub fn compact(&mut self) -> usize {
        let before = self.slots.len();
        self.slots.retain(|e| !e.is_removed());
        before - self.slots.len()
    }

    /// Compact when enough slots are dead or the interval has elapsed
    pub fn maybe_compact(&mut self, tick: u64) -> usize {
        let removed = self.removed_count();
        if removed == 0 {
            return 0;
        }
        let ratio = removed as f32 / self.slots.len() as f32;
        if ratio >= COMPACTION_RATIO || tick % COMPACTION_INTERVAL == 0 {
            self.compact()
        } else {
            0
        }
    }
}

/// Cosmetic particle kinds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ParticleKind {
    Hit,
    Crit,
    Death,
    Harvest,
    Heal,
    /// Floating damage number
    Damage(u32),
}

/// Short-lived cosmetic entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub id: EntityId,
    pub body: Body,
    pub kind: ParticleKind,
    pub velocity: Vec2,
    /// Seconds left
    pub lifetime: f32,
}

impl Particle {
    pub fn spawn(id: EntityId, at: Vec2, kind: ParticleKind) -> Self {
        let (lifetime, velocity) = match kind {
            ParticleKind::Damage(_) => (0.8, Vec2::new(0.0, -30.0)),
            ParticleKind::Death => (0.6, Vec2::ZERO),
            ParticleKind::Heal => (0.7, Vec2::new(0.0, -20.0)),
            ParticleKind::Hit | ParticleKind::Crit | ParticleKind::Harvest => (0.3, Vec2::ZERO),
        };
        Self {
            id,
            body: Body::centered(at, Vec2::splat(4.0), 1.0, 0.0),
            kind,
            velocity,
            lifetime,
        }
    }

    /// Advance one tick, flags the particle removed once expired
    pub fn decay(&mut self, dt: f32) {
        self.lifetime -= dt;
        self.body.pos += self.velocity * dt;
        if self.lifetime <= 0.0 {
            self.body.removed = true;
        }
    }
}

impl ArenaEntity for Particle {
    fn id(&self) -> EntityId {
        self.id
    }

    fn is_removed(&self) -> bool {
        self.body.removed
    }
}
