//! Normalized per-tick input.
//!
//! The host translates raw devices into an [`InputSnapshot`] once per frame;
//! the engine never reads a keyboard or mouse itself.

use std::collections::HashSet;

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};

use crate::constants::HOTBAR_SLOTS;
use crate::movement::input_direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputKey {
    Up,
    Down,
    Left,
    Right,
    Attack,
    /// Number key for a hotbar slot, 0-based
    Hotbar(u8),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputSnapshot {
    pub held: HashSet<InputKey>,
    /// Screen-space pointer position
    pub pointer: Vec2,
    pub pointer_down: bool,
}

impl InputSnapshot {
    pub fn holding(&self, key: InputKey) -> bool {
        self.held.contains(&key)
    }

    pub fn with(mut self, key: InputKey) -> Self {
        self.held.insert(key);
        self
    }

    pub fn with_pointer(mut self, pointer: Vec2, down: bool) -> Self {
        self.pointer = pointer;
        self.pointer_down = down;
        self
    }

    /// Unit (or zero) movement vector from the direction keys
    pub fn move_direction(&self) -> Vec2 {
        input_direction(
            self.holding(InputKey::Up),
            self.holding(InputKey::Down),
            self.holding(InputKey::Left),
            self.holding(InputKey::Right),
        )
    }

    pub fn attack_held(&self) -> bool {
        self.pointer_down || self.holding(InputKey::Attack)
    }

    /// Hotbar slots whose key is down, in slot order
    pub fn hotbar_pressed(&self) -> impl Iterator<Item = usize> + '_ {
        (0..HOTBAR_SLOTS).filter(|slot| self.holding(InputKey::Hotbar(*slot as u8)))
    }
}
