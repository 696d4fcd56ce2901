//! Town NPCs.
//!
//! Each of the five town roles stands at its shop footprint. Roles decide
//! what the UI may offer: a stock list, a recipe book, or a paid service.

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};

use crate::economy::crafting::{self, Recipe};
use crate::economy::{self, StockEntry};
use crate::entity::{ArenaEntity, Body, EntityId, IdGen};
use crate::world::TilePos;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NpcRole {
    Inn,
    Blacksmith,
    Alchemist,
    Priest,
    GuildRecruiter,
}

impl NpcRole {
    pub const ALL: [NpcRole; 5] = [
        Self::Inn,
        Self::Blacksmith,
        Self::Alchemist,
        Self::Priest,
        Self::GuildRecruiter,
    ];

    fn persona(&self) -> (&'static str, &'static str) {
        match self {
            Self::Inn => ("Marta", "A warm bed and a hot meal, ten gold."),
            Self::Blacksmith => ("Brann", "Bring me ore and I'll bring you steel."),
            Self::Alchemist => ("Iselde", "Potions, fresh this morning."),
            Self::Priest => ("Father Aldo", "Let the light mend your wounds."),
            Self::GuildRecruiter => ("Kes", "Looking for company on the road?"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Npc {
    pub id: EntityId,
    pub body: Body,
    pub role: NpcRole,
    pub name: String,
    pub dialogue: String,
    pub stock: Option<Vec<StockEntry>>,
    pub recipes: Option<Vec<Recipe>>,
}

impl Npc {
    pub fn at_tile(ids: &mut IdGen, role: NpcRole, tile: TilePos) -> Self {
        let (name, dialogue) = role.persona();
        let recipes = match role {
            NpcRole::Blacksmith => Some(crafting::blacksmith_recipes()),
            _ => None,
        };
        Self {
            id: ids.next_id(),
            body: Body::centered(tile.center_px(), Vec2::splat(20.0), 1.0, 0.0),
            role,
            name: name.into(),
            dialogue: dialogue.into(),
            stock: economy::stock_for(role),
            recipes,
        }
    }

    pub fn is_shop(&self) -> bool {
        self.stock.is_some()
    }

    pub fn is_crafter(&self) -> bool {
        self.recipes.is_some()
    }
}

impl ArenaEntity for Npc {
    fn id(&self) -> EntityId {
        self.id
    }

    fn is_removed(&self) -> bool {
        self.body.removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roles_get_their_goods() {
        let mut ids = IdGen::default();
        let smith = Npc::at_tile(&mut ids, NpcRole::Blacksmith, TilePos::new(3, 3));
        assert!(smith.is_shop());
        assert!(smith.is_crafter());

        let inn = Npc::at_tile(&mut ids, NpcRole::Inn, TilePos::new(5, 3));
        assert!(!inn.is_shop());
        assert!(!inn.is_crafter());
        assert!(!inn.dialogue.is_empty());
    }
}
