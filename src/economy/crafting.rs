//! Blacksmith crafting.
//!
//! A recipe consumes a fixed number of materials of each listed type plus a
//! gold fee and yields one item. The whole craft is checked before anything
//! is taken, so a failed craft never leaves a half-paid inventory.

use serde::{Deserialize, Serialize};

use crate::combat::weapons;
use crate::player::inventory::{Inventory, Item, Material, Potion};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub name: String,
    pub inputs: Vec<(Material, usize)>,
    pub gold: u64,
    pub output: Item,
}

/// Crafting errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CraftError {
    #[error("Missing {material:?}: need {needed}, have {have}")]
    MissingMaterial {
        material: Material,
        needed: usize,
        have: usize,
    },
    #[error("Insufficient gold: have {have}, need {need}")]
    InsufficientGold { have: u64, need: u64 },
    #[error("Inventory full")]
    InventoryFull,
}

/// Check every precondition of a recipe without touching anything
pub fn can_craft(recipe: &Recipe, inventory: &Inventory, gold: u64) -> Result<(), CraftError> {
    for (material, needed) in &recipe.inputs {
        let have = inventory.count_material(*material);
        if have < *needed {
            return Err(CraftError::MissingMaterial {
                material: *material,
                needed: *needed,
                have,
            });
        }
    }
    if gold < recipe.gold {
        return Err(CraftError::InsufficientGold {
            have: gold,
            need: recipe.gold,
        });
    }
    let consumed: usize = recipe.inputs.iter().map(|(_, n)| n).sum();
    // the output needs one free slot once the inputs are gone
    if inventory.free_slots() + consumed == 0 {
        return Err(CraftError::InventoryFull);
    }
    Ok(())
}

/// Consume inputs and gold, append the crafted item
pub fn craft(recipe: &Recipe, inventory: &mut Inventory, gold: &mut u64) -> Result<(), CraftError> {
    can_craft(recipe, inventory, *gold)?;
    for (material, needed) in &recipe.inputs {
        inventory.take_material(*material, *needed);
    }
    *gold -= recipe.gold;
    inventory.add(recipe.output.clone());
    Ok(())
}

/// The blacksmith's recipe book
pub fn blacksmith_recipes() -> Vec<Recipe> {
    vec![
        Recipe {
            name: "Iron Spear".into(),
            inputs: vec![(Material::IronOre, 3), (Material::Wood, 2)],
            gold: 20,
            output: Item::weapon(weapons::iron_spear()),
        },
        Recipe {
            name: "War Hammer".into(),
            inputs: vec![(Material::IronOre, 4), (Material::Stone, 3)],
            gold: 40,
            output: Item::weapon(weapons::war_hammer()),
        },
        Recipe {
            name: "Woodcutter Axe".into(),
            inputs: vec![(Material::IronOre, 1), (Material::Wood, 3)],
            gold: 10,
            output: Item::weapon(weapons::woodcutter_axe()),
        },
        Recipe {
            name: "Health Potion".into(),
            inputs: vec![(Material::Hide, 1)],
            gold: 5,
            output: Item::potion(Potion::Health),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stocked(iron: usize, wood: usize) -> Inventory {
        let mut inv = Inventory::default();
        for _ in 0..iron {
            inv.add(Item::material(Material::IronOre));
        }
        for _ in 0..wood {
            inv.add(Item::material(Material::Wood));
        }
        inv
    }

    #[test]
    fn test_craft_consumes_inputs_and_gold() {
        let recipe = &blacksmith_recipes()[0];
        let mut inv = stocked(4, 2);
        let mut gold = 25;
        assert!(craft(recipe, &mut inv, &mut gold).is_ok());
        assert_eq!(gold, 5);
        assert_eq!(inv.count_material(Material::IronOre), 1);
        assert_eq!(inv.count_material(Material::Wood), 0);
        assert!(inv.items().iter().any(|i| i.name == "Iron Spear"));
    }

    #[test]
    fn test_missing_material_changes_nothing() {
        let recipe = &blacksmith_recipes()[0];
        let mut inv = stocked(2, 5);
        let mut gold = 100;
        let err = craft(recipe, &mut inv, &mut gold).unwrap_err();
        assert_eq!(
            err,
            CraftError::MissingMaterial {
                material: Material::IronOre,
                needed: 3,
                have: 2
            }
        );
        assert_eq!(gold, 100);
        assert_eq!(inv.len(), 7);
    }

    #[test]
    fn test_insufficient_gold() {
        let recipe = &blacksmith_recipes()[1];
        let mut inv = stocked(4, 0);
        for _ in 0..3 {
            inv.add(Item::material(Material::Stone));
        }
        let mut gold = 39;
        assert!(matches!(
            craft(recipe, &mut inv, &mut gold),
            Err(CraftError::InsufficientGold { have: 39, need: 40 })
        ));
        assert_eq!(inv.count_material(Material::Stone), 3);
    }
}
