//! Inventory and item definitions.
//!
//! Items are a closed set: weapons, crafting materials and potions. Each item
//! occupies one slot; material counts are the number of matching slots.

use serde::{Deserialize, Serialize};

use crate::combat::weapons::WeaponStats;

/// Slot capacity of a fresh inventory
pub const INVENTORY_CAPACITY: usize = 40;

/// Crafting material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Material {
    Wood,
    Stone,
    IronOre,
    GoldOre,
    Hide,
}

impl Material {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Wood => "Wood",
            Self::Stone => "Stone",
            Self::IronOre => "Iron Ore",
            Self::GoldOre => "Gold Ore",
            Self::Hide => "Hide",
        }
    }

    pub fn value(&self) -> u64 {
        match self {
            Self::Wood | Self::Stone => 2,
            Self::Hide => 4,
            Self::IronOre => 8,
            Self::GoldOre => 20,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Potion {
    /// Restores 40% of max hp
    Health,
    /// Restores 40% of max mp
    Mana,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ItemKind {
    Weapon(WeaponStats),
    Material(Material),
    Potion(Potion),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    pub kind: ItemKind,
    /// Base gold value
    pub value: u64,
}

impl Item {
    pub fn weapon(stats: WeaponStats) -> Self {
        let value = (stats.damage_sum() * 5.0).round().max(1.0) as u64;
        Self {
            name: stats.name.clone(),
            kind: ItemKind::Weapon(stats),
            value,
        }
    }

    pub fn material(material: Material) -> Self {
        Self {
            name: material.name().into(),
            kind: ItemKind::Material(material),
            value: material.value(),
        }
    }

    pub fn potion(potion: Potion) -> Self {
        let name = match potion {
            Potion::Health => "Health Potion",
            Potion::Mana => "Mana Potion",
        };
        Self {
            name: name.into(),
            kind: ItemKind::Potion(potion),
            value: 15,
        }
    }

    pub fn as_material(&self) -> Option<Material> {
        match self.kind {
            ItemKind::Material(m) => Some(m),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    items: Vec<Item>,
    pub capacity: usize,
}

impl Default for Inventory {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            capacity: INVENTORY_CAPACITY,
        }
    }
}

impl Inventory {
    /// Append an item, false when full
    pub fn add(&mut self, item: Item) -> bool {
        if self.is_full() {
            return false;
        }
        self.items.push(item);
        true
    }

    pub fn remove(&mut self, index: usize) -> Option<Item> {
        if index < self.items.len() {
            Some(self.items.remove(index))
        } else {
            None
        }
    }

    pub fn get(&self, index: usize) -> Option<&Item> {
        self.items.get(index)
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }

    pub fn free_slots(&self) -> usize {
        self.capacity.saturating_sub(self.items.len())
    }

    pub fn count_material(&self, material: Material) -> usize {
        self.items
            .iter()
            .filter(|i| i.as_material() == Some(material))
            .count()
    }

    /// Remove `count` items of a material; nothing is removed when short
    pub fn take_material(&mut self, material: Material, count: usize) -> bool {
        if self.count_material(material) < count {
            return false;
        }
        let mut left = count;
        self.items.retain(|item| {
            if left > 0 && item.as_material() == Some(material) {
                left -= 1;
                false
            } else {
                true
            }
        });
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::weapons;

    #[test]
    fn test_add_until_full() {
        let mut inv = Inventory {
            capacity: 2,
            ..Default::default()
        };
        assert!(inv.add(Item::material(Material::Wood)));
        assert!(inv.add(Item::potion(Potion::Health)));
        assert!(!inv.add(Item::material(Material::Stone)));
        assert_eq!(inv.len(), 2);
        assert_eq!(inv.free_slots(), 0);
    }

    #[test]
    fn test_take_material_is_all_or_nothing() {
        let mut inv = Inventory::default();
        inv.add(Item::material(Material::IronOre));
        inv.add(Item::weapon(weapons::short_sword()));
        inv.add(Item::material(Material::IronOre));

        assert!(!inv.take_material(Material::IronOre, 3));
        assert_eq!(inv.count_material(Material::IronOre), 2);

        assert!(inv.take_material(Material::IronOre, 2));
        assert_eq!(inv.count_material(Material::IronOre), 0);
        assert_eq!(inv.len(), 1);
    }

    #[test]
    fn test_remove_out_of_range() {
        let mut inv = Inventory::default();
        assert!(inv.remove(3).is_none());
    }

    #[test]
    fn test_weapon_value_from_damage() {
        let item = Item::weapon(weapons::iron_spear());
        assert_eq!(item.value, 60);
        assert_eq!(item.name, "Iron Spear");
    }
}
