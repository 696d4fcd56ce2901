//! Shops and town services.
//!
//! Every town NPC either sells stock, offers crafting, or sells a service
//! (inn rest, priest heal, guild recruit). All trades are gold-for-goods and
//! fail without side effects.

use serde::{Deserialize, Serialize};

use crate::combat::weapons;
use crate::npc::NpcRole;
use crate::player::inventory::{Inventory, Item, Material, Potion};

pub mod crafting;

/// One line of a shop's stock
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockEntry {
    pub item: Item,
    pub price: u64,
}

impl StockEntry {
    /// Shops sell at twice the base value
    pub fn from_item(item: Item) -> Self {
        let price = item.value * 2;
        Self { item, price }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TradeError {
    #[error("Insufficient gold: have {have}, need {need}")]
    InsufficientGold { have: u64, need: u64 },
    #[error("Inventory full")]
    InventoryFull,
    #[error("Nothing for sale at index {0}")]
    NoSuchStock(usize),
}

/// Buy one copy of a stock line
pub fn purchase(
    stock: &[StockEntry],
    index: usize,
    inventory: &mut Inventory,
    gold: &mut u64,
) -> Result<(), TradeError> {
    let entry = stock.get(index).ok_or(TradeError::NoSuchStock(index))?;
    if *gold < entry.price {
        return Err(TradeError::InsufficientGold {
            have: *gold,
            need: entry.price,
        });
    }
    if inventory.is_full() {
        return Err(TradeError::InventoryFull);
    }
    *gold -= entry.price;
    inventory.add(entry.item.clone());
    Ok(())
}

/// Pay a flat fee
pub fn pay(gold: &mut u64, price: u64) -> Result<(), TradeError> {
    if *gold < price {
        return Err(TradeError::InsufficientGold {
            have: *gold,
            need: price,
        });
    }
    *gold -= price;
    Ok(())
}

/// Fee for a role's service, None for roles without one
pub fn service_price(role: NpcRole) -> Option<u64> {
    match role {
        NpcRole::Inn => Some(10),
        NpcRole::Priest => Some(15),
        NpcRole::GuildRecruiter => Some(50),
        NpcRole::Blacksmith | NpcRole::Alchemist => None,
    }
}

/// Stock a role puts up for sale
pub fn stock_for(role: NpcRole) -> Option<Vec<StockEntry>> {
    let items = match role {
        NpcRole::Blacksmith => vec![
            Item::weapon(weapons::pickaxe()),
            Item::weapon(weapons::woodcutter_axe()),
            Item::weapon(weapons::iron_spear()),
        ],
        NpcRole::Alchemist => vec![
            Item::potion(Potion::Health),
            Item::potion(Potion::Mana),
            Item::material(Material::Hide),
        ],
        NpcRole::Inn | NpcRole::Priest | NpcRole::GuildRecruiter => return None,
    };
    Some(items.into_iter().map(StockEntry::from_item).collect())
}
