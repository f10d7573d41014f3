use super::{choice::Choice, ids::ItemId, UsageEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemType {
    Weapon,
    Armor,
    Accessory,
    Consumable,
}

impl Choice for ItemType {
    const VARIANTS: &'static [Self] = &[
        ItemType::Weapon,
        ItemType::Armor,
        ItemType::Accessory,
        ItemType::Consumable,
    ];

    fn code(&self) -> &'static str {
        match self {
            ItemType::Weapon => "WEAPON",
            ItemType::Armor => "ARMOR",
            ItemType::Accessory => "ACCESSORY",
            ItemType::Consumable => "CONSUMABLE",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub item_type: ItemType,
    pub description: String,
    pub price: i64,
    pub total_usage: Option<u64>,
}

impl UsageEntry for Item {
    fn name(&self) -> &str {
        &self.name
    }

    fn total_usage(&self) -> Option<u64> {
        self.total_usage
    }
}

/// Items preferred by the top `top_percent` percent of rankers
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TopPlayerItems {
    pub top_percent: u32,
    pub top_user_count: u64,
    pub items: Vec<Item>,
}
