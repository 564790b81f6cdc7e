//! Item shape and the narrow inventory interface the progression core needs.
use serde::{Deserialize, Serialize};

use crate::loot::Rarity;

/// An item as seen by the progression core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ItemData")]
pub struct Item {
    pub id: String,
    pub name: String,
    pub rarity: Rarity,
    /// Identifying tag; champion keys carry their boss's key id here.
    /// Defaults to the id when omitted.
    pub tag: String,
}

#[derive(Deserialize)]
struct ItemData {
    id: String,
    name: String,
    #[serde(default)]
    rarity: Rarity,
    #[serde(default)]
    tag: Option<String>,
}

impl From<ItemData> for Item {
    fn from(data: ItemData) -> Self {
        let tag = data.tag.unwrap_or_else(|| data.id.clone());
        Self {
            id: data.id,
            name: data.name,
            rarity: data.rarity,
            tag,
        }
    }
}

impl Item {
    #[must_use]
    pub fn new(id: &str, name: &str, rarity: Rarity) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            rarity,
            tag: id.to_string(),
        }
    }

    /// Champion key item for a boss key id.
    #[must_use]
    pub fn champion_key(key_id: &str, boss_name: &str) -> Self {
        Self {
            id: key_id.to_string(),
            name: format!("Key of {boss_name}"),
            rarity: Rarity::Legendary,
            tag: key_id.to_string(),
        }
    }
}

/// Inventory storage owned outside the core.
pub trait KeyInventory {
    /// Number of held items satisfying `predicate`.
    fn count_matching(&self, predicate: &dyn Fn(&Item) -> bool) -> usize;

    /// Remove one item satisfying `predicate`, returning it when found.
    fn remove_one_matching(&mut self, predicate: &dyn Fn(&Item) -> bool) -> Option<Item>;

    /// Hand an item to the inventory: drops, or keys returned after an
    /// aborted gate unlock.
    fn insert(&mut self, item: Item);
}

/// Plain in-memory bag of items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Satchel {
    items: Vec<Item>,
}

impl Satchel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, item: Item) {
        self.items.push(item);
    }

    pub fn extend(&mut self, items: impl IntoIterator<Item = Item>) {
        self.items.extend(items);
    }

    #[must_use]
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl KeyInventory for Satchel {
    fn count_matching(&self, predicate: &dyn Fn(&Item) -> bool) -> usize {
        self.items.iter().filter(|item| predicate(item)).count()
    }

    fn remove_one_matching(&mut self, predicate: &dyn Fn(&Item) -> bool) -> Option<Item> {
        let idx = self.items.iter().position(|item| predicate(item))?;
        Some(self.items.remove(idx))
    }

    fn insert(&mut self, item: Item) {
        self.items.push(item);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn satchel_counts_and_removes_by_tag() {
        let mut satchel = Satchel::new();
        satchel.add(Item::champion_key("key_flame_warden", "the Flame Warden"));
        satchel.add(Item::new("ember_shard", "Ember Shard", Rarity::Common));
        satchel.add(Item::champion_key("key_flame_warden", "the Flame Warden"));

        let is_key = |item: &Item| item.tag == "key_flame_warden";
        assert_eq!(satchel.count_matching(&is_key), 2);
        let removed = satchel.remove_one_matching(&is_key).unwrap();
        assert_eq!(removed.tag, "key_flame_warden");
        assert_eq!(satchel.count_matching(&is_key), 1);
        assert!(satchel.remove_one_matching(&|item| item.tag == "missing").is_none());
        assert_eq!(satchel.len(), 2);
    }

    #[test]
    fn untagged_items_are_tagged_by_id() {
        let untagged = r#"{"id": "key_flame_warden", "name": "Warden Key"}"#;
        let key: Item = serde_json::from_str(untagged).unwrap();
        assert_eq!(key.tag, "key_flame_warden");
        assert_eq!(key.rarity, Rarity::Unknown);

        let tagged = r#"{"id": "copy", "name": "Copy", "tag": "key_frost_matron"}"#;
        let copy: Item = serde_json::from_str(tagged).unwrap();
        assert_eq!(copy.tag, "key_frost_matron");

        let parsed: Item = serde_json::from_str(&serde_json::to_string(&key).unwrap()).unwrap();
        assert_eq!(parsed, key);
    }
}
