// Grocery list model: the set of items a shopper wants to acquire

use crate::models::{Item, Store, TargetSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Represents a customer's grocery list as a set of normalized items
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroceryList {
    pub items: TargetSet,
}

impl GroceryList {
    /// Creates a new empty grocery list
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a comma-separated list such as a vision model's answer
    /// ("Apples, milk ,eggs"). Blank entries are dropped, duplicates merged.
    pub fn parse(text: &str) -> Self {
        text.split(',').filter_map(Item::parse).collect()
    }

    /// Adds an item; blank names are ignored
    pub fn add_item<S: AsRef<str>>(&mut self, name: S) {
        if let Some(item) = Item::parse(name) {
            self.items.insert(item);
        }
    }

    pub fn remove_item(&mut self, item: &Item) {
        self.items.remove(item);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items that no store in `stores` stocks
    pub fn uncoverable_items(&self, stores: &[Store]) -> BTreeSet<Item> {
        self.items
            .iter()
            .filter(|item| !stores.iter().any(|store| store.stocks(item)))
            .cloned()
            .collect()
    }

    /// Checks if the union of the given inventories contains every item
    pub fn can_be_covered_by(&self, stores: &[Store]) -> bool {
        self.uncoverable_items(stores).is_empty()
    }

    /// Returns the stores that stock at least one item from the list,
    /// keeping the input order
    pub fn find_relevant_stores<'a>(&self, stores: &'a [Store]) -> Vec<&'a Store> {
        stores
            .iter()
            .filter(|store| self.items.iter().any(|item| store.stocks(item)))
            .collect()
    }

    pub fn into_target_set(self) -> TargetSet {
        self.items
    }
}

impl FromIterator<Item> for GroceryList {
    fn from_iter<I: IntoIterator<Item = Item>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl<'a> FromIterator<&'a String> for GroceryList {
    fn from_iter<I: IntoIterator<Item = &'a String>>(iter: I) -> Self {
        let mut list = GroceryList::new();
        for name in iter {
            list.add_item(name);
        }
        list
    }
}
