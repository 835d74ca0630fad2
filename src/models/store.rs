// Store model: an address with the set of items it stocks

use crate::models::{Item, TargetSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Represents a store where items can be bought.
///
/// The address doubles as the store's key within a single routing request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Store {
    /// Free-text address, unique within a request
    pub address: String,

    /// Items this store stocks
    #[serde(default)]
    pub inventory: BTreeSet<Item>,
}

impl Store {
    /// Creates a new store with the given address and inventory
    pub fn new<S, I, T>(address: S, items: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = T>,
        T: Into<Item>,
    {
        Self {
            address: address.into(),
            inventory: items.into_iter().map(Into::into).collect(),
        }
    }

    /// Checks if the store stocks a specific item
    pub fn stocks(&self, item: &Item) -> bool {
        self.inventory.contains(item)
    }

    /// Items from `needed` that this store can supply
    pub fn new_items(&self, needed: &TargetSet) -> BTreeSet<Item> {
        needed.intersection(&self.inventory).cloned().collect()
    }

    /// Number of items from `needed` that this store can supply
    pub fn count_new_items(&self, needed: &TargetSet) -> usize {
        needed.intersection(&self.inventory).count()
    }
}
