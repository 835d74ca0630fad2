// Item model: a normalized grocery item name

use serde::{Deserialize, Serialize};
use std::fmt;

/// A grocery item name, trimmed and lowercased.
///
/// Two items are equal only if their normalized names match exactly; no fuzzy
/// matching is done here.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Item(String);

impl Item {
    /// Creates a new item, normalizing the name
    pub fn new<S: AsRef<str>>(name: S) -> Self {
        Self(name.as_ref().trim().to_lowercase())
    }

    /// Like [`Item::new`] but rejects names that are blank after trimming
    pub fn parse<S: AsRef<str>>(name: S) -> Option<Self> {
        let item = Self::new(name);
        if item.0.is_empty() {
            None
        } else {
            Some(item)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for Item {
    fn from(name: String) -> Self {
        Item::new(name)
    }
}

impl From<&str> for Item {
    fn from(name: &str) -> Self {
        Item::new(name)
    }
}

impl From<Item> for String {
    fn from(item: Item) -> Self {
        item.0
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
