//! Inventory - Named items with positive quantities, stored one document per item.
//!
//! Each item is a document in the `inventory` collection whose id is the item
//! name and whose body holds a `quantity` field. A quantity of zero is never
//! stored: the document is deleted instead.

mod policy;
mod store;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::document::DocumentError;

/// Default collection holding inventory documents.
pub const DEFAULT_COLLECTION: &str = "inventory";

/// Document field holding the item quantity.
pub const QUANTITY_FIELD: &str = "quantity";

/// An item and its count. `quantity` is always at least 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub name: String,
    pub quantity: u32,
}

impl InventoryItem {
    pub fn new(name: impl Into<String>, quantity: u32) -> Self {
        Self {
            name: name.into(),
            quantity,
        }
    }
}

/// The full contents of the collection as of the last listing, in listing order.
///
/// Only built from a listing, so every item has a quantity of at least 1.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    items: Vec<InventoryItem>,
}

impl Snapshot {
    /// Zero quantities are dropped: absence is how zero is represented.
    pub(crate) fn new(items: Vec<InventoryItem>) -> Self {
        Self {
            items: items.into_iter().filter(|item| item.quantity >= 1).collect(),
        }
    }

    pub fn items(&self) -> &[InventoryItem] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, InventoryItem> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Look up an item by exact (case-sensitive) name.
    pub fn get(&self, name: &str) -> Option<&InventoryItem> {
        self.items.iter().find(|item| item.name == name)
    }

    /// Quantity of `name`, or 0 when absent.
    pub fn quantity_of(&self, name: &str) -> u32 {
        self.get(name).map(|item| item.quantity).unwrap_or(0)
    }
}

impl<'a> IntoIterator for &'a Snapshot {
    type Item = &'a InventoryItem;
    type IntoIter = std::slice::Iter<'a, InventoryItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Error type for inventory operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InventoryError {
    /// A call to the document store failed.
    StoreUnavailable(DocumentError),
    /// Conditional writes kept losing to concurrent writers.
    Contention { name: String, attempts: u32 },
    /// The quantity cannot be represented after incrementing.
    QuantityOverflow { name: String },
}

impl fmt::Display for InventoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InventoryError::StoreUnavailable(err) => {
                write!(f, "inventory store unavailable: {}", err)
            }
            InventoryError::Contention { name, attempts } => write!(
                f,
                "gave up updating {:?} after {} conflicting attempts",
                name, attempts
            ),
            InventoryError::QuantityOverflow { name } => {
                write!(f, "quantity of {:?} cannot be incremented further", name)
            }
        }
    }
}

impl std::error::Error for InventoryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            InventoryError::StoreUnavailable(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DocumentError> for InventoryError {
    fn from(err: DocumentError) -> Self {
        InventoryError::StoreUnavailable(err)
    }
}

pub use policy::{Concurrency, MutationPolicy};
pub use store::InventoryStore;
