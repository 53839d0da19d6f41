//! Search filtering and row labels.

use crate::inventory::InventoryItem;

/// Items whose name contains `query`, ignoring case, in their original order.
///
/// An empty query matches everything.
pub fn filter_items<'a>(items: &'a [InventoryItem], query: &str) -> Vec<&'a InventoryItem> {
    if query.is_empty() {
        return items.iter().collect();
    }

    let needle = query.to_lowercase();
    items
        .iter()
        .filter(|item| item.name.to_lowercase().contains(&needle))
        .collect()
}

/// Row label for an item: first character upper-cased, the rest verbatim.
pub fn display_name(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
