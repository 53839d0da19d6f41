//! View - The inventory list as a user sees and drives it.
//!
//! `InventoryView` owns the last fetched `Snapshot` and the search query.
//! Every action awaits its mutation, then re-fetches the whole collection, so
//! the snapshot is always the result of the latest successful listing. A
//! failed call leaves the previous snapshot in place.
//!
//! ## Example
//!
//! ```ignore
//! use stockroom::{InMemoryDocumentStore, InventoryStore, InventoryView};
//!
//! let mut view = InventoryView::new(InventoryStore::new(InMemoryDocumentStore::new()));
//! view.refresh().await?;
//! view.add_item("Apple").await?;
//! view.set_search_query("app");
//! assert_eq!(view.filtered_view().len(), 1);
//! ```

mod dialog;
mod filter;

use tracing::{debug, error};

use crate::document::DocumentStore;
use crate::inventory::{InventoryError, InventoryItem, InventoryStore, Snapshot};

pub use dialog::EntryDialog;
pub use filter::{display_name, filter_items};

/// Whether the view has completed its first fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    Uninitialized,
    Populated,
}

/// One displayed row of the filtered list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row<'a> {
    pub label: String,
    pub name: &'a str,
    pub quantity: u32,
}

pub struct InventoryView<S> {
    inventory: InventoryStore<S>,
    snapshot: Snapshot,
    query: String,
    state: ViewState,
    dialog: EntryDialog,
    last_error: Option<String>,
}

impl<S: DocumentStore> InventoryView<S> {
    /// An empty, not yet fetched view. Call `refresh` to populate it.
    pub fn new(inventory: InventoryStore<S>) -> Self {
        Self {
            inventory,
            snapshot: Snapshot::default(),
            query: String::new(),
            state: ViewState::Uninitialized,
            dialog: EntryDialog::default(),
            last_error: None,
        }
    }

    /// Replace the snapshot with a fresh listing.
    pub async fn refresh(&mut self) -> Result<(), InventoryError> {
        let result = self.inventory.list_all().await;
        let snapshot = self.record("refresh", result)?;

        debug!(items = snapshot.len(), "inventory refreshed");
        self.snapshot = snapshot;
        self.state = ViewState::Populated;
        self.last_error = None;
        Ok(())
    }

    /// Add one of `name` (creating it) and refresh.
    ///
    /// `name` is used verbatim as the document id, including empty or
    /// whitespace-only names.
    pub async fn add_item(&mut self, name: &str) -> Result<(), InventoryError> {
        let result = self.inventory.increment(name).await;
        self.record("add", result)?;
        self.refresh().await
    }

    /// Remove one of `name` (deleting it at zero) and refresh.
    pub async fn remove_item(&mut self, name: &str) -> Result<(), InventoryError> {
        let result = self.inventory.decrement(name).await;
        self.record("remove", result)?;
        self.refresh().await
    }

    /// Submit the entry dialog: clear and close it, then add the drafted name.
    pub async fn confirm_entry(&mut self) -> Result<(), InventoryError> {
        let name = self.dialog.submit();
        self.add_item(&name).await
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn search_query(&self) -> &str {
        &self.query
    }

    /// Snapshot items whose name contains the search query, ignoring case.
    pub fn filtered_view(&self) -> Vec<&InventoryItem> {
        filter_items(self.snapshot.items(), &self.query)
    }

    /// The filtered view with display labels.
    pub fn rows(&self) -> Vec<Row<'_>> {
        self.filtered_view()
            .into_iter()
            .map(|item| Row {
                label: display_name(&item.name),
                name: &item.name,
                quantity: item.quantity,
            })
            .collect()
    }

    /// Sum of quantities in the filtered view.
    pub fn total_quantity(&self) -> u64 {
        self.filtered_view()
            .iter()
            .map(|item| u64::from(item.quantity))
            .sum()
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn state(&self) -> ViewState {
        self.state
    }

    pub fn dialog(&self) -> &EntryDialog {
        &self.dialog
    }

    pub fn dialog_mut(&mut self) -> &mut EntryDialog {
        &mut self.dialog
    }

    /// Message of the last failed action, cleared by a successful refresh.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn inventory(&self) -> &InventoryStore<S> {
        &self.inventory
    }

    fn record<T>(
        &mut self,
        action: &'static str,
        result: Result<T, InventoryError>,
    ) -> Result<T, InventoryError> {
        if let Err(err) = &result {
            error!(action, error = %err, "inventory action failed");
            self.last_error = Some(err.to_string());
        }
        result
    }
}
