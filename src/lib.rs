mod config;
pub mod document;
mod inventory;
#[cfg(feature = "http")]
pub mod server;
mod view;

pub use config::{
    Config, ConfigError, ENV_ADDR, ENV_COLLECTION, ENV_CONCURRENCY, ENV_MAX_ATTEMPTS,
    ENV_WRITE_MODE,
};
#[cfg(feature = "http")]
pub use document::HttpDocumentStore;
pub use document::{
    Document, DocumentError, DocumentStore, Fields, InMemoryDocumentStore, Precondition, WriteMode,
};
pub use inventory::{
    Concurrency, InventoryError, InventoryItem, InventoryStore, MutationPolicy, Snapshot,
    DEFAULT_COLLECTION, QUANTITY_FIELD,
};
pub use view::{display_name, filter_items, EntryDialog, InventoryView, Row, ViewState};
