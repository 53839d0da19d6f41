//! Documents - Keyed JSON records grouped into named collections.
//!
//! A `DocumentStore` is the only boundary to the backing database. It knows
//! nothing about inventory: it lists, reads, writes and deletes documents by
//! `(collection, id)`, and every document carries a version that conditional
//! writes can be keyed on.
//!
//! ## Example
//!
//! ```ignore
//! use stockroom::document::{DocumentStore, InMemoryDocumentStore, Precondition, WriteMode};
//! use serde_json::json;
//!
//! let store = InMemoryDocumentStore::new();
//! let fields = json!({ "quantity": 1 }).as_object().cloned().unwrap();
//! let version = store
//!     .set("inventory", "apple", fields, WriteMode::Overwrite, Precondition::Missing)
//!     .await?;
//! assert_eq!(version, 1);
//! ```

#[cfg(feature = "http")]
mod http;
mod in_memory;
mod store;
#[cfg(feature = "http")]
pub(crate) mod wire;

use std::fmt;

use serde::{Deserialize, Serialize};

/// Body of a document: a JSON object.
pub type Fields = serde_json::Map<String, serde_json::Value>;

/// A document as returned by a store listing or lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
    pub version: u64,
}

/// How a write combines the given fields with an existing document body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    /// The body is replaced by the given fields; anything else is dropped.
    Overwrite,
    /// The given fields are set; other fields on the document are kept.
    Merge,
}

/// Condition a write or delete must satisfy against the stored document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "version", rename_all = "snake_case")]
pub enum Precondition {
    /// No condition.
    #[default]
    Any,
    /// The document must exist.
    Exists,
    /// The document must not exist.
    Missing,
    /// The document must exist at exactly this version.
    Version(u64),
}

impl Precondition {
    /// Whether the condition holds for a document currently at `current`
    /// (`None` when the document does not exist).
    pub fn holds(&self, current: Option<u64>) -> bool {
        match (self, current) {
            (Precondition::Any, _) => true,
            (Precondition::Exists, current) => current.is_some(),
            (Precondition::Missing, current) => current.is_none(),
            (Precondition::Version(expected), Some(actual)) => *expected == actual,
            (Precondition::Version(_), None) => false,
        }
    }
}

impl fmt::Display for Precondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Precondition::Any => write!(f, "any"),
            Precondition::Exists => write!(f, "exists"),
            Precondition::Missing => write!(f, "missing"),
            Precondition::Version(version) => write!(f, "version {}", version),
        }
    }
}

/// Error type for document store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    /// The store could not be reached or failed to complete the call.
    Unavailable(String),
    /// A conditional write or delete found the document in another state.
    PreconditionFailed {
        collection: String,
        id: String,
        expected: Precondition,
        actual: Option<u64>,
    },
    /// Serialization/deserialization error.
    Serde(String),
    /// The collection or document id could not be decoded.
    InvalidId(String),
}

impl fmt::Display for DocumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentError::Unavailable(msg) => write!(f, "document store unavailable: {}", msg),
            DocumentError::PreconditionFailed {
                collection,
                id,
                expected,
                actual,
            } => match actual {
                Some(actual) => write!(
                    f,
                    "precondition failed on {}:{} (expected {}, actual version {})",
                    collection, id, expected, actual
                ),
                None => write!(
                    f,
                    "precondition failed on {}:{} (expected {}, document missing)",
                    collection, id, expected
                ),
            },
            DocumentError::Serde(msg) => write!(f, "document serialization error: {}", msg),
            DocumentError::InvalidId(msg) => write!(f, "invalid document id: {}", msg),
        }
    }
}

impl std::error::Error for DocumentError {}

impl From<serde_json::Error> for DocumentError {
    fn from(err: serde_json::Error) -> Self {
        DocumentError::Serde(err.to_string())
    }
}

#[cfg(feature = "http")]
pub use http::HttpDocumentStore;
pub use in_memory::InMemoryDocumentStore;
pub use store::DocumentStore;
