//! InMemoryDocumentStore - BTreeMap-backed document store for tests, development
//! and the bundled document service.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use super::{Document, DocumentError, DocumentStore, Fields, Precondition, WriteMode};

/// Internal stored representation of a document.
struct StoredDocument {
    fields: Fields,
    version: u64,
}

type Collection = BTreeMap<String, StoredDocument>;

/// In-memory document store.
///
/// Collections are created on first write. Documents are kept ordered by id,
/// so listings are deterministic. Clone-friendly via Arc.
#[derive(Clone)]
pub struct InMemoryDocumentStore {
    collections: Arc<RwLock<HashMap<String, Collection>>>,
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryDocumentStore {
    /// Create a new empty document store.
    pub fn new() -> Self {
        Self {
            collections: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Number of documents in a collection.
    pub fn len(&self, collection: &str) -> Result<usize, DocumentError> {
        let collections = self
            .collections
            .read()
            .map_err(|_| DocumentError::Unavailable("lock poisoned".into()))?;
        Ok(collections.get(collection).map(BTreeMap::len).unwrap_or(0))
    }

    fn failed(
        collection: &str,
        id: &str,
        expected: Precondition,
        actual: Option<u64>,
    ) -> DocumentError {
        DocumentError::PreconditionFailed {
            collection: collection.to_string(),
            id: id.to_string(),
            expected,
            actual,
        }
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn list(&self, collection: &str) -> Result<Vec<Document>, DocumentError> {
        let collections = self
            .collections
            .read()
            .map_err(|_| DocumentError::Unavailable("lock poisoned".into()))?;

        let documents = match collections.get(collection) {
            Some(documents) => documents
                .iter()
                .map(|(id, stored)| Document {
                    id: id.clone(),
                    fields: stored.fields.clone(),
                    version: stored.version,
                })
                .collect(),
            None => Vec::new(),
        };

        Ok(documents)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, DocumentError> {
        let collections = self
            .collections
            .read()
            .map_err(|_| DocumentError::Unavailable("lock poisoned".into()))?;

        Ok(collections
            .get(collection)
            .and_then(|documents| documents.get(id))
            .map(|stored| Document {
                id: id.to_string(),
                fields: stored.fields.clone(),
                version: stored.version,
            }))
    }

    async fn set(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
        mode: WriteMode,
        precondition: Precondition,
    ) -> Result<u64, DocumentError> {
        let mut collections = self
            .collections
            .write()
            .map_err(|_| DocumentError::Unavailable("lock poisoned".into()))?;

        let documents = collections.entry(collection.to_string()).or_default();
        let current = documents.get_mut(id);
        let actual = current.as_ref().map(|stored| stored.version);

        if !precondition.holds(actual) {
            return Err(Self::failed(collection, id, precondition, actual));
        }

        match current {
            Some(stored) => {
                match mode {
                    WriteMode::Overwrite => stored.fields = fields,
                    WriteMode::Merge => stored.fields.extend(fields),
                }
                stored.version += 1;
                Ok(stored.version)
            }
            None => {
                documents.insert(id.to_string(), StoredDocument { fields, version: 1 });
                Ok(1)
            }
        }
    }

    async fn delete(
        &self,
        collection: &str,
        id: &str,
        precondition: Precondition,
    ) -> Result<bool, DocumentError> {
        let mut collections = self
            .collections
            .write()
            .map_err(|_| DocumentError::Unavailable("lock poisoned".into()))?;

        let actual = collections
            .get(collection)
            .and_then(|documents| documents.get(id))
            .map(|stored| stored.version);

        if !precondition.holds(actual) {
            return Err(Self::failed(collection, id, precondition, actual));
        }

        Ok(collections
            .get_mut(collection)
            .and_then(|documents| documents.remove(id))
            .is_some())
    }
}
