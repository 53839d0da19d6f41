//! DocumentStore - Abstract access to a remote document collection.

use std::sync::Arc;

use async_trait::async_trait;

use super::{Document, DocumentError, Fields, Precondition, WriteMode};

/// Abstract storage for documents keyed by `(collection, id)`.
///
/// Calls are independent: nothing spans a read and a later write, so a
/// read-modify-write is only safe when the write carries a `Precondition`.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// List every document in a collection, ordered by id.
    async fn list(&self, collection: &str) -> Result<Vec<Document>, DocumentError>;

    /// Get a document by id. Returns None if not found.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, DocumentError>;

    /// Write a document and return its new version.
    ///
    /// A missing document is created at version 1 in either mode.
    async fn set(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
        mode: WriteMode,
        precondition: Precondition,
    ) -> Result<u64, DocumentError>;

    /// Delete a document by id. Returns true if it existed.
    async fn delete(
        &self,
        collection: &str,
        id: &str,
        precondition: Precondition,
    ) -> Result<bool, DocumentError>;
}

#[async_trait]
impl<S: DocumentStore + ?Sized> DocumentStore for Arc<S> {
    async fn list(&self, collection: &str) -> Result<Vec<Document>, DocumentError> {
        (**self).list(collection).await
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, DocumentError> {
        (**self).get(collection, id).await
    }

    async fn set(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
        mode: WriteMode,
        precondition: Precondition,
    ) -> Result<u64, DocumentError> {
        (**self).set(collection, id, fields, mode, precondition).await
    }

    async fn delete(
        &self,
        collection: &str,
        id: &str,
        precondition: Precondition,
    ) -> Result<bool, DocumentError> {
        (**self).delete(collection, id, precondition).await
    }
}
