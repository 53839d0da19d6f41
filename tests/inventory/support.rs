//! Test doubles wrapping the in-memory document store.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use stockroom::{
    Document, DocumentError, DocumentStore, Fields, InMemoryDocumentStore, InventoryStore,
    InventoryView, Precondition, WriteMode, DEFAULT_COLLECTION,
};

/// Seed `(name, quantity)` records directly through the document store.
pub async fn seed(store: &InMemoryDocumentStore, items: &[(&str, u32)]) {
    for (name, quantity) in items {
        let mut fields = Fields::new();
        fields.insert("quantity".into(), Value::from(*quantity));
        store
            .set(DEFAULT_COLLECTION, name, fields, WriteMode::Overwrite, Precondition::Any)
            .await
            .unwrap();
    }
}

/// A populated view over a seeded in-memory store.
pub async fn seeded_view(items: &[(&str, u32)]) -> InventoryView<InMemoryDocumentStore> {
    let store = InMemoryDocumentStore::new();
    seed(&store, items).await;
    let mut view = InventoryView::new(InventoryStore::new(store));
    view.refresh().await.unwrap();
    view
}

/// Store whose calls can be switched to fail, and which records every
/// precondition it is handed.
#[derive(Clone, Default)]
pub struct FlakyStore {
    pub inner: InMemoryDocumentStore,
    offline: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
    conflicts: Arc<AtomicUsize>,
    pub gets: Arc<AtomicUsize>,
    pub preconditions: Arc<Mutex<Vec<Precondition>>>,
}

impl FlakyStore {
    pub fn new(inner: InMemoryDocumentStore) -> Self {
        Self {
            inner,
            ..Default::default()
        }
    }

    /// Fail every call with `Unavailable`.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Fail only writes and deletes with `Unavailable`.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Answer the next `n` writes/deletes with a precondition failure.
    pub fn inject_conflicts(&self, n: usize) {
        self.conflicts.store(n, Ordering::SeqCst);
    }

    pub fn recorded(&self) -> Vec<Precondition> {
        self.preconditions.lock().unwrap().clone()
    }

    fn check_online(&self) -> Result<(), DocumentError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(DocumentError::Unavailable("network down".into()));
        }
        Ok(())
    }

    fn check_write(
        &self,
        collection: &str,
        id: &str,
        precondition: Precondition,
    ) -> Result<(), DocumentError> {
        self.check_online()?;
        self.preconditions.lock().unwrap().push(precondition);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DocumentError::Unavailable("write rejected".into()));
        }
        let injected = self
            .conflicts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if injected {
            return Err(DocumentError::PreconditionFailed {
                collection: collection.to_string(),
                id: id.to_string(),
                expected: precondition,
                actual: None,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for FlakyStore {
    async fn list(&self, collection: &str) -> Result<Vec<Document>, DocumentError> {
        self.check_online()?;
        self.inner.list(collection).await
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, DocumentError> {
        self.check_online()?;
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.inner.get(collection, id).await
    }

    async fn set(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
        mode: WriteMode,
        precondition: Precondition,
    ) -> Result<u64, DocumentError> {
        self.check_write(collection, id, precondition)?;
        self.inner.set(collection, id, fields, mode, precondition).await
    }

    async fn delete(
        &self,
        collection: &str,
        id: &str,
        precondition: Precondition,
    ) -> Result<bool, DocumentError> {
        self.check_write(collection, id, precondition)?;
        self.inner.delete(collection, id, precondition).await
    }
}
