//! Read-then-write races between clients mutating the same item.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use stockroom::{
    Concurrency, Document, DocumentError, DocumentStore, Fields, InMemoryDocumentStore,
    InventoryError, InventoryStore, MutationPolicy, Precondition, WriteMode,
};

use crate::support::{seed, FlakyStore};

/// Lets another client write `(name, quantity)` between our read and our
/// first write.
#[derive(Clone)]
struct IntrudingStore {
    inner: InMemoryDocumentStore,
    intrusion: Arc<Mutex<Option<(String, u32)>>>,
}

impl IntrudingStore {
    fn new(inner: InMemoryDocumentStore, name: &str, quantity: u32) -> Self {
        Self {
            inner,
            intrusion: Arc::new(Mutex::new(Some((name.to_string(), quantity)))),
        }
    }

    async fn intrude(&self, collection: &str) {
        let pending = self.intrusion.lock().unwrap().take();
        if let Some((name, quantity)) = pending {
            let mut fields = Fields::new();
            fields.insert("quantity".into(), Value::from(quantity));
            self.inner
                .set(collection, &name, fields, WriteMode::Overwrite, Precondition::Any)
                .await
                .unwrap();
        }
    }
}

#[async_trait]
impl DocumentStore for IntrudingStore {
    async fn list(&self, collection: &str) -> Result<Vec<Document>, DocumentError> {
        self.inner.list(collection).await
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, DocumentError> {
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
        self.intrude(collection).await;
        self.inner.set(collection, id, fields, mode, precondition).await
    }

    async fn delete(
        &self,
        collection: &str,
        id: &str,
        precondition: Precondition,
    ) -> Result<bool, DocumentError> {
        self.intrude(collection).await;
        self.inner.delete(collection, id, precondition).await
    }
}

#[tokio::test]
async fn unguarded_increment_loses_concurrent_update() {
    let docs = InMemoryDocumentStore::new();
    seed(&docs, &[("foo", 1)]).await;
    let inventory = InventoryStore::new(IntrudingStore::new(docs.clone(), "foo", 5))
        .with_policy(MutationPolicy::legacy());

    assert_eq!(inventory.increment("foo").await.unwrap(), 2);

    let item = InventoryStore::new(docs).get("foo").await.unwrap().unwrap();
    assert_eq!(item.quantity, 2);
}

#[tokio::test]
async fn optimistic_increment_retries_on_concurrent_update() {
    let docs = InMemoryDocumentStore::new();
    seed(&docs, &[("foo", 1)]).await;
    let inventory = InventoryStore::new(IntrudingStore::new(docs.clone(), "foo", 5));

    assert_eq!(inventory.increment("foo").await.unwrap(), 6);

    let item = InventoryStore::new(docs).get("foo").await.unwrap().unwrap();
    assert_eq!(item.quantity, 6);
}

#[tokio::test]
async fn optimistic_decrement_does_not_delete_restocked_item() {
    let docs = InMemoryDocumentStore::new();
    seed(&docs, &[("foo", 1)]).await;
    let inventory = InventoryStore::new(IntrudingStore::new(docs.clone(), "foo", 3));

    assert_eq!(inventory.decrement("foo").await.unwrap(), Some(2));
}

#[tokio::test]
async fn optimistic_creation_conflicts_with_concurrent_creation() {
    let docs = InMemoryDocumentStore::new();
    let inventory = InventoryStore::new(IntrudingStore::new(docs.clone(), "foo", 1));

    assert_eq!(inventory.increment("foo").await.unwrap(), 2);
}

#[tokio::test]
async fn retries_read_again_before_each_write() {
    let docs = InMemoryDocumentStore::new();
    seed(&docs, &[("foo", 1)]).await;
    let store = FlakyStore::new(docs);
    store.inject_conflicts(2);
    let inventory = InventoryStore::new(store.clone());

    assert_eq!(inventory.increment("foo").await.unwrap(), 2);

    assert_eq!(store.gets.load(std::sync::atomic::Ordering::SeqCst), 3);
    assert_eq!(
        store.recorded(),
        vec![Precondition::Version(1); 3]
    );
}

#[tokio::test]
async fn gives_up_after_max_attempts() {
    let docs = InMemoryDocumentStore::new();
    seed(&docs, &[("foo", 4)]).await;
    let store = FlakyStore::new(docs.clone());
    store.inject_conflicts(10);
    let policy = MutationPolicy::default().with_max_attempts(3);
    let inventory = InventoryStore::new(store.clone()).with_policy(policy);

    let err = inventory.decrement("foo").await.unwrap_err();

    assert_eq!(
        err,
        InventoryError::Contention {
            name: "foo".into(),
            attempts: 3
        }
    );
    assert_eq!(store.recorded().len(), 3);
    assert_eq!(InventoryStore::new(docs).get("foo").await.unwrap().unwrap().quantity, 4);
}

#[tokio::test]
async fn unguarded_policy_writes_without_preconditions() {
    let store = FlakyStore::new(InMemoryDocumentStore::new());
    let inventory = InventoryStore::new(store.clone()).with_policy(
        MutationPolicy::default().with_concurrency(Concurrency::Unguarded),
    );

    inventory.increment("foo").await.unwrap();
    inventory.increment("foo").await.unwrap();
    inventory.decrement("foo").await.unwrap();
    inventory.decrement("foo").await.unwrap();

    assert_eq!(store.recorded(), vec![Precondition::Any; 4]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn parallel_optimistic_increments_are_all_counted() {
    let docs = InMemoryDocumentStore::new();
    let inventory = Arc::new(
        InventoryStore::new(docs.clone())
            .with_policy(MutationPolicy::default().with_max_attempts(1_000)),
    );

    let mut handles = Vec::new();
    for _ in 0..8 {
        let inventory = inventory.clone();
        handles.push(tokio::spawn(async move {
            for _ in 0..25 {
                inventory.increment("bolts").await.unwrap();
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let item = inventory.get("bolts").await.unwrap().unwrap();
    assert_eq!(item.quantity, 200);
}
