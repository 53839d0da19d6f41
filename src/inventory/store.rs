//! InventoryStore - The add/remove quantity protocol over a document collection.

use serde_json::Value;
use tracing::{debug, warn};

use super::{
    InventoryError, InventoryItem, MutationPolicy, Snapshot, DEFAULT_COLLECTION, QUANTITY_FIELD,
};
use crate::config::Config;
use crate::document::{Document, DocumentError, DocumentStore, Fields};

/// Adapter between inventory operations and a `DocumentStore`.
///
/// Every operation is a read followed by at most one write or delete. Under
/// [`Concurrency::Optimistic`] the write is conditional on the version that was
/// read and the pair is retried on conflict; under [`Concurrency::Unguarded`]
/// two concurrent mutations of the same item can lose an update.
///
/// [`Concurrency::Optimistic`]: super::Concurrency::Optimistic
/// [`Concurrency::Unguarded`]: super::Concurrency::Unguarded
pub struct InventoryStore<S> {
    store: S,
    collection: String,
    policy: MutationPolicy,
}

impl<S: DocumentStore> InventoryStore<S> {
    /// Adapter over the `inventory` collection with the default policy.
    pub fn new(store: S) -> Self {
        Self::with_collection(store, DEFAULT_COLLECTION)
    }

    pub fn with_collection(store: S, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
            policy: MutationPolicy::default(),
        }
    }

    /// Adapter configured from `Config` (collection and mutation policy).
    pub fn from_config(store: S, config: &Config) -> Self {
        Self::with_collection(store, config.collection.clone()).with_policy(config.policy)
    }

    pub fn with_policy(mut self, policy: MutationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn policy(&self) -> &MutationPolicy {
        &self.policy
    }

    /// Access the inner store.
    pub fn inner(&self) -> &S {
        &self.store
    }

    /// Fetch every item in the collection, in listing order.
    ///
    /// Documents without a usable `quantity` are skipped.
    pub async fn list_all(&self) -> Result<Snapshot, InventoryError> {
        let documents = self.store.list(&self.collection).await?;
        let items = documents.into_iter().filter_map(to_item).collect();
        Ok(Snapshot::new(items))
    }

    /// Fetch a single item by name.
    pub async fn get(&self, name: &str) -> Result<Option<InventoryItem>, InventoryError> {
        let document = self.store.get(&self.collection, name).await?;
        Ok(document.and_then(to_item))
    }

    /// Add one to `name`, creating it at 1 when absent. Returns the new quantity.
    pub async fn increment(&self, name: &str) -> Result<u32, InventoryError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let current = self.store.get(&self.collection, name).await?;
            let version = current.as_ref().map(|doc| doc.version);
            let existing = current.as_ref().and_then(|doc| quantity_of(&doc.fields));

            let next = match existing {
                Some(quantity) => quantity
                    .checked_add(1)
                    .ok_or_else(|| InventoryError::QuantityOverflow {
                        name: name.to_string(),
                    })?,
                None => 1,
            };

            let result = self
                .store
                .set(
                    &self.collection,
                    name,
                    quantity_fields(next),
                    self.policy.write_mode,
                    self.policy.precondition_for(version),
                )
                .await;

            match result {
                Ok(_) => {
                    debug!(name, from = existing.unwrap_or(0), to = next, "incremented");
                    return Ok(next);
                }
                Err(err) => self.retry_or_fail(name, attempt, err)?,
            }
        }
    }

    /// Take one from `name`, deleting it when the last one goes.
    ///
    /// Returns the remaining quantity, or `None` when no record is left. An
    /// absent item is a no-op.
    pub async fn decrement(&self, name: &str) -> Result<Option<u32>, InventoryError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let Some(current) = self.store.get(&self.collection, name).await? else {
                debug!(name, "decrement of absent item ignored");
                return Ok(None);
            };
            let Some(quantity) = quantity_of(&current.fields) else {
                warn!(name, "decrement of item without a usable quantity ignored");
                return Ok(None);
            };

            let precondition = self.policy.precondition_for(Some(current.version));
            let result = if quantity == 1 {
                self.store
                    .delete(&self.collection, name, precondition)
                    .await
                    .map(|_| None)
            } else {
                self.store
                    .set(
                        &self.collection,
                        name,
                        quantity_fields(quantity - 1),
                        self.policy.write_mode,
                        precondition,
                    )
                    .await
                    .map(|_| Some(quantity - 1))
            };

            match result {
                Ok(remaining) => {
                    debug!(name, from = quantity, to = remaining.unwrap_or(0), "decremented");
                    return Ok(remaining);
                }
                Err(err) => self.retry_or_fail(name, attempt, err)?,
            }
        }
    }

    /// `Ok(())` when a conflicted mutation should be retried.
    fn retry_or_fail(
        &self,
        name: &str,
        attempt: u32,
        err: DocumentError,
    ) -> Result<(), InventoryError> {
        match err {
            DocumentError::PreconditionFailed { .. } if attempt < self.policy.attempts() => {
                warn!(name, attempt, "concurrent update detected, retrying");
                Ok(())
            }
            DocumentError::PreconditionFailed { .. } => Err(InventoryError::Contention {
                name: name.to_string(),
                attempts: attempt,
            }),
            err => Err(err.into()),
        }
    }
}

fn quantity_fields(quantity: u32) -> Fields {
    let mut fields = Fields::new();
    fields.insert(QUANTITY_FIELD.to_string(), Value::from(quantity));
    fields
}

/// A positive integral `quantity`, accepting whole floats (`3.0`).
fn quantity_of(fields: &Fields) -> Option<u32> {
    let value = fields.get(QUANTITY_FIELD)?;
    let raw = value.as_u64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.fract() == 0.0 && *f >= 0.0 && *f <= u32::MAX as f64)
            .map(|f| f as u64)
    })?;
    u32::try_from(raw).ok().filter(|quantity| *quantity >= 1)
}

fn to_item(document: Document) -> Option<InventoryItem> {
    match quantity_of(&document.fields) {
        Some(quantity) => Some(InventoryItem {
            name: document.id,
            quantity,
        }),
        None => {
            warn!(name = %document.id, "skipping inventory document without a usable quantity");
            None
        }
    }
}
