//! Store failures leave the previous snapshot on screen.

use stockroom::{
    DocumentError, DocumentStore, InMemoryDocumentStore, InventoryError, InventoryItem,
    InventoryStore, InventoryView, ViewState,
};

use crate::support::{seed, FlakyStore};

async fn flaky_view(items: &[(&str, u32)]) -> (FlakyStore, InventoryView<FlakyStore>) {
    let inner = InMemoryDocumentStore::new();
    seed(&inner, items).await;
    let store = FlakyStore::new(inner);
    let mut view = InventoryView::new(InventoryStore::new(store.clone()));
    view.refresh().await.unwrap();
    (store, view)
}

#[tokio::test]
async fn failed_initial_refresh_stays_uninitialized() {
    let store = FlakyStore::new(InMemoryDocumentStore::new());
    store.set_offline(true);
    let mut view = InventoryView::new(InventoryStore::new(store.clone()));

    let err = view.refresh().await.unwrap_err();

    assert!(matches!(err, InventoryError::StoreUnavailable(DocumentError::Unavailable(_))));
    assert_eq!(view.state(), ViewState::Uninitialized);
    assert!(view.snapshot().is_empty());
    assert!(view.last_error().is_some());
}

#[tokio::test]
async fn failed_refresh_keeps_previous_snapshot() {
    let (store, mut view) = flaky_view(&[("foo", 2)]).await;
    seed(&store.inner, &[("bar", 1)]).await;

    store.set_offline(true);
    assert!(view.refresh().await.is_err());

    assert_eq!(view.snapshot().items(), &[InventoryItem::new("foo", 2)]);
    assert_eq!(view.state(), ViewState::Populated);
}

#[tokio::test]
async fn failed_mutation_skips_refresh() {
    let (store, mut view) = flaky_view(&[("foo", 2)]).await;
    store.set_fail_writes(true);

    let err = view.add_item("foo").await.unwrap_err();

    assert!(matches!(err, InventoryError::StoreUnavailable(_)));
    assert_eq!(view.snapshot().items(), &[InventoryItem::new("foo", 2)]);
    assert_eq!(
        view.last_error(),
        Some("inventory store unavailable: document store unavailable: write rejected")
    );

    let remaining = store.inner.list("inventory").await.unwrap();
    assert_eq!(remaining[0].fields["quantity"], 2);
}

#[tokio::test]
async fn successful_refresh_clears_last_error() {
    let (store, mut view) = flaky_view(&[("foo", 2)]).await;

    store.set_fail_writes(true);
    assert!(view.remove_item("foo").await.is_err());
    assert!(view.last_error().is_some());

    store.set_fail_writes(false);
    view.remove_item("foo").await.unwrap();

    assert!(view.last_error().is_none());
    assert_eq!(view.snapshot().items(), &[InventoryItem::new("foo", 1)]);
}

#[tokio::test]
async fn failed_confirm_still_clears_and_closes_dialog() {
    let (store, mut view) = flaky_view(&[("foo", 2)]).await;
    view.dialog_mut().open();
    view.dialog_mut().set_draft("bolts");

    store.set_fail_writes(true);
    assert!(view.confirm_entry().await.is_err());

    assert!(!view.dialog().is_open());
    assert_eq!(view.dialog().draft(), "");
    assert_eq!(view.snapshot().items(), &[InventoryItem::new("foo", 2)]);
    assert!(view.last_error().is_some());
}
