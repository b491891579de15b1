//! Store faults during placement, and restarts from persisted state.

mod common;

use actor_framework::mock::FlakyStore;
use actor_framework::{ActorClient, MemoryStore, Store, StoreError};
use async_trait::async_trait;
use chrono::NaiveDate;
use common::{artwork, customer, is_available, start_with};
use gallery_checkout::lifecycle::Stores;
use gallery_checkout::model::{CatalogItem, ItemId, Order, OrderId, PlaceOrderRequest};
use gallery_checkout::order_actor::OrderError;
use rust_decimal_macros::dec;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

fn cart(ids: &[ItemId]) -> PlaceOrderRequest {
    PlaceOrderRequest::for_items(ids, "Via Roma 1, Turin", "bank transfer")
}

/// Counter store whose writes take `delay`, then succeed or fail.
struct SlowCounters {
    inner: MemoryStore<NaiveDate, u32>,
    delay: Duration,
    fail: bool,
}

impl SlowCounters {
    fn new(delay: Duration, fail: bool) -> Self {
        Self {
            inner: MemoryStore::new(),
            delay,
            fail,
        }
    }
}

#[async_trait]
impl Store<NaiveDate, u32> for SlowCounters {
    async fn load(&self) -> Result<Vec<(NaiveDate, u32)>, StoreError> {
        self.inner.load().await
    }

    async fn put(&self, records: Vec<(NaiveDate, u32)>) -> Result<(), StoreError> {
        tokio::time::sleep(self.delay).await;
        if self.fail {
            return Err(StoreError::Unavailable("counter disk gone".into()));
        }
        self.inner.put(records).await
    }

    async fn delete(&self, key: NaiveDate) -> Result<(), StoreError> {
        self.inner.delete(key).await
    }
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("gallery-checkout-{}-{}", std::process::id(), name));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

#[tokio::test]
async fn test_order_write_failure_releases_items() {
    let orders = FlakyStore::<OrderId, Order>::new();
    let mut stores = Stores::in_memory();
    stores.orders = Arc::new(orders.clone());
    let system = start_with(stores).await;

    let alice = customer(&system, "alice").await;
    let a = artwork(&system, "Harbour at Dusk", dec!(100)).await;
    let b = artwork(&system, "Blue Study", dec!(50)).await;

    orders.fail_writes(true);
    let result = system.checkout.place_order(&alice, cart(&[a, b])).await;

    let err = result.unwrap_err();
    assert!(matches!(err, OrderError::PersistenceFailed(_)), "got {err:?}");
    assert!(err.is_retryable());
    assert!(is_available(&system, a).await);
    assert!(is_available(&system, b).await);
    assert!(orders.records().is_empty());

    // The retry succeeds; the number consumed by the failed attempt is not reused
    orders.fail_writes(false);
    let order = system.checkout.place_order(&alice, cart(&[a, b])).await.unwrap();
    assert_eq!(order.invoice_number.to_string(), "INV-20261019-002");
    assert_eq!(orders.records().len(), 1);

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_sequencer_failure_releases_items() {
    let counters = FlakyStore::<NaiveDate, u32>::new();
    let mut stores = Stores::in_memory();
    stores.counters = Arc::new(counters.clone());
    let system = start_with(stores).await;

    let alice = customer(&system, "alice").await;
    let item = artwork(&system, "Salt Flats", dec!(225)).await;

    counters.fail_writes(true);
    let err = system
        .checkout
        .place_order(&alice, cart(&[item]))
        .await
        .unwrap_err();

    assert!(matches!(err, OrderError::SequencerUnavailable(_)), "got {err:?}");
    assert!(err.is_retryable());
    assert!(is_available(&system, item).await);
    assert!(system.checkout.list_orders(&alice).await.unwrap().is_empty());

    counters.fail_writes(false);
    let order = system.checkout.place_order(&alice, cart(&[item])).await.unwrap();
    assert_eq!(order.invoice_number.sequence(), 1);

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_catalog_write_failure_claims_nothing() {
    let catalog = FlakyStore::<ItemId, CatalogItem>::new();
    let mut stores = Stores::in_memory();
    stores.catalog = Arc::new(catalog.clone());
    let system = start_with(stores).await;

    let alice = customer(&system, "alice").await;
    let a = artwork(&system, "One", dec!(10)).await;
    let b = artwork(&system, "Two", dec!(20)).await;

    catalog.fail_writes(true);
    let err = system
        .checkout
        .place_order(&alice, cart(&[a, b]))
        .await
        .unwrap_err();

    assert!(matches!(err, OrderError::ReservationFailed(_)), "got {err:?}");
    assert!(err.is_retryable());
    assert!(is_available(&system, a).await);
    assert!(is_available(&system, b).await);
    assert!(catalog.records().values().all(|item| item.reserved_by.is_none()));

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_abandoned_placement_still_records_the_order() {
    let mut stores = Stores::in_memory();
    stores.counters = Arc::new(SlowCounters::new(Duration::from_millis(300), false));
    let system = start_with(stores).await;

    let alice = customer(&system, "alice").await;
    let item = artwork(&system, "Harbour at Dusk", dec!(100)).await;

    let gave_up = tokio::time::timeout(
        Duration::from_millis(50),
        system.checkout.place_order(&alice, cart(&[item])),
    )
    .await;
    assert!(gave_up.is_err(), "numbering should still be in flight");

    tokio::time::sleep(Duration::from_secs(1)).await;

    let orders = system.checkout.list_orders(&alice).await.unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].item_ids(), vec![item]);
    let held = system.catalog_client.get(item).await.unwrap().unwrap();
    assert!(!held.available);
    assert_eq!(held.reserved_by, Some(orders[0].reservation_id));

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_abandoned_placement_that_fails_releases_items() {
    let mut stores = Stores::in_memory();
    stores.counters = Arc::new(SlowCounters::new(Duration::from_millis(300), true));
    let system = start_with(stores).await;

    let alice = customer(&system, "alice").await;
    let item = artwork(&system, "Blue Study", dec!(50)).await;

    let gave_up = tokio::time::timeout(
        Duration::from_millis(50),
        system.checkout.place_order(&alice, cart(&[item])),
    )
    .await;
    assert!(gave_up.is_err(), "numbering should still be in flight");

    tokio::time::sleep(Duration::from_secs(1)).await;

    assert!(system.checkout.list_orders(&alice).await.unwrap().is_empty());
    assert!(is_available(&system, item).await);

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_restart_from_json_files_keeps_orders_and_numbering() {
    let dir = scratch_dir("restart");

    let (alice, sold, order) = {
        let system = start_with(Stores::json_files(&dir).await.unwrap()).await;
        let alice = customer(&system, "alice").await;
        let sold = artwork(&system, "Harbour at Dusk", dec!(100)).await;
        let order = system.checkout.place_order(&alice, cart(&[sold])).await.unwrap();
        system.shutdown().await.unwrap();
        (alice, sold, order)
    };

    let system = start_with(Stores::json_files(&dir).await.unwrap()).await;

    assert_eq!(system.checkout.get_order(&alice, order.id).await.unwrap(), order);
    assert!(!is_available(&system, sold).await);

    let next = artwork(&system, "Blue Study", dec!(50)).await;
    let second = system.checkout.place_order(&alice, cart(&[next])).await.unwrap();
    assert_eq!(second.invoice_number.to_string(), "INV-20261019-002");
    assert!(second.id > order.id);

    system.shutdown().await.unwrap();
    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn test_lost_counter_file_is_rebuilt_from_orders() {
    let dir = scratch_dir("lost-counters");

    let alice = {
        let system = start_with(Stores::json_files(&dir).await.unwrap()).await;
        let alice = customer(&system, "alice").await;
        for n in 0..3 {
            let item = artwork(&system, &format!("Plate {n}"), dec!(30)).await;
            system.checkout.place_order(&alice, cart(&[item])).await.unwrap();
        }
        system.shutdown().await.unwrap();
        alice
    };

    std::fs::remove_file(dir.join("invoice_counters.json")).unwrap();

    let system = start_with(Stores::json_files(&dir).await.unwrap()).await;
    let item = artwork(&system, "Plate 3", dec!(30)).await;
    let order = system.checkout.place_order(&alice, cart(&[item])).await.unwrap();
    assert_eq!(order.invoice_number.to_string(), "INV-20261019-004");
    assert_eq!(system.order_client.list().await.unwrap().len(), 4);

    system.shutdown().await.unwrap();
    let _ = std::fs::remove_dir_all(&dir);
}
