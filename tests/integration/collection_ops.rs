//! Integration tests for editing a stored collection.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use inv::error::InvError;
use inv::record::{DeviceCategory, DeviceDraft};
use inv::store::{DeviceStore, Upserted};

use crate::common::fixtures::{device, sample_devices, DataDir};
use crate::common::init_test_logging;

fn store_with_samples(data: &DataDir) -> DeviceStore {
    let store = DeviceStore::new(data.file());
    for record in sample_devices() {
        store.upsert(record);
    }
    store
}

fn names(store: &DeviceStore) -> Vec<String> {
    store
        .snapshot()
        .iter()
        .map(|r| r.device_name.clone())
        .collect()
}

#[tokio::test]
async fn edit_keeps_id_and_position_across_reload() {
    init_test_logging();
    let data = DataDir::empty();
    let store = store_with_samples(&data);
    let (pos, original) = store.resolve("1").unwrap();

    let draft = DeviceDraft {
        purchase_price: Some("49".to_string()),
        device_category: Some(DeviceCategory::Watch),
        ..DeviceDraft::default()
    };
    let edited = draft.apply(Some(&original));
    assert_eq!(store.upsert(edited), Upserted::Replaced(pos));
    store.save().await.unwrap();

    let reopened = DeviceStore::new(data.file());
    reopened.load().await;
    let (reloaded_pos, reloaded) = reopened.resolve(&original.id.to_string()).unwrap();
    assert_eq!(reloaded_pos, 1);
    assert_eq!(reloaded.id, original.id);
    assert_eq!(reloaded.device_name, "Broken watch");
    assert_eq!(reloaded.purchase_price, "49");
    assert_eq!(reopened.len(), 3);
}

#[tokio::test]
async fn new_draft_appends_with_defaults() {
    init_test_logging();
    let data = DataDir::empty();
    let store = store_with_samples(&data);

    let draft = DeviceDraft {
        device_name: Some("MacBook".to_string()),
        device_category: Some(DeviceCategory::Laptop),
        ..DeviceDraft::default()
    };
    let today = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
    let record = draft.apply_on(None, today);

    assert_eq!(store.upsert(record.clone()), Upserted::Inserted(3));
    assert_eq!(record.purchase_date, today);
    assert_eq!(record.model, "MacBook Air");
    assert!(record.purchase_price.is_empty());
}

#[test]
fn selectors_resolve_positions_and_id_prefixes() {
    init_test_logging();
    let data = DataDir::empty();
    let store = store_with_samples(&data);
    let (_, third) = store.resolve("2").unwrap();

    let (pos, _) = store.resolve(&third.short_id()).unwrap();
    assert_eq!(pos, 2);

    let upper = third.id.to_string().to_uppercase();
    let (pos, _) = store.resolve(&upper).unwrap();
    assert_eq!(pos, 2);

    assert!(matches!(
        store.resolve("3"),
        Err(InvError::InvalidPosition { index: 3, len: 3 })
    ));
    assert!(matches!(
        store.resolve("ab"),
        Err(InvError::DeviceNotFound { .. })
    ));
}

#[test]
fn remove_by_several_positions_keeps_order() {
    init_test_logging();
    let data = DataDir::empty();
    let store = store_with_samples(&data);
    store.upsert(device("Spare phone", "1", DeviceCategory::Phone));

    let removed = store.remove(&BTreeSet::from([0, 2]));

    let removed_names: Vec<_> = removed.iter().map(|r| r.device_name.as_str()).collect();
    assert_eq!(removed_names, ["iPhone 13", "AirPods Pro"]);
    assert_eq!(names(&store), ["Broken watch", "Spare phone"]);
}

#[test]
fn reorder_moves_and_clamps() {
    init_test_logging();
    let data = DataDir::empty();
    let store = store_with_samples(&data);

    assert!(store.reorder(0, 99));
    assert_eq!(names(&store), ["Broken watch", "AirPods Pro", "iPhone 13"]);

    assert!(store.reorder(2, 0));
    assert_eq!(names(&store), ["iPhone 13", "Broken watch", "AirPods Pro"]);

    assert!(!store.reorder(3, 0));
    assert_eq!(store.len(), 3);
}

#[test]
fn snapshots_are_detached_from_the_store() {
    init_test_logging();
    let data = DataDir::empty();
    let store = store_with_samples(&data);
    let before = store.snapshot();

    store.remove(&BTreeSet::from([0]));

    assert_eq!(before.len(), 3);
    assert_eq!(store.len(), 2);
}
