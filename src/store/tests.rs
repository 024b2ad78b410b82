use super::*;
use crate::error::StorageError;
use crate::events::{DashboardEvent, EventBus};
use crate::model::{ConnectionStatus, DeviceType};
use crate::seed::MockSeed;
use chrono::{TimeZone, Utc};
use std::sync::Arc;

fn seeded_store() -> DeviceStore {
    let store = DeviceStore::in_memory();
    MockSeed.apply(&store);
    store
}

/// Adapter whose writes always fail
struct BrokenStorage;

impl StatePersistence for BrokenStorage {
    fn load(&self) -> Result<Option<StoreSnapshot>, StorageError> {
        Err(StorageError::Corrupt {
            key: "broken".to_string(),
            details: "unreadable".to_string(),
        })
    }

    fn save(&self, _snapshot: &StoreSnapshot) -> Result<(), StorageError> {
        Err(StorageError::Write {
            key: "broken".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
        })
    }

    fn describe(&self) -> String {
        "broken".to_string()
    }
}

#[test]
fn test_seed_counts() {
    let store = seeded_store();
    let stats = store.stats();

    assert_eq!(stats.online_devices, 5);
    assert_eq!(stats.offline_devices, 1);
    assert_eq!(stats.online_cameras, 2);
    assert_eq!(stats.offline_cameras, 1);
    assert_eq!(stats.recording_cameras, 1);
    assert_eq!(store.online_devices().len(), 5);
    assert_eq!(store.online_cameras().len(), 2);
    assert_eq!(store.recording_cameras().len(), 1);
}

#[test]
fn test_toggle_twice_restores_power_flag() {
    let store = seeded_store();

    for device in store.devices() {
        store.toggle_device(&device.id, !device.is_on);
        store.toggle_device(&device.id, device.is_on);
        assert_eq!(store.device(&device.id), Some(device));
    }
}

#[test]
fn test_toggle_offline_device_is_accepted() {
    let store = seeded_store();

    assert!(store.toggle_device("4", true));
    assert!(store.device("4").unwrap().is_on);
}

#[test]
fn test_update_value_keeps_identity_fields() {
    let store = seeded_store();
    let before = store.device("2").unwrap();

    assert!(store.update_device_value("2", 65.0));

    let after = store.device("2").unwrap();
    assert_eq!(after.value, Some(65.0));
    assert_eq!(after.id, before.id);
    assert_eq!(after.device_type, DeviceType::Thermostat);
    assert_eq!(after.location, before.location);
}

#[test]
fn test_update_value_does_not_clamp() {
    let store = seeded_store();

    store.update_device_value("1", 250.0);
    assert_eq!(store.device("1").unwrap().value, Some(250.0));
}

#[test]
fn test_unknown_id_is_ignored() {
    let store = seeded_store();
    let before = store.snapshot();

    assert!(!store.toggle_device("missing", true));
    assert!(!store.update_device_value("missing", 1.0));
    assert!(!store.refresh_camera("missing"));
    assert!(!store.update_camera_status("missing", ConnectionStatus::Offline));

    assert_eq!(store.snapshot(), before);
}

#[test]
fn test_online_selector_preserves_order() {
    let store = seeded_store();
    store.update_device_status("2", ConnectionStatus::Offline);

    let online: Vec<_> = store.online_devices().into_iter().map(|d| d.id).collect();
    assert_eq!(online, vec!["1", "3", "5", "6"]);

    let expected: Vec<_> = store
        .devices()
        .into_iter()
        .filter(|d| d.status == ConnectionStatus::Online)
        .map(|d| d.id)
        .collect();
    assert_eq!(online, expected);
}

#[test]
fn test_status_changes_do_not_cascade() {
    let store = seeded_store();

    store.update_camera_status("cam1", ConnectionStatus::Offline);
    let camera = store.camera("cam1").unwrap();
    assert!(!camera.is_online());
    assert!(camera.is_recording);

    store.update_device_status("1", ConnectionStatus::Offline);
    assert!(store.device("1").unwrap().is_on);
}

#[test]
fn test_refresh_camera_only_touches_last_updated() {
    let store = seeded_store();
    let before = store.camera("cam2").unwrap();
    let time = Utc.with_ymd_and_hms(2024, 3, 9, 15, 4, 5).unwrap();

    assert!(store.refresh_camera_at("cam2", &time));

    let after = store.camera("cam2").unwrap();
    assert_eq!(after.last_updated, "3:04:05 PM");
    assert_eq!(after.status, before.status);
    assert_eq!(after.is_recording, before.is_recording);
    assert_eq!(after.feed_url, before.feed_url);
}

#[test]
fn test_refresh_camera_uses_wall_clock() {
    let store = seeded_store();

    store.refresh_camera("cam3");
    let stamp = store.camera("cam3").unwrap().last_updated;
    assert!(stamp.ends_with("AM") || stamp.ends_with("PM"), "{}", stamp);
}

#[test]
fn test_recording_toggle_ignores_connectivity() {
    let store = seeded_store();

    assert!(store.toggle_camera_recording("cam3", true));
    assert_eq!(store.recording_cameras().len(), 2);
}

#[test]
fn test_mutations_persist_snapshot() {
    let storage = Arc::new(MemoryStorage::new());
    let store = DeviceStore::new(storage.clone());
    MockSeed.apply(&store);

    store.toggle_device("1", false);

    assert_eq!(storage.save_count(), 3);
    let stored = storage.stored().unwrap();
    assert!(!stored.devices[0].is_on);
    assert_eq!(stored, store.snapshot());
}

#[test]
fn test_store_rehydrates_from_persistence() {
    let storage = Arc::new(MemoryStorage::new());
    {
        let store = DeviceStore::new(storage.clone());
        MockSeed.apply(&store);
        store.update_device_value("6", 70.0);
    }

    let restored = DeviceStore::new(storage);
    assert_eq!(restored.device("6").unwrap().value, Some(70.0));
    assert!(!MockSeed.apply_if_empty(&restored));
}

#[test]
fn test_store_loads_preexisting_snapshot_without_saving() {
    let mut snapshot = seeded_store().snapshot();
    snapshot.devices.truncate(2);
    let storage = Arc::new(MemoryStorage::with_snapshot(snapshot));

    let store = DeviceStore::new(storage.clone());
    assert_eq!(store.devices().len(), 2);
    assert_eq!(store.cameras().len(), 3);
    assert!(!MockSeed.apply_if_empty(&store));
    assert_eq!(storage.save_count(), 0);

    store.toggle_device("2", true);
    assert_eq!(storage.save_count(), 1);
}

#[test]
fn test_failing_persistence_does_not_fail_mutations() {
    let store = DeviceStore::new(Arc::new(BrokenStorage));
    assert!(store.is_empty());

    MockSeed.apply(&store);
    assert!(store.toggle_device("1", false));
    assert!(!store.device("1").unwrap().is_on);
}

#[test]
fn test_file_storage_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let storage = Arc::new(FileStorage::new(dir.path(), DEFAULT_STORAGE_KEY));

    let store = DeviceStore::new(storage.clone());
    assert!(MockSeed.apply_if_empty(&store));
    store.toggle_camera_recording("cam2", true);

    let entry = std::fs::read_to_string(dir.path().join("smart-home-storage.json")).unwrap();
    let envelope: PersistedEnvelope = serde_json::from_str(&entry).unwrap();
    assert_eq!(envelope.version, 0);
    assert!(envelope.state.cameras[1].is_recording);

    let restored = DeviceStore::new(storage);
    assert_eq!(restored.snapshot(), store.snapshot());
}

#[test]
fn test_file_storage_missing_entry() {
    let dir = tempfile::tempdir().unwrap();
    let storage = FileStorage::new(dir.path().join("nested"), "absent");

    assert!(storage.load().unwrap().is_none());
}

#[test]
fn test_file_storage_prepare_creates_directory() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("data").join("homedash");
    let store = DeviceStore::new(Arc::new(FileStorage::new(&base, DEFAULT_STORAGE_KEY)));

    store.prepare_persistence().unwrap();
    assert!(base.is_dir());
}

#[test]
fn test_file_storage_prepare_rejects_unwritable_location() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("occupied");
    std::fs::write(&blocker, "not a directory").unwrap();

    let storage = FileStorage::new(blocker.join("data"), DEFAULT_STORAGE_KEY);
    assert!(matches!(storage.prepare(), Err(StorageError::Write { .. })));
}

#[test]
fn test_corrupt_snapshot_starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("smart-home-storage.json"),
        r#"{"devices": "not the expected shape"}"#,
    )
    .unwrap();

    let storage = FileStorage::new(dir.path(), DEFAULT_STORAGE_KEY);
    assert!(matches!(storage.load(), Err(StorageError::Corrupt { .. })));

    let store = DeviceStore::new(Arc::new(storage));
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_mutations_publish_events() {
    let event_bus = Arc::new(EventBus::new(16));
    let mut receiver = event_bus.subscribe();
    let store = DeviceStore::in_memory().with_event_bus(Arc::clone(&event_bus));

    MockSeed.apply(&store);
    store.toggle_device("3", false);
    store.toggle_device("missing", false);
    store.update_camera_status("cam2", ConnectionStatus::Offline);

    assert_eq!(
        receiver.recv().await.unwrap(),
        DashboardEvent::DevicesReplaced { count: 6 }
    );
    assert_eq!(
        receiver.recv().await.unwrap(),
        DashboardEvent::CamerasReplaced { count: 3 }
    );
    assert_eq!(
        receiver.recv().await.unwrap(),
        DashboardEvent::DeviceToggled {
            device_id: "3".to_string(),
            is_on: false
        }
    );
    assert_eq!(
        receiver.recv().await.unwrap(),
        DashboardEvent::CameraStatusChanged {
            camera_id: "cam2".to_string(),
            status: ConnectionStatus::Offline
        }
    );
}

#[test]
fn test_clones_share_state() {
    let store = seeded_store();
    let handle = store.clone();

    handle.simulate_device_status_change("4", ConnectionStatus::Online);
    handle.simulate_camera_status_change("cam3", ConnectionStatus::Online);

    assert_eq!(store.stats().online_devices, 6);
    assert_eq!(store.stats().online_cameras, 3);
}
