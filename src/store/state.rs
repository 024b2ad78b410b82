use super::persistence::{MemoryStorage, SharedPersistence, StoreSnapshot};
use super::stats::DeviceStats;
use crate::error::{EventBusError, StorageError};
use crate::events::{DashboardEvent, EventBus};
use crate::model::{Camera, ConnectionStatus, Device};
use chrono::{DateTime, Local, TimeZone};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Record with a stable identifier inside its collection
trait Identified: Clone {
    fn id(&self) -> &str;
}

impl Identified for Device {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Identified for Camera {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Rebuild `items` with the record matching `id` replaced by `patch(record)`.
/// Order is preserved; returns whether any record matched.
fn patch_by_id<T, F>(items: &[T], id: &str, patch: F) -> (Vec<T>, bool)
where
    T: Identified,
    F: Fn(&T) -> T,
{
    let mut matched = false;
    let rebuilt: Vec<T> = items
        .iter()
        .map(|item| {
            if item.id() == id {
                matched = true;
                patch(item)
            } else {
                item.clone()
            }
        })
        .collect();
    (rebuilt, matched)
}

/// Format a wall-clock time the way the dashboard shows "last updated"
pub fn format_local_time<Tz: TimeZone>(time: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    time.format("%-I:%M:%S %p").to_string()
}

/// Single source of truth for the device and camera collections.
///
/// Cloning the store yields another handle onto the same state. Every
/// mutation rebuilds the affected collection, writes the snapshot through
/// the persistence adapter and publishes a [`DashboardEvent`]. Unknown ids
/// are ignored; mutations report whether a record matched.
#[derive(Clone)]
pub struct DeviceStore {
    state: Arc<RwLock<StoreSnapshot>>,
    persistence: SharedPersistence,
    event_bus: Option<Arc<EventBus>>,
}

impl DeviceStore {
    /// Create a store, rehydrating from the persistence adapter
    pub fn new(persistence: SharedPersistence) -> Self {
        let initial = match persistence.load() {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => StoreSnapshot::default(),
            Err(e) => {
                warn!(
                    "Ignoring stored snapshot at {}: {}",
                    persistence.describe(),
                    e
                );
                StoreSnapshot::default()
            }
        };

        Self {
            state: Arc::new(RwLock::new(initial)),
            persistence,
            event_bus: None,
        }
    }

    /// Create an empty store backed by memory only
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    /// Publish change events on the given bus
    pub fn with_event_bus(mut self, event_bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    pub fn event_bus(&self) -> Option<&Arc<EventBus>> {
        self.event_bus.as_ref()
    }

    // Device actions

    pub fn toggle_device(&self, device_id: &str, is_on: bool) -> bool {
        self.patch_device(
            device_id,
            |device| Device {
                is_on,
                ..device.clone()
            },
            || DashboardEvent::DeviceToggled {
                device_id: device_id.to_string(),
                is_on,
            },
        )
    }

    /// Overwrite the scalar value. Bounds are the caller's concern.
    pub fn update_device_value(&self, device_id: &str, value: f64) -> bool {
        self.patch_device(
            device_id,
            |device| Device {
                value: Some(value),
                ..device.clone()
            },
            || DashboardEvent::DeviceValueChanged {
                device_id: device_id.to_string(),
                value,
            },
        )
    }

    /// Overwrite connectivity; power state is left as is
    pub fn update_device_status(&self, device_id: &str, status: ConnectionStatus) -> bool {
        self.patch_device(
            device_id,
            |device| Device {
                status,
                ..device.clone()
            },
            || DashboardEvent::DeviceStatusChanged {
                device_id: device_id.to_string(),
                status,
            },
        )
    }

    // Camera actions

    /// Stamp the camera with the current local time
    pub fn refresh_camera(&self, camera_id: &str) -> bool {
        self.refresh_camera_at(camera_id, &Local::now())
    }

    pub fn refresh_camera_at<Tz: TimeZone>(&self, camera_id: &str, time: &DateTime<Tz>) -> bool
    where
        Tz::Offset: std::fmt::Display,
    {
        let last_updated = format_local_time(time);
        self.patch_camera(
            camera_id,
            |camera| Camera {
                last_updated: last_updated.clone(),
                ..camera.clone()
            },
            || DashboardEvent::CameraRefreshed {
                camera_id: camera_id.to_string(),
                last_updated: last_updated.clone(),
            },
        )
    }

    pub fn toggle_camera_recording(&self, camera_id: &str, is_recording: bool) -> bool {
        self.patch_camera(
            camera_id,
            |camera| Camera {
                is_recording,
                ..camera.clone()
            },
            || DashboardEvent::CameraRecordingChanged {
                camera_id: camera_id.to_string(),
                is_recording,
            },
        )
    }

    /// Overwrite connectivity; recording is left as is
    pub fn update_camera_status(&self, camera_id: &str, status: ConnectionStatus) -> bool {
        self.patch_camera(
            camera_id,
            |camera| Camera {
                status,
                ..camera.clone()
            },
            || DashboardEvent::CameraStatusChanged {
                camera_id: camera_id.to_string(),
                status,
            },
        )
    }

    // Bulk actions

    pub fn set_all_devices(&self, devices: Vec<Device>) {
        let count = devices.len();
        {
            let mut state = self.state.write();
            state.devices = devices;
            self.persist(&state);
        }
        self.emit(DashboardEvent::DevicesReplaced { count });
    }

    pub fn set_all_cameras(&self, cameras: Vec<Camera>) {
        let count = cameras.len();
        {
            let mut state = self.state.write();
            state.cameras = cameras;
            self.persist(&state);
        }
        self.emit(DashboardEvent::CamerasReplaced { count });
    }

    // Simulated connectivity changes

    pub fn simulate_device_status_change(&self, device_id: &str, status: ConnectionStatus) -> bool {
        debug!("Simulating device {} going {}", device_id, status);
        self.update_device_status(device_id, status)
    }

    pub fn simulate_camera_status_change(&self, camera_id: &str, status: ConnectionStatus) -> bool {
        debug!("Simulating camera {} going {}", camera_id, status);
        self.update_camera_status(camera_id, status)
    }

    // Selectors

    pub fn devices(&self) -> Vec<Device> {
        self.state.read().devices.clone()
    }

    pub fn cameras(&self) -> Vec<Camera> {
        self.state.read().cameras.clone()
    }

    pub fn device(&self, device_id: &str) -> Option<Device> {
        self.state
            .read()
            .devices
            .iter()
            .find(|d| d.id == device_id)
            .cloned()
    }

    pub fn camera(&self, camera_id: &str) -> Option<Camera> {
        self.state
            .read()
            .cameras
            .iter()
            .find(|c| c.id == camera_id)
            .cloned()
    }

    pub fn online_devices(&self) -> Vec<Device> {
        self.state
            .read()
            .devices
            .iter()
            .filter(|d| d.is_online())
            .cloned()
            .collect()
    }

    pub fn online_cameras(&self) -> Vec<Camera> {
        self.state
            .read()
            .cameras
            .iter()
            .filter(|c| c.is_online())
            .cloned()
            .collect()
    }

    pub fn recording_cameras(&self) -> Vec<Camera> {
        self.state
            .read()
            .cameras
            .iter()
            .filter(|c| c.is_recording)
            .cloned()
            .collect()
    }

    pub fn stats(&self) -> DeviceStats {
        let state = self.state.read();
        DeviceStats::compute(&state.devices, &state.cameras)
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        self.state.read().clone()
    }

    /// Check that the persistence adapter can take writes
    pub fn prepare_persistence(&self) -> Result<(), StorageError> {
        self.persistence.prepare()
    }

    pub fn is_empty(&self) -> bool {
        let state = self.state.read();
        state.devices.is_empty() && state.cameras.is_empty()
    }

    fn patch_device<P, E>(&self, device_id: &str, patch: P, event: E) -> bool
    where
        P: Fn(&Device) -> Device,
        E: FnOnce() -> DashboardEvent,
    {
        let matched = {
            let mut state = self.state.write();
            let (devices, matched) = patch_by_id(&state.devices, device_id, patch);
            state.devices = devices;
            self.persist(&state);
            matched
        };

        if matched {
            self.emit(event());
        } else {
            debug!("Ignoring update for unknown device {}", device_id);
        }
        matched
    }

    fn patch_camera<P, E>(&self, camera_id: &str, patch: P, event: E) -> bool
    where
        P: Fn(&Camera) -> Camera,
        E: FnOnce() -> DashboardEvent,
    {
        let matched = {
            let mut state = self.state.write();
            let (cameras, matched) = patch_by_id(&state.cameras, camera_id, patch);
            state.cameras = cameras;
            self.persist(&state);
            matched
        };

        if matched {
            self.emit(event());
        } else {
            debug!("Ignoring update for unknown camera {}", camera_id);
        }
        matched
    }

    /// Save under the write lock so snapshots land in mutation order
    fn persist(&self, state: &StoreSnapshot) {
        if let Err(e) = self.persistence.save(state) {
            error!(
                "Failed to persist store to {}: {}",
                self.persistence.describe(),
                e
            );
        }
    }

    fn emit(&self, event: DashboardEvent) {
        if let Some(event_bus) = &self.event_bus {
            match event_bus.publish(event) {
                Ok(_) => {}
                Err(EventBusError::PublishFailed { .. }) => {
                    // No subscribers yet
                }
                Err(e) => warn!("Failed to publish store event: {}", e),
            }
        }
    }
}
