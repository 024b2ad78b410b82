//! Mock seed data shared by the store and the dashboard.

use crate::model::{Camera, ConnectionStatus, Device, DeviceType};
use crate::store::DeviceStore;
use tracing::info;

/// The single source of the mock device and camera lists
#[derive(Debug, Clone, Default)]
pub struct MockSeed;

impl MockSeed {
    pub fn devices(&self) -> Vec<Device> {
        vec![
            device(
                "1",
                "Living Room Light",
                DeviceType::Light,
                ConnectionStatus::Online,
                true,
                75.0,
                "%",
                "Living Room",
            ),
            device(
                "2",
                "Kitchen Thermostat",
                DeviceType::Thermostat,
                ConnectionStatus::Online,
                true,
                72.0,
                "°F",
                "Kitchen",
            ),
            device(
                "3",
                "Front Door Camera",
                DeviceType::Camera,
                ConnectionStatus::Online,
                true,
                180.0,
                "°",
                "Front Door",
            ),
            device(
                "4",
                "Bedroom Light",
                DeviceType::Light,
                ConnectionStatus::Offline,
                false,
                0.0,
                "%",
                "Master Bedroom",
            ),
            device(
                "5",
                "Garage Camera",
                DeviceType::Camera,
                ConnectionStatus::Online,
                false,
                90.0,
                "°",
                "Garage",
            ),
            device(
                "6",
                "Office Thermostat",
                DeviceType::Thermostat,
                ConnectionStatus::Online,
                true,
                68.0,
                "°F",
                "Home Office",
            ),
        ]
    }

    pub fn cameras(&self) -> Vec<Camera> {
        vec![
            camera(
                "cam1",
                "Front Door Camera",
                "Front Entrance",
                "/api/camera/front-door",
                ConnectionStatus::Online,
                true,
                "2 minutes ago",
            ),
            camera(
                "cam2",
                "Backyard Camera",
                "Backyard Patio",
                "/api/camera/backyard",
                ConnectionStatus::Online,
                false,
                "5 minutes ago",
            ),
            camera(
                "cam3",
                "Garage Camera",
                "Garage Interior",
                "/api/camera/garage",
                ConnectionStatus::Offline,
                false,
                "1 hour ago",
            ),
        ]
    }

    /// Replace both store collections with the mock lists
    pub fn apply(&self, store: &DeviceStore) {
        let devices = self.devices();
        let cameras = self.cameras();
        info!(
            "Seeding store with {} devices and {} cameras",
            devices.len(),
            cameras.len()
        );
        store.set_all_devices(devices);
        store.set_all_cameras(cameras);
    }

    /// Seed the store unless it already holds a restored snapshot
    pub fn apply_if_empty(&self, store: &DeviceStore) -> bool {
        if store.is_empty() {
            self.apply(store);
            true
        } else {
            info!("Store restored from snapshot, skipping seed");
            false
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn device(
    id: &str,
    name: &str,
    device_type: DeviceType,
    status: ConnectionStatus,
    is_on: bool,
    value: f64,
    unit: &str,
    location: &str,
) -> Device {
    Device {
        id: id.to_string(),
        name: name.to_string(),
        device_type,
        status,
        is_on,
        value: Some(value),
        unit: Some(unit.to_string()),
        location: location.to_string(),
    }
}

fn camera(
    id: &str,
    name: &str,
    location: &str,
    feed_url: &str,
    status: ConnectionStatus,
    is_recording: bool,
    last_updated: &str,
) -> Camera {
    Camera {
        id: id.to_string(),
        name: name.to_string(),
        location: location.to_string(),
        feed_url: feed_url.to_string(),
        status,
        is_recording,
        last_updated: last_updated.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_seed_ids_are_unique() {
        let seed = MockSeed;
        let device_ids: HashSet<_> = seed.devices().into_iter().map(|d| d.id).collect();
        let camera_ids: HashSet<_> = seed.cameras().into_iter().map(|c| c.id).collect();

        assert_eq!(device_ids.len(), 6);
        assert_eq!(camera_ids.len(), 3);
    }

    #[test]
    fn test_seed_values_fit_their_sliders() {
        for device in MockSeed.devices() {
            let value = device.value.unwrap();
            assert!(
                device.device_type.slider().contains(value),
                "{} out of range",
                device.name
            );
        }
    }
}
