use crate::model::{Camera, Device};
use serde::Serialize;

/// Summary counts over the current collections
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceStats {
    pub total_devices: usize,
    pub online_devices: usize,
    pub offline_devices: usize,
    pub total_cameras: usize,
    pub online_cameras: usize,
    pub offline_cameras: usize,
    pub recording_cameras: usize,
}

impl DeviceStats {
    pub fn compute(devices: &[Device], cameras: &[Camera]) -> Self {
        let online_devices = devices.iter().filter(|d| d.is_online()).count();
        let online_cameras = cameras.iter().filter(|c| c.is_online()).count();

        Self {
            total_devices: devices.len(),
            online_devices,
            offline_devices: devices.len() - online_devices,
            total_cameras: cameras.len(),
            online_cameras,
            offline_cameras: cameras.len() - online_cameras,
            recording_cameras: cameras.iter().filter(|c| c.is_recording).count(),
        }
    }
}
