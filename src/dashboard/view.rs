use crate::card::DeviceCardView;
use crate::feed::CameraFeedView;
use crate::model::DeviceType;
use crate::store::DeviceStats;
use serde::Serialize;

pub const DASHBOARD_TITLE: &str = "Smart Home Control";
pub const DASHBOARD_SUBTITLE: &str = "Manage your devices and security";

/// Section title with its "N of M online" summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionHeader {
    pub title: &'static str,
    pub online: usize,
    pub total: usize,
}

impl SectionHeader {
    pub fn summary(&self) -> String {
        format!("{} of {} online", self.online, self.total)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CameraSection {
    pub header: SectionHeader,
    pub feeds: Vec<CameraFeedView>,
}

/// One non-empty group of device cards
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceGroup {
    pub title: &'static str,
    pub device_type: DeviceType,
    pub cards: Vec<DeviceCardView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceSection {
    pub header: SectionHeader,
    pub groups: Vec<DeviceGroup>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemStatus {
    pub devices_online: usize,
    pub cameras_online: usize,
    pub cameras_recording: usize,
}

impl From<&DeviceStats> for SystemStatus {
    fn from(stats: &DeviceStats) -> Self {
        Self {
            devices_online: stats.online_devices,
            cameras_online: stats.online_cameras,
            cameras_recording: stats.recording_cameras,
        }
    }
}

/// The whole page, derived fresh from the store on every render
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub title: &'static str,
    pub subtitle: &'static str,
    pub cameras: CameraSection,
    pub devices: DeviceSection,
    pub status: SystemStatus,
}

/// Group titles in page order
pub fn group_title(device_type: DeviceType) -> &'static str {
    match device_type {
        DeviceType::Light => "Lighting",
        DeviceType::Thermostat => "Climate Control",
        DeviceType::Camera => "Device Cameras",
    }
}

pub(super) const GROUP_ORDER: [DeviceType; 3] =
    [DeviceType::Light, DeviceType::Thermostat, DeviceType::Camera];
