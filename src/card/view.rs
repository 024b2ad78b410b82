use crate::model::{format_value, ConnectionStatus, Device, DeviceType};
use serde::Serialize;

pub const OFFLINE_NOTICE: &str = "Device is offline. Please check connection.";

/// Everything needed to draw one device card
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceCardView {
    pub id: String,
    pub name: String,
    pub location: String,
    pub device_type: DeviceType,
    pub status: ConnectionStatus,
    pub is_on: bool,
    pub power_label: &'static str,
    pub toggle_enabled: bool,
    pub busy: bool,
    /// Present only while the device is powered
    pub slider: Option<SliderView>,
    pub offline_notice: Option<&'static str>,
    /// Offline cards render faded
    pub dimmed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SliderView {
    pub label: &'static str,
    pub value: f64,
    pub display: String,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub enabled: bool,
}

impl DeviceCardView {
    pub fn from_device(device: &Device, busy: bool) -> Self {
        let online = device.is_online();

        Self {
            id: device.id.clone(),
            name: device.name.clone(),
            location: device.location.clone(),
            device_type: device.device_type,
            status: device.status,
            is_on: device.is_on,
            power_label: if device.is_on { "On" } else { "Off" },
            toggle_enabled: online && !busy,
            busy,
            slider: device.is_on.then(|| SliderView::from_device(device)),
            offline_notice: (!online).then_some(OFFLINE_NOTICE),
            dimmed: !online,
        }
    }
}

impl SliderView {
    fn from_device(device: &Device) -> Self {
        let config = device.device_type.slider();
        let value = device.value.unwrap_or(0.0);

        let display = match device.device_type {
            DeviceType::Camera => format!("{}°", format_value(value)),
            _ => format!(
                "{}{}",
                format_value(value),
                device.unit.as_deref().unwrap_or("")
            ),
        };

        Self {
            label: device.device_type.value_label(),
            value,
            display,
            min: config.min,
            max: config.max,
            step: config.step,
            enabled: device.is_online(),
        }
    }
}
