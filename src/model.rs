use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of device kinds. Fixed for the lifetime of a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    Light,
    Thermostat,
    Camera,
}

impl DeviceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceType::Light => "light",
            DeviceType::Thermostat => "thermostat",
            DeviceType::Camera => "camera",
        }
    }

    /// Slider bounds and step for the type's scalar value
    pub fn slider(&self) -> SliderConfig {
        match self {
            DeviceType::Light => SliderConfig::new(0.0, 100.0, 1.0),
            DeviceType::Thermostat => SliderConfig::new(50.0, 90.0, 1.0),
            DeviceType::Camera => SliderConfig::new(0.0, 360.0, 15.0),
        }
    }

    /// Label shown next to the scalar control
    pub fn value_label(&self) -> &'static str {
        match self {
            DeviceType::Light => "Brightness",
            DeviceType::Thermostat => "Temperature",
            DeviceType::Camera => "Camera Angle",
        }
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Online,
    Offline,
}

impl ConnectionStatus {
    pub fn is_online(&self) -> bool {
        matches!(self, ConnectionStatus::Online)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionStatus::Online => "online",
            ConnectionStatus::Offline => "offline",
        }
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A controllable smart-home device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub device_type: DeviceType,
    pub status: ConnectionStatus,
    pub is_on: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    pub location: String,
}

impl Device {
    pub fn is_online(&self) -> bool {
        self.status.is_online()
    }
}

/// A standalone security camera feed, distinct from a device of type camera
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Camera {
    pub id: String,
    pub name: String,
    pub location: String,
    pub feed_url: String,
    pub status: ConnectionStatus,
    pub is_recording: bool,
    pub last_updated: String,
}

impl Camera {
    pub fn is_online(&self) -> bool {
        self.status.is_online()
    }
}

/// Bounds and step of a scalar slider widget
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SliderConfig {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl SliderConfig {
    pub const fn new(min: f64, max: f64, step: f64) -> Self {
        Self { min, max, step }
    }

    /// Snap a dragged value onto the slider track: clamp to the bounds, then
    /// round to the nearest step counted from `min`.
    pub fn constrain(&self, value: f64) -> f64 {
        if value.is_nan() {
            return self.min;
        }
        let clamped = value.clamp(self.min, self.max);
        let steps = ((clamped - self.min) / self.step).round();
        (self.min + steps * self.step).min(self.max)
    }

    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// Format a scalar for display without a trailing `.0` on whole numbers
pub fn format_value(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}
