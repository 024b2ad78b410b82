use super::view::DeviceCardView;
use crate::error::{DashboardError, GestureError, Result};
use crate::model::Device;
use crate::store::DeviceStore;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info};

/// Clears the busy flag when dropped, on success, error or cancellation
struct BusyGuard {
    busy: Arc<AtomicBool>,
}

impl BusyGuard {
    fn acquire(busy: &Arc<AtomicBool>) -> Option<Self> {
        busy.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self {
                busy: Arc::clone(busy),
            })
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

/// Interactive card for one device: renders it and turns the toggle and
/// slider gestures into store mutations.
#[derive(Clone)]
pub struct DeviceCard {
    device_id: String,
    store: DeviceStore,
    toggle_delay: Duration,
    busy: Arc<AtomicBool>,
}

impl DeviceCard {
    pub fn new(device_id: &str, store: DeviceStore, toggle_delay: Duration) -> Self {
        Self {
            device_id: device_id.to_string(),
            store,
            toggle_delay,
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    pub fn device(&self) -> Option<Device> {
        self.store.device(&self.device_id)
    }

    pub fn render(&self) -> Option<DeviceCardView> {
        self.device()
            .map(|device| DeviceCardView::from_device(&device, self.is_busy()))
    }

    /// Flip the power flag after the simulated round trip.
    ///
    /// Returns the power state that was committed.
    pub async fn toggle(&self) -> Result<bool> {
        let device = self.require_device()?;

        if !device.is_online() {
            return Err(self.disabled("toggle", "device is offline"));
        }

        let _guard = BusyGuard::acquire(&self.busy)
            .ok_or_else(|| self.disabled("toggle", "a toggle is already in flight"))?;

        let target = !device.is_on;
        debug!("Toggling device {} to {}", self.device_id, target);

        match self.simulate_device_call().await {
            Ok(()) => {
                self.store.toggle_device(&self.device_id, target);
                info!(
                    "Device {} turned {}",
                    self.device_id,
                    if target { "on" } else { "off" }
                );
                Ok(target)
            }
            Err(e) => {
                error!("Failed to toggle device {}: {}", self.device_id, e);
                Err(e)
            }
        }
    }

    /// Emit a dragged slider value. The widget snaps it onto its track
    /// before it reaches the store.
    pub fn set_value(&self, value: f64) -> Result<f64> {
        let device = self.require_device()?;

        if !device.is_online() {
            return Err(self.disabled("set value", "device is offline"));
        }
        if !device.is_on {
            return Err(self.disabled("set value", "device is off"));
        }

        let emitted = device.device_type.slider().constrain(value);
        self.store.update_device_value(&self.device_id, emitted);
        debug!("Device {} value set to {}", self.device_id, emitted);
        Ok(emitted)
    }

    /// Stand-in for the device round trip; there is no transport yet, so it
    /// only waits.
    async fn simulate_device_call(&self) -> Result<()> {
        sleep(self.toggle_delay).await;
        Ok(())
    }

    fn require_device(&self) -> Result<Device> {
        self.device()
            .ok_or_else(|| GestureError::device_not_found(self.device_id.as_str()).into())
    }

    fn disabled(&self, action: &'static str, reason: &'static str) -> DashboardError {
        GestureError::Disabled {
            action,
            id: self.device_id.clone(),
            reason,
        }
        .into()
    }
}
