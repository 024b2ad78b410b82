use super::view::{
    group_title, CameraSection, DashboardView, DeviceGroup, DeviceSection, SectionHeader,
    SystemStatus, DASHBOARD_SUBTITLE, DASHBOARD_TITLE, GROUP_ORDER,
};
use crate::card::DeviceCard;
use crate::config::SimulationConfig;
use crate::error::{GestureError, Result};
use crate::feed::{CameraFeed, CameraFeedView, FeedTiming};
use crate::fault::SharedFaultInjector;
use crate::model::ConnectionStatus;
use crate::store::DeviceStore;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Outcome of reconciling mounted components with the store
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub mounted: Vec<String>,
    pub unmounted: Vec<String>,
}

impl SyncReport {
    pub fn is_empty(&self) -> bool {
        self.mounted.is_empty() && self.unmounted.is_empty()
    }
}

/// Root composition: owns one feed per camera and one card per device, and
/// reads and mutates everything through the store.
pub struct Dashboard {
    store: DeviceStore,
    faults: SharedFaultInjector,
    timing: FeedTiming,
    toggle_delay: Duration,
    feeds: RwLock<HashMap<String, Arc<CameraFeed>>>,
    cards: RwLock<HashMap<String, DeviceCard>>,
}

impl Dashboard {
    pub fn new(store: DeviceStore, faults: SharedFaultInjector, config: &SimulationConfig) -> Self {
        Self::with_timing(
            store,
            faults,
            FeedTiming::from_config(config),
            config.toggle_delay(),
        )
    }

    pub fn with_timing(
        store: DeviceStore,
        faults: SharedFaultInjector,
        timing: FeedTiming,
        toggle_delay: Duration,
    ) -> Self {
        Self {
            store,
            faults,
            timing,
            toggle_delay,
            feeds: RwLock::new(HashMap::new()),
            cards: RwLock::new(HashMap::new()),
        }
    }

    pub fn store(&self) -> &DeviceStore {
        &self.store
    }

    /// Mount feeds and cards for new records and drop the ones whose record
    /// left the store. Existing feeds see the latest camera props.
    pub fn sync(&self) -> SyncReport {
        let mut report = SyncReport::default();
        let cameras = self.store.cameras();

        {
            let mut feeds = self.feeds.write();
            feeds.retain(|id, feed| {
                let keep = cameras.iter().any(|camera| &camera.id == id);
                if !keep {
                    feed.unmount();
                    report.unmounted.push(id.clone());
                }
                keep
            });

            for camera in &cameras {
                match feeds.get(&camera.id) {
                    Some(feed) => {
                        feed.sync(camera);
                    }
                    None => {
                        let feed = CameraFeed::mount(
                            camera,
                            self.store.clone(),
                            Arc::clone(&self.faults),
                            self.timing,
                        );
                        feeds.insert(camera.id.clone(), Arc::new(feed));
                        report.mounted.push(camera.id.clone());
                    }
                }
            }
        }

        {
            let devices = self.store.devices();
            let mut cards = self.cards.write();
            cards.retain(|id, _| devices.iter().any(|device| &device.id == id));
            for device in &devices {
                cards.entry(device.id.clone()).or_insert_with(|| {
                    DeviceCard::new(&device.id, self.store.clone(), self.toggle_delay)
                });
            }
        }

        if !report.is_empty() {
            info!(
                "Dashboard sync mounted {:?}, unmounted {:?}",
                report.mounted, report.unmounted
            );
        }
        report
    }

    pub fn feed(&self, camera_id: &str) -> Option<Arc<CameraFeed>> {
        self.feeds.read().get(camera_id).cloned()
    }

    pub fn card(&self, device_id: &str) -> Option<DeviceCard> {
        self.cards.read().get(device_id).cloned()
    }

    pub fn mounted_feed_count(&self) -> usize {
        self.feeds.read().len()
    }

    /// Re-derive the whole page from the store
    pub fn render(&self) -> DashboardView {
        self.sync();

        let devices = self.store.devices();
        let cameras = self.store.cameras();
        let stats = self.store.stats();

        let feeds = cameras
            .iter()
            .filter_map(|camera| self.feed(&camera.id))
            .filter_map(|feed| feed.render())
            .collect();

        let groups = GROUP_ORDER
            .iter()
            .filter_map(|device_type| {
                let cards: Vec<_> = devices
                    .iter()
                    .filter(|device| device.device_type == *device_type)
                    .filter_map(|device| self.card(&device.id))
                    .filter_map(|card| card.render())
                    .collect();

                (!cards.is_empty()).then(|| DeviceGroup {
                    title: group_title(*device_type),
                    device_type: *device_type,
                    cards,
                })
            })
            .collect();

        DashboardView {
            title: DASHBOARD_TITLE,
            subtitle: DASHBOARD_SUBTITLE,
            cameras: CameraSection {
                header: SectionHeader {
                    title: "Security Cameras",
                    online: stats.online_cameras,
                    total: stats.total_cameras,
                },
                feeds,
            },
            devices: DeviceSection {
                header: SectionHeader {
                    title: "Smart Devices",
                    online: stats.online_devices,
                    total: stats.total_devices,
                },
                groups,
            },
            status: SystemStatus::from(&stats),
        }
    }

    pub async fn toggle_device(&self, device_id: &str) -> Result<bool> {
        self.require_card(device_id)?.toggle().await
    }

    pub fn set_device_value(&self, device_id: &str, value: f64) -> Result<f64> {
        self.require_card(device_id)?.set_value(value)
    }

    pub fn set_device_status(&self, device_id: &str, status: ConnectionStatus) -> Result<()> {
        if self.store.simulate_device_status_change(device_id, status) {
            Ok(())
        } else {
            Err(GestureError::device_not_found(device_id).into())
        }
    }

    pub fn refresh_camera(&self, camera_id: &str) -> Result<()> {
        self.require_feed(camera_id)?.refresh()
    }

    pub fn toggle_camera_recording(&self, camera_id: &str) -> Result<bool> {
        self.require_feed(camera_id)?.toggle_recording()
    }

    pub fn toggle_camera_play(&self, camera_id: &str) -> Result<bool> {
        self.require_feed(camera_id)?.toggle_play()
    }

    pub fn toggle_camera_fullscreen(&self, camera_id: &str) -> Result<bool> {
        self.require_feed(camera_id)?.toggle_fullscreen()
    }

    pub fn set_camera_status(&self, camera_id: &str, status: ConnectionStatus) -> Result<()> {
        if self.store.simulate_camera_status_change(camera_id, status) {
            self.sync();
            Ok(())
        } else {
            Err(GestureError::camera_not_found(camera_id).into())
        }
    }

    /// Current view of one camera feed, mounting it first if needed
    pub fn camera_view(&self, camera_id: &str) -> Result<CameraFeedView> {
        self.require_feed(camera_id)?
            .render()
            .ok_or_else(|| GestureError::camera_not_found(camera_id).into())
    }

    /// Replace a camera's feed with a freshly mounted one
    pub fn remount_camera(&self, camera_id: &str) -> Result<()> {
        let camera = self
            .store
            .camera(camera_id)
            .ok_or_else(|| GestureError::camera_not_found(camera_id))?;

        let feed = CameraFeed::mount(
            &camera,
            self.store.clone(),
            Arc::clone(&self.faults),
            self.timing,
        );
        if let Some(previous) = self.feeds.write().insert(camera.id.clone(), Arc::new(feed)) {
            previous.unmount();
        }
        debug!("Remounted camera feed {}", camera_id);
        Ok(())
    }

    /// Unmount every feed; pending timers never resolve afterwards
    pub fn unmount_all(&self) {
        let mut feeds = self.feeds.write();
        for feed in feeds.values() {
            feed.unmount();
        }
        feeds.clear();
        self.cards.write().clear();
    }

    fn require_card(&self, device_id: &str) -> Result<DeviceCard> {
        self.sync();
        self.card(device_id)
            .ok_or_else(|| GestureError::device_not_found(device_id).into())
    }

    fn require_feed(&self, camera_id: &str) -> Result<Arc<CameraFeed>> {
        self.sync();
        self.feed(camera_id)
            .ok_or_else(|| GestureError::camera_not_found(camera_id).into())
    }
}

impl Drop for Dashboard {
    fn drop(&mut self) {
        for feed in self.feeds.get_mut().values() {
            feed.unmount();
        }
    }
}
