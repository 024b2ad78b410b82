use super::phase::{FeedFlags, FeedPhase};
use super::view::CameraFeedView;
use crate::config::SimulationConfig;
use crate::error::{DashboardError, EventBusError, GestureError, Result};
use crate::events::{DashboardEvent, EventBus};
use crate::fault::SharedFaultInjector;
use crate::model::{Camera, ConnectionStatus};
use crate::store::DeviceStore;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Simulated feed timings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedTiming {
    pub load_delay: Duration,
    pub refresh_delay: Duration,
}

impl FeedTiming {
    pub fn from_config(config: &SimulationConfig) -> Self {
        Self {
            load_delay: config.feed_load_delay(),
            refresh_delay: config.feed_refresh_delay(),
        }
    }
}

impl Default for FeedTiming {
    fn default() -> Self {
        Self {
            load_delay: Duration::from_millis(1500),
            refresh_delay: Duration::from_millis(1000),
        }
    }
}

/// State shared between the feed and its pending timer
struct FeedShared {
    camera_id: String,
    store: DeviceStore,
    faults: SharedFaultInjector,
    event_bus: Option<Arc<EventBus>>,
    flags: Mutex<FeedFlags>,
    /// Bumped under the flags lock whenever a load starts or the feed unmounts
    generation: AtomicU64,
}

impl FeedShared {
    fn status(&self) -> ConnectionStatus {
        self.store
            .camera(&self.camera_id)
            .map(|camera| camera.status)
            .unwrap_or(ConnectionStatus::Offline)
    }

    fn phase(&self) -> FeedPhase {
        self.flags.lock().phase(self.status())
    }

    fn announce(&self) {
        let phase = self.phase();
        debug!("Feed {} is {:?}", self.camera_id, phase);
        if let Some(event_bus) = &self.event_bus {
            match event_bus.publish(DashboardEvent::FeedPhaseChanged {
                camera_id: self.camera_id.clone(),
                phase,
            }) {
                Ok(_) => {}
                Err(EventBusError::PublishFailed { .. }) => {
                    // No subscribers yet
                }
                Err(e) => warn!("Failed to publish feed phase for {}: {}", self.camera_id, e),
            }
        }
    }

    /// Start a new load generation and enter loading
    fn restart(&self) -> u64 {
        let mut flags = self.flags.lock();
        flags.loading = true;
        flags.error = false;
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Invalidate every pending load
    fn retire(&self) {
        let _flags = self.flags.lock();
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    /// Leave the loading phase, failing with the injector's odds.
    ///
    /// A load whose generation has been superseded leaves the flags alone.
    fn resolve(&self, generation: u64) -> bool {
        let failed = {
            let mut flags = self.flags.lock();
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            let failed = self.faults.should_fail();
            flags.loading = false;
            flags.error = failed;
            failed
        };
        if failed {
            warn!("Camera feed {} failed to connect", self.camera_id);
        }
        self.announce();
        true
    }
}

/// A mounted camera feed: the display state machine for one camera.
///
/// The loading, error, playing and fullscreen flags live only as long as the
/// mount. Dropping or unmounting the feed cancels its pending timer.
pub struct CameraFeed {
    shared: Arc<FeedShared>,
    timing: FeedTiming,
    feed_url: Mutex<String>,
    lifetime: CancellationToken,
    pending: Mutex<Option<CancellationToken>>,
}

impl CameraFeed {
    /// Mount a feed for `camera` and start its initial load.
    ///
    /// Must be called from within a tokio runtime.
    pub fn mount(
        camera: &Camera,
        store: DeviceStore,
        faults: SharedFaultInjector,
        timing: FeedTiming,
    ) -> Self {
        let event_bus = store.event_bus().cloned();
        let feed = Self {
            shared: Arc::new(FeedShared {
                camera_id: camera.id.clone(),
                store,
                faults,
                event_bus,
                flags: Mutex::new(FeedFlags::mounted()),
                generation: AtomicU64::new(0),
            }),
            timing,
            feed_url: Mutex::new(camera.feed_url.clone()),
            lifetime: CancellationToken::new(),
            pending: Mutex::new(None),
        };

        info!("Mounted camera feed {} ({})", camera.id, camera.feed_url);
        feed.begin_loading(timing.load_delay);
        feed
    }

    pub fn camera_id(&self) -> &str {
        &self.shared.camera_id
    }

    pub fn flags(&self) -> FeedFlags {
        *self.shared.flags.lock()
    }

    pub fn phase(&self) -> FeedPhase {
        self.shared.phase()
    }

    pub fn is_mounted(&self) -> bool {
        !self.lifetime.is_cancelled()
    }

    pub fn render(&self) -> Option<CameraFeedView> {
        self.shared
            .store
            .camera(self.camera_id())
            .map(|camera| CameraFeedView::build(&camera, self.flags()))
    }

    /// React to new camera props; a changed feed source restarts the load
    pub fn sync(&self, camera: &Camera) -> bool {
        let changed = {
            let mut feed_url = self.feed_url.lock();
            if *feed_url == camera.feed_url {
                false
            } else {
                *feed_url = camera.feed_url.clone();
                true
            }
        };

        if changed {
            info!(
                "Feed source for {} changed to {}, reloading",
                camera.id, camera.feed_url
            );
            self.begin_loading(self.timing.load_delay);
        }
        changed
    }

    /// Manual refresh, also used as the error-state retry
    pub fn refresh(&self) -> Result<()> {
        let camera = self.require_camera()?;
        let phase = self.phase();

        if !camera.is_online() && phase != FeedPhase::Error {
            return Err(self.disabled("refresh", "camera is offline"));
        }

        self.shared.store.refresh_camera(&camera.id);
        info!("Refreshing camera feed {}", camera.id);
        self.begin_loading(self.timing.refresh_delay);
        Ok(())
    }

    /// Flip the recording flag in the store
    pub fn toggle_recording(&self) -> Result<bool> {
        let camera = self.require_camera()?;

        if !camera.is_online() {
            return Err(self.disabled("recording", "camera is offline"));
        }

        let target = !camera.is_recording;
        self.shared.store.toggle_camera_recording(&camera.id, target);
        Ok(target)
    }

    /// Cosmetic play/pause; only offered on a live feed
    pub fn toggle_play(&self) -> Result<bool> {
        self.require_live("play/pause")?;
        let mut flags = self.shared.flags.lock();
        flags.playing = !flags.playing;
        Ok(flags.playing)
    }

    /// Presentation-only fullscreen; only offered on a live feed
    pub fn toggle_fullscreen(&self) -> Result<bool> {
        self.require_live("fullscreen")?;
        let mut flags = self.shared.flags.lock();
        flags.fullscreen = !flags.fullscreen;
        Ok(flags.fullscreen)
    }

    /// Remove the feed from display, cancelling any pending timer
    pub fn unmount(&self) {
        if !self.lifetime.is_cancelled() {
            debug!("Unmounting camera feed {}", self.camera_id());
            self.lifetime.cancel();
            self.shared.retire();
        }
    }

    /// Enter loading and schedule the resolution, superseding any pending
    /// timer.
    fn begin_loading(&self, delay: Duration) {
        if self.lifetime.is_cancelled() {
            return;
        }

        let token = self.lifetime.child_token();
        if let Some(previous) = self.pending.lock().replace(token.clone()) {
            previous.cancel();
        }

        let generation = self.shared.restart();
        self.shared.announce();

        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    debug!("Feed timer for {} cancelled", shared.camera_id);
                }
                _ = tokio::time::sleep(delay) => {
                    if !shared.resolve(generation) {
                        debug!("Stale feed timer for {} ignored", shared.camera_id);
                    }
                }
            }
        });
    }

    fn require_camera(&self) -> Result<Camera> {
        self.shared
            .store
            .camera(self.camera_id())
            .ok_or_else(|| GestureError::camera_not_found(self.camera_id()).into())
    }

    fn require_live(&self, action: &'static str) -> Result<()> {
        match self.phase() {
            FeedPhase::Live => Ok(()),
            _ => Err(self.disabled(action, "feed is not live")),
        }
    }

    fn disabled(&self, action: &'static str, reason: &'static str) -> DashboardError {
        GestureError::Disabled {
            action,
            id: self.camera_id().to_string(),
            reason,
        }
        .into()
    }
}

impl Drop for CameraFeed {
    fn drop(&mut self) {
        self.lifetime.cancel();
        self.shared.retire();
    }
}
