use super::types::{ComponentState, ShutdownReason};
use crate::config::DashboardConfig;
use crate::dashboard::Dashboard;
use crate::error::Result;
use crate::events::{EventBus, EventMetrics};
use crate::fault::{RandomFaults, SharedFaultInjector};
use crate::keyboard_input::KeyboardInputHandler;
use crate::store::{DeviceStore, FileStorage, MemoryStorage, SharedPersistence};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

#[cfg(feature = "server")]
use crate::server::DashboardServer;

/// Owns the store, the dashboard and the surfaces around them, and drives
/// their lifecycle from startup to graceful shutdown.
pub struct DashboardOrchestrator {
    pub(super) config: DashboardConfig,
    pub(super) event_bus: Arc<EventBus>,
    pub(super) store: DeviceStore,
    pub(super) dashboard: Arc<Dashboard>,
    pub(super) metrics: Arc<Mutex<EventMetrics>>,

    // Components
    #[cfg(feature = "server")]
    pub(super) server: Option<Arc<DashboardServer>>,
    pub(super) server_enabled: bool,
    pub(super) keyboard_handler: Option<KeyboardInputHandler>,
    pub(super) keyboard_enabled: bool,
    pub(super) reset_on_start: bool,
    pub(super) tasks: Vec<(String, JoinHandle<()>)>,

    // Lifecycle management
    pub(super) component_states: Arc<Mutex<HashMap<String, ComponentState>>>,
    pub(super) shutdown_sender: Option<oneshot::Sender<ShutdownReason>>,
    pub(super) shutdown_receiver: Option<oneshot::Receiver<ShutdownReason>>,
    pub(super) cancellation_token: CancellationToken,
}

impl DashboardOrchestrator {
    /// Create a new orchestrator with the given configuration
    pub fn new(config: DashboardConfig) -> Result<Self> {
        let faults: SharedFaultInjector =
            Arc::new(RandomFaults::new(config.simulation.failure_probability));
        Self::with_faults(config, faults)
    }

    /// Create an orchestrator whose feeds draw failures from `faults`
    pub fn with_faults(config: DashboardConfig, faults: SharedFaultInjector) -> Result<Self> {
        config.validate()?;

        let event_bus = Arc::new(EventBus::new(config.system.event_bus_capacity));

        let persistence: SharedPersistence = if config.storage.persist {
            Arc::new(FileStorage::new(&config.storage.path, &config.storage.key))
        } else {
            Arc::new(MemoryStorage::new())
        };
        info!("Device store backed by {}", persistence.describe());

        let store = DeviceStore::new(persistence).with_event_bus(Arc::clone(&event_bus));
        let dashboard = Arc::new(Dashboard::new(store.clone(), faults, &config.simulation));

        #[cfg(feature = "server")]
        let server = Some(Arc::new(DashboardServer::new(
            config.server.clone(),
            Arc::clone(&dashboard),
            Arc::clone(&event_bus),
        )));

        let keyboard_handler = Some(KeyboardInputHandler::new(
            Arc::clone(&dashboard),
            Arc::clone(&event_bus),
        ));

        let (shutdown_sender, shutdown_receiver) = oneshot::channel();

        Ok(Self {
            keyboard_enabled: config.system.keyboard,
            config,
            event_bus,
            store,
            dashboard,
            metrics: Arc::new(Mutex::new(EventMetrics::default())),
            #[cfg(feature = "server")]
            server,
            server_enabled: cfg!(feature = "server"),
            keyboard_handler,
            reset_on_start: false,
            tasks: Vec::new(),
            component_states: Arc::new(Mutex::new(HashMap::new())),
            shutdown_sender: Some(shutdown_sender),
            shutdown_receiver: Some(shutdown_receiver),
            cancellation_token: CancellationToken::new(),
        })
    }

    /// Enable or disable the keyboard input handler
    pub fn set_keyboard_enabled(&mut self, enabled: bool) {
        self.keyboard_enabled = enabled;
    }

    /// Enable or disable the HTTP server
    pub fn set_server_enabled(&mut self, enabled: bool) {
        self.server_enabled = enabled && cfg!(feature = "server");
    }

    /// Reseed on startup even when a snapshot was restored
    pub fn set_reset_on_start(&mut self, reset: bool) {
        self.reset_on_start = reset;
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn store(&self) -> &DeviceStore {
        &self.store
    }

    pub fn dashboard(&self) -> Arc<Dashboard> {
        Arc::clone(&self.dashboard)
    }

    pub fn event_bus(&self) -> Arc<EventBus> {
        Arc::clone(&self.event_bus)
    }

    pub fn metrics(&self) -> Arc<Mutex<EventMetrics>> {
        Arc::clone(&self.metrics)
    }
}
