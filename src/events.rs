use crate::error::EventBusError;
use crate::feed::FeedPhase;
use crate::model::ConnectionStatus;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Instant, SystemTime};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

/// Events that can occur in the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DashboardEvent {
    /// A device's power flag was written
    DeviceToggled { device_id: String, is_on: bool },
    /// A device's scalar value was written
    DeviceValueChanged { device_id: String, value: f64 },
    /// A device went online or offline
    DeviceStatusChanged {
        device_id: String,
        status: ConnectionStatus,
    },
    /// A camera's last-updated stamp was refreshed
    CameraRefreshed {
        camera_id: String,
        last_updated: String,
    },
    /// A camera started or stopped recording
    CameraRecordingChanged {
        camera_id: String,
        is_recording: bool,
    },
    /// A camera went online or offline
    CameraStatusChanged {
        camera_id: String,
        status: ConnectionStatus,
    },
    /// The device collection was replaced wholesale
    DevicesReplaced { count: usize },
    /// The camera collection was replaced wholesale
    CamerasReplaced { count: usize },
    /// A mounted camera feed changed display phase
    FeedPhaseChanged { camera_id: String, phase: FeedPhase },
    /// Shutdown requested
    ShutdownRequested {
        timestamp: SystemTime,
        reason: String,
    },
}

impl DashboardEvent {
    /// Get a human-readable description of the event
    pub fn description(&self) -> String {
        match self {
            DashboardEvent::DeviceToggled { device_id, is_on } => {
                format!(
                    "Device {} turned {}",
                    device_id,
                    if *is_on { "on" } else { "off" }
                )
            }
            DashboardEvent::DeviceValueChanged { device_id, value } => {
                format!("Device {} value set to {}", device_id, value)
            }
            DashboardEvent::DeviceStatusChanged { device_id, status } => {
                format!("Device {} is {}", device_id, status)
            }
            DashboardEvent::CameraRefreshed {
                camera_id,
                last_updated,
            } => {
                format!("Camera {} refreshed at {}", camera_id, last_updated)
            }
            DashboardEvent::CameraRecordingChanged {
                camera_id,
                is_recording,
            } => {
                format!(
                    "Camera {} {} recording",
                    camera_id,
                    if *is_recording { "started" } else { "stopped" }
                )
            }
            DashboardEvent::CameraStatusChanged { camera_id, status } => {
                format!("Camera {} is {}", camera_id, status)
            }
            DashboardEvent::DevicesReplaced { count } => format!("{} devices loaded", count),
            DashboardEvent::CamerasReplaced { count } => format!("{} cameras loaded", count),
            DashboardEvent::FeedPhaseChanged { camera_id, phase } => {
                format!("Feed {} is {:?}", camera_id, phase)
            }
            DashboardEvent::ShutdownRequested { reason, .. } => {
                format!("Shutdown requested: {}", reason)
            }
        }
    }

    /// Get the event type as a string for filtering
    pub fn event_type(&self) -> &'static str {
        match self {
            DashboardEvent::DeviceToggled { .. } => "device_toggled",
            DashboardEvent::DeviceValueChanged { .. } => "device_value_changed",
            DashboardEvent::DeviceStatusChanged { .. } => "device_status_changed",
            DashboardEvent::CameraRefreshed { .. } => "camera_refreshed",
            DashboardEvent::CameraRecordingChanged { .. } => "camera_recording_changed",
            DashboardEvent::CameraStatusChanged { .. } => "camera_status_changed",
            DashboardEvent::DevicesReplaced { .. } => "devices_replaced",
            DashboardEvent::CamerasReplaced { .. } => "cameras_replaced",
            DashboardEvent::FeedPhaseChanged { .. } => "feed_phase_changed",
            DashboardEvent::ShutdownRequested { .. } => "shutdown_requested",
        }
    }

    /// Whether the event reflects a write to the store
    pub fn is_store_change(&self) -> bool {
        !matches!(
            self,
            DashboardEvent::FeedPhaseChanged { .. }
                | DashboardEvent::ShutdownRequested { .. }
        )
    }
}

/// Event bus for component coordination using broadcast channels
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<DashboardEvent>,
}

impl EventBus {
    /// Create a new event bus with the specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Subscribe to events and get a receiver
    pub fn subscribe(&self) -> broadcast::Receiver<DashboardEvent> {
        self.sender.subscribe()
    }

    /// Subscribe with a filter applied on receive
    pub fn subscribe_filtered(&self, filter: EventFilter, name: &str) -> EventReceiver {
        EventReceiver::new(self.sender.subscribe(), filter, name.to_string())
    }

    /// Publish an event to all subscribers.
    ///
    /// Publishing never blocks; it fails only when nobody is subscribed.
    pub fn publish(&self, event: DashboardEvent) -> Result<usize, EventBusError> {
        debug!("Publishing event: {}", event.description());

        match &event {
            DashboardEvent::DeviceStatusChanged { device_id, status } => {
                info!("Device {} is now {}", device_id, status);
            }
            DashboardEvent::CameraStatusChanged { camera_id, status } => {
                info!("Camera {} is now {}", camera_id, status);
            }
            DashboardEvent::ShutdownRequested { reason, .. } => {
                info!("Shutdown requested: {}", reason);
            }
            _ => {}
        }

        self.sender
            .send(event)
            .map_err(|e| EventBusError::PublishFailed {
                details: e.to_string(),
            })
    }

    /// Get the number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Check if there are any active subscribers
    pub fn has_subscribers(&self) -> bool {
        self.sender.receiver_count() > 0
    }
}

/// Event filter for selective event handling
#[derive(Debug, Clone)]
pub enum EventFilter {
    /// Accept all events
    All,
    /// Accept only specific event types
    EventTypes(Vec<&'static str>),
    /// Accept only events that write to the store
    StoreChanges,
}

impl EventFilter {
    /// Check if an event passes this filter
    pub fn matches(&self, event: &DashboardEvent) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::EventTypes(types) => types.contains(&event.event_type()),
            EventFilter::StoreChanges => event.is_store_change(),
        }
    }
}

/// Event receiver with filtering
pub struct EventReceiver {
    receiver: broadcast::Receiver<DashboardEvent>,
    filter: EventFilter,
    name: String,
}

impl EventReceiver {
    pub fn new(
        receiver: broadcast::Receiver<DashboardEvent>,
        filter: EventFilter,
        name: String,
    ) -> Self {
        Self {
            receiver,
            filter,
            name,
        }
    }

    /// Receive the next filtered event
    pub async fn recv(&mut self) -> Result<DashboardEvent, EventBusError> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => {
                    if self.filter.matches(&event) {
                        debug!(
                            "Receiver '{}' received event: {}",
                            self.name,
                            event.description()
                        );
                        return Ok(event);
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!("Receiver '{}' lagged behind by {} events", self.name, n);
                    return Err(EventBusError::Lagged(n));
                }
                Err(broadcast::error::RecvError::Closed) => {
                    debug!("Event bus closed for receiver '{}'", self.name);
                    return Err(EventBusError::ChannelClosed);
                }
            }
        }
    }

    /// Try to receive an event without blocking
    pub fn try_recv(&mut self) -> Result<Option<DashboardEvent>, EventBusError> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    if self.filter.matches(&event) {
                        return Ok(Some(event));
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => return Ok(None),
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    warn!("Receiver '{}' lagged behind by {} events", self.name, n);
                    return Err(EventBusError::Lagged(n));
                }
                Err(broadcast::error::TryRecvError::Closed) => {
                    return Err(EventBusError::ChannelClosed);
                }
            }
        }
    }
}

/// Trait for components that consume events from the bus
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle_event(&mut self, event: DashboardEvent) -> Result<(), EventBusError>;

    fn handler_name(&self) -> &str;

    fn event_filter(&self) -> EventFilter {
        EventFilter::All
    }
}

/// Counters over the events seen on the bus
#[derive(Debug, Clone)]
pub struct EventMetrics {
    pub total_events: u64,
    pub events_by_type: HashMap<String, u64>,
    pub started: Instant,
}

impl Default for EventMetrics {
    fn default() -> Self {
        Self {
            total_events: 0,
            events_by_type: HashMap::new(),
            started: Instant::now(),
        }
    }
}

impl EventMetrics {
    pub fn record_event(&mut self, event: &DashboardEvent) {
        self.total_events += 1;
        *self
            .events_by_type
            .entry(event.event_type().to_string())
            .or_insert(0) += 1;
    }

    pub fn events_per_second(&self) -> f64 {
        let elapsed = self.started.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.total_events as f64 / elapsed
        } else {
            0.0
        }
    }
}

/// Logs every store change at info level
pub struct LoggingHandler {
    name: String,
}

impl LoggingHandler {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

#[async_trait]
impl EventHandler for LoggingHandler {
    async fn handle_event(&mut self, event: DashboardEvent) -> Result<(), EventBusError> {
        info!("[{}] {}", self.name, event.description());
        Ok(())
    }

    fn handler_name(&self) -> &str {
        &self.name
    }

    fn event_filter(&self) -> EventFilter {
        EventFilter::StoreChanges
    }
}

/// Records every event into shared metrics
pub struct MetricsHandler {
    name: String,
    metrics: Arc<Mutex<EventMetrics>>,
}

impl MetricsHandler {
    pub fn new(name: &str, metrics: Arc<Mutex<EventMetrics>>) -> Self {
        Self {
            name: name.to_string(),
            metrics,
        }
    }
}

#[async_trait]
impl EventHandler for MetricsHandler {
    async fn handle_event(&mut self, event: DashboardEvent) -> Result<(), EventBusError> {
        self.metrics.lock().await.record_event(&event);
        Ok(())
    }

    fn handler_name(&self) -> &str {
        &self.name
    }
}

/// Drive a handler from the bus until the channel closes or the token fires
pub async fn run_handler<H: EventHandler>(
    event_bus: &EventBus,
    mut handler: H,
    cancellation_token: tokio_util::sync::CancellationToken,
) {
    let mut receiver = event_bus.subscribe_filtered(handler.event_filter(), handler.handler_name());

    loop {
        tokio::select! {
            _ = cancellation_token.cancelled() => break,
            received = receiver.recv() => match received {
                Ok(event) => {
                    if let Err(e) = handler.handle_event(event).await {
                        warn!("Handler '{}' failed: {}", handler.handler_name(), e);
                    }
                }
                Err(EventBusError::Lagged(_)) => continue,
                Err(_) => break,
            }
        }
    }

    debug!("Handler '{}' stopped", handler.handler_name());
}
