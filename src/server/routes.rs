use crate::{
    config::ServerConfig,
    dashboard::Dashboard,
    error::{DashboardError, Result, ServerError},
    events::EventBus,
};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::handlers::{
    camera_fullscreen_handler, camera_play_handler, camera_recording_handler,
    camera_remount_handler, camera_status_handler, cameras_handler, dashboard_handler,
    device_status_handler, device_value_handler, devices_handler, events_handler,
    health_handler, page_handler, refresh_camera_handler, stats_handler, toggle_device_handler,
};

/// Shared state for the Axum server
#[derive(Clone)]
pub struct ServerState {
    pub(crate) dashboard: Arc<Dashboard>,
    pub(crate) event_bus: Arc<EventBus>,
}

impl ServerState {
    pub fn new(dashboard: Arc<Dashboard>, event_bus: Arc<EventBus>) -> Self {
        Self {
            dashboard,
            event_bus,
        }
    }
}

/// Build the dashboard routes over the given state
pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/", get(page_handler))
        .route("/health", get(health_handler))
        .route("/api/dashboard", get(dashboard_handler))
        .route("/api/stats", get(stats_handler))
        .route("/api/devices", get(devices_handler))
        .route("/api/cameras", get(cameras_handler))
        .route("/api/events", get(events_handler))
        .route("/api/devices/:id/toggle", post(toggle_device_handler))
        .route("/api/devices/:id/value", post(device_value_handler))
        .route("/api/devices/:id/status", post(device_status_handler))
        .route("/api/cameras/:id/refresh", post(refresh_camera_handler))
        .route("/api/cameras/:id/recording", post(camera_recording_handler))
        .route("/api/cameras/:id/play", post(camera_play_handler))
        .route("/api/cameras/:id/fullscreen", post(camera_fullscreen_handler))
        .route("/api/cameras/:id/status", post(camera_status_handler))
        .route("/api/cameras/:id/remount", post(camera_remount_handler))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

/// HTTP surface of the dashboard
pub struct DashboardServer {
    pub(crate) config: ServerConfig,
    pub(crate) dashboard: Arc<Dashboard>,
    pub(crate) event_bus: Arc<EventBus>,
}

impl DashboardServer {
    pub fn new(config: ServerConfig, dashboard: Arc<Dashboard>, event_bus: Arc<EventBus>) -> Self {
        Self {
            config,
            dashboard,
            event_bus,
        }
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.config.ip, self.config.port)
    }

    /// Serve until `shutdown` is cancelled
    pub async fn start(&self, shutdown: CancellationToken) -> Result<()> {
        let app = router(ServerState::new(
            Arc::clone(&self.dashboard),
            Arc::clone(&self.event_bus),
        ));

        let addr = self.address();
        info!("Starting dashboard server on {}", addr);

        let listener =
            tokio::net::TcpListener::bind(&addr)
                .await
                .map_err(|e| ServerError::BindFailed {
                    address: addr.clone(),
                    source: e,
                })?;

        info!("Dashboard server listening on http://{}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(async move { shutdown.cancelled().await })
            .await
            .map_err(|e| ServerError::StartupFailed {
                details: format!("Server error: {}", e),
            })?;

        info!("Dashboard server on {} stopped", addr);
        Ok(())
    }
}

/// Dashboard server builder
#[derive(Default)]
pub struct DashboardServerBuilder {
    config: Option<ServerConfig>,
    dashboard: Option<Arc<Dashboard>>,
    event_bus: Option<Arc<EventBus>>,
}

impl DashboardServerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn dashboard(mut self, dashboard: Arc<Dashboard>) -> Self {
        self.dashboard = Some(dashboard);
        self
    }

    pub fn event_bus(mut self, event_bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    pub fn build(self) -> Result<DashboardServer> {
        let config = self.config.ok_or_else(|| {
            DashboardError::Server(ServerError::StartupFailed {
                details: "Server configuration is required".to_string(),
            })
        })?;

        let dashboard = self.dashboard.ok_or_else(|| {
            DashboardError::Server(ServerError::StartupFailed {
                details: "Dashboard is required".to_string(),
            })
        })?;

        let event_bus = self.event_bus.ok_or_else(|| {
            DashboardError::Server(ServerError::StartupFailed {
                details: "Event bus is required".to_string(),
            })
        })?;

        Ok(DashboardServer::new(config, dashboard, event_bus))
    }
}
