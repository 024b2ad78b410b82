use super::{ComponentState, DashboardOrchestrator};
use crate::dashboard::DashboardSync;
use crate::error::Result;
use crate::events::{run_handler, EventHandler, LoggingHandler, MetricsHandler};
use crate::seed::MockSeed;
use std::sync::Arc;
use tracing::{error, info};

impl DashboardOrchestrator {
    /// Seed the store and register the components to run
    pub async fn initialize(&mut self) -> Result<()> {
        info!("Initializing dashboard components");

        self.store.prepare_persistence().map_err(|e| {
            error!("Storage is not writable: {}", e);
            e
        })?;

        if self.reset_on_start {
            info!("Reset requested, reseeding the store");
            MockSeed.apply(&self.store);
        } else {
            MockSeed.apply_if_empty(&self.store);
        }

        let mut states = self.component_states.lock().await;
        states.insert("store".to_string(), ComponentState::Running);
        states.insert("events".to_string(), ComponentState::Stopped);
        states.insert("dashboard".to_string(), ComponentState::Stopped);

        if self.server_enabled {
            states.insert("server".to_string(), ComponentState::Stopped);
        }

        // Only register keyboard component if enabled
        if self.keyboard_enabled {
            states.insert("keyboard".to_string(), ComponentState::Stopped);
        }
        drop(states);

        let stats = self.store.stats();
        info!(
            "Store holds {} devices ({} online) and {} cameras ({} online)",
            stats.total_devices, stats.online_devices, stats.total_cameras, stats.online_cameras
        );
        Ok(())
    }

    /// Start all components
    pub async fn start(&mut self) -> Result<()> {
        info!("Starting smart home dashboard");

        self.set_component_state("events", ComponentState::Starting)
            .await;
        self.spawn_handler(LoggingHandler::new("store_log"));
        self.spawn_handler(MetricsHandler::new("metrics", Arc::clone(&self.metrics)));
        self.spawn_handler(DashboardSync::new(Arc::clone(&self.dashboard)));
        self.set_component_state("events", ComponentState::Running)
            .await;

        self.set_component_state("dashboard", ComponentState::Starting)
            .await;
        let report = self.dashboard.sync();
        self.set_component_state("dashboard", ComponentState::Running)
            .await;
        info!("Dashboard mounted {} camera feeds", report.mounted.len());

        #[cfg(feature = "server")]
        self.start_server().await;

        if self.keyboard_enabled {
            if let Some(keyboard_handler) = &self.keyboard_handler {
                self.set_component_state("keyboard", ComponentState::Starting)
                    .await;

                keyboard_handler.start().await.map_err(|e| {
                    error!("Failed to start keyboard handler: {}", e);
                    e
                })?;

                self.set_component_state("keyboard", ComponentState::Running)
                    .await;
                info!("Keyboard input handler started - press q to quit");
            }
        }

        info!("Smart home dashboard started successfully");
        Ok(())
    }

    #[cfg(feature = "server")]
    async fn start_server(&mut self) {
        if !self.server_enabled {
            return;
        }
        let Some(server) = self.server.as_ref().map(Arc::clone) else {
            return;
        };

        self.set_component_state("server", ComponentState::Starting)
            .await;

        let shutdown = self.cancellation_token.child_token();
        let states = Arc::clone(&self.component_states);
        let handle = tokio::spawn(async move {
            if let Err(e) = server.start(shutdown).await {
                error!("Dashboard server error: {}", e);
                states
                    .lock()
                    .await
                    .insert("server".to_string(), ComponentState::Failed);
            }
        });
        self.tasks.push(("server".to_string(), handle));

        self.set_component_state("server", ComponentState::Running)
            .await;
        info!(
            "Dashboard server started on {}:{}",
            self.config.server.ip, self.config.server.port
        );
    }

    fn spawn_handler<H: EventHandler + 'static>(&mut self, handler: H) {
        let name = handler.handler_name().to_string();
        let event_bus = Arc::clone(&self.event_bus);
        let token = self.cancellation_token.child_token();

        let handle = tokio::spawn(async move {
            run_handler(&event_bus, handler, token).await;
        });
        self.tasks.push((name, handle));
    }
}
