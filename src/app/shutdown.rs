use super::{ComponentState, DashboardOrchestrator};
use crate::error::{DashboardError, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{error, info, warn};

impl DashboardOrchestrator {
    /// Perform graceful shutdown of all components
    pub async fn shutdown(&mut self) -> Result<i32> {
        info!("Beginning graceful shutdown");

        // Cancel all background tasks
        self.cancellation_token.cancel();

        let mut exit_code = 0;

        // Stop components in reverse start order
        if self.keyboard_enabled {
            if let Err(e) = self.stop_keyboard().await {
                error!("Error stopping keyboard: {}", e);
                exit_code = 1;
            }
        }

        if let Err(e) = self.stop_tasks().await {
            error!("Error stopping background tasks: {}", e);
            exit_code = 1;
        }

        self.set_component_state("dashboard", ComponentState::Stopping)
            .await;
        self.dashboard.unmount_all();
        self.set_component_state("dashboard", ComponentState::Stopped)
            .await;

        let stats = self.store.stats();
        info!(
            "Final store state: {} of {} devices online, {} cameras recording",
            stats.online_devices, stats.total_devices, stats.recording_cameras
        );
        self.set_component_state("store", ComponentState::Stopped)
            .await;

        let metrics = self.metrics.lock().await;
        info!(
            "Handled {} events ({:.2}/s)",
            metrics.total_events,
            metrics.events_per_second()
        );

        info!("Graceful shutdown completed with exit code: {}", exit_code);
        Ok(exit_code)
    }

    async fn stop_keyboard(&self) -> Result<()> {
        match &self.keyboard_handler {
            Some(keyboard_handler) => {
                self.stop_component("keyboard", Duration::from_secs(2), keyboard_handler.stop())
                    .await
            }
            None => {
                self.set_component_state("keyboard", ComponentState::Stopped)
                    .await;
                Ok(())
            }
        }
    }

    /// Wait for the server and event handlers to observe cancellation
    async fn stop_tasks(&mut self) -> Result<()> {
        let mut result = Ok(());

        for (name, handle) in std::mem::take(&mut self.tasks) {
            let component = if name == "server" { "server" } else { "events" };
            let stopped = self
                .stop_component(component, Duration::from_secs(5), async move {
                    handle.await.map_err(|e| {
                        DashboardError::component(name, format!("task failed: {}", e))
                    })
                })
                .await;

            if let Err(e) = stopped {
                warn!("{}", e);
                result = Err(e);
            }
        }

        result
    }

    async fn stop_component<F>(&self, component: &str, limit: Duration, stop: F) -> Result<()>
    where
        F: Future<Output = Result<()>>,
    {
        info!("Stopping {} component", component);
        self.set_component_state(component, ComponentState::Stopping)
            .await;

        match timeout(limit, stop).await {
            Ok(Ok(())) => {
                self.set_component_state(component, ComponentState::Stopped)
                    .await;
                info!("{} component stopped", component);
                Ok(())
            }
            Ok(Err(e)) => {
                self.set_component_state(component, ComponentState::Failed)
                    .await;
                error!("Error stopping {} component: {}", component, e);
                Err(e)
            }
            Err(_) => {
                self.set_component_state(component, ComponentState::Failed)
                    .await;
                error!("{} component stop timeout", component);
                Err(DashboardError::system(format!(
                    "{} component stop timeout",
                    component
                )))
            }
        }
    }
}
