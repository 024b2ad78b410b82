use super::{DashboardOrchestrator, ShutdownReason};
use crate::error::{DashboardError, Result};
use crate::events::{EventBus, EventFilter};
use std::sync::Arc;
use tokio::signal;
use tokio::sync::{oneshot, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

type SharedShutdownSender = Arc<Mutex<Option<oneshot::Sender<ShutdownReason>>>>;

impl DashboardOrchestrator {
    /// Run until a signal or a shutdown request arrives, then shut down
    pub async fn run(&mut self) -> Result<i32> {
        info!("Smart home dashboard is running");

        let shutdown_sender = self
            .shutdown_sender
            .take()
            .ok_or_else(|| DashboardError::system("Shutdown sender already taken"))?;

        let shutdown_receiver = self
            .shutdown_receiver
            .take()
            .ok_or_else(|| DashboardError::system("Shutdown receiver already taken"))?;

        let shutdown_sender = Arc::new(Mutex::new(Some(shutdown_sender)));
        self.setup_signal_handlers(Arc::clone(&shutdown_sender));
        listen_for_shutdown_requests(
            Arc::clone(&self.event_bus),
            shutdown_sender,
            self.cancellation_token.child_token(),
        );

        let shutdown_reason = shutdown_receiver
            .await
            .map_err(|_| DashboardError::system("Shutdown channel closed unexpectedly"))?;

        info!("Shutdown initiated: {:?}", shutdown_reason);

        let exit_code = self.shutdown().await?;

        info!("Smart home dashboard shutdown complete");
        Ok(exit_code)
    }

    /// Set up signal handlers for graceful shutdown
    fn setup_signal_handlers(&self, shutdown_sender: SharedShutdownSender) {
        #[cfg(unix)]
        {
            let shutdown_sender_sigterm = Arc::clone(&shutdown_sender);
            tokio::spawn(async move {
                let mut sigterm = match signal::unix::signal(signal::unix::SignalKind::terminate())
                {
                    Ok(sigterm) => sigterm,
                    Err(e) => {
                        error!("Failed to register SIGTERM handler: {}", e);
                        return;
                    }
                };

                if sigterm.recv().await.is_some() {
                    info!("Received SIGTERM signal");
                    send_shutdown(
                        &shutdown_sender_sigterm,
                        ShutdownReason::Signal("SIGTERM".to_string()),
                    )
                    .await;
                }
            });
        }

        tokio::spawn(async move {
            if let Ok(()) = signal::ctrl_c().await {
                info!("Received SIGINT signal (Ctrl+C)");
                send_shutdown(
                    &shutdown_sender,
                    ShutdownReason::Signal("SIGINT".to_string()),
                )
                .await;
            }
        });
    }
}

/// Forward `ShutdownRequested` events from the bus to the shutdown channel
fn listen_for_shutdown_requests(
    event_bus: Arc<EventBus>,
    shutdown_sender: SharedShutdownSender,
    cancellation_token: CancellationToken,
) {
    let mut receiver = event_bus.subscribe_filtered(
        EventFilter::EventTypes(vec!["shutdown_requested"]),
        "shutdown_listener",
    );

    tokio::spawn(async move {
        tokio::select! {
            _ = cancellation_token.cancelled() => {}
            received = receiver.recv() => {
                if let Ok(event) = received {
                    info!("{}", event.description());
                    send_shutdown(&shutdown_sender, ShutdownReason::UserRequest).await;
                }
            }
        }
    });
}

async fn send_shutdown(shutdown_sender: &SharedShutdownSender, reason: ShutdownReason) {
    if let Some(sender) = shutdown_sender.lock().await.take() {
        let _ = sender.send(reason);
    }
}
