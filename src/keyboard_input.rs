use crate::dashboard::Dashboard;
use crate::error::Result;
use crate::events::{DashboardEvent, EventBus};
use crate::model::ConnectionStatus;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use rand::seq::IndexedRandom;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::runtime::Handle;
use tokio::task;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Single-key terminal commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyCommand {
    /// Toggle the device whose id is the pressed digit
    ToggleDevice(String),
    /// Refresh every camera that accepts a refresh
    RefreshCameras,
    /// Flip the connectivity of one random device
    SimulateOutage,
    /// Print the dashboard
    Print,
    Quit,
}

impl KeyCommand {
    pub fn from_key(code: KeyCode) -> Option<Self> {
        match code {
            KeyCode::Char(c) if c.is_ascii_digit() && c != '0' => {
                Some(KeyCommand::ToggleDevice(c.to_string()))
            }
            KeyCode::Char('r') => Some(KeyCommand::RefreshCameras),
            KeyCode::Char('x') => Some(KeyCommand::SimulateOutage),
            KeyCode::Char('p') | KeyCode::Enter => Some(KeyCommand::Print),
            KeyCode::Char('q') | KeyCode::Esc => Some(KeyCommand::Quit),
            _ => None,
        }
    }
}

/// Apply a command to the dashboard. `Quit` is handled by the caller.
pub async fn execute(dashboard: &Dashboard, command: KeyCommand) -> Result<()> {
    match command {
        KeyCommand::ToggleDevice(id) => {
            let is_on = dashboard.toggle_device(&id).await?;
            info!("Device {} is now {}", id, if is_on { "on" } else { "off" });
        }
        KeyCommand::RefreshCameras => {
            for camera in dashboard.store().cameras() {
                if let Err(e) = dashboard.refresh_camera(&camera.id) {
                    debug!("Skipping refresh of {}: {}", camera.id, e);
                }
            }
        }
        KeyCommand::SimulateOutage => {
            let devices = dashboard.store().devices();
            if let Some(device) = devices.choose(&mut rand::rng()) {
                let status = match device.status {
                    ConnectionStatus::Online => ConnectionStatus::Offline,
                    ConnectionStatus::Offline => ConnectionStatus::Online,
                };
                dashboard.set_device_status(&device.id, status)?;
                info!("Simulated {} going {}", device.name, status);
            }
        }
        KeyCommand::Print => {
            // Raw mode needs explicit carriage returns
            let text = dashboard.render().to_string().replace('\n', "\r\n");
            print!("\r\n{}\r\n", text);
        }
        KeyCommand::Quit => {}
    }
    Ok(())
}

/// Terminal key commands for driving the dashboard without the web page
pub struct KeyboardInputHandler {
    dashboard: Arc<Dashboard>,
    event_bus: Arc<EventBus>,
    cancellation_token: CancellationToken,
}

impl KeyboardInputHandler {
    pub fn new(dashboard: Arc<Dashboard>, event_bus: Arc<EventBus>) -> Self {
        Self {
            dashboard,
            event_bus,
            cancellation_token: CancellationToken::new(),
        }
    }

    /// Start listening for keyboard input
    pub async fn start(&self) -> Result<()> {
        info!("Starting keyboard input handler - 1-9 toggle, r refresh, x outage, p print, q quit");

        let dashboard = Arc::clone(&self.dashboard);
        let event_bus = Arc::clone(&self.event_bus);
        let cancellation_token = self.cancellation_token.clone();
        let runtime_handle = Handle::current();

        task::spawn_blocking(move || {
            if let Err(e) = enable_raw_mode() {
                error!("Failed to enable raw mode for keyboard input: {}", e);
                return;
            }

            info!("Raw mode enabled - keyboard handler active");

            loop {
                if cancellation_token.is_cancelled() {
                    debug!("Keyboard input handler stopping");
                    break;
                }

                match event::poll(Duration::from_millis(100)) {
                    Ok(true) => {
                        let key_event = match event::read() {
                            Ok(Event::Key(key_event)) if key_event.kind == KeyEventKind::Press => {
                                key_event
                            }
                            _ => continue,
                        };

                        match KeyCommand::from_key(key_event.code) {
                            Some(KeyCommand::Quit) => {
                                info!("Quit key pressed - requesting shutdown");

                                let shutdown_event = DashboardEvent::ShutdownRequested {
                                    timestamp: SystemTime::now(),
                                    reason: "User requested via keyboard".to_string(),
                                };
                                if let Err(e) = event_bus.publish(shutdown_event) {
                                    warn!("Failed to publish shutdown event: {}", e);
                                }
                                break;
                            }
                            Some(command) => {
                                let dashboard = Arc::clone(&dashboard);
                                runtime_handle.spawn(async move {
                                    if let Err(e) = execute(&dashboard, command).await {
                                        warn!("Key command failed: {}", e);
                                    }
                                });
                            }
                            None => {
                                debug!("Key pressed: {:?}", key_event.code);
                            }
                        }
                    }
                    Ok(false) => {}
                    Err(e) => {
                        warn!("Error polling for keyboard events: {}", e);
                    }
                }
            }

            if let Err(e) = disable_raw_mode() {
                error!("Failed to disable raw mode: {}", e);
            } else {
                debug!("Raw mode disabled");
            }

            debug!("Keyboard input handler task exited");
        });

        Ok(())
    }

    /// Stop the keyboard input handler
    pub async fn stop(&self) -> Result<()> {
        info!("Stopping keyboard input handler");
        self.cancellation_token.cancel();

        // Let the polling loop notice the token and restore the terminal
        tokio::time::sleep(Duration::from_millis(200)).await;
        let _ = disable_raw_mode();

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fault::NeverFail;
    use crate::feed::FeedTiming;
    use crate::seed::MockSeed;
    use crate::store::DeviceStore;

    fn seeded_dashboard() -> Dashboard {
        let store = DeviceStore::in_memory();
        MockSeed.apply(&store);
        Dashboard::with_timing(
            store,
            Arc::new(NeverFail),
            FeedTiming::default(),
            Duration::from_millis(500),
        )
    }

    #[test]
    fn test_key_mapping() {
        assert_eq!(
            KeyCommand::from_key(KeyCode::Char('3')),
            Some(KeyCommand::ToggleDevice("3".to_string()))
        );
        assert_eq!(KeyCommand::from_key(KeyCode::Char('0')), None);
        assert_eq!(
            KeyCommand::from_key(KeyCode::Char('r')),
            Some(KeyCommand::RefreshCameras)
        );
        assert_eq!(KeyCommand::from_key(KeyCode::Esc), Some(KeyCommand::Quit));
        assert_eq!(KeyCommand::from_key(KeyCode::Char('z')), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_toggle_command() {
        let dashboard = seeded_dashboard();
        execute(&dashboard, KeyCommand::ToggleDevice("5".to_string()))
            .await
            .unwrap();

        assert!(dashboard.store().device("5").unwrap().is_on);
    }

    #[tokio::test(start_paused = true)]
    async fn test_outage_command_flips_one_device() {
        let dashboard = seeded_dashboard();
        execute(&dashboard, KeyCommand::SimulateOutage).await.unwrap();

        let online = dashboard.store().online_devices().len();
        assert!(online == 4 || online == 6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_skips_offline_cameras() {
        let dashboard = seeded_dashboard();
        execute(&dashboard, KeyCommand::RefreshCameras).await.unwrap();

        assert_eq!(dashboard.store().camera("cam3").unwrap().last_updated, "1 hour ago");
        assert_ne!(dashboard.store().camera("cam1").unwrap().last_updated, "2 minutes ago");
    }

    #[tokio::test]
    async fn test_keyboard_handler_stop() {
        let event_bus = Arc::new(EventBus::new(100));
        let handler = KeyboardInputHandler::new(Arc::new(seeded_dashboard()), event_bus);

        handler.stop().await.unwrap();
        assert!(handler.cancellation_token.is_cancelled());
    }
}
