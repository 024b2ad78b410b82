use super::*;
use crate::config::DashboardConfig;
use crate::error::{DashboardError, StorageError};
use crate::events::DashboardEvent;
use crate::fault::NeverFail;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

fn create_test_config(dir: &std::path::Path) -> DashboardConfig {
    let mut config = DashboardConfig::default();
    config.storage.path = dir.display().to_string();
    config.simulation.toggle_delay_ms = 10;
    config.simulation.feed_load_delay_ms = 20;
    config.simulation.feed_refresh_delay_ms = 20;
    config
}

fn create_orchestrator(config: DashboardConfig) -> DashboardOrchestrator {
    let mut orchestrator = DashboardOrchestrator::with_faults(config, Arc::new(NeverFail)).unwrap();
    orchestrator.set_server_enabled(false);
    orchestrator
}

#[tokio::test]
async fn test_orchestrator_creation() {
    let dir = tempfile::tempdir().unwrap();
    let orchestrator = create_orchestrator(create_test_config(dir.path()));

    // Nothing registered before initialize
    let states = orchestrator.get_all_component_states().await;
    assert!(states.is_empty());
    assert!(orchestrator.store().is_empty());
}

#[tokio::test]
async fn test_invalid_config_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = create_test_config(dir.path());
    config.simulation.failure_probability = 2.0;

    let result = DashboardOrchestrator::with_faults(config, Arc::new(NeverFail));
    assert!(matches!(result, Err(DashboardError::Config(_))));
}

#[tokio::test]
async fn test_unwritable_storage_fails_initialize() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("occupied");
    std::fs::write(&blocker, "not a directory").unwrap();

    let mut config = create_test_config(dir.path());
    config.storage.path = blocker.join("data").display().to_string();

    let mut orchestrator = create_orchestrator(config);
    let result = orchestrator.initialize().await;
    assert!(matches!(
        result,
        Err(DashboardError::Storage(StorageError::Write { .. }))
    ));
}

#[tokio::test]
async fn test_component_state_management() {
    let dir = tempfile::tempdir().unwrap();
    let orchestrator = create_orchestrator(create_test_config(dir.path()));

    orchestrator
        .set_component_state("server", ComponentState::Starting)
        .await;
    assert_eq!(
        orchestrator.get_component_state("server").await,
        Some(ComponentState::Starting)
    );

    orchestrator
        .set_component_state("server", ComponentState::Running)
        .await;
    orchestrator
        .set_component_state("events", ComponentState::Failed)
        .await;

    let all_states = orchestrator.get_all_component_states().await;
    assert_eq!(all_states.len(), 2);
    assert_eq!(all_states.get("server"), Some(&ComponentState::Running));
    assert_eq!(all_states.get("events"), Some(&ComponentState::Failed));
}

#[tokio::test]
async fn test_initialize_seeds_empty_store() {
    let dir = tempfile::tempdir().unwrap();
    let mut orchestrator = create_orchestrator(create_test_config(dir.path()));
    orchestrator.initialize().await.unwrap();

    let stats = orchestrator.store().stats();
    assert_eq!(stats.total_devices, 6);
    assert_eq!(stats.total_cameras, 3);

    let states = orchestrator.get_all_component_states().await;
    assert!(states.contains_key("dashboard"));
    assert!(!states.contains_key("server"));
    assert!(!states.contains_key("keyboard"));
}

#[tokio::test]
async fn test_restored_snapshot_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(dir.path());

    {
        let mut orchestrator = create_orchestrator(config.clone());
        orchestrator.initialize().await.unwrap();
        orchestrator.store().toggle_device("1", false);
    }

    let mut restarted = create_orchestrator(config.clone());
    restarted.initialize().await.unwrap();
    assert!(!restarted.store().device("1").unwrap().is_on);

    let mut reset = create_orchestrator(config);
    reset.set_reset_on_start(true);
    reset.initialize().await.unwrap();
    assert!(reset.store().device("1").unwrap().is_on);
}

#[tokio::test]
async fn test_in_memory_storage_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = create_test_config(dir.path());
    config.storage.persist = false;

    let mut orchestrator = create_orchestrator(config);
    orchestrator.initialize().await.unwrap();

    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_start_and_shutdown() {
    let dir = tempfile::tempdir().unwrap();
    let mut orchestrator = create_orchestrator(create_test_config(dir.path()));
    orchestrator.initialize().await.unwrap();
    orchestrator.start().await.unwrap();

    let dashboard = orchestrator.dashboard();
    assert_eq!(dashboard.mounted_feed_count(), 3);
    assert_eq!(
        orchestrator.get_component_state("events").await,
        Some(ComponentState::Running)
    );

    // Give the handlers a moment to subscribe
    tokio::time::sleep(Duration::from_millis(20)).await;
    orchestrator.store().toggle_device("5", true);
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(orchestrator.metrics().lock().await.total_events > 0);

    let exit_code = orchestrator.shutdown().await.unwrap();
    assert_eq!(exit_code, 0);
    assert_eq!(dashboard.mounted_feed_count(), 0);
    assert_eq!(
        orchestrator.get_component_state("dashboard").await,
        Some(ComponentState::Stopped)
    );
}

#[tokio::test]
async fn test_shutdown_requested_event_ends_run() {
    let dir = tempfile::tempdir().unwrap();
    let mut orchestrator = create_orchestrator(create_test_config(dir.path()));
    orchestrator.initialize().await.unwrap();
    orchestrator.start().await.unwrap();

    let event_bus = orchestrator.event_bus();
    let run = tokio::spawn(async move { orchestrator.run().await });

    tokio::time::sleep(Duration::from_millis(50)).await;
    event_bus
        .publish(DashboardEvent::ShutdownRequested {
            timestamp: SystemTime::now(),
            reason: "test".to_string(),
        })
        .unwrap();

    let exit_code = tokio::time::timeout(Duration::from_secs(10), run)
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert_eq!(exit_code, 0);
}
