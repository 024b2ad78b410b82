use super::*;
use crate::error::{DashboardError, GestureError};
use crate::events::{run_handler, EventBus};
use crate::feed::{FeedPhase, FeedTiming};
use crate::fault::NeverFail;
use crate::model::{ConnectionStatus, DeviceType};
use crate::seed::MockSeed;
use crate::store::DeviceStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

const TIMING: FeedTiming = FeedTiming {
    load_delay: Duration::from_millis(1500),
    refresh_delay: Duration::from_millis(1000),
};
const TOGGLE_DELAY: Duration = Duration::from_millis(500);

fn dashboard_over(store: DeviceStore) -> Dashboard {
    Dashboard::with_timing(store, Arc::new(NeverFail), TIMING, TOGGLE_DELAY)
}

fn seeded_dashboard() -> Dashboard {
    let store = DeviceStore::in_memory();
    MockSeed.apply(&store);
    dashboard_over(store)
}

#[tokio::test(start_paused = true)]
async fn test_render_seeded_page() {
    let dashboard = seeded_dashboard();
    let view = dashboard.render();

    assert_eq!(view.title, DASHBOARD_TITLE);
    assert_eq!(view.cameras.header.summary(), "2 of 3 online");
    assert_eq!(view.devices.header.summary(), "5 of 6 online");
    assert_eq!(view.cameras.feeds.len(), 3);

    let titles: Vec<_> = view.devices.groups.iter().map(|g| g.title).collect();
    assert_eq!(titles, vec!["Lighting", "Climate Control", "Device Cameras"]);
    assert_eq!(view.devices.groups[0].cards.len(), 2);

    assert_eq!(
        view.status,
        SystemStatus {
            devices_online: 5,
            cameras_online: 2,
            cameras_recording: 1,
        }
    );
}

#[tokio::test(start_paused = true)]
async fn test_empty_groups_are_omitted() {
    let store = DeviceStore::in_memory();
    let lights = MockSeed
        .devices()
        .into_iter()
        .filter(|d| d.device_type == DeviceType::Light)
        .collect();
    store.set_all_devices(lights);

    let view = dashboard_over(store).render();
    assert_eq!(view.devices.groups.len(), 1);
    assert_eq!(view.devices.groups[0].title, "Lighting");
    assert_eq!(view.cameras.header.summary(), "0 of 0 online");
}

#[tokio::test(start_paused = true)]
async fn test_counters_follow_store_mutations() {
    let dashboard = seeded_dashboard();
    dashboard.render();

    dashboard
        .set_device_status("2", ConnectionStatus::Offline)
        .unwrap();
    dashboard.toggle_camera_recording("cam2").unwrap();

    let view = dashboard.render();
    assert_eq!(view.devices.header.summary(), "4 of 6 online");
    assert_eq!(view.status.cameras_recording, 2);
}

#[tokio::test(start_paused = true)]
async fn test_sync_mounts_and_unmounts_feeds() {
    let dashboard = seeded_dashboard();
    let report = dashboard.sync();
    assert_eq!(report.mounted.len(), 3);
    assert!(dashboard.sync().is_empty());

    let garage = dashboard.feed("cam3").unwrap();
    let remaining = MockSeed.cameras().into_iter().take(2).collect();
    dashboard.store().set_all_cameras(remaining);

    let report = dashboard.sync();
    assert_eq!(report.unmounted, vec!["cam3".to_string()]);
    assert!(!garage.is_mounted());
    assert_eq!(dashboard.mounted_feed_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_feeds_resolve_through_render() {
    let dashboard = seeded_dashboard();
    let view = dashboard.render();
    assert!(view
        .cameras
        .feeds
        .iter()
        .all(|feed| feed.phase == FeedPhase::Loading));

    sleep(Duration::from_millis(1600)).await;
    let phases: Vec<_> = dashboard
        .render()
        .cameras
        .feeds
        .iter()
        .map(|feed| feed.phase)
        .collect();
    assert_eq!(
        phases,
        vec![FeedPhase::Live, FeedPhase::Live, FeedPhase::Offline]
    );
}

#[tokio::test(start_paused = true)]
async fn test_remount_restarts_loading() {
    let dashboard = seeded_dashboard();
    dashboard.sync();
    sleep(Duration::from_millis(1600)).await;
    assert_eq!(dashboard.feed("cam1").unwrap().phase(), FeedPhase::Live);

    let previous = dashboard.feed("cam1").unwrap();
    dashboard.remount_camera("cam1").unwrap();

    assert!(!previous.is_mounted());
    assert_eq!(dashboard.feed("cam1").unwrap().phase(), FeedPhase::Loading);
}

#[tokio::test(start_paused = true)]
async fn test_gestures_on_unknown_ids() {
    let dashboard = seeded_dashboard();

    assert!(matches!(
        dashboard.toggle_device("missing").await,
        Err(DashboardError::Gesture(GestureError::NotFound { .. }))
    ));
    assert!(matches!(
        dashboard.refresh_camera("missing"),
        Err(DashboardError::Gesture(GestureError::NotFound { .. }))
    ));
    assert!(dashboard
        .set_camera_status("missing", ConnectionStatus::Online)
        .is_err());
    assert!(dashboard.remount_camera("missing").is_err());
}

#[tokio::test(start_paused = true)]
async fn test_camera_status_change_mounts_and_renders_feed() {
    let dashboard = seeded_dashboard();
    assert_eq!(dashboard.mounted_feed_count(), 0);

    dashboard
        .set_camera_status("cam3", ConnectionStatus::Online)
        .unwrap();
    assert_eq!(dashboard.mounted_feed_count(), 3);

    let view = dashboard.camera_view("cam3").unwrap();
    assert_eq!(view.status, ConnectionStatus::Online);
    assert_eq!(view.phase, FeedPhase::Loading);

    assert!(matches!(
        dashboard.camera_view("cam9"),
        Err(DashboardError::Gesture(GestureError::NotFound { .. }))
    ));
}

#[tokio::test(start_paused = true)]
async fn test_toggle_through_dashboard() {
    let dashboard = seeded_dashboard();
    assert!(!dashboard.toggle_device("1").await.unwrap());
    assert!(!dashboard.store().device("1").unwrap().is_on);

    let view = dashboard.render();
    let card = &view.devices.groups[0].cards[0];
    assert_eq!(card.power_label, "Off");
    assert!(card.slider.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_text_render() {
    let dashboard = seeded_dashboard();
    dashboard.sync();
    sleep(Duration::from_millis(1600)).await;

    let text = dashboard.render().to_string();
    assert!(text.starts_with("Smart Home Control"));
    assert!(text.contains("Security Cameras (2 of 3 online)"));
    assert!(text.contains("Front Door Camera (Front Entrance) online [REC]"));
    assert!(text.contains("Camera Offline: Please check camera connection"));
    assert!(text.contains("-- Climate Control --"));
    assert!(text.contains("Brightness: 75%"));
    assert!(text.contains("Device is offline. Please check connection."));
    assert!(text.ends_with("Recording: 1"));
}

#[tokio::test(start_paused = true)]
async fn test_sync_handler_follows_reseed() {
    let event_bus = Arc::new(EventBus::new(16));
    let store = DeviceStore::in_memory().with_event_bus(Arc::clone(&event_bus));
    let dashboard = Arc::new(dashboard_over(store.clone()));
    let token = CancellationToken::new();

    let handler = tokio::spawn({
        let event_bus = Arc::clone(&event_bus);
        let handler = DashboardSync::new(Arc::clone(&dashboard));
        let token = token.clone();
        async move { run_handler(&event_bus, handler, token).await }
    });
    sleep(Duration::from_millis(1)).await;

    MockSeed.apply(&store);
    sleep(Duration::from_millis(1)).await;
    assert_eq!(dashboard.mounted_feed_count(), 3);
    assert!(dashboard.card("6").is_some());

    token.cancel();
    handler.await.unwrap();
}
