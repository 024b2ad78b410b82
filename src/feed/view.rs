use super::phase::{FeedFlags, FeedPhase};
use crate::model::{Camera, ConnectionStatus};
use serde::Serialize;

/// Text shown over the feed area
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FeedOverlay {
    pub title: &'static str,
    pub detail: Option<&'static str>,
}

impl FeedOverlay {
    pub fn for_phase(phase: FeedPhase) -> Self {
        match phase {
            FeedPhase::Loading => Self {
                title: "Loading camera feed...",
                detail: None,
            },
            FeedPhase::Error => Self {
                title: "Connection Error",
                detail: Some("Unable to connect to camera feed"),
            },
            FeedPhase::Offline => Self {
                title: "Camera Offline",
                detail: Some("Please check camera connection"),
            },
            FeedPhase::Live => Self {
                title: "Live Camera Feed",
                detail: None,
            },
        }
    }
}

/// Everything needed to draw one camera feed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CameraFeedView {
    pub id: String,
    pub name: String,
    pub location: String,
    pub status: ConnectionStatus,
    pub phase: FeedPhase,
    pub overlay: FeedOverlay,
    /// REC badge; independent of play/pause
    pub rec_indicator: bool,
    pub playing: bool,
    pub fullscreen: bool,
    /// Live-only overlay controls: play/pause, record, refresh, fullscreen
    pub controls_visible: bool,
    pub retry_available: bool,
    pub is_recording: bool,
    pub recording_label: &'static str,
    pub last_updated: String,
    pub refresh_enabled: bool,
    pub record_enabled: bool,
    pub record_action_label: &'static str,
}

impl CameraFeedView {
    pub fn build(camera: &Camera, flags: FeedFlags) -> Self {
        let phase = flags.phase(camera.status);
        let live = phase == FeedPhase::Live;
        let online = camera.is_online();

        Self {
            id: camera.id.clone(),
            name: camera.name.clone(),
            location: camera.location.clone(),
            status: camera.status,
            phase,
            overlay: FeedOverlay::for_phase(phase),
            rec_indicator: live && camera.is_recording,
            playing: flags.playing,
            fullscreen: flags.fullscreen,
            controls_visible: live,
            retry_available: phase == FeedPhase::Error,
            is_recording: camera.is_recording,
            recording_label: if camera.is_recording {
                "Recording"
            } else {
                "Not Recording"
            },
            last_updated: camera.last_updated.clone(),
            refresh_enabled: online,
            record_enabled: online,
            record_action_label: if camera.is_recording {
                "Stop Recording"
            } else {
                "Start Recording"
            },
        }
    }

    pub fn play_label(&self) -> &'static str {
        if self.playing {
            "Pause"
        } else {
            "Play"
        }
    }
}
