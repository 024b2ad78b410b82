use crate::error::{DashboardError, GestureError};
use crate::feed::CameraFeedView;
use crate::model::ConnectionStatus;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        Html, IntoResponse, Response,
    },
    Json,
};
use futures::Stream;
use serde::Deserialize;
use std::convert::Infallible;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use super::page::render_page;
use super::routes::ServerState;

/// Error body for rejected requests
pub struct ApiError(DashboardError);

impl From<DashboardError> for ApiError {
    fn from(error: DashboardError) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            DashboardError::Gesture(GestureError::NotFound { .. }) => StatusCode::NOT_FOUND,
            DashboardError::Gesture(GestureError::Disabled { .. }) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        debug!("Request rejected with {}: {}", status, self.0);
        let body = serde_json::json!({
            "error": self.0.to_string(),
            "status": status.as_u16(),
        });

        (status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Deserialize)]
pub struct ValueRequest {
    pub value: f64,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: ConnectionStatus,
}

pub async fn page_handler(State(state): State<ServerState>) -> impl IntoResponse {
    Html(render_page(&state.dashboard.render()))
}

pub async fn health_handler(State(state): State<ServerState>) -> impl IntoResponse {
    let stats = state.dashboard.store().stats();

    let health_info = serde_json::json!({
        "status": "healthy",
        "devices": stats.total_devices,
        "cameras": stats.total_cameras,
        "mounted_feeds": state.dashboard.mounted_feed_count(),
        "server_info": {
            "subscribers": state.event_bus.subscriber_count(),
        }
    });

    (StatusCode::OK, Json(health_info))
}

pub async fn dashboard_handler(State(state): State<ServerState>) -> impl IntoResponse {
    Json(state.dashboard.render())
}

pub async fn stats_handler(State(state): State<ServerState>) -> impl IntoResponse {
    Json(state.dashboard.store().stats())
}

pub async fn devices_handler(State(state): State<ServerState>) -> impl IntoResponse {
    Json(state.dashboard.store().devices())
}

pub async fn cameras_handler(State(state): State<ServerState>) -> impl IntoResponse {
    Json(state.dashboard.store().cameras())
}

/// Server-sent events mirroring the event bus
pub async fn events_handler(
    State(state): State<ServerState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    info!("New event stream client connected");
    let mut receiver = state.event_bus.subscribe();

    let stream = async_stream::stream! {
        loop {
            match receiver.recv().await {
                Ok(event) => match Event::default().event(event.event_type()).json_data(&event) {
                    Ok(sse_event) => yield Ok(sse_event),
                    Err(e) => warn!("Failed to encode event for stream: {}", e),
                },
                Err(RecvError::Lagged(n)) => {
                    warn!("Event stream client lagged behind by {} events", n);
                }
                Err(RecvError::Closed) => break,
            }
        }
        debug!("Event stream closed");
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}

pub async fn toggle_device_handler(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    state.dashboard.toggle_device(&id).await?;
    Ok(Json(state.dashboard.card(&id).and_then(|card| card.render())))
}

pub async fn device_value_handler(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(request): Json<ValueRequest>,
) -> ApiResult<impl IntoResponse> {
    let value = state.dashboard.set_device_value(&id, request.value)?;
    Ok(Json(serde_json::json!({ "id": id, "value": value })))
}

pub async fn device_status_handler(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(request): Json<StatusRequest>,
) -> ApiResult<impl IntoResponse> {
    state.dashboard.set_device_status(&id, request.status)?;
    Ok(Json(state.dashboard.store().device(&id)))
}

pub async fn refresh_camera_handler(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    state.dashboard.refresh_camera(&id)?;
    camera_view(&state, &id)
}

pub async fn camera_recording_handler(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    state.dashboard.toggle_camera_recording(&id)?;
    camera_view(&state, &id)
}

pub async fn camera_play_handler(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    state.dashboard.toggle_camera_play(&id)?;
    camera_view(&state, &id)
}

pub async fn camera_fullscreen_handler(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    state.dashboard.toggle_camera_fullscreen(&id)?;
    camera_view(&state, &id)
}

pub async fn camera_status_handler(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(request): Json<StatusRequest>,
) -> ApiResult<impl IntoResponse> {
    state.dashboard.set_camera_status(&id, request.status)?;
    camera_view(&state, &id)
}

pub async fn camera_remount_handler(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    state.dashboard.remount_camera(&id)?;
    camera_view(&state, &id)
}

fn camera_view(state: &ServerState, id: &str) -> ApiResult<Json<CameraFeedView>> {
    Ok(Json(state.dashboard.camera_view(id)?))
}
