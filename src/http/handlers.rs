use super::state::AppState;
use crate::session::{SessionPhase, StatusSnapshot};
use crate::stream::{deliver, SERVER_NAME};
use axum::{
    body::Body,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use tokio_util::io::ReaderStream;
use tracing::{debug, info};

/// Read size used when draining the delivery pipe into the response body
const BODY_READ_BYTES: usize = 8192;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct RecordingSettingsRequest {
    /// Whether recording should be enabled
    pub enabled: bool,
}

#[derive(Debug, Serialize)]
pub struct RecordingSettingsResponse {
    pub enabled: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    #[serde(flatten)]
    pub snapshot: StatusSnapshot,
    pub recording_enabled: bool,
    pub phase: SessionPhase,
    pub subscribers: usize,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /audio/stream
/// Live encoded audio, streamed until the client disconnects
pub async fn stream_audio(State(state): State<AppState>) -> Response {
    let Some(registry) = state.hub.current() else {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse {
                error: "No audio recording has started yet".to_string(),
            }),
        )
            .into_response();
    };

    let subscription = registry.subscribe();
    let write_buffer = registry.tuning().write_buffer_bytes;

    // The delivery task writes into one end; the response body drains the
    // other. When the client goes away the body is dropped and the next
    // write fails, which ends the delivery and releases the subscription.
    let (peer, body_end) = tokio::io::duplex(write_buffer);
    tokio::spawn(async move {
        let end = deliver(subscription, peer, write_buffer).await;
        debug!("Stream delivery ended after {} bytes: {:?}", end.bytes(), end);
    });

    (
        [
            (header::CONTENT_TYPE, "audio/mpeg"),
            (header::CACHE_CONTROL, "no-cache"),
            (header::PRAGMA, "no-cache"),
            (header::SERVER, SERVER_NAME),
        ],
        Body::from_stream(ReaderStream::with_capacity(body_end, BODY_READ_BYTES)),
    )
        .into_response()
}

/// GET /status
/// Current recording status
pub async fn get_status(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(StatusResponse {
            snapshot: state.status.snapshot(),
            recording_enabled: state.switch.is_enabled(),
            phase: state.gate.phase(),
            subscribers: state.hub.subscriber_count(),
        }),
    )
}

/// POST /settings/recording
/// Enable or disable recording. Takes effect at the next loop boundary.
pub async fn set_recording(
    State(state): State<AppState>,
    Json(req): Json<RecordingSettingsRequest>,
) -> impl IntoResponse {
    state.switch.set_enabled(req.enabled);
    info!("Audio recording {}", if req.enabled { "enabled" } else { "disabled" });

    (
        StatusCode::OK,
        Json(RecordingSettingsResponse {
            enabled: req.enabled,
            message: if req.enabled {
                "Recording will start at the next supervisor check".to_string()
            } else {
                "Recording will stop after the current chunk".to_string()
            },
        }),
    )
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
