use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    let recordings = ServeDir::new(&state.recordings_dir);

    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Live stream
        .route("/audio/stream", get(handlers::stream_audio))
        // Finished recordings
        .nest_service("/audio/recordings", recordings)
        // Status and administration
        .route("/status", get(handlers::get_status))
        .route("/settings/recording", post(handlers::set_recording))
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
