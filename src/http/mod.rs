//! HTTP surface of the audio pipeline
//!
//! - GET /audio/stream - Live encoded audio
//! - GET /audio/recordings/* - Finished recordings
//! - GET /status - Recording status snapshot
//! - POST /settings/recording - Enable or disable recording
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
