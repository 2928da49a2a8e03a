use crate::session::{RecordingSwitch, SessionGate, StatusBoard};
use crate::stream::StreamHub;
use std::path::PathBuf;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Registry of the current (or last) recording session
    pub hub: StreamHub,

    /// Recording status shown by the cockpit UI
    pub status: StatusBoard,

    /// Administrative recording switch
    pub switch: RecordingSwitch,

    /// Session lifecycle phase, for status reporting
    pub gate: SessionGate,

    /// Directory finished recordings are served from
    pub recordings_dir: PathBuf,
}
