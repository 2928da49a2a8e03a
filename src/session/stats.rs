use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;

/// How a recording session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionEnd {
    /// Recording was administratively disabled
    Disabled,
    /// The live feed ended or failed
    FeedClosed,
    /// The capture device stopped delivering buffers
    CaptureFault,
}

/// Summary of a finished recording session
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    /// Recording file name
    pub file_name: String,

    /// Full path of the recording
    pub path: PathBuf,

    /// When the recording started
    pub started_at: DateTime<Utc>,

    /// Total duration in seconds
    pub duration_secs: f64,

    /// Chunks broadcast to subscribers
    pub chunks_broadcast: u64,

    /// Chunks dropped for slow subscribers
    pub chunks_dropped: u64,

    /// Why the session ended
    pub end: SessionEnd,
}
