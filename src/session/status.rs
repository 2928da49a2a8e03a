use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

/// Recording status shown by the cockpit UI
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatusSnapshot {
    /// Name of the file being recorded, empty when not recording
    pub file_name: String,

    /// Level of the last capture buffer in dBFS (`null` in JSON for silence)
    pub loudness_db: f32,

    /// When the current recording started
    pub started_at: Option<DateTime<Utc>>,
}

impl StatusSnapshot {
    pub fn is_recording(&self) -> bool {
        !self.file_name.is_empty()
    }
}

/// Process-wide recording status
///
/// Each update swaps in a whole new snapshot; readers always see a consistent
/// one. The session owns `file_name`/`started_at`, the capture callback owns
/// `loudness_db`. Last write wins.
#[derive(Clone)]
pub struct StatusBoard {
    tx: Arc<watch::Sender<StatusSnapshot>>,
}

impl StatusBoard {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(StatusSnapshot::default());
        Self { tx: Arc::new(tx) }
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        self.tx.borrow().clone()
    }

    pub fn file_name(&self) -> String {
        self.tx.borrow().file_name.clone()
    }

    pub fn is_recording(&self) -> bool {
        self.tx.borrow().is_recording()
    }

    pub fn set_loudness(&self, loudness_db: f32) {
        self.tx.send_modify(|s| s.loudness_db = loudness_db);
    }

    pub fn mark_recording(&self, file_name: &str, started_at: DateTime<Utc>) {
        self.tx.send_modify(|s| {
            s.file_name = file_name.to_string();
            s.started_at = Some(started_at);
        });
    }

    /// Back to "not recording": empty file name, zero loudness
    pub fn reset(&self) {
        self.tx.send_replace(StatusSnapshot::default());
    }
}

impl Default for StatusBoard {
    fn default() -> Self {
        Self::new()
    }
}

/// Administrative "recording enabled" flag
#[derive(Clone, Debug)]
pub struct RecordingSwitch {
    enabled: Arc<AtomicBool>,
}

impl RecordingSwitch {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled: Arc::new(AtomicBool::new(enabled)),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }
}
