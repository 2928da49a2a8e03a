use std::path::PathBuf;

use crate::audio::{CaptureConfig, EncoderSettings};
use crate::stream::StreamTuning;

/// Configuration for a recording session
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Directory recordings are written to (created if missing)
    pub recordings_dir: PathBuf,

    /// Capture stream parameters (mono, 44.1kHz, half-second buffers)
    pub capture: CaptureConfig,

    /// Encoder parameters (mono, 44.1kHz in, 16kHz out, quality 6)
    pub encoder: EncoderSettings,

    /// Fan-out tuning (4000 byte chunks, 10 deep queues, 32KiB write buffer)
    pub tuning: StreamTuning,
}

impl SessionConfig {
    pub fn new(recordings_dir: impl Into<PathBuf>) -> Self {
        Self {
            recordings_dir: recordings_dir.into(),
            capture: CaptureConfig::default(),
            encoder: EncoderSettings::default(),
            tuning: StreamTuning::default(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new("recordings")
    }
}
