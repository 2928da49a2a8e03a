//! Recording session management
//!
//! This module provides the `RecordingSession` that owns one capture run:
//! - Capture device and per-buffer loudness metering
//! - Encoding into a file and the live pipe at once
//! - Broadcasting the live pipe through a fresh fan-out registry
//! - Status reporting and the supervisor that restarts sessions

mod config;
mod error;
mod gate;
mod session;
mod stats;
mod status;
mod supervisor;

pub use config::SessionConfig;
pub use error::SessionError;
pub use gate::{SessionGate, SessionPhase, SessionTicket};
pub use session::{recording_file_name, RecorderContext, RecordingSession};
pub use stats::{SessionEnd, SessionSummary};
pub use status::{RecordingSwitch, StatusBoard, StatusSnapshot};
pub use supervisor::CaptureSupervisor;
