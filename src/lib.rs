pub mod audio;
pub mod config;
pub mod http;
pub mod session;
pub mod stream;

pub use audio::{
    loudness, AudioFile, CaptureConfig, CaptureDevice, EncoderFactory, EncoderSettings,
    LinearPcmEncoderFactory, PcmEncoder, WavFileDevice,
};
pub use config::Config;
pub use http::{create_router, AppState};
pub use session::{
    CaptureSupervisor, RecorderContext, RecordingSession, RecordingSwitch, SessionConfig,
    SessionError, SessionSummary, StatusBoard, StatusSnapshot,
};
pub use stream::{FanoutRegistry, StreamHub, StreamTuning, Subscription};
