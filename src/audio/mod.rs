pub mod device;
pub mod encoder;
pub mod file;
pub mod meter;
pub mod sink;

pub use device::{
    BufferCallback, CaptureConfig, CaptureDevice, CaptureHost, CaptureStream, FaultCallback,
};
pub use encoder::{
    EncoderFactory, EncoderSettings, EncoderSink, LinearPcmEncoder, LinearPcmEncoderFactory,
    PcmEncoder,
};
pub use file::{AudioFile, WavFileDevice};
pub use meter::{loudness, SILENCE_DB};
pub use sink::{live_pipe, PipeReader, PipeWriter, TeeWriter};
