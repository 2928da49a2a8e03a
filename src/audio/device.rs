use anyhow::Result;

/// Called once per captured PCM buffer, on the capture subsystem's thread
pub type BufferCallback = Box<dyn FnMut(&[i16]) + Send + 'static>;

/// Called when the capture subsystem can no longer deliver buffers
pub type FaultCallback = Box<dyn FnOnce(anyhow::Error) + Send + 'static>;

/// Stream configuration requested from a capture device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureConfig {
    /// Number of input channels (1 = mono)
    pub input_channels: u16,
    /// Number of output channels (capture-only streams use 0)
    pub output_channels: u16,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Frames delivered per callback invocation
    pub frames_per_buffer: usize,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            input_channels: 1,
            output_channels: 0,
            sample_rate: 44_100,
            frames_per_buffer: 22_050, // Half a second per buffer
        }
    }
}

impl CaptureConfig {
    /// Wall-clock duration covered by one buffer
    pub fn buffer_duration(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f64(self.frames_per_buffer as f64 / self.sample_rate as f64)
    }
}

/// Audio capture device
///
/// Implementations wrap a platform capture driver. `acquire` brings the
/// driver up; dropping the returned host releases it again.
pub trait CaptureDevice: Send + Sync {
    /// Bring up the capture subsystem
    fn acquire(&self) -> Result<Box<dyn CaptureHost>>;

    /// Device name for logging
    fn name(&self) -> &str;
}

/// An acquired capture subsystem, able to open streams
pub trait CaptureHost: Send {
    /// Open an input stream that invokes `on_buffer` once per full buffer.
    ///
    /// `on_fault` is invoked at most once if the stream stops delivering
    /// buffers on its own (driver error, end of input).
    fn open_stream(
        &mut self,
        config: &CaptureConfig,
        on_buffer: BufferCallback,
        on_fault: FaultCallback,
    ) -> Result<Box<dyn CaptureStream>>;
}

/// An open capture stream. Dropping it closes the stream.
pub trait CaptureStream: Send {
    /// Begin invoking the buffer callback
    fn start(&mut self) -> Result<()>;

    /// Stop invoking the buffer callback. Blocks until no callback is running.
    fn stop(&mut self) -> Result<()>;

    /// Check if the stream is currently delivering buffers
    fn is_capturing(&self) -> bool;
}
