use anyhow::{anyhow, bail, Context, Result};
use hound::WavReader;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Instant;
use tracing::{info, warn};

use super::device::{
    BufferCallback, CaptureConfig, CaptureDevice, CaptureHost, CaptureStream, FaultCallback,
};

pub struct AudioFile {
    pub path: String,
    pub duration_seconds: f64,
    pub sample_rate: u32,
    pub channels: u16,
    pub samples: Vec<i16>,
}

impl AudioFile {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening audio file: {}", path.display());

        let reader = WavReader::open(path)
            .context("Failed to open WAV file")?;

        let spec = reader.spec();
        if spec.sample_format != hound::SampleFormat::Int || spec.bits_per_sample != 16 {
            bail!(
                "Unsupported WAV format: {:?} {} bits (expected 16-bit integer PCM)",
                spec.sample_format,
                spec.bits_per_sample
            );
        }

        let samples: Vec<i16> = reader
            .into_samples::<i16>()
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to read audio samples")?;

        let duration_seconds = samples.len() as f64 /
            (spec.sample_rate as f64 * spec.channels as f64);

        info!(
            "Audio file loaded: {:.1}s, {}Hz, {} channels, {} samples",
            duration_seconds,
            spec.sample_rate,
            spec.channels,
            samples.len()
        );

        Ok(Self {
            path: path.display().to_string(),
            duration_seconds,
            sample_rate: spec.sample_rate,
            channels: spec.channels,
            samples,
        })
    }

    /// Downmix interleaved samples to mono by averaging each frame
    pub fn to_mono(&self) -> Vec<i16> {
        if self.channels <= 1 {
            return self.samples.clone();
        }

        self.samples
            .chunks_exact(self.channels as usize)
            .map(|frame| {
                let sum: i32 = frame.iter().map(|&s| s as i32).sum();
                (sum / frame.len() as i32) as i16
            })
            .collect()
    }
}

/// Capture device that plays a WAV file as if it were a live input
///
/// Buffers are delivered at real-time pace from a dedicated thread. When the
/// file runs out the stream reports a fault, which ends the recording session.
pub struct WavFileDevice {
    path: PathBuf,
    name: String,
}

impl WavFileDevice {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = format!("wav:{}", path.display());
        Self { path, name }
    }
}

impl CaptureDevice for WavFileDevice {
    fn acquire(&self) -> Result<Box<dyn CaptureHost>> {
        let audio = AudioFile::open(&self.path)
            .with_context(|| format!("Failed to acquire capture device {}", self.name))?;

        Ok(Box::new(WavHost {
            sample_rate: audio.sample_rate,
            samples: Arc::new(audio.to_mono()),
        }))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

struct WavHost {
    sample_rate: u32,
    samples: Arc<Vec<i16>>,
}

impl CaptureHost for WavHost {
    fn open_stream(
        &mut self,
        config: &CaptureConfig,
        on_buffer: BufferCallback,
        on_fault: FaultCallback,
    ) -> Result<Box<dyn CaptureStream>> {
        if config.input_channels != 1 || config.output_channels != 0 {
            bail!(
                "WAV capture supports mono input only (requested {} in / {} out)",
                config.input_channels,
                config.output_channels
            );
        }
        if config.sample_rate != self.sample_rate {
            bail!(
                "WAV capture rate mismatch: file is {}Hz, stream requested {}Hz",
                self.sample_rate,
                config.sample_rate
            );
        }
        if config.frames_per_buffer == 0 {
            bail!("frames_per_buffer must be positive");
        }

        Ok(Box::new(WavStream {
            samples: Arc::clone(&self.samples),
            config: config.clone(),
            on_buffer: Some(on_buffer),
            on_fault: Some(on_fault),
            running: Arc::new(AtomicBool::new(false)),
            worker: None,
            offset: 0,
        }))
    }
}

type WorkerResult = (BufferCallback, Option<FaultCallback>, usize);

struct WavStream {
    samples: Arc<Vec<i16>>,
    config: CaptureConfig,
    on_buffer: Option<BufferCallback>,
    on_fault: Option<FaultCallback>,
    running: Arc<AtomicBool>,
    worker: Option<JoinHandle<WorkerResult>>,
    /// Sample position to resume from after a stop
    offset: usize,
}

impl CaptureStream for WavStream {
    fn start(&mut self) -> Result<()> {
        if self.worker.is_some() {
            bail!("Already capturing");
        }

        let mut on_buffer = self
            .on_buffer
            .take()
            .ok_or_else(|| anyhow!("Stream callback is unavailable"))?;
        let mut on_fault = self.on_fault.take();
        let samples = Arc::clone(&self.samples);
        let running = Arc::clone(&self.running);
        let frames = self.config.frames_per_buffer;
        let pace = self.config.buffer_duration();
        let mut offset = self.offset;

        running.store(true, Ordering::SeqCst);

        let worker = std::thread::Builder::new()
            .name("wav-capture".to_string())
            .spawn(move || {
                let mut deadline = Instant::now();

                while running.load(Ordering::SeqCst) {
                    if offset + frames > samples.len() {
                        running.store(false, Ordering::SeqCst);
                        if let Some(fault) = on_fault.take() {
                            fault(anyhow!("capture input exhausted after {} samples", offset));
                        }
                        break;
                    }

                    deadline += pace;
                    std::thread::sleep(deadline.saturating_duration_since(Instant::now()));

                    on_buffer(&samples[offset..offset + frames]);
                    offset += frames;
                }

                (on_buffer, on_fault, offset)
            })
            .context("Failed to spawn capture thread")?;

        self.worker = Some(worker);
        info!("WAV capture started ({} frames per buffer)", frames);

        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.running.store(false, Ordering::SeqCst);

        let Some(worker) = self.worker.take() else {
            return Ok(());
        };

        let (on_buffer, on_fault, offset) = worker
            .join()
            .map_err(|_| anyhow!("Capture thread panicked"))?;
        self.on_buffer = Some(on_buffer);
        self.on_fault = on_fault;
        self.offset = offset;

        info!("WAV capture stopped at sample {}", offset);

        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl Drop for WavStream {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            warn!("Failed to stop WAV capture on drop: {}", e);
        }
    }
}
