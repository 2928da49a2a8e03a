use anyhow::{bail, Context, Result};
use std::io::Write;
use tracing::info;

/// Sink the encoder writes compressed bytes into
pub type EncoderSink = Box<dyn Write + Send>;

/// Encoder parameters, mutable until `apply_settings` is called
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderSettings {
    /// Input channel count (1 = mono)
    pub channels: u16,
    /// Rate of the PCM handed to `write_pcm`, in Hz
    pub input_rate: u32,
    /// Rate of the encoded stream, in Hz
    pub output_rate: u32,
    /// Quality knob, 0 (best) to 9 (fastest)
    pub quality: u8,
}

impl Default for EncoderSettings {
    fn default() -> Self {
        Self {
            channels: 1,
            input_rate: 44_100,
            output_rate: 16_000,
            quality: 6,
        }
    }
}

/// Sequential PCM encoder writing to an injected sink
pub trait PcmEncoder: Send {
    /// Settings to adjust before `apply_settings`
    fn settings_mut(&mut self) -> &mut EncoderSettings;

    /// Validate and lock in the current settings. Must precede `write_pcm`.
    fn apply_settings(&mut self) -> Result<()>;

    /// Encode one PCM buffer
    fn write_pcm(&mut self, samples: &[i16]) -> Result<()>;

    /// Flush pending frames and hand the sink back to the caller
    fn close(self: Box<Self>) -> Result<EncoderSink>;
}

/// Creates encoders bound to a sink
pub trait EncoderFactory: Send + Sync {
    fn create(&self, sink: EncoderSink) -> Result<Box<dyn PcmEncoder>>;

    /// File extension for recordings produced by this encoder
    fn file_extension(&self) -> &str;
}

/// Uncompressed encoder: rate-converts mono PCM and writes it as 16-bit
/// little-endian samples
///
/// Rate conversion keeps one input sample each time the output phase
/// accumulator wraps, so 22050 samples at 44.1kHz always yield exactly
/// 8000 samples at 16kHz regardless of how input is split into buffers.
pub struct LinearPcmEncoder {
    sink: EncoderSink,
    settings: EncoderSettings,
    applied: Option<EncoderSettings>,
    phase: u64,
    scratch: Vec<u8>,
}

impl LinearPcmEncoder {
    pub fn new(sink: EncoderSink) -> Self {
        Self {
            sink,
            settings: EncoderSettings::default(),
            applied: None,
            phase: 0,
            scratch: Vec::new(),
        }
    }
}

impl PcmEncoder for LinearPcmEncoder {
    fn settings_mut(&mut self) -> &mut EncoderSettings {
        &mut self.settings
    }

    fn apply_settings(&mut self) -> Result<()> {
        let s = &self.settings;
        if s.channels != 1 {
            bail!("Unsupported channel count {} (mono only)", s.channels);
        }
        if s.input_rate == 0 || s.output_rate == 0 {
            bail!("Sample rates must be positive");
        }
        if s.output_rate > s.input_rate {
            bail!(
                "Upsampling is not supported ({}Hz -> {}Hz)",
                s.input_rate,
                s.output_rate
            );
        }
        if s.quality > 9 {
            bail!("Quality {} out of range 0-9", s.quality);
        }

        info!(
            "Encoder settings applied: {} ch, {}Hz -> {}Hz, quality {}",
            s.channels, s.input_rate, s.output_rate, s.quality
        );
        self.applied = Some(s.clone());
        self.phase = 0;

        Ok(())
    }

    fn write_pcm(&mut self, samples: &[i16]) -> Result<()> {
        let Some(settings) = &self.applied else {
            bail!("Encoder settings not applied");
        };
        let input_rate = settings.input_rate as u64;
        let output_rate = settings.output_rate as u64;

        self.scratch.clear();
        for &sample in samples {
            self.phase += output_rate;
            if self.phase >= input_rate {
                self.phase -= input_rate;
                self.scratch.extend_from_slice(&sample.to_le_bytes());
            }
        }

        self.sink
            .write_all(&self.scratch)
            .context("Failed to write encoded audio")?;

        Ok(())
    }

    fn close(mut self: Box<Self>) -> Result<EncoderSink> {
        self.sink.flush().context("Failed to flush encoder sink")?;
        Ok(self.sink)
    }
}

/// Factory for [`LinearPcmEncoder`]
#[derive(Debug, Default, Clone, Copy)]
pub struct LinearPcmEncoderFactory;

impl EncoderFactory for LinearPcmEncoderFactory {
    fn create(&self, sink: EncoderSink) -> Result<Box<dyn PcmEncoder>> {
        Ok(Box::new(LinearPcmEncoder::new(sink)))
    }

    fn file_extension(&self) -> &str {
        "pcm"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn applied_encoder(buf: &SharedBuf) -> Box<dyn PcmEncoder> {
        let mut encoder = LinearPcmEncoderFactory
            .create(Box::new(buf.clone()))
            .unwrap();
        encoder.apply_settings().unwrap();
        encoder
    }

    #[test]
    fn test_default_settings() {
        let settings = EncoderSettings::default();
        assert_eq!(settings.channels, 1);
        assert_eq!(settings.input_rate, 44_100);
        assert_eq!(settings.output_rate, 16_000);
        assert_eq!(settings.quality, 6);
    }

    #[test]
    fn test_half_second_buffer_converts_exactly() {
        let buf = SharedBuf::default();
        let mut encoder = applied_encoder(&buf);

        encoder.write_pcm(&vec![7i16; 22_050]).unwrap();

        // 8000 samples at 16kHz, 2 bytes each
        assert_eq!(buf.0.lock().unwrap().len(), 16_000);
    }

    #[test]
    fn test_conversion_is_stable_across_buffer_splits() {
        let buf = SharedBuf::default();
        let mut encoder = applied_encoder(&buf);

        for _ in 0..10 {
            encoder.write_pcm(&vec![1i16; 4_410]).unwrap();
        }

        assert_eq!(buf.0.lock().unwrap().len(), 32_000);
    }

    #[test]
    fn test_samples_written_little_endian() {
        let buf = SharedBuf::default();
        let mut encoder = LinearPcmEncoder::new(Box::new(buf.clone()));
        encoder.settings_mut().output_rate = 44_100;
        encoder.apply_settings().unwrap();

        encoder.write_pcm(&[0x0102, -2]).unwrap();

        assert_eq!(*buf.0.lock().unwrap(), vec![0x02, 0x01, 0xFE, 0xFF]);
    }

    #[test]
    fn test_write_before_apply_fails() {
        let mut encoder = LinearPcmEncoder::new(Box::new(SharedBuf::default()));
        assert!(encoder.write_pcm(&[1, 2, 3]).is_err());
    }

    #[test]
    fn test_rejects_stereo() {
        let mut encoder = LinearPcmEncoder::new(Box::new(SharedBuf::default()));
        encoder.settings_mut().channels = 2;
        assert!(encoder.apply_settings().is_err());
    }

    #[test]
    fn test_rejects_upsampling() {
        let mut encoder = LinearPcmEncoder::new(Box::new(SharedBuf::default()));
        encoder.settings_mut().output_rate = 48_000;
        assert!(encoder.apply_settings().is_err());
    }
}
