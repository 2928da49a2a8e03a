// Shared helpers for integration tests

#![allow(dead_code)]

use anyhow::Result;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Write a 16-bit PCM WAV file holding `frames` frames of `value` on every channel
pub fn write_constant_wav(
    path: &Path,
    sample_rate: u32,
    channels: u16,
    frames: usize,
    value: i16,
) -> Result<PathBuf> {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec)?;
    for _ in 0..frames * channels as usize {
        writer.write_sample(value)?;
    }
    writer.finalize()?;

    Ok(path.to_path_buf())
}

/// Poll `check` until it yields a value or `deadline` passes
pub async fn wait_for<T, F>(deadline: Duration, mut check: F) -> Option<T>
where
    F: FnMut() -> Option<T>,
{
    let start = tokio::time::Instant::now();
    loop {
        if let Some(value) = check() {
            return Some(value);
        }
        if start.elapsed() > deadline {
            return None;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// Await `fut`, failing the test if it takes longer than `secs` seconds
pub async fn within<F: Future>(secs: u64, fut: F) -> F::Output {
    tokio::time::timeout(Duration::from_secs(secs), fut)
        .await
        .expect("operation timed out")
}
