// Integration tests for WAV input and the file-backed capture device
//
// These tests verify that we can read WAV files, downmix them, and replay
// them as a paced capture stream.

mod common;

use anyhow::Result;
use cockpit_audio::audio::{AudioFile, CaptureConfig, CaptureDevice, WavFileDevice};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn test_audio_file_open() -> Result<()> {
    let dir = TempDir::new()?;
    let path = common::write_constant_wav(&dir.path().join("mono.wav"), 44_100, 1, 22_050, 100)?;

    let audio = AudioFile::open(&path)?;

    assert!((audio.duration_seconds - 0.5).abs() < 0.001, "Duration should be 500ms");
    assert_eq!(audio.sample_rate, 44_100);
    assert_eq!(audio.channels, 1);
    assert_eq!(audio.samples.len(), 22_050);
    assert!(audio.path.contains("mono.wav"));

    Ok(())
}

#[test]
fn test_audio_file_nonexistent() {
    let path = PathBuf::from("/nonexistent/path/to/audio.wav");
    let result = AudioFile::open(&path);

    assert!(result.is_err(), "Opening nonexistent file should fail");
}

#[test]
fn test_audio_file_stereo_downmix() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("stereo.wav");

    let spec = hound::WavSpec {
        channels: 2,
        sample_rate: 44_100,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(&path, spec)?;
    for (left, right) in [(100i16, 200i16), (-300, 100), (32767, 32767)] {
        writer.write_sample(left)?;
        writer.write_sample(right)?;
    }
    writer.finalize()?;

    let audio = AudioFile::open(&path)?;
    assert_eq!(audio.channels, 2);
    assert_eq!(audio.to_mono(), vec![150, -100, 32767]);

    Ok(())
}

#[test]
fn test_wav_device_delivers_fixed_buffers_then_faults() -> Result<()> {
    let dir = TempDir::new()?;
    // 5 buffers of 441 frames (10ms each) plus a partial one that is never delivered
    let path = common::write_constant_wav(&dir.path().join("in.wav"), 44_100, 1, 441 * 5 + 100, 7)?;

    let device = WavFileDevice::new(&path);
    let mut host = device.acquire()?;

    let config = CaptureConfig {
        frames_per_buffer: 441,
        ..CaptureConfig::default()
    };

    let sizes = Arc::new(Mutex::new(Vec::new()));
    let faults = Arc::new(AtomicUsize::new(0));
    let (fault_tx, fault_rx) = std::sync::mpsc::channel();

    let on_buffer = {
        let sizes = Arc::clone(&sizes);
        Box::new(move |samples: &[i16]| {
            assert!(samples.iter().all(|&s| s == 7));
            sizes.lock().unwrap().push(samples.len());
        })
    };
    let on_fault = {
        let faults = Arc::clone(&faults);
        Box::new(move |_e: anyhow::Error| {
            faults.fetch_add(1, Ordering::SeqCst);
            let _ = fault_tx.send(());
        })
    };

    let mut stream = host.open_stream(&config, on_buffer, on_fault)?;
    stream.start()?;
    assert!(stream.is_capturing() || faults.load(Ordering::SeqCst) == 1);

    fault_rx.recv_timeout(Duration::from_secs(5))?;
    stream.stop()?;

    assert_eq!(*sizes.lock().unwrap(), vec![441; 5]);
    assert_eq!(faults.load(Ordering::SeqCst), 1);
    assert!(!stream.is_capturing());

    Ok(())
}

#[test]
fn test_wav_device_stop_halts_callbacks() -> Result<()> {
    let dir = TempDir::new()?;
    let path = common::write_constant_wav(&dir.path().join("long.wav"), 44_100, 1, 44_100 * 10, 1)?;

    let mut host = WavFileDevice::new(&path).acquire()?;
    let config = CaptureConfig {
        frames_per_buffer: 441,
        ..CaptureConfig::default()
    };

    let count = Arc::new(AtomicUsize::new(0));
    let on_buffer = {
        let count = Arc::clone(&count);
        Box::new(move |_samples: &[i16]| {
            count.fetch_add(1, Ordering::SeqCst);
        })
    };

    let mut stream = host.open_stream(&config, on_buffer, Box::new(|_e: anyhow::Error| {}))?;
    stream.start()?;
    std::thread::sleep(Duration::from_millis(100));
    stream.stop()?;

    let after_stop = count.load(Ordering::SeqCst);
    assert!(after_stop > 0, "Should have delivered some buffers");

    std::thread::sleep(Duration::from_millis(100));
    assert_eq!(count.load(Ordering::SeqCst), after_stop);

    Ok(())
}

#[test]
fn test_wav_device_rejects_rate_mismatch() -> Result<()> {
    let dir = TempDir::new()?;
    let path = common::write_constant_wav(&dir.path().join("48k.wav"), 48_000, 1, 4_800, 1)?;

    let mut host = WavFileDevice::new(&path).acquire()?;
    let result = host.open_stream(
        &CaptureConfig::default(),
        Box::new(|_samples: &[i16]| {}),
        Box::new(|_e: anyhow::Error| {}),
    );

    assert!(result.is_err(), "44.1kHz stream over a 48kHz file should fail");

    Ok(())
}

#[test]
fn test_wav_device_missing_file_fails_acquire() {
    let device = WavFileDevice::new("/nonexistent/cockpit.wav");
    assert!(device.acquire().is_err());
}
