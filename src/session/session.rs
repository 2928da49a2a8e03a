use super::config::SessionConfig;
use super::error::SessionError;
use super::gate::SessionTicket;
use super::stats::{SessionEnd, SessionSummary};
use super::status::{RecordingSwitch, StatusBoard};
use crate::audio::{
    live_pipe, loudness, BufferCallback, CaptureDevice, EncoderFactory, FaultCallback,
    PcmEncoder, TeeWriter,
};
use crate::stream::{run_read_loop, FanoutRegistry, ReadLoopExit, StreamHub};
use anyhow::Context;
use chrono::{DateTime, Local, Utc};
use parking_lot::Mutex;
use std::fs::{self, OpenOptions};
use std::sync::Arc;
use tokio::sync::Notify;
use tracing::{info, warn};

type SharedEncoder = Arc<Mutex<Option<Box<dyn PcmEncoder>>>>;

/// Everything a recording session needs from the rest of the process
#[derive(Clone)]
pub struct RecorderContext {
    /// Capture device (black-box driver)
    pub device: Arc<dyn CaptureDevice>,

    /// Encoder constructor (black-box codec)
    pub encoders: Arc<dyn EncoderFactory>,

    /// Status shown by the cockpit UI
    pub status: StatusBoard,

    /// Administrative enable flag
    pub switch: RecordingSwitch,

    /// Where each session publishes its fan-out registry
    pub hub: StreamHub,

    /// Session parameters
    pub config: SessionConfig,
}

/// One capture → encode → store → broadcast run
pub struct RecordingSession;

impl RecordingSession {
    /// Run a session to completion
    ///
    /// Setup failures abort the session and release everything acquired so
    /// far. Once recording, the session lasts until the read loop exits or
    /// the capture device faults; teardown then runs in reverse order of
    /// acquisition and the status board is reset.
    pub async fn run(
        ctx: RecorderContext,
        ticket: SessionTicket,
    ) -> Result<SessionSummary, SessionError> {
        let cfg = &ctx.config;
        let started_at = Utc::now();

        // 1. Capture device
        let device = Arc::clone(&ctx.device);
        let host = off_runtime("device acquisition", move || {
            device
                .acquire()
                .map_err(SessionError::aborted("device acquisition"))
        })
        .await?;

        // 2. Destination file
        let file_name = recording_file_name(started_at, ctx.encoders.file_extension());
        let path = cfg.recordings_dir.join(&file_name);
        let file = {
            let dir = cfg.recordings_dir.clone();
            let path = path.clone();
            off_runtime("file creation", move || {
                fs::create_dir_all(&dir)
                    .and_then(|_| OpenOptions::new().write(true).create_new(true).open(&path))
                    .with_context(|| format!("Failed to create recording file {}", path.display()))
                    .map_err(SessionError::aborted("file creation"))
            })
            .await?
        };
        info!("Audio output to {}", file_name);

        // 3. File + live pipe
        let (pipe_writer, pipe_reader) = live_pipe();
        let sink = TeeWriter::new(file, pipe_writer);

        // 4. Encoder
        let mut encoder = ctx
            .encoders
            .create(Box::new(sink))
            .map_err(SessionError::aborted("encoder creation"))?;
        *encoder.settings_mut() = cfg.encoder.clone();
        encoder
            .apply_settings()
            .map_err(SessionError::EncoderUnrecoverable)?;
        let encoder: SharedEncoder = Arc::new(Mutex::new(Some(encoder)));

        // 5. Capture stream
        let fault = Arc::new(Notify::new());
        let (host, stream) = {
            let capture = cfg.capture.clone();
            let on_buffer = capture_callback(Arc::clone(&encoder), ctx.status.clone());
            let on_fault = fault_callback(Arc::clone(&fault));
            let mut host = host;
            off_runtime("capture start", move || {
                let mut stream = host
                    .open_stream(&capture, on_buffer, on_fault)
                    .map_err(SessionError::aborted("stream open"))?;
                stream
                    .start()
                    .map_err(SessionError::aborted("capture start"))?;
                Ok((host, stream))
            })
            .await?
        };

        ctx.status.mark_recording(&file_name, started_at);
        ticket.activate();
        info!("Audio recording started on {}", ctx.device.name());

        // 6. Fan-out registry for this session
        let registry = FanoutRegistry::new(cfg.tuning);
        ctx.hub.publish(registry.clone());

        // 7. Broadcast until the feed ends, recording is disabled or capture faults
        let end = tokio::select! {
            exit = run_read_loop(pipe_reader, &registry, &ctx.switch) => match exit {
                ReadLoopExit::Disabled { .. } => SessionEnd::Disabled,
                ReadLoopExit::FeedClosed { .. } => SessionEnd::FeedClosed,
            },
            _ = fault.notified() => SessionEnd::CaptureFault,
        };

        // 8. Teardown, reverse order. Stopping joins the capture thread.
        ticket.stopping();

        let closing = Arc::clone(&encoder);
        let teardown = off_runtime("teardown", move || {
            let mut stream = stream;
            if let Err(e) = stream.stop() {
                warn!("Failed to stop capture stream: {:#}", e);
            }
            drop(stream);

            let encoder = closing.lock().take();
            if let Some(encoder) = encoder {
                match encoder.close() {
                    // Dropping the sink closes the file and ends the live pipe
                    Ok(sink) => drop(sink),
                    Err(e) => warn!("Failed to close encoder: {:#}", e),
                }
            }

            drop(host);
            Ok(())
        });
        if let Err(e) = teardown.await {
            warn!("{}", e);
        }
        info!("Recording file closed: {}", path.display());

        ctx.status.reset();

        let summary = SessionSummary {
            file_name,
            path,
            started_at,
            duration_secs: Utc::now()
                .signed_duration_since(started_at)
                .num_milliseconds() as f64
                / 1000.0,
            chunks_broadcast: registry.broadcast_total(),
            chunks_dropped: registry.dropped_total(),
            end,
        };

        info!(
            "Audio recording stopped ({:?}): {:.1}s, {} chunks broadcast, {} dropped",
            summary.end, summary.duration_secs, summary.chunks_broadcast, summary.chunks_dropped
        );

        Ok(summary)
    }
}

/// Run blocking device and file work on the blocking pool
async fn off_runtime<T, F>(step: &'static str, work: F) -> Result<T, SessionError>
where
    F: FnOnce() -> Result<T, SessionError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| SessionError::aborted(step)(e.into()))?
}

/// `YYYY-MM-DD-HHMMSS.<ext>` in local time
pub fn recording_file_name(started_at: DateTime<Utc>, extension: &str) -> String {
    format!(
        "{}.{}",
        started_at.with_timezone(&Local).format("%Y-%m-%d-%H%M%S"),
        extension
    )
}

/// Per-buffer capture work: update loudness, feed the encoder.
///
/// Runs on the capture thread. Errors are logged and swallowed.
fn capture_callback(encoder: SharedEncoder, status: StatusBoard) -> BufferCallback {
    Box::new(move |samples: &[i16]| {
        status.set_loudness(loudness(samples));

        if let Some(enc) = encoder.lock().as_mut() {
            if let Err(e) = enc.write_pcm(samples) {
                warn!("Dropping capture buffer: {:#}", e);
            }
        }
    })
}

fn fault_callback(fault: Arc<Notify>) -> FaultCallback {
    Box::new(move |e: anyhow::Error| {
        warn!("Capture fault: {:#}", e);
        fault.notify_one();
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_recording_file_name_format() {
        let local = Local.with_ymd_and_hms(2026, 3, 4, 5, 6, 7).unwrap();
        let name = recording_file_name(local.with_timezone(&Utc), "mp3");
        assert_eq!(name, "2026-03-04-050607.mp3");
    }
}
