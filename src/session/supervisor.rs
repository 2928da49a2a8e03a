use super::error::SessionError;
use super::gate::SessionGate;
use super::session::{RecorderContext, RecordingSession};
use anyhow::Result;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

/// Periodically starts a recording session when one is wanted
///
/// On each tick: if recording is enabled and no session is under way, spawn
/// one and move on without waiting for it. A failed session is simply retried
/// on a later tick, except for an encoder that rejects its settings, which
/// ends the supervisor with an error.
pub struct CaptureSupervisor {
    ctx: RecorderContext,
    gate: SessionGate,
    poll_interval: Duration,
    fatal_tx: mpsc::UnboundedSender<SessionError>,
    fatal_rx: mpsc::UnboundedReceiver<SessionError>,
}

impl CaptureSupervisor {
    pub fn new(ctx: RecorderContext, poll_interval: Duration) -> Self {
        let (fatal_tx, fatal_rx) = mpsc::unbounded_channel();
        Self {
            ctx,
            gate: SessionGate::new(),
            poll_interval,
            fatal_tx,
            fatal_rx,
        }
    }

    pub fn gate(&self) -> &SessionGate {
        &self.gate
    }

    /// Make one start-or-skip decision
    ///
    /// Returns the handle of the spawned session task, if one was started.
    pub fn tick(&self) -> Option<JoinHandle<()>> {
        if !self.ctx.switch.is_enabled() || self.ctx.status.is_recording() {
            return None;
        }
        let ticket = self.gate.try_begin()?;

        info!("Starting recording session");
        let ctx = self.ctx.clone();
        let fatal_tx = self.fatal_tx.clone();

        Some(tokio::spawn(async move {
            match RecordingSession::run(ctx, ticket).await {
                Ok(summary) => info!("Session for {} finished: {:?}", summary.file_name, summary.end),
                Err(e) if e.is_fatal() => {
                    error!("{}", e);
                    let _ = fatal_tx.send(e);
                }
                Err(e) => warn!("{}", e),
            }
        }))
    }

    /// Tick until a fatal session error occurs
    pub async fn run(mut self) -> Result<()> {
        info!(
            "Capture supervisor started (polling every {:?})",
            self.poll_interval
        );

        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately; wait a full interval first
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.tick();
                }
                Some(fatal) = self.fatal_rx.recv() => {
                    error!("Capture supervisor stopping");
                    return Err(fatal.into());
                }
            }
        }
    }
}
