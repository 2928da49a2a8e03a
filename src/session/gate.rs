use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// Lifecycle phase of the (single) recording session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    Idle,
    Starting,
    Active,
    Stopping,
}

/// Admits at most one recording session at a time
#[derive(Clone)]
pub struct SessionGate {
    phase: Arc<Mutex<SessionPhase>>,
}

impl SessionGate {
    pub fn new() -> Self {
        Self {
            phase: Arc::new(Mutex::new(SessionPhase::Idle)),
        }
    }

    pub fn phase(&self) -> SessionPhase {
        *self.phase.lock()
    }

    /// Move Idle → Starting. `None` if a session is already under way.
    pub fn try_begin(&self) -> Option<SessionTicket> {
        let mut phase = self.phase.lock();
        if *phase != SessionPhase::Idle {
            return None;
        }
        *phase = SessionPhase::Starting;
        debug!("Session gate: idle -> starting");

        Some(SessionTicket {
            phase: Arc::clone(&self.phase),
        })
    }
}

impl Default for SessionGate {
    fn default() -> Self {
        Self::new()
    }
}

/// Proof of admission. Dropping it returns the gate to Idle.
pub struct SessionTicket {
    phase: Arc<Mutex<SessionPhase>>,
}

impl SessionTicket {
    pub fn activate(&self) {
        self.transition(SessionPhase::Active);
    }

    pub fn stopping(&self) {
        self.transition(SessionPhase::Stopping);
    }

    fn transition(&self, next: SessionPhase) {
        let mut phase = self.phase.lock();
        debug!("Session gate: {:?} -> {:?}", *phase, next);
        *phase = next;
    }
}

impl Drop for SessionTicket {
    fn drop(&mut self) {
        self.transition(SessionPhase::Idle);
    }
}
