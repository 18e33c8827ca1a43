//! Refresh cycle state machine and statistics

use crate::{IntegrationError, Result};
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Phase of a remote chart session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshPhase {
    /// Created, nothing fetched yet
    Idle,
    Loading,
    Ready,
    Errored,
    /// Torn down; terminal
    ShutDown,
}

/// Counters describing the cycles a session has run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RefreshStats {
    pub cycles_started: u64,
    pub cycles_succeeded: u64,
    pub cycles_failed: u64,
    /// Cycles that finished after teardown and were dropped
    pub cycles_discarded: u64,
    pub timers_started: u64,
    pub state_transitions: u64,
    pub last_cycle_duration_ms: Option<u64>,
    pub last_record_count: Option<usize>,
}

/// Shared, thread-safe view of the session phase
#[derive(Debug, Clone)]
pub struct PhaseTracker {
    phase: Arc<RwLock<RefreshPhase>>,
    stats: Arc<RwLock<RefreshStats>>,
    cycle_started_at: Arc<RwLock<Option<Instant>>>,
}

impl Default for PhaseTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl PhaseTracker {
    pub fn new() -> Self {
        Self {
            phase: Arc::new(RwLock::new(RefreshPhase::Idle)),
            stats: Arc::new(RwLock::new(RefreshStats::default())),
            cycle_started_at: Arc::new(RwLock::new(None)),
        }
    }

    pub fn phase(&self) -> RefreshPhase {
        *self.phase.read()
    }

    pub fn stats(&self) -> RefreshStats {
        self.stats.read().clone()
    }

    pub fn is_shut_down(&self) -> bool {
        self.phase() == RefreshPhase::ShutDown
    }

    /// Transition to a new phase, rejecting moves the state machine does not allow
    pub fn transition_to(&self, new_phase: RefreshPhase) -> Result<()> {
        {
            let mut phase = self.phase.write();
            let old = *phase;

            if !is_valid_transition(old, new_phase) {
                return Err(IntegrationError::Lifecycle(format!(
                    "Invalid transition from {old:?} to {new_phase:?}"
                )));
            }

            *phase = new_phase;
        }

        self.stats.write().state_transitions += 1;
        Ok(())
    }

    pub fn begin_cycle(&self) -> Result<()> {
        self.transition_to(RefreshPhase::Loading)?;
        *self.cycle_started_at.write() = Some(Instant::now());
        self.stats.write().cycles_started += 1;
        Ok(())
    }

    pub fn complete_cycle(&self, record_count: usize) -> Result<()> {
        self.transition_to(RefreshPhase::Ready)?;
        let elapsed = self.take_cycle_duration();
        let mut stats = self.stats.write();
        stats.cycles_succeeded += 1;
        stats.last_record_count = Some(record_count);
        stats.last_cycle_duration_ms = elapsed.map(|d| d.as_millis() as u64);
        Ok(())
    }

    pub fn fail_cycle(&self) -> Result<()> {
        self.transition_to(RefreshPhase::Errored)?;
        let elapsed = self.take_cycle_duration();
        let mut stats = self.stats.write();
        stats.cycles_failed += 1;
        stats.last_cycle_duration_ms = elapsed.map(|d| d.as_millis() as u64);
        Ok(())
    }

    pub fn record_discarded(&self) {
        self.stats.write().cycles_discarded += 1;
    }

    pub fn record_timer_started(&self) {
        self.stats.write().timers_started += 1;
    }

    /// Move to the terminal phase; repeated calls are harmless
    pub fn shut_down(&self) {
        if self.transition_to(RefreshPhase::ShutDown).is_err() {
            log::trace!("Session already shut down");
        }
    }

    fn take_cycle_duration(&self) -> Option<Duration> {
        self.cycle_started_at.write().take().map(|t| t.elapsed())
    }
}

fn is_valid_transition(from: RefreshPhase, to: RefreshPhase) -> bool {
    use RefreshPhase::*;

    match (from, to) {
        // a new cycle may start from any non-terminal phase
        (Idle | Ready | Errored, Loading) => true,
        (Loading, Ready | Errored) => true,

        (ShutDown, _) => false,
        (_, ShutDown) => true,

        _ => false,
    }
}
