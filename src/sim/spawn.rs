//! Spawn gating
//!
//! A two-state machine deciding when the next piece may drop. Every accepted
//! drop and every fusion throws the gate back to `Settling`; it reopens once
//! the board is stable (or a hard timeout expires) and a minimum dwell since
//! the last drop has passed. Re-evaluation is rate-limited to the polling
//! interval; the limit is a performance choice, not a correctness one.

use crate::config::GameConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnGateState {
    /// The board is still moving (or just changed); drops are refused
    Settling,
    /// A new piece may be introduced
    Ready,
}

#[derive(Debug, Clone, Copy)]
pub struct SpawnGate {
    state: SpawnGateState,
    settling_since_ms: f64,
    last_drop_ms: f64,
    last_poll_ms: f64,
}

impl Default for SpawnGate {
    fn default() -> Self {
        Self::new()
    }
}

impl SpawnGate {
    /// The gate opens immediately on a fresh, untouched board.
    pub fn new() -> Self {
        Self {
            state: SpawnGateState::Ready,
            settling_since_ms: f64::NEG_INFINITY,
            last_drop_ms: f64::NEG_INFINITY,
            last_poll_ms: f64::NEG_INFINITY,
        }
    }

    pub fn state(&self) -> SpawnGateState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == SpawnGateState::Ready
    }

    /// Moment of the last accepted drop; -inf before the first one
    pub fn last_drop_ms(&self) -> f64 {
        self.last_drop_ms
    }

    pub fn on_drop(&mut self, now_ms: f64) {
        self.state = SpawnGateState::Settling;
        self.settling_since_ms = now_ms;
        self.last_drop_ms = now_ms;
    }

    /// A fusion invalidates whatever settling progress had accumulated.
    pub fn on_fusion(&mut self, now_ms: f64) {
        self.state = SpawnGateState::Settling;
        self.settling_since_ms = now_ms;
    }

    /// Re-evaluate the gate. `all_stable` is only consulted when the polling
    /// interval has elapsed and the timeout has not already decided.
    pub fn poll(&mut self, now_ms: f64, config: &GameConfig, all_stable: impl FnOnce() -> bool) {
        if self.state == SpawnGateState::Ready {
            return;
        }
        if now_ms - self.last_poll_ms < config.stability_poll_ms {
            return;
        }
        self.last_poll_ms = now_ms;

        let dwell_ok = now_ms - self.last_drop_ms >= config.settle_delay_ms;
        if !dwell_ok {
            return;
        }
        let timed_out = now_ms - self.settling_since_ms >= config.max_stabilize_ms;
        if timed_out || all_stable() {
            self.state = SpawnGateState::Ready;
        }
    }
}
