//! Fixed-timestep income scheduler.
//!
//! Converts a continuously changing passive rate into discrete,
//! deterministic credit grants. The host loop reports elapsed wall
//! time from its monotonic clock; the scheduler accumulates it and
//! emits one tick per full tick duration. Total credit per wall-clock
//! second converges to the passive rate regardless of host scheduling
//! jitter, and behaviour is a pure function of the elapsed samples.

use crate::types::Millis;

/// Tick duration in the reference tuning: 100 ms, ten ticks a second.
pub const TICK_MS: Millis = 100;

#[derive(Debug, Clone)]
pub struct IncomeScheduler {
    tick_ms: Millis,
    accumulator_ms: Millis,
    paused: bool,
}

impl IncomeScheduler {
    pub fn new() -> Self {
        Self::with_tick(TICK_MS)
    }

    pub fn with_tick(tick_ms: Millis) -> Self {
        assert!(tick_ms > 0, "tick duration must be positive");
        Self {
            tick_ms,
            accumulator_ms: 0,
            paused: false,
        }
    }

    /// Report elapsed wall time. Returns the number of whole ticks
    /// consumed; the caller credits `rate / ticks_per_second` once per
    /// tick, reading the current rate at credit time.
    ///
    /// Splitting an interval across calls yields the same tick count
    /// as reporting it at once — no tick is skipped or double-counted.
    pub fn advance(&mut self, elapsed_ms: Millis) -> u32 {
        if self.paused {
            return 0;
        }
        self.accumulator_ms += elapsed_ms;
        let ticks = self.accumulator_ms / self.tick_ms;
        self.accumulator_ms -= ticks * self.tick_ms;
        ticks as u32
    }

    /// Amount to credit per tick for a given passive rate.
    pub fn credit_per_tick(&self, rate: f64) -> f64 {
        rate / self.ticks_per_second()
    }

    pub fn ticks_per_second(&self) -> f64 {
        1000.0 / self.tick_ms as f64
    }

    /// While paused, reported elapsed time is ignored entirely.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Stop discards the unconsumed fractional accumulator; no
    /// carry-over across a stop/start boundary.
    pub fn stop(&mut self) {
        self.paused = true;
        self.accumulator_ms = 0;
    }
}

impl Default for IncomeScheduler {
    fn default() -> Self {
        Self::new()
    }
}
