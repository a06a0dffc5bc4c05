//! Per-player behavioural history — the raw material for
//! anti-automation decisions.
//!
//! Each player gets a sliding one-second window of accepted action
//! timestamps, a rolling suspicion score, an optional block expiry,
//! and a bounded ring buffer of inter-action intervals for pattern
//! analysis. Windows are created lazily on first action and evicted
//! after a period of inactivity.

use crate::types::{Millis, PlayerId};
use std::collections::{HashMap, VecDeque};

/// Trailing window length for rate decisions.
pub const WINDOW_MS: Millis = 1_000;

/// Ring buffer capacity for inter-action intervals.
pub const INTERVAL_CAPACITY: usize = 10;

/// Windows idle longer than this are evicted.
pub const IDLE_EVICT_MS: Millis = 10 * 60 * 1_000;

#[derive(Debug, Clone)]
pub struct BehaviorWindow {
    /// Timestamps of recorded actions, oldest first.
    actions: VecDeque<Millis>,
    /// Last up-to-10 inter-action intervals, oldest first.
    intervals: VecDeque<Millis>,
    pub suspicion: f64,
    pub blocked_until: Option<Millis>,
    /// Timestamp of the last recorded action; used for interval
    /// computation and suspicion decay.
    pub last_action: Option<Millis>,
    /// Last time this window was touched at all, for eviction.
    pub last_seen: Millis,
}

impl BehaviorWindow {
    fn new(now: Millis) -> Self {
        Self {
            actions: VecDeque::new(),
            intervals: VecDeque::with_capacity(INTERVAL_CAPACITY),
            suspicion: 0.0,
            blocked_until: None,
            last_action: None,
            last_seen: now,
        }
    }

    /// Drop timestamps that have fallen out of the trailing window.
    pub fn evict_stale(&mut self, now: Millis) {
        let cutoff = now.saturating_sub(WINDOW_MS);
        while let Some(&front) = self.actions.front() {
            if front < cutoff {
                self.actions.pop_front();
            } else {
                break;
            }
        }
    }

    /// Actions currently inside the trailing window. Call
    /// [`evict_stale`](Self::evict_stale) first.
    pub fn actions_in_window(&self) -> usize {
        self.actions.len()
    }

    /// Record an accepted action.
    pub fn record(&mut self, now: Millis) {
        self.actions.push_back(now);
        self.last_action = Some(now);
    }

    /// Push an inter-action interval, evicting the oldest when full.
    pub fn push_interval(&mut self, interval: Millis) {
        if self.intervals.len() == INTERVAL_CAPACITY {
            self.intervals.pop_front();
        }
        self.intervals.push_back(interval);
    }

    pub fn intervals(&self) -> impl Iterator<Item = Millis> + '_ {
        self.intervals.iter().copied()
    }

    pub fn interval_count(&self) -> usize {
        self.intervals.len()
    }

    /// Wipe history and suspicion (after a block expires).
    pub fn reset(&mut self) {
        self.actions.clear();
        self.intervals.clear();
        self.suspicion = 0.0;
        self.blocked_until = None;
        self.last_action = None;
    }
}

/// All players' behaviour windows.
#[derive(Debug, Default)]
pub struct BehaviorTracker {
    windows: HashMap<PlayerId, BehaviorWindow>,
}

impl BehaviorTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch or lazily create a player's window, stamping last_seen.
    pub fn window_mut(&mut self, player_id: &str, now: Millis) -> &mut BehaviorWindow {
        let window = self
            .windows
            .entry(player_id.to_string())
            .or_insert_with(|| BehaviorWindow::new(now));
        window.last_seen = now;
        window
    }

    pub fn window(&self, player_id: &str) -> Option<&BehaviorWindow> {
        self.windows.get(player_id)
    }

    /// Evict windows idle past the inactivity horizon. Cheap enough
    /// to run on any maintenance opportunity.
    pub fn evict_idle(&mut self, now: Millis) {
        let before = self.windows.len();
        self.windows
            .retain(|_, w| now.saturating_sub(w.last_seen) < IDLE_EVICT_MS);
        let evicted = before - self.windows.len();
        if evicted > 0 {
            log::debug!("evicted {evicted} idle behavior windows");
        }
    }

    pub fn tracked_players(&self) -> usize {
        self.windows.len()
    }
}
