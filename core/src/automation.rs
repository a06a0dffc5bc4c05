//! Behavioural anti-automation engine.
//!
//! Detects and throttles superhuman or mechanically regular input
//! (auto-clickers, scripted bursts) from the per-player behaviour
//! windows alone — no server round-trip per action. Per player the
//! engine is a small state machine: Normal → Warned → Blocked, with
//! blocks expiring lazily on the next action.
//!
//! All decisions are pure functions of the caller-supplied `now`;
//! nothing here reads an ambient clock.

use crate::{
    behavior::{BehaviorTracker, BehaviorWindow},
    types::Millis,
};

// ── Constants ────────────────────────────────────────────────────────────────

/// Actions allowed inside the trailing one-second window.
pub const MAX_ACTIONS_PER_SECOND: usize = 14;
/// Suspicion level at which a player is blocked.
pub const BLOCK_THRESHOLD: f64 = 3.0;
/// Standard block duration.
pub const BLOCK_MS: Millis = 60_000;
/// Request-flood guard: recorded actions in the window above this
/// trigger an immediate long block, regardless of suspicion.
pub const FLOOD_THRESHOLD: usize = 100;
/// Flood blocks last five times the standard duration.
pub const FLOOD_BLOCK_MS: Millis = 5 * BLOCK_MS;
/// Suspicion decays by this much per sufficiently spaced action.
const SUSPICION_DECAY: f64 = 0.1;
/// Gap required before decay applies.
const DECAY_GAP_MS: Millis = 200;
/// Pattern analysis needs at least this many interval samples.
const PATTERN_MIN_SAMPLES: usize = 5;
/// Std-dev below this (with a sub-100 ms mean) is superhuman regularity.
const PATTERN_STDDEV_MS: f64 = 10.0;
const PATTERN_MEAN_MS: f64 = 100.0;

// ── Decision type ────────────────────────────────────────────────────────────

/// The verdict for one action or request.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionDecision {
    pub allowed: bool,
    pub reason: Option<String>,
    pub warning: Option<String>,
}

impl ActionDecision {
    fn allow() -> Self {
        Self {
            allowed: true,
            reason: None,
            warning: None,
        }
    }

    fn allow_with_warning(warning: String) -> Self {
        Self {
            allowed: true,
            reason: None,
            warning: Some(warning),
        }
    }

    fn reject(reason: String) -> Self {
        Self {
            allowed: false,
            reason: Some(reason),
            warning: None,
        }
    }

    fn reject_with_warning(reason: String, warning: String) -> Self {
        Self {
            allowed: false,
            reason: Some(reason),
            warning: Some(warning),
        }
    }
}

// ── Engine ───────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct AntiAutomationEngine {
    tracker: BehaviorTracker,
}

impl AntiAutomationEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate one manual action (click) for a player at `now`.
    ///
    /// This is a pure decision plus a bookkeeping mutation of the
    /// player's behaviour window. It never panics for a well-formed
    /// player id. Calls for the same player must be serialized by the
    /// caller; different players are independent.
    pub fn validate_action(&mut self, player_id: &str, now: Millis) -> ActionDecision {
        let window = self.tracker.window_mut(player_id, now);

        if let Some(decision) = check_block(window, player_id, now) {
            return decision;
        }

        // Rate check against the trailing window.
        window.evict_stale(now);
        if window.actions_in_window() >= MAX_ACTIONS_PER_SECOND {
            window.suspicion += 1.0;
            if window.suspicion >= BLOCK_THRESHOLD {
                return block(window, player_id, now, BLOCK_MS, "bot detected");
            }
            // Rate-limited actions are NOT recorded into history.
            return ActionDecision::reject_with_warning(
                "too many actions per second".into(),
                format!("suspicion level {:.0}", window.suspicion),
            );
        }

        // Interval since the last accepted action feeds the pattern
        // buffer; the very first action has no interval.
        let interval = window.last_action.map(|t| now.saturating_sub(t));
        if let Some(iv) = interval {
            window.push_interval(iv);
        }

        if is_mechanical_pattern(window) {
            window.suspicion += 1.0;
            if window.suspicion >= BLOCK_THRESHOLD {
                return block(window, player_id, now, BLOCK_MS, "bot detected");
            }
            // Suspicious but tolerated: the action counts.
            window.record(now);
            log::debug!(
                "player {player_id}: mechanical pattern, suspicion={:.1}",
                window.suspicion
            );
            return ActionDecision::allow_with_warning(
                "suspiciously regular input pattern".into(),
            );
        }

        window.record(now);

        // Isolated past bursts should not accumulate into a permanent
        // penalty; spaced-out actions slowly pay suspicion down.
        if window.suspicion > 0.0 && interval.map_or(false, |iv| iv > DECAY_GAP_MS) {
            window.suspicion = (window.suspicion - SUSPICION_DECAY).max(0.0);
        }

        ActionDecision::allow()
    }

    /// Coarse flood guard for non-click requests. Independent of the
    /// click heuristics: blowing past the threshold blocks immediately
    /// for five times the standard duration.
    pub fn validate_request(&mut self, player_id: &str, now: Millis) -> ActionDecision {
        let window = self.tracker.window_mut(player_id, now);

        if let Some(decision) = check_block(window, player_id, now) {
            return decision;
        }

        window.evict_stale(now);
        if window.actions_in_window() > FLOOD_THRESHOLD {
            return block(window, player_id, now, FLOOD_BLOCK_MS, "request flood");
        }

        window.record(now);
        ActionDecision::allow()
    }

    /// Current suspicion for a player, if tracked. Test and tooling
    /// hook; gameplay code never reads this directly.
    pub fn suspicion(&self, player_id: &str) -> Option<f64> {
        self.tracker.window(player_id).map(|w| w.suspicion)
    }

    /// Recorded interval samples for a player. Test and tooling hook.
    pub fn interval_count(&self, player_id: &str) -> usize {
        self.tracker
            .window(player_id)
            .map(|w| w.interval_count())
            .unwrap_or(0)
    }

    pub fn is_blocked(&self, player_id: &str, now: Millis) -> bool {
        self.blocked_until(player_id)
            .map(|until| now < until)
            .unwrap_or(false)
    }

    pub fn blocked_until(&self, player_id: &str) -> Option<Millis> {
        self.tracker.window(player_id).and_then(|w| w.blocked_until)
    }

    /// Drop behaviour windows idle past the inactivity horizon.
    pub fn evict_idle(&mut self, now: Millis) {
        self.tracker.evict_idle(now);
    }
}

/// Handle an existing block: reject while active, self-heal on expiry.
fn check_block(
    window: &mut BehaviorWindow,
    player_id: &str,
    now: Millis,
) -> Option<ActionDecision> {
    let until = window.blocked_until?;
    if now < until {
        let remaining_s = (until - now).div_ceil(1_000);
        return Some(ActionDecision::reject(format!(
            "blocked for {remaining_s}s"
        )));
    }
    // Expiry is checked lazily; the block clears on the next action.
    log::debug!("player {player_id}: block expired, state reset");
    window.reset();
    None
}

fn block(
    window: &mut BehaviorWindow,
    player_id: &str,
    now: Millis,
    duration_ms: Millis,
    reason: &str,
) -> ActionDecision {
    window.blocked_until = Some(now + duration_ms);
    log::warn!(
        "player {player_id} blocked for {}s: {reason}",
        duration_ms / 1_000
    );
    ActionDecision::reject(format!("{reason}; blocked for {}s", duration_ms / 1_000))
}

/// Mechanical-pattern detection over the last up-to-10 intervals.
///
/// Flags superhuman regularity (std-dev < 10 ms at a sub-100 ms mean)
/// and scripted timers (only one or two distinct interval values among
/// five or more samples). Fewer than five samples is never suspicious.
fn is_mechanical_pattern(window: &BehaviorWindow) -> bool {
    if window.interval_count() < PATTERN_MIN_SAMPLES {
        return false;
    }

    let n = window.interval_count() as f64;
    let mean = window.intervals().map(|iv| iv as f64).sum::<f64>() / n;
    let variance = window
        .intervals()
        .map(|iv| {
            let d = iv as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / n;
    let stddev = variance.sqrt();

    if stddev < PATTERN_STDDEV_MS && mean < PATTERN_MEAN_MS {
        return true;
    }

    let mut distinct: Vec<Millis> = window.intervals().collect();
    distinct.sort_unstable();
    distinct.dedup();
    distinct.len() <= 2
}
