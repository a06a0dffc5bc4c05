//! The economy engine — the facade the host application talks to.
//!
//! RULES:
//!   - One engine per running process (or per shard), constructed
//!     explicitly and threaded through parameters. No globals.
//!   - Time is always supplied by the caller; the engine never reads
//!     a clock. Same seed + same call sequence = same state and the
//!     same event log, byte for byte.
//!   - Every state change is recorded in the event log.
//!   - Calls for the same player must be serialized by the host;
//!     different players (on different engines/shards) are fully
//!     independent apart from the shared item serial sequence.

use crate::{
    achievements::{self, AchievementBook, AchievementRule, NotificationQueue, Unlock},
    automation::AntiAutomationEngine,
    catalog::UpgradeCatalog,
    error::{EconomyError, EconomyResult},
    event::{event_type_name, EconomyEvent},
    items::{UniqueItem, UniqueItemGenerator},
    ledger::{EconomyLedger, PlayerEconomy, PurchaseOutcome},
    scheduler::IncomeScheduler,
    snapshot::{EngineSnapshot, HoldingSnapshot, PlayerSnapshot},
    types::{Millis, PlayerId},
};
use std::collections::HashMap;

/// Currency granted per accepted manual action.
pub const DEFAULT_CLICK_VALUE: f64 = 1.0;

struct PlayerState {
    ledger: EconomyLedger,
    achievements: AchievementBook,
    notifications: NotificationQueue,
}

pub struct GameEngine {
    catalog: UpgradeCatalog,
    rules: Vec<AchievementRule>,
    players: HashMap<PlayerId, PlayerState>,
    automation: AntiAutomationEngine,
    items: UniqueItemGenerator,
    scheduler: IncomeScheduler,
    click_value: f64,
    /// Engine clock in the host's time domain: advanced by `tick()`
    /// elapsed time and synchronized to every caller-supplied `now`.
    /// Stamps passive-path achievement unlocks.
    clock_ms: Millis,
    events: Vec<EconomyEvent>,
}

impl GameEngine {
    pub fn new(seed: u64, catalog: UpgradeCatalog, rules: Vec<AchievementRule>) -> Self {
        Self {
            catalog,
            rules,
            players: HashMap::new(),
            automation: AntiAutomationEngine::new(),
            items: UniqueItemGenerator::new(seed),
            scheduler: IncomeScheduler::new(),
            click_value: DEFAULT_CLICK_VALUE,
            clock_ms: 0,
            events: Vec::new(),
        }
    }

    /// Build a fully wired engine with the standard catalog and rule
    /// set. Call this instead of assembling the pieces by hand.
    pub fn build(seed: u64) -> Self {
        Self::new(seed, UpgradeCatalog::standard(), achievements::standard_rules())
    }

    pub fn with_click_value(mut self, click_value: f64) -> Self {
        self.click_value = click_value;
        self
    }

    pub fn catalog(&self) -> &UpgradeCatalog {
        &self.catalog
    }

    // ── Manual actions ─────────────────────────────────────────────

    /// Anti-automation verdict for one action, without crediting.
    /// Bookkeeping only — the ledger is untouched either way.
    pub fn validate_action(
        &mut self,
        player_id: &str,
        now: Millis,
    ) -> crate::automation::ActionDecision {
        self.automation.validate_action(player_id, now)
    }

    /// One manual click: validate, credit on acceptance, evaluate
    /// achievements. Returns the decision so the host can surface
    /// warnings and block reasons.
    pub fn click(
        &mut self,
        player_id: &str,
        now: Millis,
    ) -> EconomyResult<crate::automation::ActionDecision> {
        self.observe_time(now);
        let was_blocked = self.automation.is_blocked(player_id, now);
        let decision = self.automation.validate_action(player_id, now);

        if !decision.allowed {
            if !was_blocked {
                if let Some(until) = self.automation.blocked_until(player_id) {
                    self.push_event(EconomyEvent::PlayerBlocked {
                        player_id: player_id.to_string(),
                        until,
                    });
                }
            }
            self.push_event(EconomyEvent::ActionRejected {
                player_id: player_id.to_string(),
                reason: decision.reason.clone().unwrap_or_default(),
            });
            return Ok(decision);
        }

        let click_value = self.click_value;
        let state = self.player_mut(player_id);
        state.ledger.credit_manual_action(click_value)?;
        let balance = state.ledger.economy.balance;
        self.push_event(EconomyEvent::ActionCredited {
            player_id: player_id.to_string(),
            amount: click_value,
            balance,
        });

        self.evaluate_achievements(player_id, now)?;
        Ok(decision)
    }

    // ── Purchases ──────────────────────────────────────────────────

    /// Attempt a purchase. Runs the request flood guard, the ledger
    /// purchase, the unique-item roll for composite upgrades, and an
    /// achievement pass. All-or-nothing on the ledger side.
    pub fn purchase(
        &mut self,
        player_id: &str,
        upgrade_id: &str,
        now: Millis,
    ) -> EconomyResult<(PurchaseOutcome, Option<UniqueItem>)> {
        self.observe_time(now);
        let guard = self.automation.validate_request(player_id, now);
        if !guard.allowed {
            let reason = guard.reason.unwrap_or_default();
            self.push_event(EconomyEvent::PurchaseRejected {
                player_id: player_id.to_string(),
                upgrade_id: upgrade_id.to_string(),
                reason: reason.clone(),
            });
            return Ok((PurchaseOutcome::Throttled { reason }, None));
        }

        let catalog = &self.catalog;
        let state = self
            .players
            .entry(player_id.to_string())
            .or_insert_with(|| PlayerState {
                ledger: EconomyLedger::new(catalog),
                achievements: AchievementBook::default(),
                notifications: NotificationQueue::default(),
            });
        let outcome = state.ledger.purchase(catalog, upgrade_id)?;
        state.ledger.refresh_unlocks(catalog);

        let item = match &outcome {
            PurchaseOutcome::Purchased { cost, new_count } => {
                self.push_event(EconomyEvent::UpgradePurchased {
                    player_id: player_id.to_string(),
                    upgrade_id: upgrade_id.to_string(),
                    cost: *cost,
                    new_count: *new_count,
                });
                let item = self.roll_item(player_id, upgrade_id, now);
                self.evaluate_achievements(player_id, now)?;
                item
            }
            other => {
                self.push_event(EconomyEvent::PurchaseRejected {
                    player_id: player_id.to_string(),
                    upgrade_id: upgrade_id.to_string(),
                    reason: format!("{other:?}"),
                });
                None
            }
        };

        Ok((outcome, item))
    }

    /// Item roll for hosts that drive their own purchase flow. Only
    /// composite (chain) upgrades are eligible; producer purchases
    /// always return `None`.
    pub fn generate_item_if_eligible(
        &mut self,
        player_id: &str,
        upgrade_id: &str,
        upgrade_name: &str,
        base_cost: f64,
        now: Millis,
    ) -> Option<UniqueItem> {
        let item =
            self.items
                .maybe_generate(player_id, upgrade_id, upgrade_name, base_cost, now)?;
        self.push_event(EconomyEvent::ItemGenerated {
            player_id: player_id.to_string(),
            serial: item.serial,
            tier: item.tier,
            rarity: item.rarity,
            bonus_multiplier: item.bonus_multiplier,
            source_upgrade: item.source_upgrade.clone(),
        });
        Some(item)
    }

    fn roll_item(&mut self, player_id: &str, upgrade_id: &str, now: Millis) -> Option<UniqueItem> {
        let def = self.catalog.get(upgrade_id)?;
        if !def.is_composite() {
            return None;
        }
        let (label, base_cost) = (def.label.clone(), def.base_cost);
        self.generate_item_if_eligible(player_id, upgrade_id, &label, base_cost, now)
    }

    // ── Passive income ─────────────────────────────────────────────

    /// Report elapsed wall time from the host loop. Consumes whole
    /// 100 ms ticks from the accumulator and credits every player's
    /// current passive rate once per tick — the rate is re-read each
    /// tick, so purchases and multipliers take effect mid-interval.
    pub fn tick(&mut self, elapsed_ms: Millis) -> EconomyResult<()> {
        self.clock_ms += elapsed_ms;
        let ticks = self.scheduler.advance(elapsed_ms);
        if ticks == 0 {
            return Ok(());
        }

        let player_ids: Vec<PlayerId> = self.players.keys().cloned().collect();
        for player_id in player_ids {
            let mut granted = 0.0;
            for _ in 0..ticks {
                let state = self
                    .players
                    .get_mut(&player_id)
                    .ok_or_else(|| EconomyError::UnknownPlayer {
                        player_id: player_id.clone(),
                    })?;
                let rate = state.ledger.passive_income_rate();
                if rate <= 0.0 {
                    break;
                }
                let amount = self.scheduler.credit_per_tick(rate);
                state.ledger.credit(amount)?;
                granted += amount;
            }
            if granted > 0.0 {
                self.push_event(EconomyEvent::PassiveIncomeGranted {
                    player_id: player_id.clone(),
                    amount: granted,
                    ticks,
                });
                let now = self.clock_ms;
                self.evaluate_achievements(&player_id, now)?;
            }
        }
        Ok(())
    }

    pub fn pause_income(&mut self) {
        self.scheduler.pause();
    }

    pub fn resume_income(&mut self) {
        self.scheduler.resume();
    }

    /// Stop the scheduler on session end; the fractional accumulator
    /// is discarded.
    pub fn stop_income(&mut self) {
        self.scheduler.stop();
    }

    // ── Snapshots ──────────────────────────────────────────────────

    /// Read-only snapshot for persistence and external evaluation.
    pub fn snapshot(&self, player_id: &str) -> EconomyResult<PlayerSnapshot> {
        let state = self
            .players
            .get(player_id)
            .ok_or_else(|| EconomyError::UnknownPlayer {
                player_id: player_id.to_string(),
            })?;
        let mut holdings: Vec<HoldingSnapshot> = state
            .ledger
            .holdings()
            .filter(|h| h.count > 0)
            .map(|h| HoldingSnapshot {
                upgrade_id: h.upgrade_id.clone(),
                count: h.count,
            })
            .collect();
        holdings.sort_by(|a, b| a.upgrade_id.cmp(&b.upgrade_id));
        Ok(PlayerSnapshot {
            player_id: player_id.to_string(),
            economy: state.ledger.economy.clone(),
            holdings,
            achievements: state.achievements.clone(),
        })
    }

    /// Restore a player from external storage, replacing any existing
    /// in-memory state. Derived fields are recomputed from the
    /// catalog.
    pub fn load_snapshot(&mut self, snapshot: PlayerSnapshot) -> EconomyResult<()> {
        let mut ledger = EconomyLedger::new(&self.catalog);
        ledger.economy = snapshot.economy;
        ledger.restore_holdings(
            &self.catalog,
            snapshot
                .holdings
                .into_iter()
                .map(|h| (h.upgrade_id, h.count)),
        )?;
        self.players.insert(
            snapshot.player_id,
            PlayerState {
                ledger,
                achievements: snapshot.achievements,
                notifications: NotificationQueue::default(),
            },
        );
        Ok(())
    }

    pub fn engine_snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            next_serial: self.items.next_serial(),
        }
    }

    pub fn load_engine_snapshot(&mut self, snapshot: EngineSnapshot, seed: u64) {
        self.items = UniqueItemGenerator::new(seed).with_next_serial(snapshot.next_serial);
    }

    // ── Inspection ─────────────────────────────────────────────────

    pub fn economy(&self, player_id: &str) -> Option<&PlayerEconomy> {
        self.players.get(player_id).map(|s| &s.ledger.economy)
    }

    pub fn ledger(&self, player_id: &str) -> Option<&EconomyLedger> {
        self.players.get(player_id).map(|s| &s.ledger)
    }

    pub fn passive_income_rate(&mut self, player_id: &str) -> f64 {
        self.players
            .get_mut(player_id)
            .map(|s| s.ledger.passive_income_rate())
            .unwrap_or(0.0)
    }

    pub fn achievements(&self, player_id: &str) -> Option<&AchievementBook> {
        self.players.get(player_id).map(|s| &s.achievements)
    }

    /// Live unlock notifications for a player; expired ones drop out.
    pub fn notifications(&mut self, player_id: &str, now: Millis) -> Vec<String> {
        self.players
            .get_mut(player_id)
            .map(|s| s.notifications.active(now))
            .unwrap_or_default()
    }

    /// Drain the accumulated event log.
    pub fn drain_events(&mut self) -> Vec<EconomyEvent> {
        std::mem::take(&mut self.events)
    }

    /// Periodic maintenance: evict idle behaviour windows.
    pub fn evict_idle(&mut self, now: Millis) {
        self.automation.evict_idle(now);
    }

    // ── Internals ──────────────────────────────────────────────────

    fn push_event(&mut self, event: EconomyEvent) {
        log::debug!("event: {}", event_type_name(&event));
        self.events.push(event);
    }

    /// Keep the engine clock in the caller's time domain, so passive
    /// unlock timestamps are comparable to click-path ones even when
    /// the host clock starts at a nonzero epoch.
    fn observe_time(&mut self, now: Millis) {
        if now > self.clock_ms {
            self.clock_ms = now;
        }
    }

    fn player_mut(&mut self, player_id: &str) -> &mut PlayerState {
        let catalog = &self.catalog;
        self.players
            .entry(player_id.to_string())
            .or_insert_with(|| PlayerState {
                ledger: EconomyLedger::new(catalog),
                achievements: AchievementBook::default(),
                notifications: NotificationQueue::default(),
            })
    }

    /// Evaluate rules after a ledger mutation, applying rewards.
    /// Rewards are mutations themselves, so the pass repeats until no
    /// new rule fires; unlock-once guarantees termination.
    fn evaluate_achievements(&mut self, player_id: &str, now: Millis) -> EconomyResult<()> {
        loop {
            let state = self
                .players
                .get_mut(player_id)
                .ok_or_else(|| EconomyError::UnknownPlayer {
                    player_id: player_id.to_string(),
                })?;
            let rate = state.ledger.passive_income_rate();
            let unlocks =
                achievements::evaluate(&self.rules, &mut state.achievements, &state.ledger.economy, rate, now);
            if unlocks.is_empty() {
                return Ok(());
            }
            for unlock in unlocks {
                self.apply_reward(player_id, &unlock, now)?;
            }
        }
    }

    fn apply_reward(&mut self, player_id: &str, unlock: &Unlock, now: Millis) -> EconomyResult<()> {
        let state = self
            .players
            .get_mut(player_id)
            .ok_or_else(|| EconomyError::UnknownPlayer {
                player_id: player_id.to_string(),
            })?;

        if unlock.reward.currency > 0.0 {
            state.ledger.credit(unlock.reward.currency)?;
        }
        if let Some(multiplier) = unlock.reward.income_multiplier {
            state.ledger.economy.income_multiplier *= multiplier;
            state.ledger.invalidate_rate();
        }
        state.ledger.economy.prestige_points += unlock.reward.prestige_points;

        state
            .notifications
            .push(now, format!("Achievement unlocked: {}", unlock.label));
        self.push_event(EconomyEvent::AchievementUnlocked {
            player_id: player_id.to_string(),
            rule_id: unlock.rule_id.clone(),
            reward_currency: unlock.reward.currency,
        });
        Ok(())
    }
}
