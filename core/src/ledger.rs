//! The economy ledger — authoritative currency and upgrade roster for
//! one player.
//!
//! RULES:
//!   - Balance is never negative. Debits clamp at zero so passive and
//!     reward credits never fail on float drift.
//!   - Purchases are all-or-nothing: a rejected purchase leaves no
//!     partial state behind.
//!   - Derived values (current cost, income per unit, passive rate)
//!     are recomputed on mutation, never on read paths coupled to a
//!     UI refresh.

use crate::{
    catalog::{UpgradeCatalog, UpgradeDefinition},
    error::{EconomyError, EconomyResult},
    types::UpgradeId,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Currency counters for one player.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerEconomy {
    pub balance: f64,
    /// Monotonic total of everything ever credited. Spending reduces
    /// balance but never this.
    pub lifetime_earned: f64,
    pub lifetime_clicks: u64,
    pub lifetime_purchases: u64,
    /// Permanent multiplier on passive income, granted by achievements.
    pub income_multiplier: f64,
    /// Secondary currency granted by achievements.
    pub prestige_points: u64,
}

impl Default for PlayerEconomy {
    fn default() -> Self {
        Self {
            balance: 0.0,
            lifetime_earned: 0.0,
            lifetime_clicks: 0,
            lifetime_purchases: 0,
            income_multiplier: 1.0,
            prestige_points: 0,
        }
    }
}

/// Mutable per-player state for one upgrade definition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UpgradeHolding {
    pub upgrade_id: UpgradeId,
    pub count: u32,
    pub current_cost: f64,
    pub income_per_unit: f64,
    /// Recomputed on every evaluation — a holding can re-lock if a
    /// prerequisite count ever falls.
    pub unlocked: bool,
}

impl UpgradeHolding {
    fn new(def: &UpgradeDefinition) -> Self {
        Self {
            upgrade_id: def.upgrade_id.clone(),
            count: 0,
            current_cost: def.base_cost,
            income_per_unit: def.base_income,
            unlocked: !def.is_composite(),
        }
    }

    fn recompute(&mut self, def: &UpgradeDefinition) {
        self.current_cost = def.base_cost * def.cost_ratio.powi(self.count as i32);
        self.income_per_unit = def.base_income * def.income_ratio.powi(self.count as i32);
    }
}

/// The outcome of a purchase attempt. Policy rejections are values,
/// not errors — only malformed input raises `EconomyError`.
#[derive(Debug, Clone, PartialEq)]
pub enum PurchaseOutcome {
    Purchased { cost: f64, new_count: u32 },
    InsufficientFunds { cost: f64, balance: f64 },
    RequirementsNotMet,
    UnknownUpgrade,
    /// Denied by the anti-automation layer before reaching the
    /// ledger. The engine's purchase path produces this; the ledger
    /// itself never does.
    Throttled { reason: String },
}

impl PurchaseOutcome {
    pub fn is_purchased(&self) -> bool {
        matches!(self, Self::Purchased { .. })
    }
}

/// One player's authoritative ledger.
#[derive(Debug, Clone)]
pub struct EconomyLedger {
    pub economy: PlayerEconomy,
    holdings: HashMap<UpgradeId, UpgradeHolding>,
    /// Cached passive rate; `None` means invalidated.
    cached_rate: Option<f64>,
}

impl EconomyLedger {
    pub fn new(catalog: &UpgradeCatalog) -> Self {
        let holdings = catalog
            .iter()
            .map(|def| (def.upgrade_id.clone(), UpgradeHolding::new(def)))
            .collect();
        Self {
            economy: PlayerEconomy::default(),
            holdings,
            cached_rate: None,
        }
    }

    /// Credit currency. Rejects negative or non-finite amounts loudly;
    /// those are programmer errors, never game states.
    pub fn credit(&mut self, amount: f64) -> EconomyResult<()> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(EconomyError::InvalidAmount { amount });
        }
        self.economy.balance += amount;
        self.economy.lifetime_earned += amount;
        Ok(())
    }

    /// Debit currency, clamping at zero. Underflow is silently
    /// absorbed; only negative or non-finite amounts error.
    pub fn debit(&mut self, amount: f64) -> EconomyResult<()> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(EconomyError::InvalidAmount { amount });
        }
        self.economy.balance = (self.economy.balance - amount).max(0.0);
        Ok(())
    }

    /// Credit one manual action and bump the lifetime click counter.
    pub fn credit_manual_action(&mut self, click_value: f64) -> EconomyResult<()> {
        self.credit(click_value)?;
        self.economy.lifetime_clicks += 1;
        Ok(())
    }

    /// Attempt to buy one unit of `upgrade_id`.
    pub fn purchase(
        &mut self,
        catalog: &UpgradeCatalog,
        upgrade_id: &str,
    ) -> EconomyResult<PurchaseOutcome> {
        let def = match catalog.get(upgrade_id) {
            Some(def) => def,
            None => return Ok(PurchaseOutcome::UnknownUpgrade),
        };

        // Requirements are evaluated fresh on every attempt — never
        // memoized from an earlier unlock.
        if def.is_composite() && !self.requirements_satisfied(def) {
            return Ok(PurchaseOutcome::RequirementsNotMet);
        }

        let holding = self
            .holdings
            .get(upgrade_id)
            .ok_or_else(|| EconomyError::UnknownUpgrade {
                upgrade_id: upgrade_id.to_string(),
            })?;
        let cost = holding.current_cost;

        if self.economy.balance < cost {
            return Ok(PurchaseOutcome::InsufficientFunds {
                cost,
                balance: self.economy.balance,
            });
        }

        self.debit(cost)?;
        let holding = self
            .holdings
            .get_mut(upgrade_id)
            .ok_or_else(|| EconomyError::UnknownUpgrade {
                upgrade_id: upgrade_id.to_string(),
            })?;
        holding.count += 1;
        holding.recompute(def);
        let new_count = holding.count;
        self.economy.lifetime_purchases += 1;
        self.cached_rate = None;

        log::debug!(
            "purchase {upgrade_id}: count={new_count} cost={cost:.2} balance={:.2}",
            self.economy.balance
        );
        Ok(PurchaseOutcome::Purchased { cost, new_count })
    }

    /// True iff every (prerequisite, min_count) pair is satisfied by
    /// the current roster.
    pub fn requirements_satisfied(&self, def: &UpgradeDefinition) -> bool {
        def.requirements.iter().all(|req| {
            self.holdings
                .get(&req.upgrade_id)
                .map(|h| h.count >= req.min_count)
                .unwrap_or(false)
        })
    }

    /// Refresh every composite holding's `unlocked` flag against the
    /// current roster. Called after mutations and on snapshot load.
    pub fn refresh_unlocks(&mut self, catalog: &UpgradeCatalog) {
        for def in catalog.iter() {
            if !def.is_composite() {
                continue;
            }
            let unlocked = self.requirements_satisfied(def);
            if let Some(holding) = self.holdings.get_mut(&def.upgrade_id) {
                holding.unlocked = unlocked;
            }
        }
    }

    /// Sum of income_per_unit × count across all holdings, scaled by
    /// the permanent achievement multiplier. Cached; invalidated on
    /// purchase and snapshot load.
    pub fn passive_income_rate(&mut self) -> f64 {
        if let Some(rate) = self.cached_rate {
            return rate;
        }
        let base: f64 = self
            .holdings
            .values()
            .map(|h| h.income_per_unit * h.count as f64)
            .sum();
        let rate = base * self.economy.income_multiplier;
        self.cached_rate = Some(rate);
        rate
    }

    /// Invalidate the cached rate (after multiplier changes).
    pub fn invalidate_rate(&mut self) {
        self.cached_rate = None;
    }

    pub fn holding(&self, upgrade_id: &str) -> Option<&UpgradeHolding> {
        self.holdings.get(upgrade_id)
    }

    pub fn holdings(&self) -> impl Iterator<Item = &UpgradeHolding> {
        self.holdings.values()
    }

    /// Restore holding counts from a snapshot. Derived fields are
    /// recomputed from the catalog, not trusted from storage.
    pub fn restore_holdings(
        &mut self,
        catalog: &UpgradeCatalog,
        counts: impl IntoIterator<Item = (UpgradeId, u32)>,
    ) -> EconomyResult<()> {
        for (upgrade_id, count) in counts {
            let def = catalog
                .get(&upgrade_id)
                .ok_or(EconomyError::SnapshotMismatch {
                    upgrade_id: upgrade_id.clone(),
                })?;
            let holding = self
                .holdings
                .entry(upgrade_id)
                .or_insert_with(|| UpgradeHolding::new(def));
            holding.count = count;
            holding.recompute(def);
        }
        self.refresh_unlocks(catalog);
        self.cached_rate = None;
        Ok(())
    }
}
