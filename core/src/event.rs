//! Economy events — everything observable the core does.
//!
//! RULE: every state change the engine performs is recorded as an
//! event. Hosts drain the log for display, persistence triggers, and
//! the determinism test compares two engines' logs entry by entry.
//! Variants are added over time — never removed or reordered.

use crate::{
    items::ItemTier,
    types::{Millis, PlayerId, Serial, UpgradeId},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EconomyEvent {
    // ── Manual actions ─────────────────────────────
    ActionCredited {
        player_id: PlayerId,
        amount: f64,
        balance: f64,
    },
    ActionRejected {
        player_id: PlayerId,
        reason: String,
    },
    PlayerBlocked {
        player_id: PlayerId,
        until: Millis,
    },

    // ── Purchases ──────────────────────────────────
    UpgradePurchased {
        player_id: PlayerId,
        upgrade_id: UpgradeId,
        cost: f64,
        new_count: u32,
    },
    PurchaseRejected {
        player_id: PlayerId,
        upgrade_id: UpgradeId,
        reason: String,
    },

    // ── Passive income ─────────────────────────────
    PassiveIncomeGranted {
        player_id: PlayerId,
        amount: f64,
        ticks: u32,
    },

    // ── Items ──────────────────────────────────────
    ItemGenerated {
        player_id: PlayerId,
        serial: Serial,
        tier: ItemTier,
        rarity: f64,
        bonus_multiplier: f64,
        source_upgrade: UpgradeId,
    },

    // ── Achievements ───────────────────────────────
    AchievementUnlocked {
        player_id: PlayerId,
        rule_id: String,
        reward_currency: f64,
    },
}

/// Extract a stable string name from an event variant, for log lines
/// and host-side filtering.
pub fn event_type_name(event: &EconomyEvent) -> &'static str {
    match event {
        EconomyEvent::ActionCredited { .. } => "action_credited",
        EconomyEvent::ActionRejected { .. } => "action_rejected",
        EconomyEvent::PlayerBlocked { .. } => "player_blocked",
        EconomyEvent::UpgradePurchased { .. } => "upgrade_purchased",
        EconomyEvent::PurchaseRejected { .. } => "purchase_rejected",
        EconomyEvent::PassiveIncomeGranted { .. } => "passive_income_granted",
        EconomyEvent::ItemGenerated { .. } => "item_generated",
        EconomyEvent::AchievementUnlocked { .. } => "achievement_unlocked",
    }
}
