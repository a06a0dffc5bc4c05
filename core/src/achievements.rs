//! Achievement rules and evaluation.
//!
//! The rule list is an external, immutable input (loaded alongside
//! the upgrade catalog). Evaluation is a stateless pass over a
//! [`PlayerEconomy`] snapshot; per-player unlock state lives in an
//! [`AchievementBook`] and each rule unlocks — and pays out — exactly
//! once for the lifetime of the player.

use crate::{
    ledger::PlayerEconomy,
    types::Millis,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Trigger predicates over a player snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Trigger {
    BalanceAtLeast { amount: f64 },
    LifetimeEarnedAtLeast { amount: f64 },
    ClicksAtLeast { count: u64 },
    PurchasesAtLeast { count: u64 },
    PassiveRateAtLeast { rate: f64 },
}

impl Trigger {
    pub fn holds(&self, economy: &PlayerEconomy, passive_rate: f64) -> bool {
        match self {
            Self::BalanceAtLeast { amount } => economy.balance >= *amount,
            Self::LifetimeEarnedAtLeast { amount } => economy.lifetime_earned >= *amount,
            Self::ClicksAtLeast { count } => economy.lifetime_clicks >= *count,
            Self::PurchasesAtLeast { count } => economy.lifetime_purchases >= *count,
            Self::PassiveRateAtLeast { rate } => passive_rate >= *rate,
        }
    }
}

/// Reward granted on unlock. Any combination of the three.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Reward {
    #[serde(default)]
    pub currency: f64,
    /// Permanent multiplicative bonus on passive income.
    #[serde(default)]
    pub income_multiplier: Option<f64>,
    #[serde(default)]
    pub prestige_points: u64,
}

/// One immutable achievement rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AchievementRule {
    pub rule_id: String,
    pub label: String,
    pub trigger: Trigger,
    pub reward: Reward,
}

#[derive(Debug, Clone, Deserialize)]
struct RulesFile {
    achievements: Vec<AchievementRule>,
}

/// Load a rule list from its JSON file representation.
pub fn rules_from_json(json: &str) -> Result<Vec<AchievementRule>, serde_json::Error> {
    let file: RulesFile = serde_json::from_str(json)?;
    Ok(file.achievements)
}

/// The tuned default rule set used by the runner and tests.
pub fn standard_rules() -> Vec<AchievementRule> {
    fn rule(id: &str, label: &str, trigger: Trigger, reward: Reward) -> AchievementRule {
        AchievementRule {
            rule_id: id.into(),
            label: label.into(),
            trigger,
            reward,
        }
    }
    let cash = |currency: f64| Reward {
        currency,
        income_multiplier: None,
        prestige_points: 0,
    };
    vec![
        rule(
            "first_steps",
            "First Steps",
            Trigger::ClicksAtLeast { count: 10 },
            cash(25.0),
        ),
        rule(
            "busy_hands",
            "Busy Hands",
            Trigger::ClicksAtLeast { count: 1_000 },
            cash(2_500.0),
        ),
        rule(
            "shopkeeper",
            "Shopkeeper",
            Trigger::PurchasesAtLeast { count: 10 },
            cash(500.0),
        ),
        rule(
            "thousandaire",
            "Thousandaire",
            Trigger::LifetimeEarnedAtLeast { amount: 1_000.0 },
            cash(100.0),
        ),
        rule(
            "millionaire",
            "Millionaire",
            Trigger::LifetimeEarnedAtLeast { amount: 1_000_000.0 },
            Reward {
                currency: 10_000.0,
                income_multiplier: Some(1.05),
                prestige_points: 1,
            },
        ),
        rule(
            "industrialist",
            "Industrialist",
            Trigger::PassiveRateAtLeast { rate: 1_000.0 },
            Reward {
                currency: 0.0,
                income_multiplier: Some(1.10),
                prestige_points: 1,
            },
        ),
    ]
}

/// Per-player unlock state: rule_id → unlock timestamp.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AchievementBook {
    unlocked: HashMap<String, Millis>,
}

impl AchievementBook {
    pub fn is_unlocked(&self, rule_id: &str) -> bool {
        self.unlocked.contains_key(rule_id)
    }

    pub fn unlocked_at(&self, rule_id: &str) -> Option<Millis> {
        self.unlocked.get(rule_id).copied()
    }

    pub fn unlocked_count(&self) -> usize {
        self.unlocked.len()
    }

    fn mark(&mut self, rule_id: &str, now: Millis) {
        self.unlocked.insert(rule_id.to_string(), now);
    }
}

/// A rule newly satisfied during an evaluation pass. The caller
/// applies the reward and surfaces the notification.
#[derive(Debug, Clone)]
pub struct Unlock {
    pub rule_id: String,
    pub label: String,
    pub reward: Reward,
    pub unlocked_at: Millis,
}

/// Evaluate all not-yet-unlocked rules against a snapshot. Marks each
/// newly satisfied rule in the book (first satisfaction wins, exactly
/// once) and returns the unlocks for reward application.
pub fn evaluate(
    rules: &[AchievementRule],
    book: &mut AchievementBook,
    economy: &PlayerEconomy,
    passive_rate: f64,
    now: Millis,
) -> Vec<Unlock> {
    let mut unlocks = Vec::new();
    for rule in rules {
        if book.is_unlocked(&rule.rule_id) {
            continue;
        }
        if rule.trigger.holds(economy, passive_rate) {
            book.mark(&rule.rule_id, now);
            log::info!("achievement unlocked: {} ({})", rule.label, rule.rule_id);
            unlocks.push(Unlock {
                rule_id: rule.rule_id.clone(),
                label: rule.label.clone(),
                reward: rule.reward.clone(),
                unlocked_at: now,
            });
        }
    }
    unlocks
}

// ── Notifications ────────────────────────────────────────────────────────────

/// Notification lifetime. Presentational only — expiry never affects
/// gameplay state.
pub const NOTIFICATION_MS: Millis = 5_000;

/// One-shot unlock notifications for the UI, pruned lazily.
#[derive(Debug, Clone, Default)]
pub struct NotificationQueue {
    entries: Vec<(Millis, String)>,
}

impl NotificationQueue {
    pub fn push(&mut self, now: Millis, text: String) {
        self.entries.push((now, text));
    }

    /// Live notifications at `now`; expired entries are dropped.
    pub fn active(&mut self, now: Millis) -> Vec<String> {
        self.entries
            .retain(|(at, _)| now.saturating_sub(*at) < NOTIFICATION_MS);
        self.entries.iter().map(|(_, text)| text.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unlock_happens_exactly_once() {
        let rules = vec![AchievementRule {
            rule_id: "r".into(),
            label: "R".into(),
            trigger: Trigger::BalanceAtLeast { amount: 10.0 },
            reward: Reward {
                currency: 5.0,
                income_multiplier: None,
                prestige_points: 0,
            },
        }];
        let mut book = AchievementBook::default();
        let economy = PlayerEconomy {
            balance: 50.0,
            ..PlayerEconomy::default()
        };

        let first = evaluate(&rules, &mut book, &economy, 0.0, 100);
        assert_eq!(first.len(), 1);
        assert_eq!(book.unlocked_at("r"), Some(100));

        // Predicate still true on later passes; no re-unlock.
        for t in [200, 300, 400] {
            assert!(evaluate(&rules, &mut book, &economy, 0.0, t).is_empty());
        }
        assert_eq!(book.unlocked_at("r"), Some(100));
    }

    #[test]
    fn notifications_expire() {
        let mut q = NotificationQueue::default();
        q.push(0, "a".into());
        q.push(3_000, "b".into());
        assert_eq!(q.active(4_000).len(), 2);
        assert_eq!(q.active(5_500), vec!["b".to_string()]);
        assert!(q.active(9_000).is_empty());
    }
}
