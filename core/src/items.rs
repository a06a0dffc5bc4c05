//! Probabilistic unique-item generation.
//!
//! High-tier (composite/chain) purchases may mint a one-of-a-kind
//! item: drop chance steps with the upgrade's base cost, rarity is
//! log-scaled in cost with bounded jitter, and tier/bonus/flavor all
//! derive from rarity. Serial numbers come from a single global
//! monotonic counter — no duplicates, ever, across threads or shards.
//!
//! All randomness flows through the generator's seeded [`GameRng`]
//! stream; same seed and same purchase sequence reproduce the same
//! drops.

use crate::{
    rng::{GameRng, RngStream},
    types::{Millis, PlayerId, Serial, UpgradeId},
};
use serde::{Deserialize, Serialize};
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

// ── Tiers ────────────────────────────────────────────────────────────────────

/// Rarity tiers, derived from the 0–100 rarity score via fixed
/// breakpoints. Order matters for display and comparison.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ItemTier {
    Common,
    Uncommon,
    Epic,
    Legendary,
    Mythic,
    Transcendent,
}

impl ItemTier {
    /// Pure rarity→tier mapping. Rarity 96 is always the top tier;
    /// rarity 49 always lands just below the midpoint breakpoint.
    pub fn from_rarity(rarity: f64) -> Self {
        if rarity >= 95.0 {
            Self::Transcendent
        } else if rarity >= 80.0 {
            Self::Mythic
        } else if rarity >= 65.0 {
            Self::Legendary
        } else if rarity >= 50.0 {
            Self::Epic
        } else if rarity >= 30.0 {
            Self::Uncommon
        } else {
            Self::Common
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Common => "Common",
            Self::Uncommon => "Uncommon",
            Self::Epic => "Epic",
            Self::Legendary => "Legendary",
            Self::Mythic => "Mythic",
            Self::Transcendent => "Transcendent",
        }
    }

    /// Flavor adjective, fixed per tier so names are reproducible.
    fn adjective(&self) -> &'static str {
        match self {
            Self::Common => "Sturdy",
            Self::Uncommon => "Polished",
            Self::Epic => "Radiant",
            Self::Legendary => "Fabled",
            Self::Mythic => "Mythic",
            Self::Transcendent => "Transcendent",
        }
    }

    fn flavor_text(&self) -> &'static str {
        match self {
            Self::Common => "A dependable piece of workmanship.",
            Self::Uncommon => "Carries the mark of a careful maker.",
            Self::Epic => "Hums faintly with stored potential.",
            Self::Legendary => "Spoken of in workshop legends.",
            Self::Mythic => "Few have ever held its like.",
            Self::Transcendent => "Production itself bends around it.",
        }
    }
}

// ── Item ─────────────────────────────────────────────────────────────────────

/// A generated unique item. Immutable once created except for the
/// owner field, which transfer reassigns.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UniqueItem {
    /// Strictly increasing, unique across the whole system lifetime.
    pub serial: Serial,
    pub name: String,
    pub description: String,
    /// 1–100 rarity score.
    pub rarity: f64,
    pub tier: ItemTier,
    /// Linear in rarity: 1 + (rarity/100)·5, range [1, 6).
    pub bonus_multiplier: f64,
    pub owner_id: PlayerId,
    pub source_upgrade: UpgradeId,
    pub created_at: Millis,
}

impl UniqueItem {
    /// Reassign ownership. Serial, rarity, and bonus never change.
    pub fn transfer(&mut self, new_owner: &str) {
        self.owner_id = new_owner.to_string();
    }
}

// ── Generator ────────────────────────────────────────────────────────────────

pub struct UniqueItemGenerator {
    rng: GameRng,
    /// Shared so sharded generators still issue one global sequence.
    next_serial: Arc<AtomicU64>,
}

impl UniqueItemGenerator {
    pub fn new(master_seed: u64) -> Self {
        Self {
            rng: GameRng::for_stream(master_seed, RngStream::Items),
            next_serial: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Restore the serial counter from a snapshot. The next generated
    /// item receives exactly `next_serial`.
    pub fn with_next_serial(mut self, next_serial: Serial) -> Self {
        self.next_serial = Arc::new(AtomicU64::new(next_serial));
        self
    }

    /// Share one serial sequence between generators (per-shard
    /// deployments). Everything else stays per-generator.
    pub fn share_serials_with(mut self, other: &UniqueItemGenerator) -> Self {
        self.next_serial = Arc::clone(&other.next_serial);
        self
    }

    /// The serial the next generated item would receive. Persist this
    /// with the engine snapshot.
    pub fn next_serial(&self) -> Serial {
        self.next_serial.load(Ordering::SeqCst)
    }

    /// Roll for a drop on a qualifying purchase. Returns `None` when
    /// the drop-chance gate fails; the serial counter only advances on
    /// an actual item, never per attempt.
    pub fn maybe_generate(
        &mut self,
        owner_id: &str,
        source_upgrade: &str,
        upgrade_name: &str,
        base_cost: f64,
        now: Millis,
    ) -> Option<UniqueItem> {
        let chance = drop_chance(base_cost);
        if !self.rng.chance(chance) {
            return None;
        }

        let rarity = self.roll_rarity(base_cost);
        let tier = ItemTier::from_rarity(rarity);
        let bonus_multiplier = 1.0 + (rarity / 100.0) * 5.0;
        let serial = self.next_serial.fetch_add(1, Ordering::SeqCst);

        let item = UniqueItem {
            serial,
            name: format!("{} {}", tier.adjective(), upgrade_name),
            description: tier.flavor_text().to_string(),
            rarity,
            tier,
            bonus_multiplier,
            owner_id: owner_id.to_string(),
            source_upgrade: source_upgrade.to_string(),
            created_at: now,
        };

        log::info!(
            "item #{serial} generated for {owner_id}: {} (rarity {rarity:.1}, x{bonus_multiplier:.2})",
            item.name
        );
        Some(item)
    }

    /// Rarity = clamp(1, 100, 10·log10(base_cost) + uniform(0, 20)).
    /// Log-scaled so an order of magnitude in cost moves the rarity
    /// band meaningfully; the jitter keeps a cost tier varied.
    fn roll_rarity(&mut self, base_cost: f64) -> f64 {
        let jitter = self.rng.next_f64_below(20.0);
        (10.0 * base_cost.max(1.0).log10() + jitter).clamp(1.0, 100.0)
    }
}

/// Drop chance as a step function of base cost: six bands from 10%
/// for cheap chain upgrades up to 50% for the most expensive.
pub fn drop_chance(base_cost: f64) -> f64 {
    if base_cost < 1_000.0 {
        0.10
    } else if base_cost < 10_000.0 {
        0.18
    } else if base_cost < 100_000.0 {
        0.25
    } else if base_cost < 1_000_000.0 {
        0.32
    } else if base_cost < 10_000_000.0 {
        0.40
    } else {
        0.50
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_breakpoints() {
        assert_eq!(ItemTier::from_rarity(96.0), ItemTier::Transcendent);
        assert_eq!(ItemTier::from_rarity(95.0), ItemTier::Transcendent);
        assert_eq!(ItemTier::from_rarity(94.9), ItemTier::Mythic);
        assert_eq!(ItemTier::from_rarity(50.0), ItemTier::Epic);
        assert_eq!(ItemTier::from_rarity(49.0), ItemTier::Uncommon);
        assert_eq!(ItemTier::from_rarity(29.9), ItemTier::Common);
        assert_eq!(ItemTier::from_rarity(1.0), ItemTier::Common);
    }

    #[test]
    fn drop_chance_bands_are_monotonic() {
        let costs = [500.0, 5_000.0, 50_000.0, 500_000.0, 5_000_000.0, 50_000_000.0];
        let chances: Vec<f64> = costs.iter().map(|&c| drop_chance(c)).collect();
        assert_eq!(chances[0], 0.10);
        assert_eq!(chances[5], 0.50);
        assert!(chances.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn flavor_is_reproducible_per_tier() {
        assert_eq!(ItemTier::Mythic.adjective(), "Mythic");
        assert_eq!(
            ItemTier::Common.flavor_text(),
            ItemTier::from_rarity(10.0).flavor_text()
        );
    }
}
