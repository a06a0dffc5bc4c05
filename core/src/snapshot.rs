//! Snapshot types and the consumed persistence contract.
//!
//! The core guarantees in-memory consistency and hands out complete,
//! self-contained snapshots; where they are stored is the host's
//! problem. Derived fields (current cost, income per unit, passive
//! rate) are deliberately absent — they are recomputed from the
//! catalog on restore, never trusted from storage.

use crate::{
    achievements::AchievementBook,
    error::EconomyResult,
    ledger::PlayerEconomy,
    types::{PlayerId, Serial, UpgradeId},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HoldingSnapshot {
    pub upgrade_id: UpgradeId,
    pub count: u32,
}

/// Complete persistable state for one player.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerSnapshot {
    pub player_id: PlayerId,
    pub economy: PlayerEconomy,
    pub holdings: Vec<HoldingSnapshot>,
    pub achievements: AchievementBook,
}

/// Engine-level state that is not per-player: the item serial
/// counter must survive restarts so serials stay globally unique.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineSnapshot {
    pub next_serial: Serial,
}

/// The persistence contract the core consumes. Implemented by the
/// host (database, save file, cloud sync) — never by this crate.
pub trait SnapshotStore {
    fn save_player(&mut self, snapshot: &PlayerSnapshot) -> EconomyResult<()>;
    fn load_player(&self, player_id: &str) -> EconomyResult<Option<PlayerSnapshot>>;
    fn save_engine(&mut self, snapshot: &EngineSnapshot) -> EconomyResult<()>;
    fn load_engine(&self) -> EconomyResult<Option<EngineSnapshot>>;
}
