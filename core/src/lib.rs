//! idle-core — the authoritative economy for an incremental
//! ("idle-clicker") game.
//!
//! Four tightly coupled subsystems guarantee a fair, consistent, and
//! cheat-resistant economy:
//!
//!   1. [`ledger`] — currency/upgrade state machine with purchase
//!      validation and exponential cost/income scaling.
//!   2. [`scheduler`] — fixed-timestep conversion of the passive rate
//!      into discrete, deterministic credits.
//!   3. [`automation`] (over [`behavior`]) — detection and throttling
//!      of superhuman or mechanically regular input.
//!   4. [`items`] — probabilistic unique-item generation on high-tier
//!      purchases, with a global monotonic serial sequence.
//!
//! [`engine::GameEngine`] wires them together behind the interface a
//! host session layer calls. Persistence, rendering, and transport
//! are external: the core consumes a catalog, a rule list, and a
//! [`snapshot::SnapshotStore`] contract, and is driven entirely by
//! caller-supplied time — making every behaviour reproducible in
//! tests.

pub mod achievements;
pub mod automation;
pub mod behavior;
pub mod catalog;
pub mod engine;
pub mod error;
pub mod event;
pub mod format;
pub mod items;
pub mod ledger;
pub mod rng;
pub mod scheduler;
pub mod snapshot;
pub mod types;

pub use automation::ActionDecision;
pub use engine::GameEngine;
pub use error::{EconomyError, EconomyResult};
pub use ledger::PurchaseOutcome;
