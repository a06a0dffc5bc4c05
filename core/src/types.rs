//! Shared primitive types used across the entire economy core.

/// A stable, unique identifier for a player. Assigned by the host
/// application (session layer); the core never mints these.
pub type PlayerId = String;

/// The catalog identifier of an upgrade definition.
pub type UpgradeId = String;

/// A point in time, in milliseconds on the host's monotonic clock.
/// The core never reads a clock itself — every operation that needs
/// time takes a `Millis` argument, which keeps the whole core
/// deterministic and unit-testable.
pub type Millis = u64;

/// A globally unique item serial number.
pub type Serial = u64;
