use thiserror::Error;

#[derive(Error, Debug)]
pub enum EconomyError {
    #[error("Invalid amount: {amount} (must be finite and non-negative)")]
    InvalidAmount { amount: f64 },

    #[error("Unknown upgrade '{upgrade_id}'")]
    UnknownUpgrade { upgrade_id: String },

    #[error("Upgrade '{upgrade_id}' requires unknown prerequisite '{prerequisite}'")]
    UnknownPrerequisite {
        upgrade_id: String,
        prerequisite: String,
    },

    #[error("Cyclic requirement chain involving upgrade '{upgrade_id}'")]
    CyclicRequirements { upgrade_id: String },

    #[error("Invalid upgrade definition '{upgrade_id}': {reason}")]
    InvalidDefinition { upgrade_id: String, reason: String },

    #[error("Unknown player '{player_id}'")]
    UnknownPlayer { player_id: String },

    #[error("Snapshot references unknown upgrade '{upgrade_id}'")]
    SnapshotMismatch { upgrade_id: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type EconomyResult<T> = Result<T, EconomyError>;
