//! Error taxonomy for the settlement engine.
//!
//! Validation errors are recoverable and carry no side effects. Integrity
//! errors (`FairnessViolation`, `Persistence` mid-transaction) are fatal for
//! the settlement attempt: the transaction rolls back and the round stays
//! open. `AlreadySettled` is deliberately distinguishable so callers can
//! treat a retried settlement as "already done" rather than as a failure.

use crate::games::types::GameType;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Invalid selection for {game}: {reason}")]
    InvalidSelection { game: GameType, reason: String },

    #[error("Invalid stake {stake}: {reason}")]
    InvalidStake { stake: u64, reason: String },

    #[error("Round {0} not found")]
    RoundNotFound(Uuid),

    #[error("Round {0} already settled")]
    AlreadySettled(Uuid),

    #[error("Caller {caller} does not own the bet on round {round_id}")]
    Unauthorized { round_id: Uuid, caller: String },

    #[error("Compliance check failed: {reason}")]
    ComplianceBlocked { reason: String },

    #[error("Server seed for round {0} already revealed")]
    SeedAlreadyRevealed(Uuid),

    #[error("Fairness violation on round {round_id}: {detail}")]
    FairnessViolation { round_id: Uuid, detail: String },

    #[error("Persistence failure: {0}")]
    Persistence(String),
}

impl EngineError {
    /// True for the idempotent-retry signal: the round was settled before
    /// this call, nothing changed, and the caller can treat it as done.
    pub fn is_already_settled(&self) -> bool {
        matches!(self, EngineError::AlreadySettled(_))
    }

    /// True for caller-input errors that leave no partial state behind.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            EngineError::InvalidSelection { .. }
                | EngineError::InvalidStake { .. }
                | EngineError::Unauthorized { .. }
                | EngineError::ComplianceBlocked { .. }
        )
    }

    /// Message safe to show end users. Integrity failures stay generic;
    /// the full detail goes to operator logs only.
    pub fn user_message(&self) -> String {
        match self {
            EngineError::FairnessViolation { .. } | EngineError::Persistence(_) => {
                "settlement failed, please retry".to_string()
            }
            other => other.to_string(),
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
