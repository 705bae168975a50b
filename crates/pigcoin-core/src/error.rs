use std::io;

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Goal not found: {0}")]
    GoalNotFound(Uuid),
    #[error("Installment {number} not found in goal {goal_id}")]
    InstallmentNotFound { goal_id: Uuid, number: u32 },
    #[error("Transaction not found: {0}")]
    TransactionNotFound(Uuid),
    #[error("Goal {0} already reached its target")]
    GoalAlreadyReached(Uuid),
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Serialization error: {0}")]
    Serde(String),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::Serde(err.to_string())
    }
}
