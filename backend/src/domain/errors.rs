//! Error taxonomy shared by every core operation.
use thiserror::Error;

use crate::storage::RetryableError;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Identity check failed")]
    IdentityMismatch,

    #[error("Attendance already recorded today")]
    AlreadyMarked,

    #[error("Insufficient points: {available} available, {cost} required")]
    InsufficientBalance { available: i64, cost: i64 },

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Storage failure: {0}")]
    StorageFailure(#[from] anyhow::Error),
}

impl CoreError {
    pub fn code(&self) -> &'static str {
        match self {
            CoreError::IdentityMismatch => "IDENTITY_MISMATCH",
            CoreError::AlreadyMarked => "ALREADY_MARKED",
            CoreError::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            CoreError::Unauthorized => "UNAUTHORIZED",
            CoreError::NotFound(_) => "NOT_FOUND",
            CoreError::InvalidInput(_) => "INVALID_INPUT",
            CoreError::InvalidState(_) => "INVALID_STATE",
            CoreError::StorageFailure(_) => "STORAGE_FAILURE",
        }
    }
}

impl From<sqlx::Error> for CoreError {
    fn from(err: sqlx::Error) -> Self {
        CoreError::StorageFailure(err.into())
    }
}

impl RetryableError for CoreError {
    fn is_transient(&self) -> bool {
        match self {
            CoreError::StorageFailure(err) => err.is_transient(),
            _ => false,
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
