use thiserror::Error;

/// Failures raised by the storage collaborator
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StorageError {
    #[error("Record not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Field-level validation failures on domain records
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        min: u8,
        max: u8,
        value: u8,
    },
}

/// Errors surfaced by the goal lifecycle manager
#[derive(Error, Debug)]
pub enum GoalError {
    #[error("Invalid goal: {0}")]
    InvalidGoal(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl GoalError {
    pub fn invalid(message: impl Into<String>) -> Self {
        GoalError::InvalidGoal(message.into())
    }
}
