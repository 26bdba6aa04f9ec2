//! Error types for the Mentora matching engine.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MentoraError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Entity already exists: {entity}")]
    AlreadyExists { entity: String },

    #[error("Invalid state: cannot {action} from state {from}")]
    InvalidState { from: String, action: String },

    #[error("Capacity exceeded: mentor {mentor_id} already has {capacity} active mentees")]
    CapacityExceeded { mentor_id: String, capacity: u32 },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl MentoraError {
    /// Machine-readable error code surfaced to API clients.
    pub fn code(&self) -> &'static str {
        match self {
            MentoraError::NotFound { .. } => "not_found",
            MentoraError::AlreadyExists { .. } => "already_exists",
            MentoraError::InvalidState { .. } => "invalid_state",
            MentoraError::CapacityExceeded { .. } => "capacity_exceeded",
            MentoraError::Validation { .. } => "validation_error",
            MentoraError::Database(_) => "storage_error",
            MentoraError::Internal(_) => "internal_error",
        }
    }

    /// Whether the failure comes from the storage layer rather than
    /// from the request itself.
    pub fn is_storage(&self) -> bool {
        matches!(self, MentoraError::Database(_) | MentoraError::Internal(_))
    }
}

pub type MentoraResult<T> = Result<T, MentoraError>;
