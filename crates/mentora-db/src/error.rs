//! Database-specific error types and conversions.

use mentora_core::error::MentoraError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Corrupt record: {0}")]
    Decode(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },
}

impl From<DbError> for MentoraError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => MentoraError::NotFound { entity, id },
            other => MentoraError::Database(other.to_string()),
        }
    }
}
