//! Matching engine error types.

use mentora_core::error::MentoraError;
use mentora_core::models::match_suggestion::{MatchAction, MatchStatus};
use mentora_core::models::user::UserRole;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum MatchError {
    #[error("user {user_id} is not a {expected}")]
    WrongRole { user_id: Uuid, expected: UserRole },

    #[error("user {user_id} is not approved")]
    NotApproved { user_id: Uuid },

    #[error("cannot {action} a suggestion in state {from}")]
    IllegalTransition { from: MatchStatus, action: MatchAction },

    #[error("suggestion {suggestion_id} has expired")]
    Expired {
        suggestion_id: Uuid,
        action: MatchAction,
    },

    #[error("invalid matching configuration: {0}")]
    InvalidConfig(String),
}

impl From<MatchError> for MentoraError {
    fn from(err: MatchError) -> Self {
        match err {
            MatchError::WrongRole { .. }
            | MatchError::NotApproved { .. }
            | MatchError::InvalidConfig(_) => MentoraError::Validation {
                message: err.to_string(),
            },
            MatchError::IllegalTransition { from, action } => MentoraError::InvalidState {
                from: from.to_string(),
                action: action.to_string(),
            },
            MatchError::Expired { action, .. } => MentoraError::InvalidState {
                from: MatchStatus::Expired.to_string(),
                action: action.to_string(),
            },
        }
    }
}
