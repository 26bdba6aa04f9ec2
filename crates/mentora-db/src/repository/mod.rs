//! SurrealDB repository implementations.

mod match_suggestion;
mod mentorship;
mod user;

pub use match_suggestion::SurrealMatchSuggestionRepository;
pub use mentorship::SurrealMentorshipRepository;
pub use user::SurrealUserRepository;

use surrealdb_types::SurrealValue;

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
pub(crate) struct CountRow {
    pub(crate) total: u64,
}

/// Marker thrown inside a transaction when a compare-and-swap on a
/// lifecycle status finds the record in another state.
pub(crate) const THROW_INVALID_STATE: &str = "mentora:invalid_state";

/// Marker thrown inside the connect transaction when the mentor has no
/// free capacity.
pub(crate) const THROW_CAPACITY_EXCEEDED: &str = "mentora:capacity_exceeded";

/// Why a multi-statement transaction did not commit.
#[derive(Debug)]
pub(crate) enum TxFailure {
    /// One of our `THROW` markers fired; the transaction rolled back.
    Thrown(&'static str),
    /// The engine reported a read/write conflict; safe to retry.
    Conflict(String),
    Other(String),
}

/// Inspect the per-statement errors of a transaction response.
///
/// A failed transaction reports an error for every statement; the
/// `THROW` marker is in one of them, the rest say the transaction was
/// cancelled.
pub(crate) fn classify_tx_errors(
    errors: std::collections::HashMap<usize, surrealdb::Error>,
) -> Option<TxFailure> {
    if errors.is_empty() {
        return None;
    }
    let messages: Vec<String> = errors.values().map(|e| e.to_string()).collect();

    for marker in [THROW_INVALID_STATE, THROW_CAPACITY_EXCEEDED] {
        if messages.iter().any(|m| m.contains(marker)) {
            return Some(TxFailure::Thrown(marker));
        }
    }

    let joined = messages.join("; ");
    let lowered = joined.to_lowercase();
    if lowered.contains("conflict") || lowered.contains("can be retried") {
        Some(TxFailure::Conflict(joined))
    } else {
        Some(TxFailure::Other(joined))
    }
}
