//! Mentora matching engine: pair scoring, candidate generation, the
//! suggestion lifecycle and batch backfill.

pub mod backfill;
pub mod candidates;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod scoring;
pub mod service;

pub use backfill::{BackfillOptions, BackfillSummary, MentorFailure};
pub use candidates::{MenteeSuggestions, MentorSuggestions, RankedSuggestion};
pub use config::{MatchingConfig, ScoringWeights};
pub use error::MatchError;
pub use lifecycle::TransitionOutcome;
pub use scoring::{MatchScore, PairHistory};
pub use service::MatchService;
