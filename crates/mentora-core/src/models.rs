//! Domain models for Mentora.
//!
//! These are the core types shared across all crates.

pub mod availability;
pub mod match_suggestion;
pub mod mentorship;
pub mod user;
