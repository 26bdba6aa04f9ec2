//! Mentora Core: domain models, the match suggestion state machine,
//! and repository traits shared by the storage and matching crates.

pub mod error;
pub mod models;
pub mod repository;

pub use error::{MentoraError, MentoraResult};
