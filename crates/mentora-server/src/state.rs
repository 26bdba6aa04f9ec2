//! Shared application state.

use std::sync::Arc;

use mentora_core::error::MentoraResult;
use mentora_db::repository::{
    SurrealMatchSuggestionRepository, SurrealMentorshipRepository, SurrealUserRepository,
};
use mentora_matching::{MatchService, MatchingConfig};
use surrealdb::{Connection, Surreal};

pub type SurrealMatchService<C> = MatchService<
    SurrealUserRepository<C>,
    SurrealMatchSuggestionRepository<C>,
    SurrealMentorshipRepository<C>,
>;

pub struct AppState<C: Connection> {
    pub service: Arc<SurrealMatchService<C>>,
}

impl<C: Connection> Clone for AppState<C> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
        }
    }
}

impl<C: Connection> AppState<C> {
    /// Wire the SurrealDB repositories into a matching service.
    pub fn new(db: Surreal<C>, config: MatchingConfig) -> MentoraResult<Self> {
        let suggestions = SurrealMatchSuggestionRepository::with_connect_retries(
            db.clone(),
            config.connect_retries,
        );
        let service = MatchService::new(
            SurrealUserRepository::new(db.clone()),
            suggestions,
            SurrealMentorshipRepository::new(db),
            config,
        )?;
        Ok(Self {
            service: Arc::new(service),
        })
    }
}
