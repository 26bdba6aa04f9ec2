//! Matching service: shared state for candidate generation, the
//! suggestion lifecycle and the backfill runner.

use mentora_core::error::{MentoraError, MentoraResult};
use mentora_core::models::user::{User, UserRole};
use mentora_core::repository::{
    MatchSuggestionRepository, MentorshipRepository, Pagination, UserFilter, UserRepository,
};
use uuid::Uuid;

use crate::config::MatchingConfig;
use crate::error::MatchError;

/// Matching service.
///
/// Generic over repository implementations so that the engine has no
/// dependency on the database crate.
pub struct MatchService<U, S, M>
where
    U: UserRepository,
    S: MatchSuggestionRepository,
    M: MentorshipRepository,
{
    pub(crate) user_repo: U,
    pub(crate) suggestion_repo: S,
    pub(crate) mentorship_repo: M,
    pub(crate) config: MatchingConfig,
}

impl<U, S, M> MatchService<U, S, M>
where
    U: UserRepository,
    S: MatchSuggestionRepository,
    M: MentorshipRepository,
{
    /// Build a service. Fails with `ValidationError` on an invalid
    /// configuration.
    pub fn new(
        user_repo: U,
        suggestion_repo: S,
        mentorship_repo: M,
        config: MatchingConfig,
    ) -> MentoraResult<Self> {
        config.validate()?;
        Ok(Self {
            user_repo,
            suggestion_repo,
            mentorship_repo,
            config,
        })
    }

    /// Load a user and check their role.
    pub(crate) async fn load_with_role(&self, id: Uuid, role: UserRole) -> MentoraResult<User> {
        let user = self.user_repo.get_by_id(id).await?;
        if user.role != role {
            return Err(MatchError::WrongRole {
                user_id: id,
                expected: role,
            }
            .into());
        }
        Ok(user)
    }

    /// Every approved user with the given role, oldest first.
    pub(crate) async fn approved_users(&self, role: UserRole) -> MentoraResult<Vec<User>> {
        let mut users = Vec::new();
        let mut offset = 0;
        loop {
            let page = self
                .user_repo
                .list(
                    UserFilter::approved(role),
                    Pagination {
                        offset,
                        limit: self.config.directory_page_size,
                    },
                )
                .await?;
            let more = page.has_more();
            let fetched = page.items.len() as u64;
            offset += fetched;
            users.extend(page.items);
            if !more || fetched == 0 {
                break;
            }
        }
        Ok(users)
    }

    /// Error for a compare-and-swap that found the record in another
    /// state than expected.
    pub(crate) async fn lost_race(&self, id: Uuid, action: &str) -> MentoraError {
        match self.suggestion_repo.get_by_id(id).await {
            Ok(current) => MentoraError::InvalidState {
                from: current.status.to_string(),
                action: action.to_string(),
            },
            Err(e) => e,
        }
    }
}
