//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Lifecycle writes are
//! compare-and-swap operations: they name the state they expect and
//! leave the record untouched when it has moved on.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::MentoraResult;
use crate::models::{
    match_suggestion::{
        CreateMatchSuggestion, MatchStatus, MatchSuggestion, RescoreMatchSuggestion,
        TransitionChanges,
    },
    mentorship::{Mentorship, MentorshipStatus},
    user::{CreateUser, UpdateUser, User, UserRole, UserStatus},
};

/// Pagination parameters for list queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

impl<T> PaginatedResult<T> {
    pub fn has_more(&self) -> bool {
        self.offset + (self.items.len() as u64) < self.total
    }
}

/// Filter for user listings. `None` matches any value.
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub role: Option<UserRole>,
    pub status: Option<UserStatus>,
}

impl UserFilter {
    pub fn approved(role: UserRole) -> Self {
        Self {
            role: Some(role),
            status: Some(UserStatus::Approved),
        }
    }
}

// ---------------------------------------------------------------------------
// User directory
// ---------------------------------------------------------------------------

pub trait UserRepository: Send + Sync {
    fn create(&self, input: CreateUser) -> impl Future<Output = MentoraResult<User>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = MentoraResult<User>> + Send;
    /// Setting `status` to `Approved` also stamps `approved_at`.
    fn update(
        &self,
        id: Uuid,
        input: UpdateUser,
    ) -> impl Future<Output = MentoraResult<User>> + Send;
    /// Soft-delete: sets status to Inactive.
    fn delete(&self, id: Uuid) -> impl Future<Output = MentoraResult<()>> + Send;
    /// Users ordered by creation time (oldest first).
    fn list(
        &self,
        filter: UserFilter,
        pagination: Pagination,
    ) -> impl Future<Output = MentoraResult<PaginatedResult<User>>> + Send;
}

// ---------------------------------------------------------------------------
// Match suggestions
// ---------------------------------------------------------------------------

pub trait MatchSuggestionRepository: Send + Sync {
    /// Create a `suggested` record. Fails with `AlreadyExists` when the
    /// pair already has an active suggestion.
    fn create(
        &self,
        input: CreateMatchSuggestion,
    ) -> impl Future<Output = MentoraResult<MatchSuggestion>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = MentoraResult<MatchSuggestion>> + Send;
    /// Every suggestion (any state) involving the mentor, oldest first.
    fn list_by_mentor(
        &self,
        mentor_id: Uuid,
    ) -> impl Future<Output = MentoraResult<Vec<MatchSuggestion>>> + Send;
    /// Every suggestion (any state) involving the mentee, oldest first.
    fn list_by_mentee(
        &self,
        mentee_id: Uuid,
    ) -> impl Future<Output = MentoraResult<Vec<MatchSuggestion>>> + Send;
    /// Replace score, breakdown and matched terms of an active
    /// suggestion. Fails with `InvalidState` if it is terminal.
    fn rescore(
        &self,
        id: Uuid,
        input: RescoreMatchSuggestion,
    ) -> impl Future<Output = MentoraResult<MatchSuggestion>> + Send;
    /// Move a suggestion from `from` to `to`. Returns `None` when the
    /// stored status is no longer `from`.
    fn transition(
        &self,
        id: Uuid,
        from: MatchStatus,
        to: MatchStatus,
        changes: TransitionChanges,
    ) -> impl Future<Output = MentoraResult<Option<MatchSuggestion>>> + Send;
    /// Atomically move a `mentor_accepted` suggestion to `connected`,
    /// take one unit of the mentor's capacity, and create the
    /// mentorship. Nothing is written if any step fails.
    fn connect(
        &self,
        id: Uuid,
    ) -> impl Future<Output = MentoraResult<(MatchSuggestion, Mentorship)>> + Send;
    /// Expire every active suggestion whose deadline is at or before
    /// `now`. Returns the expired records.
    fn expire_stale(
        &self,
        now: DateTime<Utc>,
    ) -> impl Future<Output = MentoraResult<Vec<MatchSuggestion>>> + Send;
}

// ---------------------------------------------------------------------------
// Mentorships
// ---------------------------------------------------------------------------

pub trait MentorshipRepository: Send + Sync {
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = MentoraResult<Mentorship>> + Send;
    fn list_by_mentor(
        &self,
        mentor_id: Uuid,
    ) -> impl Future<Output = MentoraResult<Vec<Mentorship>>> + Send;
    fn list_by_mentee(
        &self,
        mentee_id: Uuid,
    ) -> impl Future<Output = MentoraResult<Vec<Mentorship>>> + Send;
    /// End an active mentorship and release one unit of the mentor's
    /// capacity in the same transaction.
    fn end(
        &self,
        id: Uuid,
        status: MentorshipStatus,
    ) -> impl Future<Output = MentoraResult<Mentorship>> + Send;
}
