//! Suggestion lifecycle: mentor and mentee responses, admin rejection,
//! expiry and the end of a mentorship.
//!
//! Every status change is a compare-and-swap against the state read
//! just before it. A suggestion past its deadline is marked `expired`
//! the first time anyone touches it, and the action fails.

use chrono::{DateTime, Utc};
use mentora_core::error::{MentoraError, MentoraResult};
use mentora_core::models::match_suggestion::{
    MatchAction, MatchStatus, MatchSuggestion, TransitionChanges,
};
use mentora_core::models::mentorship::{Mentorship, MentorshipStatus};
use mentora_core::repository::{MatchSuggestionRepository, MentorshipRepository, UserRepository};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::error::MatchError;
use crate::service::MatchService;

/// Result of a lifecycle action.
#[derive(Debug, Clone, Serialize)]
pub struct TransitionOutcome {
    pub suggestion: MatchSuggestion,
    /// Set when the action connected the pair.
    pub mentorship: Option<Mentorship>,
}

impl<U, S, M> MatchService<U, S, M>
where
    U: UserRepository,
    S: MatchSuggestionRepository,
    M: MentorshipRepository,
{
    /// Mentor accepts a `suggested` match. The mentor's capacity is
    /// re-read here and the expiry deadline restarts.
    pub async fn mentor_accept(&self, id: Uuid) -> MentoraResult<TransitionOutcome> {
        let now = Utc::now();
        let action = MatchAction::MentorAccept;
        let (current, to) = self.load_for_action(id, action, now).await?;

        let mentor = self.user_repo.get_by_id(current.mentor_id).await?;
        if !mentor.has_capacity() {
            return Err(MentoraError::CapacityExceeded {
                mentor_id: mentor.id.to_string(),
                capacity: mentor.capacity,
            });
        }

        let changes = TransitionChanges {
            expires_at: Some(Some(now + self.config.suggestion_ttl())),
            mentor_responded_at: Some(now),
            ..Default::default()
        };
        self.apply(current, to, action, changes).await
    }

    pub async fn mentor_decline(
        &self,
        id: Uuid,
        reason: Option<String>,
    ) -> MentoraResult<TransitionOutcome> {
        let now = Utc::now();
        let action = MatchAction::MentorDecline;
        let (current, to) = self.load_for_action(id, action, now).await?;

        let changes = TransitionChanges {
            decline_reason: reason,
            mentor_responded_at: Some(now),
            ..Default::default()
        };
        self.apply(current, to, action, changes).await
    }

    /// Mentee accepts a `mentor_accepted` match. Status change, capacity
    /// claim and mentorship creation happen in one storage transaction.
    pub async fn mentee_accept(&self, id: Uuid) -> MentoraResult<TransitionOutcome> {
        let now = Utc::now();
        let (current, to) = self
            .load_for_action(id, MatchAction::MenteeAccept, now)
            .await?;

        let (suggestion, mentorship) = self.suggestion_repo.connect(current.id).await?;

        info!(
            suggestion_id = %suggestion.id,
            from = current.status.as_str(),
            to = to.as_str(),
            mentorship_id = %mentorship.id,
            mentor_id = %suggestion.mentor_id,
            mentee_id = %suggestion.mentee_id,
            "Mentorship connected"
        );

        Ok(TransitionOutcome {
            suggestion,
            mentorship: Some(mentorship),
        })
    }

    pub async fn mentee_decline(
        &self,
        id: Uuid,
        reason: Option<String>,
    ) -> MentoraResult<TransitionOutcome> {
        let now = Utc::now();
        let action = MatchAction::MenteeDecline;
        let (current, to) = self.load_for_action(id, action, now).await?;

        let changes = TransitionChanges {
            decline_reason: reason,
            mentee_responded_at: Some(now),
            ..Default::default()
        };
        self.apply(current, to, action, changes).await
    }

    /// Admin rejection of a `suggested` or `mentor_accepted` match.
    pub async fn reject(
        &self,
        id: Uuid,
        reason: Option<String>,
    ) -> MentoraResult<TransitionOutcome> {
        let now = Utc::now();
        let action = MatchAction::Reject;
        let (current, to) = self.load_for_action(id, action, now).await?;

        let changes = TransitionChanges {
            decline_reason: reason,
            ..Default::default()
        };
        self.apply(current, to, action, changes).await
    }

    /// Complete or cancel an active mentorship, releasing one unit of
    /// the mentor's capacity.
    pub async fn end_mentorship(
        &self,
        id: Uuid,
        status: MentorshipStatus,
    ) -> MentoraResult<Mentorship> {
        let mentorship = self.mentorship_repo.end(id, status).await?;
        info!(
            mentorship_id = %mentorship.id,
            mentor_id = %mentorship.mentor_id,
            status = mentorship.status.as_str(),
            "Mentorship ended"
        );
        Ok(mentorship)
    }

    /// Expire every active suggestion past its deadline.
    pub async fn expire_stale(&self, now: DateTime<Utc>) -> MentoraResult<Vec<MatchSuggestion>> {
        let expired = self.suggestion_repo.expire_stale(now).await?;
        if !expired.is_empty() {
            info!(count = expired.len(), "Expired stale suggestions");
        }
        Ok(expired)
    }

    /// Load a suggestion for `action`, expiring it first when its
    /// deadline has passed. Returns the record and the target state.
    async fn load_for_action(
        &self,
        id: Uuid,
        action: MatchAction,
        now: DateTime<Utc>,
    ) -> MentoraResult<(MatchSuggestion, MatchStatus)> {
        let current = self.suggestion_repo.get_by_id(id).await?;

        if current.is_stale(now) {
            if let Some(expired_to) = MatchAction::Expire.apply(current.status) {
                let expired = self
                    .suggestion_repo
                    .transition(id, current.status, expired_to, TransitionChanges::default())
                    .await?;
                if expired.is_some() {
                    info!(suggestion_id = %id, %action, "Expired suggestion on access");
                }
            }
            return Err(MatchError::Expired {
                suggestion_id: id,
                action,
            }
            .into());
        }

        let to = action.apply(current.status).ok_or(MatchError::IllegalTransition {
            from: current.status,
            action,
        })?;
        Ok((current, to))
    }

    async fn apply(
        &self,
        current: MatchSuggestion,
        to: MatchStatus,
        action: MatchAction,
        changes: TransitionChanges,
    ) -> MentoraResult<TransitionOutcome> {
        let Some(suggestion) = self
            .suggestion_repo
            .transition(current.id, current.status, to, changes)
            .await?
        else {
            return Err(self.lost_race(current.id, action.as_str()).await);
        };

        info!(
            suggestion_id = %suggestion.id,
            mentor_id = %suggestion.mentor_id,
            mentee_id = %suggestion.mentee_id,
            from = current.status.as_str(),
            to = suggestion.status.as_str(),
            "Suggestion transitioned"
        );

        Ok(TransitionOutcome {
            suggestion,
            mentorship: None,
        })
    }
}
