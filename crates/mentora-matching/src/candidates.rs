//! Candidate generation for mentors and mentees.
//!
//! Generation expires stale suggestions, scores every eligible
//! counterpart, ranks them and persists the top `limit`: pairs that
//! already hold a `suggested` record are rescored in place, new pairs
//! get a fresh record. A mentor at full capacity only gets a read-only
//! preview.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use mentora_core::error::{MentoraError, MentoraResult};
use mentora_core::models::match_suggestion::{
    CreateMatchSuggestion, MatchStatus, MatchSuggestion, RescoreMatchSuggestion,
};
use mentora_core::models::mentorship::{Mentorship, MentorshipStatus};
use mentora_core::models::user::{User, UserRole};
use mentora_core::repository::{MatchSuggestionRepository, MentorshipRepository, UserRepository};
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::MatchError;
use crate::scoring::{self, MatchScore, PairHistory};
use crate::service::MatchService;

/// One ranked candidate pair.
#[derive(Debug, Clone, Serialize)]
pub struct RankedSuggestion {
    pub mentor_id: Uuid,
    pub mentee_id: Uuid,
    pub score: MatchScore,
    /// The stored record. `None` for read-only previews.
    pub suggestion: Option<MatchSuggestion>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct MentorSuggestions {
    pub mentor_id: Uuid,
    pub suggestions: Vec<RankedSuggestion>,
    pub capacity: u32,
    pub active_mentees: u32,
    pub capacity_reached: bool,
    pub created: usize,
    pub updated: usize,
    pub expired: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct MenteeSuggestions {
    pub mentee_id: Uuid,
    pub suggestions: Vec<RankedSuggestion>,
    /// Mentor-accepted suggestions waiting for this mentee.
    pub awaiting_mentee: usize,
    /// Suggestions waiting for a mentor's response.
    pub awaiting_mentor: usize,
    pub created: usize,
    pub updated: usize,
    pub expired: usize,
}

/// Which end of the pair generation runs for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Mentor,
    Mentee,
}

impl Side {
    fn counterpart(self, mentor_id: Uuid, mentee_id: Uuid) -> Uuid {
        match self {
            Side::Mentor => mentee_id,
            Side::Mentee => mentor_id,
        }
    }
}

/// What the anchor user's records say about one counterpart.
#[derive(Debug, Default)]
struct PairState {
    history: PairHistory,
    open: Option<MatchSuggestion>,
    blocked: bool,
    mentored: bool,
}

impl PairState {
    fn excluded(&self) -> bool {
        self.mentored
            || self.blocked
            || self
                .open
                .as_ref()
                .is_some_and(|s| s.status != MatchStatus::Suggested)
    }
}

fn pair_states(
    side: Side,
    suggestions: Vec<MatchSuggestion>,
    mentorships: &[Mentorship],
    cooldown_start: DateTime<Utc>,
) -> HashMap<Uuid, PairState> {
    let mut states: HashMap<Uuid, PairState> = HashMap::new();

    for s in suggestions {
        let state = states
            .entry(side.counterpart(s.mentor_id, s.mentee_id))
            .or_default();
        match s.status {
            MatchStatus::MentorDeclined => state.history.mentor_declines += 1,
            MatchStatus::MenteeDeclined => state.history.mentee_declines += 1,
            MatchStatus::Rejected => state.history.rejections += 1,
            MatchStatus::Expired => state.history.expirations += 1,
            _ => {}
        }
        if s.status.is_refusal() && s.updated_at > cooldown_start {
            state.blocked = true;
        }
        if s.is_active() {
            state.open = Some(s);
        }
    }

    for m in mentorships {
        let state = states
            .entry(side.counterpart(m.mentor_id, m.mentee_id))
            .or_default();
        match m.status {
            MentorshipStatus::Active => state.mentored = true,
            MentorshipStatus::Completed => state.history.past_mentorships += 1,
            MentorshipStatus::Cancelled => {}
        }
    }

    states
}

struct Candidate {
    counterpart: User,
    score: MatchScore,
    open: Option<MatchSuggestion>,
}

struct Generated {
    suggestions: Vec<RankedSuggestion>,
    created: usize,
    updated: usize,
    awaiting_mentee: usize,
    awaiting_mentor: usize,
}

impl<U, S, M> MatchService<U, S, M>
where
    U: UserRepository,
    S: MatchSuggestionRepository,
    M: MentorshipRepository,
{
    /// Generate and persist ranked suggestions for a mentor.
    pub async fn generate_for_mentor(
        &self,
        mentor_id: Uuid,
        limit: Option<usize>,
    ) -> MentoraResult<MentorSuggestions> {
        let now = Utc::now();
        let mentor = self.load_with_role(mentor_id, UserRole::Mentor).await?;
        let expired = self.suggestion_repo.expire_stale(now).await?.len();

        let mut result = self
            .build_for_mentor(&mentor, self.config.resolve_limit(limit), now)
            .await?;
        result.expired = expired;
        Ok(result)
    }

    /// Generate and persist ranked suggestions for a mentee.
    pub async fn generate_for_mentee(
        &self,
        mentee_id: Uuid,
        limit: Option<usize>,
    ) -> MentoraResult<MenteeSuggestions> {
        let now = Utc::now();
        let mentee = self.load_with_role(mentee_id, UserRole::Mentee).await?;
        let expired = self.suggestion_repo.expire_stale(now).await?.len();

        if !mentee.is_approved_mentee() {
            return Err(MatchError::NotApproved { user_id: mentee_id }.into());
        }

        let pool: Vec<User> = self
            .approved_users(UserRole::Mentor)
            .await?
            .into_iter()
            .filter(User::has_capacity)
            .collect();

        let generated = self
            .rank_and_persist(
                Side::Mentee,
                &mentee,
                pool,
                self.config.resolve_limit(limit),
                true,
                now,
            )
            .await?;

        info!(
            mentee_id = %mentee.id,
            suggestions = generated.suggestions.len(),
            created = generated.created,
            updated = generated.updated,
            expired,
            "Generated mentee suggestions"
        );

        Ok(MenteeSuggestions {
            mentee_id: mentee.id,
            suggestions: generated.suggestions,
            awaiting_mentee: generated.awaiting_mentee,
            awaiting_mentor: generated.awaiting_mentor,
            created: generated.created,
            updated: generated.updated,
            expired,
        })
    }

    /// Read path for a mentor's dashboard. Storage failures degrade to
    /// an empty list.
    pub async fn mentor_view(
        &self,
        mentor_id: Uuid,
        limit: Option<usize>,
    ) -> MentoraResult<MentorSuggestions> {
        match self.generate_for_mentor(mentor_id, limit).await {
            Err(e) if e.is_storage() => {
                warn!(%mentor_id, error = %e, "Serving empty mentor suggestions after storage error");
                Ok(MentorSuggestions {
                    mentor_id,
                    ..Default::default()
                })
            }
            other => other,
        }
    }

    /// Read path for a mentee's dashboard. Storage failures degrade to
    /// an empty list.
    pub async fn mentee_view(
        &self,
        mentee_id: Uuid,
        limit: Option<usize>,
    ) -> MentoraResult<MenteeSuggestions> {
        match self.generate_for_mentee(mentee_id, limit).await {
            Err(e) if e.is_storage() => {
                warn!(%mentee_id, error = %e, "Serving empty mentee suggestions after storage error");
                Ok(MenteeSuggestions {
                    mentee_id,
                    ..Default::default()
                })
            }
            other => other,
        }
    }

    /// Generation for an already loaded mentor, without the expiry
    /// sweep. Shared with the backfill runner.
    pub(crate) async fn build_for_mentor(
        &self,
        mentor: &User,
        limit: usize,
        now: DateTime<Utc>,
    ) -> MentoraResult<MentorSuggestions> {
        if !mentor.is_approved_mentor() {
            return Err(MatchError::NotApproved { user_id: mentor.id }.into());
        }

        let capacity_reached = !mentor.has_capacity();
        let pool = self.approved_users(UserRole::Mentee).await?;

        let generated = self
            .rank_and_persist(Side::Mentor, mentor, pool, limit, !capacity_reached, now)
            .await?;

        info!(
            mentor_id = %mentor.id,
            suggestions = generated.suggestions.len(),
            created = generated.created,
            updated = generated.updated,
            capacity_reached,
            "Generated mentor suggestions"
        );

        Ok(MentorSuggestions {
            mentor_id: mentor.id,
            suggestions: generated.suggestions,
            capacity: mentor.capacity,
            active_mentees: mentor.active_mentee_count,
            capacity_reached,
            created: generated.created,
            updated: generated.updated,
            expired: 0,
        })
    }

    async fn rank_and_persist(
        &self,
        side: Side,
        anchor: &User,
        pool: Vec<User>,
        limit: usize,
        persist: bool,
        now: DateTime<Utc>,
    ) -> MentoraResult<Generated> {
        let (suggestions, mentorships) = match side {
            Side::Mentor => (
                self.suggestion_repo.list_by_mentor(anchor.id).await?,
                self.mentorship_repo.list_by_mentor(anchor.id).await?,
            ),
            Side::Mentee => (
                self.suggestion_repo.list_by_mentee(anchor.id).await?,
                self.mentorship_repo.list_by_mentee(anchor.id).await?,
            ),
        };

        let awaiting_mentee = suggestions
            .iter()
            .filter(|s| s.status == MatchStatus::MentorAccepted)
            .count();
        let mut awaiting_mentor = suggestions
            .iter()
            .filter(|s| s.status == MatchStatus::Suggested)
            .count();

        let cooldown_start = now - self.config.decline_cooldown();
        let mut states = pair_states(side, suggestions, &mentorships, cooldown_start);

        let mut candidates: Vec<Candidate> = pool
            .into_iter()
            .filter(|user| user.id != anchor.id)
            .filter_map(|counterpart| {
                let state = states.remove(&counterpart.id).unwrap_or_default();
                if state.excluded() {
                    return None;
                }
                let (mentor, mentee) = match side {
                    Side::Mentor => (anchor, &counterpart),
                    Side::Mentee => (&counterpart, anchor),
                };
                let score = scoring::score(mentor, mentee, &state.history, &self.config, now);
                Some(Candidate {
                    counterpart,
                    score,
                    open: state.open,
                })
            })
            .collect();

        candidates.sort_by(|a, b| {
            scoring::rank_order(
                (a.score.total, a.counterpart.created_at, a.counterpart.id),
                (b.score.total, b.counterpart.created_at, b.counterpart.id),
            )
        });
        candidates.truncate(limit);

        let mut ranked = Vec::with_capacity(candidates.len());
        let mut created = 0;
        let mut updated = 0;

        for candidate in candidates {
            let (mentor_id, mentee_id) = match side {
                Side::Mentor => (anchor.id, candidate.counterpart.id),
                Side::Mentee => (candidate.counterpart.id, anchor.id),
            };

            let suggestion = if !persist {
                candidate.open
            } else if let Some(open) = candidate.open {
                let rescored = self
                    .suggestion_repo
                    .rescore(
                        open.id,
                        RescoreMatchSuggestion {
                            score: candidate.score.total,
                            breakdown: candidate.score.breakdown,
                            matched_expertise: candidate.score.matched_expertise.clone(),
                        },
                    )
                    .await?;
                debug!(
                    suggestion_id = %rescored.id,
                    old_score = open.score,
                    new_score = rescored.score,
                    "Rescored suggestion"
                );
                updated += 1;
                Some(rescored)
            } else {
                match self
                    .suggestion_repo
                    .create(CreateMatchSuggestion {
                        mentor_id,
                        mentee_id,
                        score: candidate.score.total,
                        breakdown: candidate.score.breakdown,
                        matched_expertise: candidate.score.matched_expertise.clone(),
                        expires_at: Some(now + self.config.suggestion_ttl()),
                        notes: None,
                        metadata: None,
                    })
                    .await
                {
                    Ok(s) => {
                        created += 1;
                        awaiting_mentor += 1;
                        Some(s)
                    }
                    Err(MentoraError::AlreadyExists { .. }) => {
                        // Another request claimed the pair first.
                        debug!(%mentor_id, %mentee_id, "Skipping pair with a concurrent suggestion");
                        continue;
                    }
                    Err(e) => return Err(e),
                }
            };

            ranked.push(RankedSuggestion {
                mentor_id,
                mentee_id,
                score: candidate.score,
                suggestion,
            });
        }

        Ok(Generated {
            suggestions: ranked,
            created,
            updated,
            awaiting_mentee,
            awaiting_mentor,
        })
    }
}
