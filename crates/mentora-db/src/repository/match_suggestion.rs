//! SurrealDB implementation of [`MatchSuggestionRepository`].
//!
//! The one-active-suggestion-per-pair invariant is backed by the unique
//! `active_pair_key` index: the key is `<mentor>:<mentee>` while the
//! suggestion is active and the suggestion's own id once it reaches a
//! terminal state.
//!
//! Status changes are conditional updates (`WHERE status = $from`), so
//! two concurrent transitions on the same record cannot both succeed.

use chrono::{DateTime, Utc};
use mentora_core::error::{MentoraError, MentoraResult};
use mentora_core::models::match_suggestion::{
    CreateMatchSuggestion, MatchAction, MatchStatus, MatchSuggestion, RescoreMatchSuggestion,
    ScoreBreakdown, TransitionChanges,
};
use mentora_core::models::mentorship::Mentorship;
use mentora_core::repository::{MatchSuggestionRepository, MentorshipRepository, UserRepository};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::{debug, warn};
use uuid::Uuid;

use super::mentorship::SurrealMentorshipRepository;
use super::user::SurrealUserRepository;
use super::{THROW_CAPACITY_EXCEEDED, TxFailure, classify_tx_errors};
use crate::error::DbError;

const DEFAULT_CONNECT_RETRIES: u32 = 3;

const ACTIVE_PAIR_INDEX: &str = "idx_suggestion_active_pair";

const CONNECT_TX: &str = "\
BEGIN TRANSACTION;
LET $moved = (UPDATE type::record('match_suggestion', $id) SET \
    status = $to, active_pair_key = $id, \
    mentee_responded_at = time::now(), updated_at = time::now() \
    WHERE status = $from);
IF array::len($moved) = 0 { THROW 'mentora:invalid_state' };
LET $claimed = (UPDATE type::record('user', $mentor_id) SET \
    active_mentee_count += 1, updated_at = time::now() \
    WHERE role = 'mentor' AND active_mentee_count < capacity);
IF array::len($claimed) = 0 { THROW 'mentora:capacity_exceeded' };
CREATE type::record('mentorship', $mentorship_id) SET \
    mentor_id = $mentor_id, mentee_id = $mentee_id, \
    suggestion_id = $id, status = 'active', \
    started_at = time::now(), ended_at = NONE;
COMMIT TRANSACTION;
";

#[derive(Debug, SurrealValue)]
struct SuggestionRow {
    mentor_id: String,
    mentee_id: String,
    score: f64,
    score_expertise: f64,
    score_availability: f64,
    score_interactions: f64,
    score_priority: f64,
    matched_expertise: Vec<String>,
    status: String,
    decline_reason: Option<String>,
    notes: Option<String>,
    metadata: serde_json::Value,
    expires_at: Option<DateTime<Utc>>,
    mentor_responded_at: Option<DateTime<Utc>>,
    mentee_responded_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct SuggestionRowWithId {
    record_id: String,
    mentor_id: String,
    mentee_id: String,
    score: f64,
    score_expertise: f64,
    score_availability: f64,
    score_interactions: f64,
    score_priority: f64,
    matched_expertise: Vec<String>,
    status: String,
    decline_reason: Option<String>,
    notes: Option<String>,
    metadata: serde_json::Value,
    expires_at: Option<DateTime<Utc>>,
    mentor_responded_at: Option<DateTime<Utc>>,
    mentee_responded_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn parse_uuid(s: &str, what: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(s).map_err(|e| DbError::Decode(format!("invalid {what} UUID: {e}")))
}

fn parse_status(s: &str) -> Result<MatchStatus, DbError> {
    MatchStatus::parse(s).ok_or_else(|| DbError::Decode(format!("unknown match status: {s}")))
}

fn pair_key(mentor_id: Uuid, mentee_id: Uuid) -> String {
    format!("{mentor_id}:{mentee_id}")
}

fn statuses_literal(statuses: &[MatchStatus]) -> String {
    let quoted: Vec<String> = statuses.iter().map(|s| format!("'{s}'")).collect();
    format!("[{}]", quoted.join(", "))
}

impl SuggestionRow {
    fn into_suggestion(self, id: Uuid) -> Result<MatchSuggestion, DbError> {
        Ok(MatchSuggestion {
            id,
            mentor_id: parse_uuid(&self.mentor_id, "mentor")?,
            mentee_id: parse_uuid(&self.mentee_id, "mentee")?,
            score: self.score,
            breakdown: ScoreBreakdown {
                expertise: self.score_expertise,
                availability: self.score_availability,
                interactions: self.score_interactions,
                priority: self.score_priority,
            },
            matched_expertise: self.matched_expertise,
            status: parse_status(&self.status)?,
            decline_reason: self.decline_reason,
            notes: self.notes,
            metadata: self.metadata,
            expires_at: self.expires_at,
            mentor_responded_at: self.mentor_responded_at,
            mentee_responded_at: self.mentee_responded_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl SuggestionRowWithId {
    fn try_into_suggestion(self) -> Result<MatchSuggestion, DbError> {
        let id = parse_uuid(&self.record_id, "suggestion")?;
        SuggestionRow {
            mentor_id: self.mentor_id,
            mentee_id: self.mentee_id,
            score: self.score,
            score_expertise: self.score_expertise,
            score_availability: self.score_availability,
            score_interactions: self.score_interactions,
            score_priority: self.score_priority,
            matched_expertise: self.matched_expertise,
            status: self.status,
            decline_reason: self.decline_reason,
            notes: self.notes,
            metadata: self.metadata,
            expires_at: self.expires_at,
            mentor_responded_at: self.mentor_responded_at,
            mentee_responded_at: self.mentee_responded_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .into_suggestion(id)
    }
}

/// SurrealDB implementation of the MatchSuggestion repository.
#[derive(Clone)]
pub struct SurrealMatchSuggestionRepository<C: Connection> {
    db: Surreal<C>,
    /// How often the connect transaction is retried after a
    /// read/write conflict.
    connect_retries: u32,
}

impl<C: Connection> SurrealMatchSuggestionRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self {
            db,
            connect_retries: DEFAULT_CONNECT_RETRIES,
        }
    }

    pub fn with_connect_retries(db: Surreal<C>, connect_retries: u32) -> Self {
        Self {
            db,
            connect_retries,
        }
    }

    async fn select_where(
        &self,
        condition: &str,
        field: &'static str,
        value: String,
    ) -> MentoraResult<Vec<MatchSuggestion>> {
        let mut result = self
            .db
            .query(format!(
                "SELECT meta::id(id) AS record_id, * FROM match_suggestion \
                 WHERE {condition} \
                 ORDER BY created_at ASC, record_id ASC"
            ))
            .bind((field, value))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<SuggestionRowWithId> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(|row| row.try_into_suggestion())
            .collect::<Result<Vec<_>, DbError>>()?;
        Ok(items)
    }

    /// Run the connect transaction once.
    async fn try_connect(
        &self,
        suggestion: &MatchSuggestion,
        mentorship_id: Uuid,
    ) -> MentoraResult<Option<TxFailure>> {
        let connect_target = MatchAction::MenteeAccept
            .apply(MatchStatus::MentorAccepted)
            .ok_or_else(|| DbError::Query("mentee acceptance has no target state".into()))?;
        let mut response = self
            .db
            .query(CONNECT_TX)
            .bind(("id", suggestion.id.to_string()))
            .bind(("from", MatchStatus::MentorAccepted.as_str().to_string()))
            .bind(("to", connect_target.as_str().to_string()))
            .bind(("mentor_id", suggestion.mentor_id.to_string()))
            .bind(("mentee_id", suggestion.mentee_id.to_string()))
            .bind(("mentorship_id", mentorship_id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(classify_tx_errors(response.take_errors()))
    }
}

impl<C: Connection> MatchSuggestionRepository for SurrealMatchSuggestionRepository<C> {
    async fn create(&self, input: CreateMatchSuggestion) -> MentoraResult<MatchSuggestion> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let metadata = input
            .metadata
            .unwrap_or(serde_json::Value::Object(Default::default()));

        let result = self
            .db
            .query(
                "CREATE type::record('match_suggestion', $id) SET \
                 mentor_id = $mentor_id, mentee_id = $mentee_id, \
                 active_pair_key = $pair_key, \
                 score = $score, \
                 score_expertise = $score_expertise, \
                 score_availability = $score_availability, \
                 score_interactions = $score_interactions, \
                 score_priority = $score_priority, \
                 matched_expertise = $matched_expertise, \
                 status = 'suggested', \
                 decline_reason = NONE, notes = $notes, \
                 metadata = $metadata, expires_at = $expires_at, \
                 mentor_responded_at = NONE, mentee_responded_at = NONE",
            )
            .bind(("id", id_str.clone()))
            .bind(("mentor_id", input.mentor_id.to_string()))
            .bind(("mentee_id", input.mentee_id.to_string()))
            .bind(("pair_key", pair_key(input.mentor_id, input.mentee_id)))
            .bind(("score", input.score))
            .bind(("score_expertise", input.breakdown.expertise))
            .bind(("score_availability", input.breakdown.availability))
            .bind(("score_interactions", input.breakdown.interactions))
            .bind(("score_priority", input.breakdown.priority))
            .bind(("matched_expertise", input.matched_expertise))
            .bind(("notes", input.notes))
            .bind(("metadata", metadata))
            .bind(("expires_at", input.expires_at))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| {
            let message = e.to_string();
            if message.contains(ACTIVE_PAIR_INDEX) {
                MentoraError::AlreadyExists {
                    entity: "match_suggestion".into(),
                }
            } else {
                DbError::Query(message).into()
            }
        })?;

        let rows: Vec<SuggestionRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "match_suggestion".into(),
            id: id_str,
        })?;

        Ok(row.into_suggestion(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> MentoraResult<MatchSuggestion> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('match_suggestion', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<SuggestionRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "match_suggestion".into(),
            id: id_str,
        })?;

        Ok(row.into_suggestion(id)?)
    }

    async fn list_by_mentor(&self, mentor_id: Uuid) -> MentoraResult<Vec<MatchSuggestion>> {
        self.select_where("mentor_id = $mentor_id", "mentor_id", mentor_id.to_string())
            .await
    }

    async fn list_by_mentee(&self, mentee_id: Uuid) -> MentoraResult<Vec<MatchSuggestion>> {
        self.select_where("mentee_id = $mentee_id", "mentee_id", mentee_id.to_string())
            .await
    }

    async fn rescore(
        &self,
        id: Uuid,
        input: RescoreMatchSuggestion,
    ) -> MentoraResult<MatchSuggestion> {
        let id_str = id.to_string();

        let query = format!(
            "UPDATE type::record('match_suggestion', $id) SET \
             score = $score, \
             score_expertise = $score_expertise, \
             score_availability = $score_availability, \
             score_interactions = $score_interactions, \
             score_priority = $score_priority, \
             matched_expertise = $matched_expertise, \
             updated_at = time::now() \
             WHERE status IN {}",
            statuses_literal(&MatchStatus::ACTIVE)
        );

        let result = self
            .db
            .query(query)
            .bind(("id", id_str.clone()))
            .bind(("score", input.score))
            .bind(("score_expertise", input.breakdown.expertise))
            .bind(("score_availability", input.breakdown.availability))
            .bind(("score_interactions", input.breakdown.interactions))
            .bind(("score_priority", input.breakdown.priority))
            .bind(("matched_expertise", input.matched_expertise))
            .await
            .map_err(DbError::from)?;
        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<SuggestionRow> = result.take(0).map_err(DbError::from)?;
        match rows.into_iter().next() {
            Some(row) => Ok(row.into_suggestion(id)?),
            None => {
                // Either missing (NotFound propagates) or terminal.
                let current = self.get_by_id(id).await?;
                Err(MentoraError::InvalidState {
                    from: current.status.to_string(),
                    action: "rescore".into(),
                })
            }
        }
    }

    async fn transition(
        &self,
        id: Uuid,
        from: MatchStatus,
        to: MatchStatus,
        changes: TransitionChanges,
    ) -> MentoraResult<Option<MatchSuggestion>> {
        // Connecting claims capacity, so only `connect` may set it.
        if to == MatchStatus::Connected || !from.can_transition_to(to) {
            return Err(MentoraError::InvalidState {
                from: from.to_string(),
                action: format!("move to {to}"),
            });
        }

        let id_str = id.to_string();

        let mut sets = vec!["status = $to", "updated_at = time::now()"];
        if to.is_terminal() {
            // Release the pair's active slot.
            sets.push("active_pair_key = $id");
        }
        if changes.decline_reason.is_some() {
            sets.push("decline_reason = $decline_reason");
        }
        if changes.expires_at.is_some() {
            sets.push("expires_at = $expires_at");
        }
        if changes.mentor_responded_at.is_some() {
            sets.push("mentor_responded_at = $mentor_responded_at");
        }
        if changes.mentee_responded_at.is_some() {
            sets.push("mentee_responded_at = $mentee_responded_at");
        }

        let query = format!(
            "UPDATE type::record('match_suggestion', $id) SET {} \
             WHERE status = $from",
            sets.join(", ")
        );

        let mut builder = self
            .db
            .query(&query)
            .bind(("id", id_str))
            .bind(("from", from.as_str().to_string()))
            .bind(("to", to.as_str().to_string()));

        if let Some(reason) = changes.decline_reason {
            builder = builder.bind(("decline_reason", reason));
        }
        if let Some(expires_at) = changes.expires_at {
            // expires_at is Option<Option<DateTime>>: Some(None) clears the deadline
            builder = builder.bind(("expires_at", expires_at));
        }
        if let Some(at) = changes.mentor_responded_at {
            builder = builder.bind(("mentor_responded_at", at));
        }
        if let Some(at) = changes.mentee_responded_at {
            builder = builder.bind(("mentee_responded_at", at));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<SuggestionRow> = result.take(0).map_err(DbError::from)?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.into_suggestion(id)?)),
            None => Ok(None),
        }
    }

    async fn connect(&self, id: Uuid) -> MentoraResult<(MatchSuggestion, Mentorship)> {
        let suggestion = self.get_by_id(id).await?;
        let mentorship_id = Uuid::new_v4();

        let mut attempt = 0;
        loop {
            match self.try_connect(&suggestion, mentorship_id).await? {
                None => break,
                Some(TxFailure::Thrown(THROW_CAPACITY_EXCEEDED)) => {
                    let mentor = SurrealUserRepository::new(self.db.clone())
                        .get_by_id(suggestion.mentor_id)
                        .await?;
                    return Err(MentoraError::CapacityExceeded {
                        mentor_id: mentor.id.to_string(),
                        capacity: mentor.capacity,
                    });
                }
                Some(TxFailure::Thrown(_)) => {
                    let current = self.get_by_id(id).await?;
                    return Err(MentoraError::InvalidState {
                        from: current.status.to_string(),
                        action: MatchAction::MenteeAccept.to_string(),
                    });
                }
                Some(TxFailure::Conflict(message)) if attempt < self.connect_retries => {
                    attempt += 1;
                    debug!(suggestion_id = %id, attempt, %message, "Retrying connect after conflict");
                }
                Some(TxFailure::Conflict(message)) | Some(TxFailure::Other(message)) => {
                    warn!(suggestion_id = %id, %message, "Connect transaction failed");
                    return Err(DbError::Query(message).into());
                }
            }
        }

        let connected = self.get_by_id(id).await?;
        let mentorship = SurrealMentorshipRepository::new(self.db.clone())
            .get_by_id(mentorship_id)
            .await?;

        Ok((connected, mentorship))
    }

    async fn expire_stale(&self, now: DateTime<Utc>) -> MentoraResult<Vec<MatchSuggestion>> {
        let query = format!(
            "SELECT meta::id(id) AS record_id, * FROM match_suggestion \
             WHERE status IN {} AND expires_at != NONE AND expires_at <= $now \
             ORDER BY created_at ASC",
            statuses_literal(&[MatchStatus::Suggested, MatchStatus::MentorAccepted])
        );

        let mut result = self
            .db
            .query(query)
            .bind(("now", now))
            .await
            .map_err(DbError::from)?;
        let rows: Vec<SuggestionRowWithId> = result.take(0).map_err(DbError::from)?;

        let mut expired = Vec::with_capacity(rows.len());
        for row in rows {
            let stale = row.try_into_suggestion()?;
            // A concurrent transition wins; skip the record then.
            if let Some(updated) = self
                .transition(
                    stale.id,
                    stale.status,
                    MatchStatus::Expired,
                    TransitionChanges::default(),
                )
                .await?
            {
                expired.push(updated);
            }
        }

        Ok(expired)
    }
}
