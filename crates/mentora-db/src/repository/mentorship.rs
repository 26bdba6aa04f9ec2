//! SurrealDB implementation of [`MentorshipRepository`].
//!
//! Mentorships are only created by the connect transaction in the
//! match suggestion repository; this repository reads and ends them.

use chrono::{DateTime, Utc};
use mentora_core::error::{MentoraError, MentoraResult};
use mentora_core::models::mentorship::{Mentorship, MentorshipStatus};
use mentora_core::repository::MentorshipRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::warn;
use uuid::Uuid;

use super::{TxFailure, classify_tx_errors};
use crate::error::DbError;

const END_TX: &str = "\
BEGIN TRANSACTION;
LET $ended = (UPDATE type::record('mentorship', $id) SET \
    status = $status, ended_at = time::now() \
    WHERE status = 'active');
IF array::len($ended) = 0 { THROW 'mentora:invalid_state' };
UPDATE type::record('user', $mentor_id) SET \
    active_mentee_count -= 1, updated_at = time::now() \
    WHERE active_mentee_count > 0;
COMMIT TRANSACTION;
";

#[derive(Debug, SurrealValue)]
struct MentorshipRow {
    mentor_id: String,
    mentee_id: String,
    suggestion_id: String,
    status: String,
    started_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
}

#[derive(Debug, SurrealValue)]
struct MentorshipRowWithId {
    record_id: String,
    mentor_id: String,
    mentee_id: String,
    suggestion_id: String,
    status: String,
    started_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
}

fn row_to_mentorship(row: MentorshipRow, id: Uuid) -> Result<Mentorship, DbError> {
    let parse = |s: &str, what: &str| {
        Uuid::parse_str(s).map_err(|e| DbError::Decode(format!("invalid {what} UUID: {e}")))
    };
    Ok(Mentorship {
        id,
        mentor_id: parse(&row.mentor_id, "mentor")?,
        mentee_id: parse(&row.mentee_id, "mentee")?,
        suggestion_id: parse(&row.suggestion_id, "suggestion")?,
        status: MentorshipStatus::parse(&row.status)
            .ok_or_else(|| DbError::Decode(format!("unknown mentorship status: {}", row.status)))?,
        started_at: row.started_at,
        ended_at: row.ended_at,
    })
}

impl MentorshipRowWithId {
    fn try_into_mentorship(self) -> Result<Mentorship, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Decode(format!("invalid UUID: {e}")))?;
        row_to_mentorship(
            MentorshipRow {
                mentor_id: self.mentor_id,
                mentee_id: self.mentee_id,
                suggestion_id: self.suggestion_id,
                status: self.status,
                started_at: self.started_at,
                ended_at: self.ended_at,
            },
            id,
        )
    }
}

/// SurrealDB implementation of the Mentorship repository.
#[derive(Clone)]
pub struct SurrealMentorshipRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealMentorshipRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn select_where(
        &self,
        condition: &str,
        field: &'static str,
        value: String,
    ) -> MentoraResult<Vec<Mentorship>> {
        let mut result = self
            .db
            .query(format!(
                "SELECT meta::id(id) AS record_id, * FROM mentorship \
                 WHERE {condition} ORDER BY started_at ASC"
            ))
            .bind((field, value))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<MentorshipRowWithId> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(|row| row.try_into_mentorship())
            .collect::<Result<Vec<_>, DbError>>()?;
        Ok(items)
    }
}

impl<C: Connection> MentorshipRepository for SurrealMentorshipRepository<C> {
    async fn get_by_id(&self, id: Uuid) -> MentoraResult<Mentorship> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('mentorship', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<MentorshipRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "mentorship".into(),
            id: id_str,
        })?;

        row_to_mentorship(row, id).map_err(Into::into)
    }

    async fn list_by_mentor(&self, mentor_id: Uuid) -> MentoraResult<Vec<Mentorship>> {
        self.select_where("mentor_id = $mentor_id", "mentor_id", mentor_id.to_string())
            .await
    }

    async fn list_by_mentee(&self, mentee_id: Uuid) -> MentoraResult<Vec<Mentorship>> {
        self.select_where("mentee_id = $mentee_id", "mentee_id", mentee_id.to_string())
            .await
    }

    async fn end(&self, id: Uuid, status: MentorshipStatus) -> MentoraResult<Mentorship> {
        if status == MentorshipStatus::Active {
            return Err(MentoraError::Validation {
                message: "a mentorship can only end as completed or cancelled".into(),
            });
        }

        let current = self.get_by_id(id).await?;

        let mut response = self
            .db
            .query(END_TX)
            .bind(("id", id.to_string()))
            .bind(("mentor_id", current.mentor_id.to_string()))
            .bind(("status", status.as_str().to_string()))
            .await
            .map_err(DbError::from)?;

        match classify_tx_errors(response.take_errors()) {
            None => {}
            Some(TxFailure::Thrown(_)) => {
                let latest = self.get_by_id(id).await?;
                return Err(MentoraError::InvalidState {
                    from: latest.status.as_str().to_string(),
                    action: format!("mark mentorship {}", status.as_str()),
                });
            }
            Some(TxFailure::Conflict(message)) | Some(TxFailure::Other(message)) => {
                warn!(mentorship_id = %id, %message, "Ending mentorship failed");
                return Err(DbError::Query(message).into());
            }
        }

        self.get_by_id(id).await
    }
}
