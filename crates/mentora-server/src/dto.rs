//! JSON request and response bodies (camelCase on the wire).

use chrono::{DateTime, Utc};
use mentora_core::models::match_suggestion::{MatchStatus, MatchSuggestion, ScoreBreakdown};
use mentora_core::models::mentorship::{Mentorship, MentorshipStatus};
use mentora_matching::{
    BackfillSummary, MenteeSuggestions, MentorFailure, MentorSuggestions, RankedSuggestion,
    TransitionOutcome,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<i64>,
}

impl LimitQuery {
    /// Negative values are clamped like zero.
    pub fn limit(&self) -> Option<usize> {
        self.limit.map(|l| usize::try_from(l).unwrap_or(0))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReasonBody {
    pub reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateBody {
    pub mentor_id: Option<Uuid>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionDto {
    pub id: Uuid,
    pub mentor_id: Uuid,
    pub mentee_id: Uuid,
    pub score: f64,
    pub breakdown: ScoreBreakdown,
    pub matched_expertise: Vec<String>,
    pub status: MatchStatus,
    pub decline_reason: Option<String>,
    pub notes: Option<String>,
    pub metadata: serde_json::Value,
    pub expires_at: Option<DateTime<Utc>>,
    pub mentor_responded_at: Option<DateTime<Utc>>,
    pub mentee_responded_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<MatchSuggestion> for SuggestionDto {
    fn from(s: MatchSuggestion) -> Self {
        Self {
            id: s.id,
            mentor_id: s.mentor_id,
            mentee_id: s.mentee_id,
            score: s.score,
            breakdown: s.breakdown,
            matched_expertise: s.matched_expertise,
            status: s.status,
            decline_reason: s.decline_reason,
            notes: s.notes,
            metadata: s.metadata,
            expires_at: s.expires_at,
            mentor_responded_at: s.mentor_responded_at,
            mentee_responded_at: s.mentee_responded_at,
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

/// A ranked candidate. `suggestion` is absent for read-only previews.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedDto {
    pub mentor_id: Uuid,
    pub mentee_id: Uuid,
    pub score: f64,
    pub breakdown: ScoreBreakdown,
    pub matched_expertise: Vec<String>,
    pub suggestion: Option<SuggestionDto>,
}

impl From<RankedSuggestion> for RankedDto {
    fn from(r: RankedSuggestion) -> Self {
        Self {
            mentor_id: r.mentor_id,
            mentee_id: r.mentee_id,
            score: r.score.total,
            breakdown: r.score.breakdown,
            matched_expertise: r.score.matched_expertise,
            suggestion: r.suggestion.map(SuggestionDto::from),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MentorMeta {
    pub capacity: u32,
    pub active_mentees: u32,
    pub capacity_reached: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenteeMeta {
    pub awaiting_mentee: usize,
    pub awaiting_mentor: usize,
}

#[derive(Debug, Serialize)]
pub struct SuggestionList<M> {
    pub suggestions: Vec<RankedDto>,
    pub meta: M,
}

impl From<MentorSuggestions> for SuggestionList<MentorMeta> {
    fn from(r: MentorSuggestions) -> Self {
        Self {
            suggestions: r.suggestions.into_iter().map(RankedDto::from).collect(),
            meta: MentorMeta {
                capacity: r.capacity,
                active_mentees: r.active_mentees,
                capacity_reached: r.capacity_reached,
            },
        }
    }
}

impl From<MenteeSuggestions> for SuggestionList<MenteeMeta> {
    fn from(r: MenteeSuggestions) -> Self {
        Self {
            suggestions: r.suggestions.into_iter().map(RankedDto::from).collect(),
            meta: MenteeMeta {
                awaiting_mentee: r.awaiting_mentee,
                awaiting_mentor: r.awaiting_mentor,
            },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MentorshipDto {
    pub id: Uuid,
    pub mentor_id: Uuid,
    pub mentee_id: Uuid,
    pub suggestion_id: Uuid,
    pub status: MentorshipStatus,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl From<Mentorship> for MentorshipDto {
    fn from(m: Mentorship) -> Self {
        Self {
            id: m.id,
            mentor_id: m.mentor_id,
            mentee_id: m.mentee_id,
            suggestion_id: m.suggestion_id,
            status: m.status,
            started_at: m.started_at,
            ended_at: m.ended_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TransitionDto {
    pub suggestion: SuggestionDto,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mentorship: Option<MentorshipDto>,
}

impl From<TransitionOutcome> for TransitionDto {
    fn from(o: TransitionOutcome) -> Self {
        Self {
            suggestion: o.suggestion.into(),
            mentorship: o.mentorship.map(MentorshipDto::from),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureDto {
    pub mentor_id: Uuid,
    pub code: &'static str,
    pub message: String,
}

impl From<MentorFailure> for FailureDto {
    fn from(f: MentorFailure) -> Self {
        Self {
            mentor_id: f.mentor_id,
            code: f.code,
            message: f.message,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackfillDto {
    pub mentors_processed: usize,
    pub mentors_failed: usize,
    pub created: usize,
    pub updated: usize,
    pub expired: usize,
    pub failures: Vec<FailureDto>,
}

impl From<BackfillSummary> for BackfillDto {
    fn from(s: BackfillSummary) -> Self {
        Self {
            mentors_processed: s.mentors_processed,
            mentors_failed: s.mentors_failed,
            created: s.created,
            updated: s.updated,
            expired: s.expired,
            failures: s.failures.into_iter().map(FailureDto::from).collect(),
        }
    }
}
