//! Mentorship domain model.
//!
//! A mentorship is created when a match suggestion reaches
//! `connected`. Sessions, chat and feedback hang off it elsewhere.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MentorshipStatus {
    Active,
    Completed,
    Cancelled,
}

impl MentorshipStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MentorshipStatus::Active => "active",
            MentorshipStatus::Completed => "completed",
            MentorshipStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(MentorshipStatus::Active),
            "completed" => Some(MentorshipStatus::Completed),
            "cancelled" => Some(MentorshipStatus::Cancelled),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mentorship {
    pub id: Uuid,
    pub mentor_id: Uuid,
    pub mentee_id: Uuid,
    /// Suggestion this mentorship was connected from.
    pub suggestion_id: Uuid,
    pub status: MentorshipStatus,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl Mentorship {
    pub fn is_active(&self) -> bool {
        self.status == MentorshipStatus::Active
    }
}
