//! Match suggestion domain model and lifecycle state machine.
//!
//! ```text
//! suggested ──► mentor_accepted ──► mentee_accepted ──► connected
//!     │               │
//!     ├─► mentor_declined   ├─► mentee_declined
//!     ├─► rejected          ├─► rejected
//!     └─► expired           └─► expired
//! ```
//!
//! `mentee_accepted` is transient: the connect step moves a suggestion
//! from `mentor_accepted` straight to `connected` in one transaction.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Suggested,
    MentorAccepted,
    MentorDeclined,
    MenteeAccepted,
    MenteeDeclined,
    Rejected,
    Expired,
    Connected,
}

impl MatchStatus {
    pub const ALL: [MatchStatus; 8] = [
        MatchStatus::Suggested,
        MatchStatus::MentorAccepted,
        MatchStatus::MentorDeclined,
        MatchStatus::MenteeAccepted,
        MatchStatus::MenteeDeclined,
        MatchStatus::Rejected,
        MatchStatus::Expired,
        MatchStatus::Connected,
    ];

    /// States that still hold the pair's single active slot.
    pub const ACTIVE: [MatchStatus; 3] = [
        MatchStatus::Suggested,
        MatchStatus::MentorAccepted,
        MatchStatus::MenteeAccepted,
    ];

    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            MatchStatus::MentorDeclined
                | MatchStatus::MenteeDeclined
                | MatchStatus::Rejected
                | MatchStatus::Expired
                | MatchStatus::Connected
        )
    }

    /// Whether `self -> next` is an edge of the lifecycle graph.
    pub const fn can_transition_to(self, next: MatchStatus) -> bool {
        matches!(
            (self, next),
            (MatchStatus::Suggested, MatchStatus::MentorAccepted)
                | (MatchStatus::Suggested, MatchStatus::MentorDeclined)
                | (MatchStatus::Suggested, MatchStatus::Rejected)
                | (MatchStatus::Suggested, MatchStatus::Expired)
                | (MatchStatus::MentorAccepted, MatchStatus::MenteeAccepted)
                // Mentee acceptance connects the pair in one storage
                // transaction; `mentee_accepted` is never persisted.
                | (MatchStatus::MentorAccepted, MatchStatus::Connected)
                | (MatchStatus::MentorAccepted, MatchStatus::MenteeDeclined)
                | (MatchStatus::MentorAccepted, MatchStatus::Rejected)
                | (MatchStatus::MentorAccepted, MatchStatus::Expired)
                | (MatchStatus::MenteeAccepted, MatchStatus::Connected)
        )
    }

    /// Whether the suggestion is a decline-type outcome that blocks the
    /// pair for the cooldown window.
    pub const fn is_refusal(self) -> bool {
        matches!(
            self,
            MatchStatus::MentorDeclined | MatchStatus::MenteeDeclined | MatchStatus::Rejected
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Suggested => "suggested",
            MatchStatus::MentorAccepted => "mentor_accepted",
            MatchStatus::MentorDeclined => "mentor_declined",
            MatchStatus::MenteeAccepted => "mentee_accepted",
            MatchStatus::MenteeDeclined => "mentee_declined",
            MatchStatus::Rejected => "rejected",
            MatchStatus::Expired => "expired",
            MatchStatus::Connected => "connected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        MatchStatus::ALL.into_iter().find(|st| st.as_str() == s)
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Compile-time checks on the transition table.
const _: () = {
    assert!(MatchStatus::Suggested.can_transition_to(MatchStatus::MentorAccepted));
    assert!(MatchStatus::MentorAccepted.can_transition_to(MatchStatus::MenteeAccepted));
    assert!(MatchStatus::MenteeAccepted.can_transition_to(MatchStatus::Connected));
    assert!(MatchStatus::MentorAccepted.can_transition_to(MatchStatus::Connected));
    assert!(!MatchStatus::Suggested.can_transition_to(MatchStatus::Connected));
    assert!(!MatchStatus::Connected.can_transition_to(MatchStatus::Expired));
    assert!(!MatchStatus::Expired.can_transition_to(MatchStatus::Suggested));
};

/// A lifecycle action requested by a mentor, mentee, admin or the
/// expiry sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchAction {
    MentorAccept,
    MentorDecline,
    MenteeAccept,
    MenteeDecline,
    Reject,
    Expire,
}

impl MatchAction {
    /// The state the action moves a suggestion into.
    pub const fn target(self) -> MatchStatus {
        match self {
            MatchAction::MentorAccept => MatchStatus::MentorAccepted,
            MatchAction::MentorDecline => MatchStatus::MentorDeclined,
            MatchAction::MenteeAccept => MatchStatus::Connected,
            MatchAction::MenteeDecline => MatchStatus::MenteeDeclined,
            MatchAction::Reject => MatchStatus::Rejected,
            MatchAction::Expire => MatchStatus::Expired,
        }
    }

    /// Resulting state when applied to `from`, or `None` if the
    /// transition is not allowed.
    pub const fn apply(self, from: MatchStatus) -> Option<MatchStatus> {
        let to = self.target();
        if from.can_transition_to(to) {
            Some(to)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MatchAction::MentorAccept => "mentor-accept",
            MatchAction::MentorDecline => "mentor-decline",
            MatchAction::MenteeAccept => "mentee-accept",
            MatchAction::MenteeDecline => "mentee-decline",
            MatchAction::Reject => "reject",
            MatchAction::Expire => "expire",
        }
    }
}

impl fmt::Display for MatchAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-component score points. Components sum to the total score.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct ScoreBreakdown {
    pub expertise: f64,
    pub availability: f64,
    pub interactions: f64,
    pub priority: f64,
}

impl ScoreBreakdown {
    pub fn total(&self) -> f64 {
        self.expertise + self.availability + self.interactions + self.priority
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchSuggestion {
    pub id: Uuid,
    pub mentor_id: Uuid,
    pub mentee_id: Uuid,
    /// 0..=100.
    pub score: f64,
    pub breakdown: ScoreBreakdown,
    /// Normalized terms shared by the mentee's interests/goals and the
    /// mentor's expertise.
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

impl MatchSuggestion {
    pub fn is_active(&self) -> bool {
        !self.status.is_terminal()
    }

    /// Active, but past its expiry deadline.
    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        self.is_active()
            && self.status.can_transition_to(MatchStatus::Expired)
            && self.expires_at.is_some_and(|at| at <= now)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMatchSuggestion {
    pub mentor_id: Uuid,
    pub mentee_id: Uuid,
    pub score: f64,
    pub breakdown: ScoreBreakdown,
    pub matched_expertise: Vec<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

/// New score for an existing active suggestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RescoreMatchSuggestion {
    pub score: f64,
    pub breakdown: ScoreBreakdown,
    pub matched_expertise: Vec<String>,
}

/// Field changes applied together with a compare-and-swap status change.
#[derive(Debug, Clone, Default)]
pub struct TransitionChanges {
    pub decline_reason: Option<String>,
    /// `Some(Some(at))` = set, `Some(None)` = clear, `None` = keep.
    pub expires_at: Option<Option<DateTime<Utc>>>,
    pub mentor_responded_at: Option<DateTime<Utc>>,
    pub mentee_responded_at: Option<DateTime<Utc>>,
}
