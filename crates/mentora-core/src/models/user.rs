//! User domain model.
//!
//! Mentors, mentees and admins share one record. Mentor-only fields
//! (`capacity`, `active_mentee_count`) are zero for other roles.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::availability::AvailabilitySlot;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Mentee,
    Mentor,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Mentee => "mentee",
            UserRole::Mentor => "mentor",
            UserRole::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "mentee" => Some(UserRole::Mentee),
            "mentor" => Some(UserRole::Mentor),
            "admin" => Some(UserRole::Admin),
            _ => None,
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Application/approval status. Users are never hard-deleted; removal
/// sets [`UserStatus::Inactive`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    Pending,
    Approved,
    Rejected,
    Inactive,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Pending => "pending",
            UserStatus::Approved => "approved",
            UserStatus::Rejected => "rejected",
            UserStatus::Inactive => "inactive",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(UserStatus::Pending),
            "approved" => Some(UserStatus::Approved),
            "rejected" => Some(UserStatus::Rejected),
            "inactive" => Some(UserStatus::Inactive),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub status: UserStatus,
    /// Mentor expertise tags.
    pub expertise: Vec<String>,
    /// Mentee interests.
    pub interests: Vec<String>,
    /// Mentee goals; matched against mentor expertise together with
    /// `interests`.
    pub goals: Vec<String>,
    pub availability: Vec<AvailabilitySlot>,
    pub program: Option<String>,
    /// Program-level priority flag (e.g. scholarship cohort).
    pub priority: bool,
    /// Maximum concurrent mentees (mentors only).
    pub capacity: u32,
    /// Currently active mentorships (mentors only).
    pub active_mentee_count: u32,
    pub approved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_approved_mentor(&self) -> bool {
        self.role == UserRole::Mentor && self.status == UserStatus::Approved
    }

    pub fn is_approved_mentee(&self) -> bool {
        self.role == UserRole::Mentee && self.status == UserStatus::Approved
    }

    pub fn has_capacity(&self) -> bool {
        self.active_mentee_count < self.capacity
    }

    /// Start of the mentee's wait for a mentor.
    pub fn waiting_since(&self) -> DateTime<Utc> {
        self.approved_at.unwrap_or(self.created_at)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    pub role: UserRole,
    #[serde(default)]
    pub expertise: Vec<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub goals: Vec<String>,
    #[serde(default)]
    pub availability: Vec<AvailabilitySlot>,
    pub program: Option<String>,
    #[serde(default)]
    pub priority: bool,
    #[serde(default)]
    pub capacity: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub email: Option<String>,
    pub status: Option<UserStatus>,
    pub expertise: Option<Vec<String>>,
    pub interests: Option<Vec<String>>,
    pub goals: Option<Vec<String>>,
    pub availability: Option<Vec<AvailabilitySlot>>,
    /// `Some(Some(val))` = set, `Some(None)` = clear, `None` = no change.
    pub program: Option<Option<String>>,
    pub priority: Option<bool>,
    pub capacity: Option<u32>,
}
