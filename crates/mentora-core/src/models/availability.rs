//! Weekly availability slots.
//!
//! A slot is a half-open `[start_minute, end_minute)` range of minutes
//! since midnight on a weekday. The textual form `Mon 09:00-11:30` is
//! used for storage and command-line input.

use std::fmt;
use std::str::FromStr;

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::error::MentoraError;

const MINUTES_PER_DAY: u16 = 24 * 60;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct AvailabilitySlot {
    pub day: Weekday,
    pub start_minute: u16,
    pub end_minute: u16,
}

impl AvailabilitySlot {
    pub fn new(day: Weekday, start_minute: u16, end_minute: u16) -> Result<Self, MentoraError> {
        if end_minute <= start_minute || end_minute > MINUTES_PER_DAY {
            return Err(MentoraError::Validation {
                message: format!(
                    "invalid availability range {start_minute}-{end_minute} on {day}"
                ),
            });
        }
        Ok(Self {
            day,
            start_minute,
            end_minute,
        })
    }

    pub fn duration_minutes(&self) -> u16 {
        self.end_minute.saturating_sub(self.start_minute)
    }

    /// Minutes shared with `other`; zero on different days.
    pub fn overlap_minutes(&self, other: &AvailabilitySlot) -> u16 {
        if self.day != other.day {
            return 0;
        }
        let start = self.start_minute.max(other.start_minute);
        let end = self.end_minute.min(other.end_minute);
        end.saturating_sub(start)
    }
}

fn format_minute(minute: u16) -> String {
    format!("{:02}:{:02}", minute / 60, minute % 60)
}

fn parse_minute(s: &str) -> Option<u16> {
    let (h, m) = s.split_once(':')?;
    let h: u16 = h.trim().parse().ok()?;
    let m: u16 = m.trim().parse().ok()?;
    if m >= 60 || h > 24 || (h == 24 && m != 0) {
        return None;
    }
    Some(h * 60 + m)
}

impl fmt::Display for AvailabilitySlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}-{}",
            self.day,
            format_minute(self.start_minute),
            format_minute(self.end_minute)
        )
    }
}

impl FromStr for AvailabilitySlot {
    type Err = MentoraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || MentoraError::Validation {
            message: format!("invalid availability slot: {s:?} (expected e.g. \"Mon 09:00-11:00\")"),
        };

        let (day, range) = s.trim().split_once(char::is_whitespace).ok_or_else(invalid)?;
        let day: Weekday = day.parse().map_err(|_| invalid())?;
        let (start, end) = range.trim().split_once('-').ok_or_else(invalid)?;
        let start = parse_minute(start).ok_or_else(invalid)?;
        let end = parse_minute(end).ok_or_else(invalid)?;

        AvailabilitySlot::new(day, start, end)
    }
}
