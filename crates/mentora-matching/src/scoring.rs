//! Pure scoring of a (mentor, mentee) pair.
//!
//! Every component is a ratio in `[0, 1]` multiplied by its normalized
//! weight. Components and the total are rounded to two decimals so the
//! same inputs always produce bit-identical scores, which keeps ranking
//! and idempotent re-generation stable.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use mentora_core::models::availability::AvailabilitySlot;
use mentora_core::models::match_suggestion::ScoreBreakdown;
use mentora_core::models::user::User;
use serde::Serialize;
use uuid::Uuid;

use crate::config::MatchingConfig;

const NEUTRAL_INTERACTION: f64 = 0.5;
const SECONDS_PER_DAY: f64 = 86_400.0;

/// Score of a pair plus the expertise terms that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchScore {
    /// 0..=100.
    pub total: f64,
    pub breakdown: ScoreBreakdown,
    pub matched_expertise: Vec<String>,
}

/// What happened between a mentor and a mentee before.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PairHistory {
    pub mentor_declines: u32,
    pub mentee_declines: u32,
    pub rejections: u32,
    pub expirations: u32,
    pub past_mentorships: u32,
}

impl PairHistory {
    pub fn is_empty(&self) -> bool {
        *self == PairHistory::default()
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Trim, lower-case and deduplicate free-text tags. Blank tags are
/// dropped.
pub fn normalize_terms<'a, I>(terms: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = &'a String>,
{
    terms
        .into_iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Share of the mentee's interests and goals covered by the mentor's
/// expertise, plus the shared terms in sorted order.
pub fn expertise_overlap(mentor: &User, mentee: &User) -> (f64, Vec<String>) {
    let wanted = normalize_terms(mentee.interests.iter().chain(mentee.goals.iter()));
    let offered = normalize_terms(mentor.expertise.iter());
    if wanted.is_empty() || offered.is_empty() {
        return (0.0, Vec::new());
    }

    let matched: Vec<String> = wanted.intersection(&offered).cloned().collect();
    let ratio = matched.len() as f64 / wanted.len() as f64;
    (ratio, matched)
}

/// Share of the mentee's weekly slots the mentor can cover.
///
/// A mentee slot counts as covered when one mentor slot on the same
/// day shares at least `min(min_overlap_minutes, slot length)` minutes
/// with it.
pub fn availability_coverage(
    mentor_slots: &[AvailabilitySlot],
    mentee_slots: &[AvailabilitySlot],
    min_overlap_minutes: u16,
) -> f64 {
    if mentor_slots.is_empty() || mentee_slots.is_empty() {
        return 0.0;
    }

    let covered = mentee_slots
        .iter()
        .filter(|slot| {
            let needed = min_overlap_minutes.min(slot.duration_minutes()).max(1);
            mentor_slots
                .iter()
                .any(|offer| offer.overlap_minutes(slot) >= needed)
        })
        .count();

    covered as f64 / mentee_slots.len() as f64
}

/// Interaction signal: neutral without history, lowered by refusals and
/// expiries, raised by past mentorships.
pub fn interaction_signal(history: &PairHistory, config: &MatchingConfig) -> f64 {
    if history.is_empty() {
        return NEUTRAL_INTERACTION;
    }
    let declines = f64::from(history.mentor_declines + history.mentee_declines);
    let signal = NEUTRAL_INTERACTION - declines * config.decline_penalty
        - f64::from(history.rejections) * config.rejection_penalty
        - f64::from(history.expirations) * config.expiry_penalty
        + f64::from(history.past_mentorships) * config.past_mentorship_bonus;
    signal.clamp(0.0, 1.0)
}

/// Priority signal from mentee wait time and the program priority flag.
pub fn priority_signal(mentee: &User, now: DateTime<Utc>, config: &MatchingConfig) -> f64 {
    let waited_days =
        ((now - mentee.waiting_since()).num_seconds().max(0) as f64) / SECONDS_PER_DAY;
    let wait_fraction = (waited_days / f64::from(config.priority_wait_cap_days)).min(1.0);

    let bonus = config.priority_flag_bonus;
    let flag = if mentee.priority { bonus } else { 0.0 };
    (wait_fraction * (1.0 - bonus) + flag).clamp(0.0, 1.0)
}

/// Score a (mentor, mentee) pair.
///
/// Pure: the result depends only on the arguments.
pub fn score(
    mentor: &User,
    mentee: &User,
    history: &PairHistory,
    config: &MatchingConfig,
    now: DateTime<Utc>,
) -> MatchScore {
    let weights = config.weights.normalized();

    let (expertise_ratio, matched_expertise) = expertise_overlap(mentor, mentee);
    let availability_ratio = availability_coverage(
        &mentor.availability,
        &mentee.availability,
        config.min_overlap_minutes,
    );

    let breakdown = ScoreBreakdown {
        expertise: round2(expertise_ratio * weights.expertise),
        availability: round2(availability_ratio * weights.availability),
        interactions: round2(interaction_signal(history, config) * weights.interactions),
        priority: round2(priority_signal(mentee, now, config) * weights.priority),
    };

    MatchScore {
        total: round2(breakdown.total()).clamp(0.0, 100.0),
        breakdown,
        matched_expertise,
    }
}

/// Ranking order: higher score first, then the counterpart created
/// first, then the lower counterpart id.
pub fn rank_order(
    a: (f64, DateTime<Utc>, Uuid),
    b: (f64, DateTime<Utc>, Uuid),
) -> Ordering {
    b.0.total_cmp(&a.0)
        .then_with(|| a.1.cmp(&b.1))
        .then_with(|| a.2.cmp(&b.2))
}
