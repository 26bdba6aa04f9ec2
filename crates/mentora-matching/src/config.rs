//! Matching engine configuration.

use crate::error::MatchError;

/// Relative weights of the four score components.
///
/// Weights are normalized to sum to 100 before use, so `5/3/1/1`
/// and `50/30/10/10` score identically.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    pub expertise: f64,
    pub availability: f64,
    pub interactions: f64,
    pub priority: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            expertise: 50.0,
            availability: 30.0,
            interactions: 10.0,
            priority: 10.0,
        }
    }
}

impl ScoringWeights {
    fn components(&self) -> [(&'static str, f64); 4] {
        [
            ("expertise", self.expertise),
            ("availability", self.availability),
            ("interactions", self.interactions),
            ("priority", self.priority),
        ]
    }

    pub fn validate(&self) -> Result<(), MatchError> {
        for (name, w) in self.components() {
            if !w.is_finite() || w < 0.0 {
                return Err(MatchError::InvalidConfig(format!(
                    "{name} weight must be a finite, non-negative number (got {w})"
                )));
            }
        }
        if self.sum() <= 0.0 {
            return Err(MatchError::InvalidConfig(
                "at least one scoring weight must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn sum(&self) -> f64 {
        self.expertise + self.availability + self.interactions + self.priority
    }

    /// Weights scaled so that they sum to 100.
    pub fn normalized(&self) -> ScoringWeights {
        let sum = self.sum();
        if sum <= 0.0 {
            return ScoringWeights::default();
        }
        let k = 100.0 / sum;
        ScoringWeights {
            expertise: self.expertise * k,
            availability: self.availability * k,
            interactions: self.interactions * k,
            priority: self.priority * k,
        }
    }
}

/// Configuration for the matching engine.
#[derive(Debug, Clone)]
pub struct MatchingConfig {
    pub weights: ScoringWeights,
    /// Minimum shared minutes for a mentee slot to count as covered
    /// (default: 30). Slots shorter than this need full coverage.
    pub min_overlap_minutes: u16,
    /// Interaction penalty per mentor or mentee decline (default: 0.25).
    pub decline_penalty: f64,
    /// Interaction penalty per expired suggestion (default: 0.1).
    pub expiry_penalty: f64,
    /// Interaction penalty per admin rejection (default: 0.25).
    pub rejection_penalty: f64,
    /// Interaction bonus per completed mentorship (default: 0.25).
    pub past_mentorship_bonus: f64,
    /// Wait time at which the priority component saturates
    /// (default: 30 days).
    pub priority_wait_cap_days: u32,
    /// Share of the priority component granted by the program
    /// priority flag (default: 0.5).
    pub priority_flag_bonus: f64,
    /// Suggestion lifetime in seconds, restarted when the mentor
    /// accepts (default: 1_209_600 = 14 days).
    pub suggestion_ttl_secs: u64,
    /// How long a declined or rejected pair stays blocked, in seconds
    /// (default: 2_592_000 = 30 days).
    pub decline_cooldown_secs: u64,
    /// Suggestions returned when the caller gives no limit (default: 10).
    pub default_limit: usize,
    /// Upper bound for caller-supplied limits (default: 100).
    pub max_limit: usize,
    /// Page size when walking the user directory (default: 100).
    pub directory_page_size: u64,
    /// Retries of the connect transaction after a storage conflict
    /// (default: 3).
    pub connect_retries: u32,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            weights: ScoringWeights::default(),
            min_overlap_minutes: 30,
            decline_penalty: 0.25,
            expiry_penalty: 0.1,
            rejection_penalty: 0.25,
            past_mentorship_bonus: 0.25,
            priority_wait_cap_days: 30,
            priority_flag_bonus: 0.5,
            suggestion_ttl_secs: 1_209_600,
            decline_cooldown_secs: 2_592_000,
            default_limit: 10,
            max_limit: 100,
            directory_page_size: 100,
            connect_retries: 3,
        }
    }
}

impl MatchingConfig {
    pub fn validate(&self) -> Result<(), MatchError> {
        self.weights.validate()?;

        for (name, v) in [
            ("decline_penalty", self.decline_penalty),
            ("expiry_penalty", self.expiry_penalty),
            ("rejection_penalty", self.rejection_penalty),
            ("past_mentorship_bonus", self.past_mentorship_bonus),
            ("priority_flag_bonus", self.priority_flag_bonus),
        ] {
            if !(0.0..=1.0).contains(&v) {
                return Err(MatchError::InvalidConfig(format!(
                    "{name} must be within [0, 1] (got {v})"
                )));
            }
        }
        if self.priority_wait_cap_days == 0 {
            return Err(MatchError::InvalidConfig(
                "priority_wait_cap_days must be positive".into(),
            ));
        }
        if self.max_limit == 0 || self.default_limit == 0 || self.default_limit > self.max_limit {
            return Err(MatchError::InvalidConfig(format!(
                "limits must satisfy 0 < default_limit ({}) <= max_limit ({})",
                self.default_limit, self.max_limit
            )));
        }
        if self.directory_page_size == 0 {
            return Err(MatchError::InvalidConfig(
                "directory_page_size must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Resolve a caller-supplied limit: `None` means `default_limit`,
    /// anything else is clamped into `1..=max_limit`.
    pub fn resolve_limit(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.default_limit)
            .clamp(1, self.max_limit)
    }

    pub fn suggestion_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(i64::try_from(self.suggestion_ttl_secs).unwrap_or(i64::MAX))
    }

    pub fn decline_cooldown(&self) -> chrono::Duration {
        chrono::Duration::seconds(i64::try_from(self.decline_cooldown_secs).unwrap_or(i64::MAX))
    }
}
