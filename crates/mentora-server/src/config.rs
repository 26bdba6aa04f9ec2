//! Server configuration loaded from `MENTORA_*` environment variables.
//!
//! Unset or unparsable variables fall back to the defaults.

use std::env;

use mentora_db::DbConfig;
use mentora_matching::{MatchingConfig, ScoringWeights};

fn env_bool(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|v| match v.as_str() {
            "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
            "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}

fn env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}

fn env_u32(name: &str, default: u32) -> u32 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(default)
}

fn env_usize(name: &str, default: usize) -> usize {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(default)
}

fn env_f64(name: &str, default: f64) -> f64 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<f64>().ok())
        .unwrap_or(default)
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen address (default `0.0.0.0:8080`).
    pub bind: String,
    /// Emit JSON log lines (default `true`).
    pub log_json: bool,
    pub db: DbConfig,
    pub matching: MatchingConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".into(),
            log_json: true,
            db: DbConfig::default(),
            matching: MatchingConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bind: env::var("MENTORA_BIND").unwrap_or(defaults.bind),
            log_json: env_bool("MENTORA_LOG_JSON", defaults.log_json),
            db: DbConfig::from_env(),
            matching: matching_from_env(defaults.matching),
        }
    }
}

fn matching_from_env(d: MatchingConfig) -> MatchingConfig {
    MatchingConfig {
        weights: ScoringWeights {
            expertise: env_f64("MENTORA_WEIGHT_EXPERTISE", d.weights.expertise),
            availability: env_f64("MENTORA_WEIGHT_AVAILABILITY", d.weights.availability),
            interactions: env_f64("MENTORA_WEIGHT_INTERACTIONS", d.weights.interactions),
            priority: env_f64("MENTORA_WEIGHT_PRIORITY", d.weights.priority),
        },
        suggestion_ttl_secs: env_u64("MENTORA_SUGGESTION_TTL_SECS", d.suggestion_ttl_secs),
        decline_cooldown_secs: env_u64("MENTORA_DECLINE_COOLDOWN_SECS", d.decline_cooldown_secs),
        default_limit: env_usize("MENTORA_DEFAULT_LIMIT", d.default_limit),
        max_limit: env_usize("MENTORA_MAX_LIMIT", d.max_limit),
        connect_retries: env_u32("MENTORA_CONNECT_RETRIES", d.connect_retries),
        ..d
    }
}
