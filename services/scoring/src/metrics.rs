//! Engine metrics
//!
//! Counters for applied and rejected events, safe to share across threads.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use types::errors::ScoringError;

/// Core metrics for the scoring engine.
#[derive(Debug)]
pub struct EngineMetrics {
    pub events_applied: AtomicU64,
    pub events_rejected: AtomicU64,
    pub mutations_applied: AtomicU64,
    pub matches_created: AtomicU64,
    /// Rejections grouped by error kind.
    pub rejections: Mutex<BTreeMap<&'static str, u64>>,
}

impl EngineMetrics {
    pub fn new() -> Self {
        Self {
            events_applied: AtomicU64::new(0),
            events_rejected: AtomicU64::new(0),
            mutations_applied: AtomicU64::new(0),
            matches_created: AtomicU64::new(0),
            rejections: Mutex::new(BTreeMap::new()),
        }
    }

    /// Record an event applied with `mutations` mutations.
    pub fn record_applied(&self, mutations: usize) {
        self.events_applied.fetch_add(1, Ordering::Relaxed);
        self.mutations_applied
            .fetch_add(mutations as u64, Ordering::Relaxed);
    }

    /// Record an event rejected with `error`.
    pub fn record_rejected(&self, error: &ScoringError) {
        self.events_rejected.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut rejections) = self.rejections.lock() {
            *rejections.entry(error_kind(error)).or_insert(0) += 1;
        }
    }

    pub fn record_match_created(&self) {
        self.matches_created.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a point-in-time copy of all metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let rejections = self
            .rejections
            .lock()
            .map(|r| r.iter().map(|(k, v)| (k.to_string(), *v)).collect())
            .unwrap_or_default();

        MetricsSnapshot {
            events_applied: self.events_applied.load(Ordering::Relaxed),
            events_rejected: self.events_rejected.load(Ordering::Relaxed),
            mutations_applied: self.mutations_applied.load(Ordering::Relaxed),
            matches_created: self.matches_created.load(Ordering::Relaxed),
            rejections,
        }
    }
}

impl Default for EngineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Serializable metrics snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub events_applied: u64,
    pub events_rejected: u64,
    pub mutations_applied: u64,
    pub matches_created: u64,
    pub rejections: BTreeMap<String, u64>,
}

/// Stable label for an error kind.
pub fn error_kind(error: &ScoringError) -> &'static str {
    use types::errors::{ConfigError, FeedError, RosterError};

    match error {
        ScoringError::UnknownMatch { .. } => "unknown_match",
        ScoringError::ParticipantsNotSet => "participants_not_set",
        ScoringError::MatchPoisoned { .. } => "match_poisoned",
        ScoringError::CounterOverflow { .. } => "counter_overflow",
        ScoringError::Roster(RosterError::UnknownPlayer { .. }) => "unknown_player",
        ScoringError::Roster(_) => "roster",
        ScoringError::Feed(FeedError::MalformedField { .. }) => "malformed_field",
        ScoringError::Feed(_) => "feed",
        ScoringError::Config(ConfigError::UnconfiguredOverPolicy) => "unconfigured_over_policy",
        ScoringError::Config(_) => "config",
    }
}
