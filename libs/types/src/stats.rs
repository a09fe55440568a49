//! Batting and bowling stat counters
//!
//! Pure accumulators. Inputs are unsigned, so there is nothing to validate
//! here; the feed decoder rejects values that are not non-negative integers.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::extras::ExtraKind;

/// Run values that count as boundaries.
pub const BOUNDARY_VALUES: [u32; 2] = [4, 6];

/// Batting figures for one player
///
/// Invariant: runs_scored >= Σ boundaries[v] * v
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattingStats {
    pub runs_scored: u32,
    pub balls_faced: u32,
    /// Boundary value → count. Both 4 and 6 are always present.
    pub boundaries: BTreeMap<u32, u32>,
}

impl BattingStats {
    pub fn new() -> Self {
        Self {
            runs_scored: 0,
            balls_faced: 0,
            boundaries: BOUNDARY_VALUES.iter().map(|&v| (v, 0)).collect(),
        }
    }

    /// Record runs off the bat from one ball faced.
    pub fn record_run(&mut self, runs: u32) {
        self.runs_scored += runs;
        self.balls_faced += 1;
        if let Some(count) = self.boundaries.get_mut(&runs) {
            *count += 1;
        }
    }

    /// Number of boundaries of the given value.
    pub fn boundary_count(&self, value: u32) -> u32 {
        self.boundaries.get(&value).copied().unwrap_or(0)
    }

    /// Runs scored in boundaries.
    pub fn boundary_runs(&self) -> u64 {
        self.boundaries
            .iter()
            .map(|(&value, &count)| u64::from(value) * u64::from(count))
            .sum()
    }

    /// Check invariant: runs_scored >= boundary runs
    pub fn check_invariant(&self) -> bool {
        u64::from(self.runs_scored) >= self.boundary_runs()
    }
}

impl Default for BattingStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Bowling figures for one player
///
/// `legal_balls` excludes wides and no-balls. Economy is derived on demand.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BowlingStats {
    pub runs_conceded: u32,
    pub legal_balls: u32,
    pub wickets: u32,
    pub wides: u32,
    pub no_balls: u32,
}

impl BowlingStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_ball_bowled(&mut self) {
        self.legal_balls += 1;
    }

    pub fn record_wicket(&mut self) {
        self.wickets += 1;
    }

    pub fn record_conceded_run(&mut self, runs: u32) {
        self.runs_conceded += runs;
    }

    /// Record an extra against this bowler.
    ///
    /// Wides and no-balls go to their own buckets; every category is added
    /// to runs conceded.
    pub fn record_extra(&mut self, kind: ExtraKind, runs: u32) {
        match kind {
            ExtraKind::Wides => self.wides += runs,
            ExtraKind::NoBalls => self.no_balls += runs,
            ExtraKind::Byes | ExtraKind::LegByes | ExtraKind::Penalty => {}
        }
        self.record_conceded_run(runs);
    }

    /// Runs conceded per legal ball.
    ///
    /// Returns `None` when no legal ball has been bowled yet.
    pub fn economy(&self) -> Option<Decimal> {
        if self.legal_balls == 0 {
            return None;
        }
        Some(Decimal::from(self.runs_conceded) / Decimal::from(self.legal_balls))
    }
}
