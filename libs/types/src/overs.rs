//! Over counting
//!
//! The number of balls in an over is match configuration, not a constant:
//! six is standard, eight-ball overs were played in Australia and New
//! Zealand, and five-ball overs appear in some short formats. Scorecard
//! logic goes through the [`OverPolicy`] trait so every length reuses it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU32;

use crate::errors::ConfigError;

/// Completed overs plus balls into the current over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverCount {
    pub overs: u32,
    pub balls: u32,
}

impl OverCount {
    /// Rebuild the legal-ball count this was derived from.
    pub fn total_balls(&self, balls_per_over: NonZeroU32) -> u32 {
        self.overs * balls_per_over.get() + self.balls
    }
}

/// Scorecard notation, e.g. `12.3`.
impl fmt::Display for OverCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.overs, self.balls)
    }
}

/// Split a legal-ball count into (completed overs, balls into the current over).
pub fn overs(balls: u32, balls_per_over: NonZeroU32) -> OverCount {
    OverCount {
        overs: balls / balls_per_over,
        balls: balls % balls_per_over,
    }
}

/// Strategy for turning legal balls into overs.
pub trait OverPolicy: fmt::Debug + Send + Sync {
    fn balls_per_over(&self) -> NonZeroU32;

    fn overs(&self, balls: u32) -> OverCount {
        overs(balls, self.balls_per_over())
    }
}

/// An over of a fixed number of legal deliveries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedOverPolicy {
    balls_per_over: NonZeroU32,
}

impl FixedOverPolicy {
    pub fn new(balls_per_over: NonZeroU32) -> Self {
        Self { balls_per_over }
    }

    /// The standard six-ball over.
    pub fn six_ball() -> Self {
        Self::new(NonZeroU32::MIN.saturating_add(5))
    }
}

impl OverPolicy for FixedOverPolicy {
    fn balls_per_over(&self) -> NonZeroU32 {
        self.balls_per_over
    }
}

/// Select the over policy for a match.
///
/// Only lengths listed in `supported` are accepted. Anything else is an
/// error; there is no fallback length.
pub fn select_over_policy(
    balls_per_over: u32,
    supported: &[u32],
) -> Result<FixedOverPolicy, ConfigError> {
    let unsupported = || ConfigError::UnsupportedOverLength {
        balls_per_over,
        supported: supported.to_vec(),
    };

    if !supported.contains(&balls_per_over) {
        return Err(unsupported());
    }
    NonZeroU32::new(balls_per_over)
        .map(FixedOverPolicy::new)
        .ok_or_else(unsupported)
}
