//! Extra-run categories
//!
//! Extras are runs credited to the batting side that are not attributed to
//! a batter's strike.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Category of an extra
///
/// Ordering follows the canonical scorecard order, which is also the order
/// the classifier emits extra mutations in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtraKind {
    Wides,
    #[serde(rename = "noballs")]
    NoBalls,
    Byes,
    #[serde(rename = "legbyes")]
    LegByes,
    Penalty,
}

impl ExtraKind {
    /// All categories in canonical order.
    pub const ALL: [ExtraKind; 5] = [
        ExtraKind::Wides,
        ExtraKind::NoBalls,
        ExtraKind::Byes,
        ExtraKind::LegByes,
        ExtraKind::Penalty,
    ];

    /// Feed column / wire label.
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtraKind::Wides => "wides",
            ExtraKind::NoBalls => "noballs",
            ExtraKind::Byes => "byes",
            ExtraKind::LegByes => "legbyes",
            ExtraKind::Penalty => "penalty",
        }
    }

    /// Whether a delivery carrying this extra must be re-bowled.
    ///
    /// Wides and no-balls never count towards the over.
    pub fn voids_delivery(&self) -> bool {
        matches!(self, ExtraKind::Wides | ExtraKind::NoBalls)
    }
}

impl fmt::Display for ExtraKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExtraKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "wides" | "wide" => Ok(ExtraKind::Wides),
            "noballs" | "noball" | "no-balls" | "no_balls" => Ok(ExtraKind::NoBalls),
            "byes" | "bye" => Ok(ExtraKind::Byes),
            "legbyes" | "legbye" | "leg-byes" | "leg_byes" => Ok(ExtraKind::LegByes),
            "penalty" => Ok(ExtraKind::Penalty),
            other => Err(format!("unknown extra category: {other}")),
        }
    }
}
