//! Types library for the live cricket scorecard engine
//!
//! This library provides the core domain types used by the scoring service:
//! stat counters, players, teams, over counting, and the error taxonomy.
//! Nothing here performs I/O.
//!
//! # Modules
//! - `ids`: Identifiers (MatchId, PlayerName)
//! - `extras`: Extra-run categories
//! - `stats`: Batting and bowling stat counters
//! - `player`: Rostered player
//! - `team`: Team roster and team-level aggregates
//! - `overs`: Over policy and over counting
//! - `errors`: Error taxonomy

// Public modules
pub mod ids;
pub mod extras;
pub mod stats;
pub mod player;
pub mod team;
pub mod overs;
pub mod errors;

// Library version constant
pub const LIB_VERSION: &str = "1.0.0";

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::ids::*;
    pub use crate::extras::*;
    pub use crate::stats::*;
    pub use crate::player::*;
    pub use crate::team::*;
    pub use crate::overs::*;
    pub use crate::errors::*;
}
