//! Error types for the scoring engine
//!
//! Comprehensive error taxonomy using thiserror

use thiserror::Error;

/// Top-level scoring error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScoringError {
    #[error("Roster error: {0}")]
    Roster(#[from] RosterError),

    #[error("Feed error: {0}")]
    Feed(#[from] FeedError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Unknown match: {match_id}")]
    UnknownMatch { match_id: String },

    #[error("Current striker, non-striker and bowler have not been set")]
    ParticipantsNotSet,

    #[error("Match {match_id} is unavailable after a panic while it was being updated")]
    MatchPoisoned { match_id: String },

    #[error("Applying the delivery would overflow the {counter} counter")]
    CounterOverflow { counter: String },
}

/// Team roster errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RosterError {
    #[error("Player {name} is not on the {team} roster")]
    UnknownPlayer { team: String, name: String },

    #[error("Team not registered for this match: {team}")]
    UnknownTeam { team: String },

    #[error("Both teams are already registered; cannot add {team}")]
    TooManyTeams { team: String },

    #[error("Batting and bowling teams have not been registered")]
    TeamsNotRegistered,

    #[error("Feed reports {reported} batting but {expected} is already batting this innings")]
    BattingSideMismatch { expected: String, reported: String },
}

/// Feed decoding errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FeedError {
    #[error("Malformed field {field}: {value:?}")]
    MalformedField { field: String, value: String },

    #[error("Missing field: {field}")]
    MissingField { field: String },

    #[error("Unknown record type: {record}")]
    UnknownRecord { record: String },

    #[error("CSV error: {message}")]
    Csv { message: String },
}

/// Configuration errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("No over policy configured")]
    UnconfiguredOverPolicy,

    #[error("Unsupported over length: {balls_per_over} balls (supported: {supported:?})")]
    UnsupportedOverLength {
        balls_per_over: u32,
        supported: Vec<u32>,
    },

    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },
}
