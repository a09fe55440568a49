//! Identifier types for scoring entities
//!
//! Identifiers come straight from the provider feed, so they wrap the feed's
//! own strings rather than generating fresh ones.

use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt;

/// Identifier of a live match as carried by the feed
///
/// Cricsheet uses numeric ids (e.g. "335982") but other providers use
/// slugs, so the value is kept as an opaque trimmed string. Deserializing
/// goes through [`MatchId::try_new`], so a blank id never enters the engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct MatchId(String);

impl MatchId {
    /// Create a new MatchId from a string
    ///
    /// # Panics
    /// Panics if the identifier is empty after trimming
    pub fn new(id: impl Into<String>) -> Self {
        Self::try_new(id).expect("MatchId must not be empty")
    }

    /// Try to create a MatchId, returning None if blank
    pub fn try_new(id: impl Into<String>) -> Option<Self> {
        let s = id.into();
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// Get the identifier string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for MatchId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::try_new(raw).ok_or_else(|| de::Error::custom("MatchId must not be empty"))
    }
}

impl From<u64> for MatchId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

/// Player name, unique within one team roster
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerName(String);

impl PlayerName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PlayerName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for PlayerName {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl PartialEq<str> for PlayerName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}
