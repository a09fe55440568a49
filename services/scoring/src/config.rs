//! Engine configuration
//!
//! Loaded from environment variables with defaults. Values that are set but
//! cannot be parsed are errors rather than silently replaced by a default.

use std::env;

use types::errors::ConfigError;

/// Environment variable listing accepted over lengths, comma separated.
pub const ENV_OVER_LENGTHS: &str = "SCORING_OVER_LENGTHS";
/// Environment variable with the over length used when a match's setup
/// feed does not carry one.
pub const ENV_DEFAULT_BALLS_PER_OVER: &str = "SCORING_DEFAULT_BALLS_PER_OVER";

/// Configuration for the scoring engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoringConfig {
    /// Over lengths a match may be configured with.
    pub supported_over_lengths: Vec<u32>,
    /// Over length applied when a match is created. `None` means every
    /// match must announce its own length before overs can be reported.
    pub default_balls_per_over: Option<u32>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            supported_over_lengths: vec![5, 6, 8],
            default_balls_per_over: None,
        }
    }
}

impl ScoringConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `SCORING_OVER_LENGTHS` (default: 5,6,8)
    /// - `SCORING_DEFAULT_BALLS_PER_OVER` (default: unset)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let supported_over_lengths = match lookup(ENV_OVER_LENGTHS) {
            Some(raw) => parse_over_lengths(&raw)?,
            None => defaults.supported_over_lengths,
        };

        let default_balls_per_over = match lookup(ENV_DEFAULT_BALLS_PER_OVER) {
            Some(raw) => Some(parse_u32(ENV_DEFAULT_BALLS_PER_OVER, &raw)?),
            None => defaults.default_balls_per_over,
        };

        let config = Self {
            supported_over_lengths,
            default_balls_per_over,
        };
        config.validate()?;
        Ok(config)
    }

    /// The default over length, if any, must itself be supported.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(length) = self.default_balls_per_over {
            if !self.supported_over_lengths.contains(&length) {
                return Err(ConfigError::UnsupportedOverLength {
                    balls_per_over: length,
                    supported: self.supported_over_lengths.clone(),
                });
            }
        }
        Ok(())
    }
}

fn parse_over_lengths(raw: &str) -> Result<Vec<u32>, ConfigError> {
    let mut lengths = raw
        .split(',')
        .map(|part| parse_u32(ENV_OVER_LENGTHS, part))
        .collect::<Result<Vec<_>, _>>()?;

    if lengths.is_empty() || lengths.contains(&0) {
        return Err(ConfigError::InvalidValue {
            key: ENV_OVER_LENGTHS.to_string(),
            value: raw.to_string(),
        });
    }
    lengths.sort_unstable();
    lengths.dedup();
    Ok(lengths)
}

fn parse_u32(key: &str, raw: &str) -> Result<u32, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: raw.to_string(),
    })
}
