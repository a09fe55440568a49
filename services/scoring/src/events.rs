//! Normalized event definitions consumed by the scoring engine
//!
//! Every event names the match it belongs to and carries an explicit
//! `event_type` tag. How the event was produced (CSV row, JSON webhook body)
//! is the decoder's business; the engine only sees these records.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use types::extras::ExtraKind;
use types::ids::{MatchId, PlayerName};

/// One event from the provider feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchEvent {
    pub match_id: MatchId,
    pub payload: EventPayload,
}

/// Event-specific payloads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event_type")]
pub enum EventPayload {
    /// Match setup information. Creates the match on first sight.
    Info { entry: InfoEntry },

    /// The batters at the crease and the bowler changed.
    Participants(Participants),

    /// One delivery.
    Delivery(Delivery),

    /// The batting side's innings ended; sides swap roles.
    InningsBreak,
}

/// A single setup fact about a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InfoEntry {
    /// A competing team. The first registered team bats first.
    Team { name: String },
    /// A player on a team's roster.
    Player { team: String, name: PlayerName },
    BallsPerOver(u32),
    Date(NaiveDate),
    Venue(String),
    City(String),
    /// Any other key, kept as match metadata.
    Other { key: String, value: String },
}

/// Current striker, non-striker and bowler, by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participants {
    pub striker: PlayerName,
    pub non_striker: PlayerName,
    pub bowler: PlayerName,
}

impl Participants {
    pub fn new(
        striker: impl Into<PlayerName>,
        non_striker: impl Into<PlayerName>,
        bowler: impl Into<PlayerName>,
    ) -> Self {
        Self {
            striker: striker.into(),
            non_striker: non_striker.into(),
            bowler: bowler.into(),
        }
    }
}

/// Extra runs on a delivery, per category. Absent means zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extras {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wides: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub noballs: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub byes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legbyes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub penalty: Option<u32>,
}

impl Extras {
    pub fn get(&self, kind: ExtraKind) -> Option<u32> {
        match kind {
            ExtraKind::Wides => self.wides,
            ExtraKind::NoBalls => self.noballs,
            ExtraKind::Byes => self.byes,
            ExtraKind::LegByes => self.legbyes,
            ExtraKind::Penalty => self.penalty,
        }
    }

    pub fn set(&mut self, kind: ExtraKind, runs: Option<u32>) {
        let slot = match kind {
            ExtraKind::Wides => &mut self.wides,
            ExtraKind::NoBalls => &mut self.noballs,
            ExtraKind::Byes => &mut self.byes,
            ExtraKind::LegByes => &mut self.legbyes,
            ExtraKind::Penalty => &mut self.penalty,
        };
        *slot = runs;
    }

    /// Builder-style setter.
    pub fn with(mut self, kind: ExtraKind, runs: u32) -> Self {
        self.set(kind, Some(runs));
        self
    }

    /// Categories with a non-zero value, in canonical order.
    pub fn present(&self) -> impl Iterator<Item = (ExtraKind, u32)> + '_ {
        ExtraKind::ALL
            .into_iter()
            .filter_map(|kind| self.get(kind).filter(|&runs| runs > 0).map(|runs| (kind, runs)))
    }

    /// Whether the delivery must be re-bowled (a wide or no-ball was called).
    pub fn voids_delivery(&self) -> bool {
        self.present().any(|(kind, _)| kind.voids_delivery())
    }
}

/// One delivery as reported by the feed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delivery {
    /// Innings number, when the feed reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub innings: Option<u32>,
    /// Feed ball label, e.g. "3.4".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ball: Option<String>,
    /// Batting side named by the feed, when it reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batting_team: Option<String>,
    /// Participants on this ball, when the feed repeats them per delivery.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub participants: Option<Participants>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runs_off_bat: Option<u32>,
    #[serde(default)]
    pub extras: Extras,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wicket_type: Option<String>,
}

impl Delivery {
    /// A delivery with runs off the bat only.
    pub fn runs(runs: u32) -> Self {
        Self {
            runs_off_bat: Some(runs),
            ..Self::default()
        }
    }

    /// A delivery with a single extra.
    pub fn extra(kind: ExtraKind, runs: u32) -> Self {
        Self {
            extras: Extras::default().with(kind, runs),
            ..Self::default()
        }
    }

    /// A dot ball that dismissed the striker.
    pub fn wicket(wicket_type: impl Into<String>) -> Self {
        Self {
            wicket_type: Some(wicket_type.into()),
            ..Self::default()
        }
    }

    pub fn with_participants(mut self, participants: Participants) -> Self {
        self.participants = Some(participants);
        self
    }

    /// Whether a wicket fell on this delivery.
    pub fn has_wicket(&self) -> bool {
        self.wicket_type
            .as_deref()
            .map(|w| !w.trim().is_empty())
            .unwrap_or(false)
    }
}

impl MatchEvent {
    pub fn new(match_id: MatchId, payload: EventPayload) -> Self {
        Self {
            match_id,
            payload,
        }
    }

    pub fn info(match_id: MatchId, entry: InfoEntry) -> Self {
        Self::new(match_id, EventPayload::Info { entry })
    }

    pub fn delivery(match_id: MatchId, delivery: Delivery) -> Self {
        Self::new(match_id, EventPayload::Delivery(delivery))
    }

    pub fn participants(match_id: MatchId, participants: Participants) -> Self {
        Self::new(match_id, EventPayload::Participants(participants))
    }

    /// Whether this event may create a match that does not exist yet.
    pub fn is_setup(&self) -> bool {
        matches!(self.payload, EventPayload::Info { .. })
    }

    /// Get the event type as a string label for logging.
    pub fn event_type_label(&self) -> &'static str {
        match &self.payload {
            EventPayload::Info { .. } => "Info",
            EventPayload::Participants(_) => "Participants",
            EventPayload::Delivery(_) => "Delivery",
            EventPayload::InningsBreak => "InningsBreak",
        }
    }
}
