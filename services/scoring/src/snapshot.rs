//! Scorecard snapshots
//!
//! A snapshot is the only way consumers observe a scorecard. It is built
//! from the live state on every request, never cached, and carries a
//! SHA-256 checksum of its content so a client can detect a changed or
//! corrupted copy.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use types::errors::{RosterError, ScoringError};
use types::extras::ExtraKind;
use types::ids::{MatchId, PlayerName};
use types::overs::{OverCount, OverPolicy};
use types::player::Player;
use types::team::Team;

use crate::scorecard::Scorecard;

/// Decimal places economy rates are reported with.
pub const ECONOMY_DECIMALS: u32 = 2;

/// Batting line for one player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattingLine {
    pub runs: u32,
    pub balls_faced: u32,
    pub fours: u32,
    pub sixes: u32,
}

/// Bowling line for one player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BowlingLine {
    pub overs: OverCount,
    pub legal_balls: u32,
    pub runs_conceded: u32,
    pub wickets: u32,
    pub wides: u32,
    pub no_balls: u32,
    /// Runs conceded per legal ball. Omitted before the first legal ball.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub economy: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub name: PlayerName,
    pub batting: BattingLine,
    pub bowling: BowlingLine,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamSnapshot {
    pub name: String,
    pub runs: u32,
    pub wickets_lost: u32,
    pub wickets_taken: u32,
    pub extras: BTreeMap<ExtraKind, u32>,
    pub extras_conceded: BTreeMap<ExtraKind, u32>,
    pub players: Vec<PlayerSnapshot>,
}

/// Full read-only view of one match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScorecardSnapshot {
    pub match_id: MatchId,
    pub date: Option<NaiveDate>,
    pub venue: Option<String>,
    pub city: Option<String>,
    pub info: BTreeMap<String, String>,
    pub innings: u32,
    pub batting_team: TeamSnapshot,
    pub bowling_team: TeamSnapshot,
    pub striker: Option<PlayerSnapshot>,
    pub non_striker: Option<PlayerSnapshot>,
    pub bowler: Option<PlayerSnapshot>,
    pub balls_per_over: u32,
    pub balls: u32,
    pub overs: OverCount,
    /// Feed label of the last ball applied, if the feed supplied one.
    pub last_ball: Option<String>,
    pub events_applied: u64,
    pub checksum: String,
}

impl ScorecardSnapshot {
    /// Build a snapshot of the scorecard's current state.
    ///
    /// Fails if the teams are not registered or no over policy is set.
    pub fn capture(card: &Scorecard) -> Result<Self, ScoringError> {
        let policy = card.over_policy()?;
        let (batting, bowling) = match (card.batting_team(), card.bowling_team()) {
            (Some(batting), Some(bowling)) => (batting, bowling),
            _ => return Err(RosterError::TeamsNotRegistered.into()),
        };
        let metadata = card.metadata();

        let mut snapshot = Self {
            match_id: card.match_id().clone(),
            date: metadata.date,
            venue: metadata.venue.clone(),
            city: metadata.city.clone(),
            info: metadata.info.clone(),
            innings: card.innings(),
            batting_team: team_snapshot(batting, policy),
            bowling_team: team_snapshot(bowling, policy),
            striker: card.striker().map(|p| player_snapshot(p, policy)),
            non_striker: card.non_striker().map(|p| player_snapshot(p, policy)),
            bowler: card.bowler().map(|p| player_snapshot(p, policy)),
            balls_per_over: policy.balls_per_over().get(),
            balls: card.balls(),
            overs: policy.overs(card.balls()),
            last_ball: card.last_ball().map(str::to_string),
            events_applied: card.events_applied(),
            checksum: String::new(),
        };
        snapshot.checksum = compute_checksum(&snapshot);
        Ok(snapshot)
    }

    /// Score in the usual "runs/wickets" notation for the batting side.
    pub fn score_line(&self) -> String {
        format!(
            "{} {}/{} ({} ov)",
            self.batting_team.name, self.batting_team.runs, self.batting_team.wickets_lost, self.overs
        )
    }
}

fn team_snapshot(team: &Team, policy: &dyn OverPolicy) -> TeamSnapshot {
    TeamSnapshot {
        name: team.name().to_string(),
        runs: team.runs(),
        wickets_lost: team.wickets_lost(),
        wickets_taken: team.wickets_taken(),
        extras: team.extras().clone(),
        extras_conceded: team.extras_conceded().clone(),
        players: team
            .players()
            .iter()
            .map(|p| player_snapshot(p, policy))
            .collect(),
    }
}

fn player_snapshot(player: &Player, policy: &dyn OverPolicy) -> PlayerSnapshot {
    let batting = &player.batting;
    let bowling = &player.bowling;
    PlayerSnapshot {
        name: player.name.clone(),
        batting: BattingLine {
            runs: batting.runs_scored,
            balls_faced: batting.balls_faced,
            fours: batting.boundary_count(4),
            sixes: batting.boundary_count(6),
        },
        bowling: BowlingLine {
            overs: policy.overs(bowling.legal_balls),
            legal_balls: bowling.legal_balls,
            runs_conceded: bowling.runs_conceded,
            wickets: bowling.wickets,
            wides: bowling.wides,
            no_balls: bowling.no_balls,
            economy: bowling.economy().map(|e| e.round_dp(ECONOMY_DECIMALS)),
        },
    }
}

/// Compute a SHA-256 checksum over the snapshot content.
///
/// Every field except the checksum itself is hashed in a fixed order.
fn compute_checksum(snapshot: &ScorecardSnapshot) -> String {
    let mut hasher = Sha256::new();

    hasher.update(snapshot.match_id.as_str().as_bytes());
    hasher.update(b"|");
    if let Some(date) = snapshot.date {
        hasher.update(date.to_string().as_bytes());
    }
    hasher.update(b"|");
    hasher.update(snapshot.venue.as_deref().unwrap_or_default().as_bytes());
    hasher.update(b"|");
    hasher.update(snapshot.city.as_deref().unwrap_or_default().as_bytes());
    hasher.update(b"|");
    for (key, value) in &snapshot.info {
        hasher.update(key.as_bytes());
        hasher.update(b"=");
        hasher.update(value.as_bytes());
        hasher.update(b";");
    }
    hasher.update(b"---");

    hash_team(&mut hasher, &snapshot.batting_team);
    hash_team(&mut hasher, &snapshot.bowling_team);

    for participant in [&snapshot.striker, &snapshot.non_striker, &snapshot.bowler] {
        match participant {
            Some(player) => hash_player(&mut hasher, player),
            None => hasher.update(b"-"),
        }
        hasher.update(b"|");
    }
    hasher.update(b"---");

    hasher.update(snapshot.innings.to_le_bytes());
    hasher.update(snapshot.balls_per_over.to_le_bytes());
    hasher.update(snapshot.balls.to_le_bytes());
    hasher.update(snapshot.overs.to_string().as_bytes());
    hasher.update(snapshot.last_ball.as_deref().unwrap_or_default().as_bytes());
    hasher.update(snapshot.events_applied.to_le_bytes());

    format!("{:x}", hasher.finalize())
}

fn hash_team(hasher: &mut Sha256, team: &TeamSnapshot) {
    hasher.update(team.name.as_bytes());
    hasher.update(team.runs.to_le_bytes());
    hasher.update(team.wickets_lost.to_le_bytes());
    hasher.update(team.wickets_taken.to_le_bytes());
    for ledger in [&team.extras, &team.extras_conceded] {
        for (kind, runs) in ledger {
            hasher.update(kind.as_str().as_bytes());
            hasher.update(b":");
            hasher.update(runs.to_le_bytes());
        }
        hasher.update(b"|");
    }
    for player in &team.players {
        hash_player(hasher, player);
    }
    hasher.update(b"---");
}

fn hash_player(hasher: &mut Sha256, player: &PlayerSnapshot) {
    let batting = &player.batting;
    let bowling = &player.bowling;
    hasher.update(player.name.as_str().as_bytes());
    hasher.update(b":");
    for value in [batting.runs, batting.balls_faced, batting.fours, batting.sixes] {
        hasher.update(value.to_le_bytes());
    }
    for value in [
        bowling.legal_balls,
        bowling.runs_conceded,
        bowling.wickets,
        bowling.wides,
        bowling.no_balls,
    ] {
        hasher.update(value.to_le_bytes());
    }
    if let Some(economy) = bowling.economy {
        hasher.update(economy.to_string().as_bytes());
    }
    hasher.update(b";");
}

/// Verify that a snapshot's checksum matches its content.
pub fn verify_snapshot_integrity(snapshot: &ScorecardSnapshot) -> bool {
    snapshot.checksum == compute_checksum(snapshot)
}
