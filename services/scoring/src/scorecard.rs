//! Per-match scorecard
//!
//! The scorecard is the aggregate root for one match. It owns both teams,
//! tracks who is currently on strike and bowling, and exposes the mutation
//! API the classifier drives:
//!
//! - `RunsOffBat` → batting total, striker's runs and balls faced, bowler's
//!   runs conceded
//! - `Extra` → batting extras and total, bowling side's conceded ledger,
//!   bowler's wides/no-balls bucket and runs conceded
//! - `Wicket` → wickets lost / taken, bowler's wickets
//! - `BallBowled` → innings ball counter, bowler's legal balls
//!
//! A legal delivery advances the ball counters only through `BallBowled`,
//! so each legal ball is counted exactly once however many other outcomes
//! it carried.

use std::collections::BTreeMap;
use std::num::NonZeroU32;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use types::errors::{ConfigError, RosterError, ScoringError};
use types::extras::ExtraKind;
use types::ids::MatchId;
use types::overs::{select_over_policy, OverCount, OverPolicy};
use types::player::Player;
use types::team::Team;

use crate::config::ScoringConfig;
use crate::events::{InfoEntry, Participants};
use crate::snapshot::ScorecardSnapshot;

/// One state change produced by classifying a delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mutation", rename_all = "snake_case")]
pub enum Mutation {
    RunsOffBat { runs: u32 },
    Extra { kind: ExtraKind, runs: u32 },
    Wicket,
    BallBowled,
}

impl Mutation {
    pub fn label(&self) -> &'static str {
        match self {
            Mutation::RunsOffBat { .. } => "runs_off_bat",
            Mutation::Extra { .. } => "extra",
            Mutation::Wicket => "wicket",
            Mutation::BallBowled => "ball_bowled",
        }
    }
}

/// Descriptive match information.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchMetadata {
    pub date: Option<NaiveDate>,
    pub venue: Option<String>,
    pub city: Option<String>,
    /// Any other setup keys (season, event, toss, umpires, ...).
    pub info: BTreeMap<String, String>,
}

/// Roster positions of the current participants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CurrentParticipants {
    striker: usize,
    non_striker: usize,
    bowler: usize,
}

/// Live scorecard for a single match.
#[derive(Debug, Clone)]
pub struct Scorecard {
    match_id: MatchId,
    metadata: MatchMetadata,
    batting: Option<Team>,
    bowling: Option<Team>,
    participants: Option<CurrentParticipants>,
    over_policy: Option<Arc<dyn OverPolicy>>,
    /// Legal balls in the current innings.
    balls: u32,
    /// Whether any delivery has been scored in the current innings.
    innings_underway: bool,
    innings: u32,
    events_applied: u64,
    last_ball: Option<String>,
}

impl Scorecard {
    /// Create an empty scorecard with no teams and no over policy.
    pub fn new(match_id: MatchId) -> Self {
        Self {
            match_id,
            metadata: MatchMetadata::default(),
            batting: None,
            bowling: None,
            participants: None,
            over_policy: None,
            balls: 0,
            innings_underway: false,
            innings: 1,
            events_applied: 0,
            last_ball: None,
        }
    }

    /// Create a scorecard, applying the configured default over length.
    pub fn from_config(match_id: MatchId, config: &ScoringConfig) -> Result<Self, ScoringError> {
        let mut card = Self::new(match_id);
        if let Some(length) = config.default_balls_per_over {
            card.configure_balls_per_over(length, config)?;
        }
        Ok(card)
    }

    // ── Setup ───────────────────────────────────────────────────────

    /// Apply one setup fact.
    pub fn apply_info(&mut self, entry: &InfoEntry, config: &ScoringConfig) -> Result<(), ScoringError> {
        match entry {
            InfoEntry::Team { name } => self.register_team(name)?,
            InfoEntry::Player { team, name } => {
                self.add_player(team, name.as_str())?;
            }
            InfoEntry::BallsPerOver(length) => self.configure_balls_per_over(*length, config)?,
            InfoEntry::Date(date) => self.set_date(*date),
            InfoEntry::Venue(venue) => self.metadata.venue = Some(venue.clone()),
            InfoEntry::City(city) => self.metadata.city = Some(city.clone()),
            InfoEntry::Other { key, value } => self.set_info(key, value),
        }
        Ok(())
    }

    /// Register a competing team. The first team bats first.
    pub fn register_team(&mut self, name: &str) -> Result<(), RosterError> {
        if self.team(name).is_some() {
            return Ok(());
        }
        if self.batting.is_none() {
            self.batting = Some(Team::new(name));
        } else if self.bowling.is_none() {
            self.bowling = Some(Team::new(name));
        } else {
            return Err(RosterError::TooManyTeams {
                team: name.to_string(),
            });
        }
        debug!(match_id = %self.match_id, team = name, "Team registered");
        Ok(())
    }

    /// Add a player to a registered team's roster (lookup-or-insert).
    pub fn add_player(&mut self, team: &str, name: &str) -> Result<usize, RosterError> {
        let roster = self.team_mut(team).ok_or_else(|| RosterError::UnknownTeam {
            team: team.to_string(),
        })?;
        Ok(roster.add_player(name))
    }

    /// Select the over policy from a configured length.
    pub fn configure_balls_per_over(
        &mut self,
        balls_per_over: u32,
        config: &ScoringConfig,
    ) -> Result<(), ConfigError> {
        let policy = select_over_policy(balls_per_over, &config.supported_over_lengths)?;
        self.configure_overs(policy);
        Ok(())
    }

    pub fn configure_overs(&mut self, policy: impl OverPolicy + 'static) {
        info!(
            match_id = %self.match_id,
            balls_per_over = policy.balls_per_over().get(),
            "Over policy selected"
        );
        self.over_policy = Some(Arc::new(policy));
    }

    /// Keep the earliest date seen; multi-day matches list one row per day.
    pub fn set_date(&mut self, date: NaiveDate) {
        self.metadata.date = Some(match self.metadata.date {
            Some(existing) => existing.min(date),
            None => date,
        });
    }

    /// Repeated keys (e.g. two umpires) are joined with "; ".
    pub fn set_info(&mut self, key: &str, value: &str) {
        self.metadata
            .info
            .entry(key.to_string())
            .and_modify(|existing| {
                existing.push_str("; ");
                existing.push_str(value);
            })
            .or_insert_with(|| value.to_string());
    }

    // ── Participants ────────────────────────────────────────────────

    /// Point striker and non-striker at batting-roster players and the
    /// bowler at a bowling-roster player.
    ///
    /// All three names are resolved before anything changes.
    pub fn set_current_participants(
        &mut self,
        striker: &str,
        non_striker: &str,
        bowler: &str,
    ) -> Result<(), ScoringError> {
        let (batting, bowling) = self.sides()?;
        let resolved = resolve_participants(batting, bowling, striker, non_striker, bowler)?;
        self.commit_participants(resolved);
        Ok(())
    }

    fn commit_participants(&mut self, resolved: CurrentParticipants) {
        if self.participants != Some(resolved) {
            if let (Some(batting), Some(bowling)) = (self.batting.as_ref(), self.bowling.as_ref()) {
                debug!(
                    match_id = %self.match_id,
                    striker = %batting[resolved.striker].name,
                    non_striker = %batting[resolved.non_striker].name,
                    bowler = %bowling[resolved.bowler].name,
                    "Current participants changed"
                );
            }
        }
        self.participants = Some(resolved);
    }

    /// Make `team` the batting side.
    ///
    /// Setup feeds do not say who bats first, so the first delivery of an
    /// innings may flip the sides. Once anything has been scored in the
    /// innings, wides and no-balls included, the sides are fixed until the
    /// innings changes.
    pub fn align_batting_side(&mut self, team: &str) -> Result<(), ScoringError> {
        if self.needs_flip(team)? {
            self.flip_sides(team);
        }
        Ok(())
    }

    /// Whether `team` is currently bowling and may take over the bat.
    fn needs_flip(&self, team: &str) -> Result<bool, ScoringError> {
        let (batting, bowling) = self.sides()?;
        if batting.name() == team {
            return Ok(false);
        }
        if bowling.name() != team {
            return Err(RosterError::UnknownTeam {
                team: team.to_string(),
            }
            .into());
        }
        if self.innings_underway {
            return Err(RosterError::BattingSideMismatch {
                expected: batting.name().to_string(),
                reported: team.to_string(),
            }
            .into());
        }
        Ok(true)
    }

    fn flip_sides(&mut self, team: &str) {
        std::mem::swap(&mut self.batting, &mut self.bowling);
        self.participants = None;
        info!(match_id = %self.match_id, batting = team, "Batting side set from feed");
    }

    /// End the current innings: the sides swap roles, the ball counter
    /// restarts and the participants must be set again.
    pub fn swap_innings(&mut self) -> Result<(), ScoringError> {
        self.sides()?;
        std::mem::swap(&mut self.batting, &mut self.bowling);
        self.balls = 0;
        self.innings_underway = false;
        self.participants = None;
        self.innings += 1;
        self.last_ball = None;
        info!(
            match_id = %self.match_id,
            innings = self.innings,
            batting = self.batting.as_ref().map(Team::name).unwrap_or_default(),
            "Innings changed"
        );
        Ok(())
    }

    // ── Mutations ───────────────────────────────────────────────────

    pub fn apply_runs_off_bat(&mut self, runs: u32) -> Result<(), ScoringError> {
        self.apply(&[Mutation::RunsOffBat { runs }])
    }

    pub fn apply_extra(&mut self, kind: ExtraKind, runs: u32) -> Result<(), ScoringError> {
        self.apply(&[Mutation::Extra { kind, runs }])
    }

    pub fn apply_wicket(&mut self) -> Result<(), ScoringError> {
        self.apply(&[Mutation::Wicket])
    }

    pub fn apply_ball_bowled(&mut self) -> Result<(), ScoringError> {
        self.apply(&[Mutation::BallBowled])
    }

    /// Apply a batch of mutations.
    ///
    /// Preconditions are checked once up front; after that no mutation can
    /// fail, so either all of them apply or none do.
    pub fn apply(&mut self, mutations: &[Mutation]) -> Result<(), ScoringError> {
        let current = self.participants.ok_or(ScoringError::ParticipantsNotSet)?;
        let (batting, bowling) = self.sides()?;
        check_headroom(batting, bowling, current, self.balls, mutations)?;
        self.commit(current, mutations);
        Ok(())
    }

    /// Apply one delivery: optionally take the batting side and participants
    /// named on it, then apply its mutations.
    ///
    /// Everything is validated against the state the delivery would leave
    /// behind before any of it is committed, so a rejected delivery changes
    /// nothing.
    pub fn apply_delivery(
        &mut self,
        batting_team: Option<&str>,
        participants: Option<&Participants>,
        mutations: &[Mutation],
    ) -> Result<(), ScoringError> {
        let flip = match batting_team {
            Some(team) => self.needs_flip(team)?,
            None => false,
        };
        let (batting, bowling) = match self.sides()? {
            (batting, bowling) if flip => (bowling, batting),
            sides => sides,
        };
        let current = match participants {
            Some(names) => resolve_participants(
                batting,
                bowling,
                names.striker.as_str(),
                names.non_striker.as_str(),
                names.bowler.as_str(),
            )?,
            // A flip clears the previous participants.
            None if flip => return Err(ScoringError::ParticipantsNotSet),
            None => self.participants.ok_or(ScoringError::ParticipantsNotSet)?,
        };
        check_headroom(batting, bowling, current, self.balls, mutations)?;

        if let (true, Some(team)) = (flip, batting_team) {
            self.flip_sides(team);
        }
        self.commit_participants(current);
        self.commit(current, mutations);
        Ok(())
    }

    /// Apply mutations whose preconditions have been checked.
    fn commit(&mut self, current: CurrentParticipants, mutations: &[Mutation]) {
        let (batting, bowling) = match (self.batting.as_mut(), self.bowling.as_mut()) {
            (Some(batting), Some(bowling)) => (batting, bowling),
            _ => return,
        };

        for mutation in mutations {
            match *mutation {
                Mutation::RunsOffBat { runs } => {
                    batting.record_run(runs);
                    batting[current.striker].batting.record_run(runs);
                    bowling[current.bowler].bowling.record_conceded_run(runs);
                }
                Mutation::Extra { kind, runs } => {
                    batting.record_extra(kind, runs);
                    bowling.record_extra_conceded(kind, runs);
                    bowling[current.bowler].bowling.record_extra(kind, runs);
                }
                Mutation::Wicket => {
                    batting.record_wicket();
                    bowling.record_wicket_taken();
                    bowling[current.bowler].bowling.record_wicket();
                }
                Mutation::BallBowled => {
                    self.balls += 1;
                    bowling[current.bowler].bowling.record_ball_bowled();
                }
            }
        }
        if !mutations.is_empty() {
            self.innings_underway = true;
        }

        debug!(
            match_id = %self.match_id,
            mutations = mutations.len(),
            runs = batting.runs(),
            wickets = batting.wickets_lost(),
            balls = self.balls,
            "Mutations applied"
        );
    }

    /// Mark one feed event as fully applied.
    pub fn record_event(&mut self, ball: Option<&str>) {
        self.events_applied += 1;
        if let Some(ball) = ball {
            self.last_ball = Some(ball.to_string());
        }
    }

    // ── Derived values ──────────────────────────────────────────────

    /// Overs bowled in the current innings.
    pub fn overs(&self) -> Result<OverCount, ScoringError> {
        Ok(self.over_policy()?.overs(self.balls))
    }

    pub fn over_policy(&self) -> Result<&dyn OverPolicy, ConfigError> {
        self.over_policy
            .as_deref()
            .ok_or(ConfigError::UnconfiguredOverPolicy)
    }

    pub fn balls_per_over(&self) -> Option<NonZeroU32> {
        self.over_policy.as_ref().map(|policy| policy.balls_per_over())
    }

    /// Read-only projection of the full state, computed on every call.
    pub fn snapshot(&self) -> Result<ScorecardSnapshot, ScoringError> {
        ScorecardSnapshot::capture(self)
    }

    /// Check both team invariants and every batter's boundary invariant.
    pub fn check_invariants(&self) -> bool {
        [self.batting.as_ref(), self.bowling.as_ref()]
            .into_iter()
            .flatten()
            .all(|team| {
                team.check_invariant() && team.players().iter().all(|p| p.batting.check_invariant())
            })
    }

    // ── Accessors ───────────────────────────────────────────────────

    pub fn match_id(&self) -> &MatchId {
        &self.match_id
    }

    pub fn metadata(&self) -> &MatchMetadata {
        &self.metadata
    }

    pub fn batting_team(&self) -> Option<&Team> {
        self.batting.as_ref()
    }

    pub fn bowling_team(&self) -> Option<&Team> {
        self.bowling.as_ref()
    }

    /// Look up a team by name in either role.
    pub fn team(&self, name: &str) -> Option<&Team> {
        [self.batting.as_ref(), self.bowling.as_ref()]
            .into_iter()
            .flatten()
            .find(|team| team.name() == name)
    }

    pub fn striker(&self) -> Option<&Player> {
        let current = self.participants?;
        self.batting.as_ref()?.player_at(current.striker)
    }

    pub fn non_striker(&self) -> Option<&Player> {
        let current = self.participants?;
        self.batting.as_ref()?.player_at(current.non_striker)
    }

    pub fn bowler(&self) -> Option<&Player> {
        let current = self.participants?;
        self.bowling.as_ref()?.player_at(current.bowler)
    }

    pub fn balls(&self) -> u32 {
        self.balls
    }

    pub fn innings(&self) -> u32 {
        self.innings
    }

    pub fn events_applied(&self) -> u64 {
        self.events_applied
    }

    pub fn last_ball(&self) -> Option<&str> {
        self.last_ball.as_deref()
    }

    fn team_mut(&mut self, name: &str) -> Option<&mut Team> {
        [self.batting.as_mut(), self.bowling.as_mut()]
            .into_iter()
            .flatten()
            .find(|team| team.name() == name)
    }

    fn sides(&self) -> Result<(&Team, &Team), RosterError> {
        match (self.batting.as_ref(), self.bowling.as_ref()) {
            (Some(batting), Some(bowling)) => Ok((batting, bowling)),
            _ => Err(RosterError::TeamsNotRegistered),
        }
    }
}

fn resolve_participants(
    batting: &Team,
    bowling: &Team,
    striker: &str,
    non_striker: &str,
    bowler: &str,
) -> Result<CurrentParticipants, RosterError> {
    Ok(CurrentParticipants {
        striker: batting.require(striker)?,
        non_striker: batting.require(non_striker)?,
        bowler: bowling.require(bowler)?,
    })
}

/// What a batch adds to each counter it touches.
#[derive(Debug, Default)]
struct BatchTotals {
    runs: u64,
    bat_runs: u64,
    strokes: u64,
    wickets: u64,
    balls: u64,
}

impl BatchTotals {
    fn of(mutations: &[Mutation]) -> Self {
        let mut totals = Self::default();
        for mutation in mutations {
            match *mutation {
                Mutation::RunsOffBat { runs } => {
                    totals.runs += u64::from(runs);
                    totals.bat_runs += u64::from(runs);
                    totals.strokes += 1;
                }
                Mutation::Extra { runs, .. } => totals.runs += u64::from(runs),
                Mutation::Wicket => totals.wickets += 1,
                Mutation::BallBowled => totals.balls += 1,
            }
        }
        totals
    }
}

/// Reject a batch that would overflow any counter it touches.
///
/// Extras ledgers and the bowler's wides and no-balls are bounded by the
/// runs counters checked here.
fn check_headroom(
    batting: &Team,
    bowling: &Team,
    current: CurrentParticipants,
    balls: u32,
    mutations: &[Mutation],
) -> Result<(), ScoringError> {
    let totals = BatchTotals::of(mutations);
    let striker = &batting[current.striker].batting;
    let bowler = &bowling[current.bowler].bowling;

    let counters = [
        ("team runs", batting.runs(), totals.runs),
        ("batter runs", striker.runs_scored, totals.bat_runs),
        ("balls faced", striker.balls_faced, totals.strokes),
        ("runs conceded", bowler.runs_conceded, totals.runs),
        ("legal balls", bowler.legal_balls, totals.balls),
        ("innings balls", balls, totals.balls),
        ("wickets lost", batting.wickets_lost(), totals.wickets),
        ("wickets taken", bowling.wickets_taken(), totals.wickets),
        ("bowler wickets", bowler.wickets, totals.wickets),
    ];
    for (counter, value, added) in counters {
        if u64::from(value) + added > u64::from(u32::MAX) {
            return Err(ScoringError::CounterOverflow {
                counter: counter.to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::overs::FixedOverPolicy;

    const KKR: &str = "Kolkata Knight Riders";
    const RCB: &str = "Royal Challengers Bangalore";

    fn setup() -> Scorecard {
        let mut card = Scorecard::new(MatchId::new("335982"));
        card.register_team(KKR).unwrap();
        card.register_team(RCB).unwrap();
        for name in ["SC Ganguly", "BB McCullum", "RT Ponting"] {
            card.add_player(KKR, name).unwrap();
        }
        for name in ["P Kumar", "Z Khan"] {
            card.add_player(RCB, name).unwrap();
        }
        card.configure_overs(FixedOverPolicy::six_ball());
        card.set_current_participants("SC Ganguly", "BB McCullum", "P Kumar")
            .unwrap();
        card
    }

    #[test]
    fn test_runs_off_bat() {
        let mut card = setup();
        card.apply_runs_off_bat(4).unwrap();

        let striker = card.striker().unwrap();
        assert_eq!(striker.batting.runs_scored, 4);
        assert_eq!(striker.batting.balls_faced, 1);
        assert_eq!(striker.batting.boundary_count(4), 1);

        let bowler = card.bowler().unwrap();
        assert_eq!(bowler.bowling.runs_conceded, 4);
        assert_eq!(bowler.bowling.legal_balls, 0);

        assert_eq!(card.batting_team().unwrap().runs(), 4);
        assert!(card.check_invariants());
    }

    #[test]
    fn test_extra_goes_to_both_ledgers() {
        let mut card = setup();
        card.apply_extra(ExtraKind::Wides, 1).unwrap();

        let batting = card.batting_team().unwrap();
        let bowling = card.bowling_team().unwrap();
        assert_eq!(batting.runs(), 1);
        assert_eq!(batting.extras().get(&ExtraKind::Wides), Some(&1));
        assert_eq!(bowling.extras_conceded().get(&ExtraKind::Wides), Some(&1));
        assert_eq!(bowling.runs(), 0);

        let bowler = card.bowler().unwrap();
        assert_eq!(bowler.bowling.wides, 1);
        assert_eq!(bowler.bowling.runs_conceded, 1);
        assert_eq!(bowler.bowling.legal_balls, 0);
        assert_eq!(card.balls(), 0);
        assert!(card.check_invariants());
    }

    #[test]
    fn test_wicket_does_not_change_striker() {
        let mut card = setup();
        card.apply_wicket().unwrap();

        assert_eq!(card.batting_team().unwrap().wickets_lost(), 1);
        assert_eq!(card.bowling_team().unwrap().wickets_taken(), 1);
        assert_eq!(card.bowler().unwrap().bowling.wickets, 1);
        assert_eq!(card.striker().unwrap().name.as_str(), "SC Ganguly");
    }

    #[test]
    fn test_ball_bowled_advances_overs() {
        let mut card = setup();
        for _ in 0..7 {
            card.apply_ball_bowled().unwrap();
        }
        assert_eq!(card.balls(), 7);
        assert_eq!(card.overs().unwrap(), OverCount { overs: 1, balls: 1 });
        assert_eq!(card.bowler().unwrap().bowling.legal_balls, 7);
    }

    #[test]
    fn test_mutations_before_participants_rejected() {
        let mut card = Scorecard::new(MatchId::new("335982"));
        card.register_team(KKR).unwrap();
        card.register_team(RCB).unwrap();

        let err = card.apply_runs_off_bat(1).unwrap_err();
        assert_eq!(err, ScoringError::ParticipantsNotSet);
        assert_eq!(card.batting_team().unwrap().runs(), 0);
    }

    #[test]
    fn test_unknown_participant_leaves_previous_in_place() {
        let mut card = setup();
        let err = card
            .set_current_participants("RT Ponting", "BB McCullum", "A Kumble")
            .unwrap_err();
        assert!(matches!(
            err,
            ScoringError::Roster(RosterError::UnknownPlayer { .. })
        ));
        assert_eq!(card.striker().unwrap().name.as_str(), "SC Ganguly");
        assert_eq!(card.bowler().unwrap().name.as_str(), "P Kumar");
    }

    #[test]
    fn test_bowler_must_be_on_bowling_side() {
        let mut card = setup();
        let err = card
            .set_current_participants("SC Ganguly", "BB McCullum", "RT Ponting")
            .unwrap_err();
        assert_eq!(
            err,
            ScoringError::Roster(RosterError::UnknownPlayer {
                team: RCB.to_string(),
                name: "RT Ponting".to_string(),
            })
        );
    }

    #[test]
    fn test_third_team_rejected() {
        let mut card = setup();
        card.register_team(KKR).unwrap();
        let err = card.register_team("Deccan Chargers").unwrap_err();
        assert!(matches!(err, RosterError::TooManyTeams { .. }));
    }

    #[test]
    fn test_player_for_unknown_team_rejected() {
        let mut card = setup();
        let err = card.add_player("Deccan Chargers", "AC Gilchrist").unwrap_err();
        assert!(matches!(err, RosterError::UnknownTeam { .. }));
    }

    #[test]
    fn test_overs_without_policy() {
        let card = Scorecard::new(MatchId::new("335982"));
        assert_eq!(
            card.overs().unwrap_err(),
            ScoringError::Config(ConfigError::UnconfiguredOverPolicy)
        );
    }

    #[test]
    fn test_unsupported_balls_per_over() {
        let mut card = Scorecard::new(MatchId::new("335982"));
        let err = card
            .apply_info(&InfoEntry::BallsPerOver(7), &ScoringConfig::default())
            .unwrap_err();
        assert!(matches!(
            err,
            ScoringError::Config(ConfigError::UnsupportedOverLength { .. })
        ));
        assert!(card.balls_per_over().is_none());
    }

    #[test]
    fn test_default_over_length_from_config() {
        let config = ScoringConfig {
            default_balls_per_over: Some(8),
            ..ScoringConfig::default()
        };
        let card = Scorecard::from_config(MatchId::new("1"), &config).unwrap();
        assert_eq!(card.balls_per_over().map(NonZeroU32::get), Some(8));
    }

    #[test]
    fn test_swap_innings() {
        let mut card = setup();
        card.apply_runs_off_bat(6).unwrap();
        card.apply_ball_bowled().unwrap();

        card.swap_innings().unwrap();
        assert_eq!(card.innings(), 2);
        assert_eq!(card.balls(), 0);
        assert_eq!(card.batting_team().unwrap().name(), RCB);
        assert_eq!(card.bowling_team().unwrap().runs(), 6);
        assert!(card.striker().is_none());
        assert_eq!(
            card.apply_runs_off_bat(1).unwrap_err(),
            ScoringError::ParticipantsNotSet
        );

        card.set_current_participants("P Kumar", "Z Khan", "SC Ganguly")
            .unwrap();
        card.apply_runs_off_bat(1).unwrap();
        assert_eq!(card.batting_team().unwrap().runs(), 1);
        assert!(card.check_invariants());
    }

    #[test]
    fn test_align_batting_side_before_first_ball() {
        let mut card = setup();
        card.align_batting_side(KKR).unwrap();
        assert!(card.striker().is_some());

        card.align_batting_side(RCB).unwrap();
        assert_eq!(card.batting_team().unwrap().name(), RCB);
        assert_eq!(card.innings(), 1);
        assert!(card.striker().is_none());
    }

    #[test]
    fn test_align_batting_side_after_first_ball() {
        let mut card = setup();
        card.apply_ball_bowled().unwrap();
        let err = card.align_batting_side(RCB).unwrap_err();
        assert!(matches!(
            err,
            ScoringError::Roster(RosterError::BattingSideMismatch { .. })
        ));
        assert_eq!(card.batting_team().unwrap().name(), KKR);

        let err = card.align_batting_side("Deccan Chargers").unwrap_err();
        assert!(matches!(err, ScoringError::Roster(RosterError::UnknownTeam { .. })));
    }

    #[test]
    fn test_align_batting_side_after_wide() {
        let mut card = setup();
        card.apply_extra(ExtraKind::Wides, 1).unwrap();
        assert_eq!(card.balls(), 0);

        let err = card.align_batting_side(RCB).unwrap_err();
        assert!(matches!(
            err,
            ScoringError::Roster(RosterError::BattingSideMismatch { .. })
        ));
        assert_eq!(card.batting_team().unwrap().name(), KKR);
        assert_eq!(card.batting_team().unwrap().runs(), 1);
    }

    #[test]
    fn test_new_innings_may_be_aligned_again() {
        let mut card = setup();
        card.apply_ball_bowled().unwrap();
        card.swap_innings().unwrap();

        // RCB now bats; naming it again is a no-op, naming KKR still flips.
        card.align_batting_side(RCB).unwrap();
        card.align_batting_side(KKR).unwrap();
        assert_eq!(card.batting_team().unwrap().name(), KKR);
    }

    #[test]
    fn test_overflowing_runs_rejected() {
        let mut card = setup();
        card.apply(&[Mutation::RunsOffBat { runs: u32::MAX }, Mutation::BallBowled])
            .unwrap();

        let before = card.snapshot().unwrap();
        let err = card
            .apply(&[Mutation::RunsOffBat { runs: 1 }, Mutation::BallBowled])
            .unwrap_err();
        assert_eq!(
            err,
            ScoringError::CounterOverflow {
                counter: "team runs".to_string()
            }
        );
        assert_eq!(card.snapshot().unwrap(), before);
        assert!(card.check_invariants());
    }

    #[test]
    fn test_overflow_checked_across_the_whole_batch() {
        let mut card = setup();
        let err = card
            .apply(&[
                Mutation::RunsOffBat { runs: u32::MAX },
                Mutation::Extra {
                    kind: ExtraKind::Byes,
                    runs: 1,
                },
            ])
            .unwrap_err();
        assert!(matches!(err, ScoringError::CounterOverflow { .. }));
        assert_eq!(card.batting_team().unwrap().runs(), 0);
    }

    #[test]
    fn test_apply_delivery_flips_and_sets_participants() {
        let mut card = setup();
        let names = Participants::new("P Kumar", "Z Khan", "SC Ganguly");
        card.apply_delivery(Some(RCB), Some(&names), &[Mutation::RunsOffBat { runs: 2 }])
            .unwrap();

        assert_eq!(card.batting_team().unwrap().name(), RCB);
        assert_eq!(card.batting_team().unwrap().runs(), 2);
        assert_eq!(card.striker().unwrap().name.as_str(), "P Kumar");
        assert_eq!(card.bowler().unwrap().bowling.runs_conceded, 2);
    }

    #[test]
    fn test_apply_delivery_rejected_leaves_sides() {
        let mut card = setup();

        // Names resolved against the flipped sides; the bowler is unknown.
        let names = Participants::new("P Kumar", "Z Khan", "A Kumble");
        let err = card
            .apply_delivery(Some(RCB), Some(&names), &[Mutation::BallBowled])
            .unwrap_err();
        assert!(matches!(err, ScoringError::Roster(RosterError::UnknownPlayer { .. })));

        // Flipping without naming the new participants is rejected too.
        let err = card
            .apply_delivery(Some(RCB), None, &[Mutation::BallBowled])
            .unwrap_err();
        assert_eq!(err, ScoringError::ParticipantsNotSet);

        assert_eq!(card.batting_team().unwrap().name(), KKR);
        assert_eq!(card.striker().unwrap().name.as_str(), "SC Ganguly");
        assert_eq!(card.balls(), 0);
    }

    #[test]
    fn test_metadata() {
        let mut card = setup();
        let config = ScoringConfig::default();
        let later = NaiveDate::from_ymd_opt(2008, 4, 19).unwrap();
        let earlier = NaiveDate::from_ymd_opt(2008, 4, 18).unwrap();
        card.apply_info(&InfoEntry::Date(later), &config).unwrap();
        card.apply_info(&InfoEntry::Date(earlier), &config).unwrap();
        card.apply_info(&InfoEntry::City("Bangalore".into()), &config).unwrap();
        card.set_info("umpire", "Asad Rauf");
        card.set_info("umpire", "RE Koertzen");

        assert_eq!(card.metadata().date, Some(earlier));
        assert_eq!(card.metadata().city.as_deref(), Some("Bangalore"));
        assert_eq!(
            card.metadata().info.get("umpire").map(String::as_str),
            Some("Asad Rauf; RE Koertzen")
        );
    }
}
