//! Team roster and team-level aggregates
//!
//! A team only tracks its own totals. Which player a ball is credited to is
//! decided by the scorecard, since only it knows who is on strike.
//!
//! Both sides keep an extras ledger. The batting side records extras it
//! scored (these count towards its total); the bowling side records the same
//! extras as conceded, in a separate ledger that never feeds its total.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::ops::{Index, IndexMut};

use crate::errors::RosterError;
use crate::extras::ExtraKind;
use crate::ids::PlayerName;
use crate::player::Player;

/// A team in one match
///
/// Invariant: runs = Σ roster batting runs + Σ extras
#[derive(Debug, Clone, Serialize)]
pub struct Team {
    name: String,
    /// Roster in the order players were first referenced.
    players: Vec<Player>,
    #[serde(skip)]
    index: HashMap<PlayerName, usize>,
    runs: u32,
    wickets_lost: u32,
    wickets_taken: u32,
    extras: BTreeMap<ExtraKind, u32>,
    extras_conceded: BTreeMap<ExtraKind, u32>,
}

impl Team {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            players: Vec::new(),
            index: HashMap::new(),
            runs: 0,
            wickets_lost: 0,
            wickets_taken: 0,
            extras: BTreeMap::new(),
            extras_conceded: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add a player by name, or return the existing roster position.
    ///
    /// Re-adding a known name never duplicates the entry or resets stats.
    pub fn add_player(&mut self, name: impl Into<PlayerName>) -> usize {
        let name = name.into();
        if let Some(&position) = self.index.get(&name) {
            return position;
        }
        let position = self.players.len();
        self.index.insert(name.clone(), position);
        self.players.push(Player::new(name));
        position
    }

    /// Roster position of a player.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(&PlayerName::new(name)).copied()
    }

    /// Roster position of a player, or `UnknownPlayer`.
    pub fn require(&self, name: &str) -> Result<usize, RosterError> {
        self.position(name).ok_or_else(|| RosterError::UnknownPlayer {
            team: self.name.clone(),
            name: name.to_string(),
        })
    }

    pub fn player(&self, name: &str) -> Option<&Player> {
        self.position(name).map(|position| &self.players[position])
    }

    pub fn player_at(&self, position: usize) -> Option<&Player> {
        self.players.get(position)
    }

    pub fn player_at_mut(&mut self, position: usize) -> Option<&mut Player> {
        self.players.get_mut(position)
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn record_run(&mut self, runs: u32) {
        self.runs += runs;
    }

    /// Record an extra scored by this team; counts towards the total.
    pub fn record_extra(&mut self, kind: ExtraKind, runs: u32) {
        *self.extras.entry(kind).or_insert(0) += runs;
        self.runs += runs;
    }

    /// Record an extra conceded while bowling.
    pub fn record_extra_conceded(&mut self, kind: ExtraKind, runs: u32) {
        *self.extras_conceded.entry(kind).or_insert(0) += runs;
    }

    pub fn record_wicket(&mut self) {
        self.wickets_lost += 1;
    }

    pub fn record_wicket_taken(&mut self) {
        self.wickets_taken += 1;
    }

    pub fn runs(&self) -> u32 {
        self.runs
    }

    pub fn wickets_lost(&self) -> u32 {
        self.wickets_lost
    }

    pub fn wickets_taken(&self) -> u32 {
        self.wickets_taken
    }

    pub fn extras(&self) -> &BTreeMap<ExtraKind, u32> {
        &self.extras
    }

    pub fn extras_conceded(&self) -> &BTreeMap<ExtraKind, u32> {
        &self.extras_conceded
    }

    pub fn extras_total(&self) -> u32 {
        self.extras.values().sum()
    }

    /// Check invariant: runs = Σ batting runs + Σ extras
    pub fn check_invariant(&self) -> bool {
        let batting: u64 = self.players.iter().map(|p| u64::from(p.batting.runs_scored)).sum();
        let extras: u64 = self.extras.values().map(|&runs| u64::from(runs)).sum();
        u64::from(self.runs) == batting + extras
    }
}

/// Roster access by position.
///
/// # Panics
/// Panics if `position` is not on the roster
impl Index<usize> for Team {
    type Output = Player;

    fn index(&self, position: usize) -> &Player {
        &self.players[position]
    }
}

impl IndexMut<usize> for Team {
    fn index_mut(&mut self, position: usize) -> &mut Player {
        &mut self.players[position]
    }
}
