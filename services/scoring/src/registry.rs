//! Match registry
//!
//! Keyed store of live scorecards. Each scorecard sits behind its own lock,
//! so events for different matches proceed in parallel while a single
//! match sees one event at a time. Entries live for the life of the
//! registry; there is no eviction.

use std::sync::{Arc, Mutex};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::{error, info};
use types::errors::ScoringError;
use types::ids::MatchId;

use crate::scorecard::Scorecard;
use crate::snapshot::ScorecardSnapshot;

/// Shared handle to one match's scorecard and its lock.
pub type MatchHandle = Arc<Mutex<Scorecard>>;

#[derive(Debug, Default)]
pub struct MatchRegistry {
    matches: DashMap<MatchId, MatchHandle>,
}

impl MatchRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle for an existing match.
    pub fn get(&self, match_id: &MatchId) -> Option<MatchHandle> {
        self.matches.get(match_id).map(|entry| Arc::clone(entry.value()))
    }

    /// Handle for an existing match, or `UnknownMatch`.
    pub fn require(&self, match_id: &MatchId) -> Result<MatchHandle, ScoringError> {
        self.get(match_id).ok_or_else(|| ScoringError::UnknownMatch {
            match_id: match_id.to_string(),
        })
    }

    /// Handle for a match, creating its scorecard on first sight.
    ///
    /// Returns the handle and whether it was created by this call. If
    /// `create` fails nothing is inserted.
    pub fn get_or_create<F>(
        &self,
        match_id: &MatchId,
        create: F,
    ) -> Result<(MatchHandle, bool), ScoringError>
    where
        F: FnOnce() -> Result<Scorecard, ScoringError>,
    {
        match self.matches.entry(match_id.clone()) {
            Entry::Occupied(entry) => Ok((Arc::clone(entry.get()), false)),
            Entry::Vacant(entry) => {
                let handle = Arc::new(Mutex::new(create()?));
                entry.insert(Arc::clone(&handle));
                info!(match_id = %match_id, "Match scorecard created");
                Ok((handle, true))
            }
        }
    }

    /// Run `f` with exclusive access to an existing match.
    pub fn with_match<R, F>(&self, match_id: &MatchId, f: F) -> Result<R, ScoringError>
    where
        F: FnOnce(&mut Scorecard) -> Result<R, ScoringError>,
    {
        let handle = self.require(match_id)?;
        Self::with_handle(match_id, &handle, f)
    }

    /// Run `f` with exclusive access to the scorecard behind `handle`.
    pub fn with_handle<R, F>(match_id: &MatchId, handle: &MatchHandle, f: F) -> Result<R, ScoringError>
    where
        F: FnOnce(&mut Scorecard) -> Result<R, ScoringError>,
    {
        let mut card = handle.lock().map_err(|_| {
            error!(match_id = %match_id, "Scorecard lock poisoned");
            ScoringError::MatchPoisoned {
                match_id: match_id.to_string(),
            }
        })?;
        f(&mut card)
    }

    /// Snapshot of one match, taken under its lock.
    pub fn snapshot(&self, match_id: &MatchId) -> Result<ScorecardSnapshot, ScoringError> {
        self.with_match(match_id, |card| card.snapshot())
    }

    pub fn contains(&self, match_id: &MatchId) -> bool {
        self.matches.contains_key(match_id)
    }

    /// Known match ids, sorted.
    pub fn match_ids(&self) -> Vec<MatchId> {
        let mut ids: Vec<MatchId> = self.matches.iter().map(|entry| entry.key().clone()).collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}
