//! Event dispatcher
//!
//! Routes each event to its match's scorecard and applies it under the
//! match lock:
//!
//! - `Info` → create the scorecard on first sight, apply the setup fact
//! - `Participants` → resolve and set striker, non-striker, bowler
//! - `Delivery` → align the batting side and set the ball's participants
//!   if given, then classify and apply
//! - `InningsBreak` → swap batting and bowling sides
//!
//! Only setup events create matches; anything else for an unknown match is
//! rejected. A rejected event leaves the scorecard untouched: a delivery's
//! batting side, participants and mutations are all validated before any
//! of them is committed.

use std::sync::Arc;

use tracing::{debug, warn};
use types::errors::ScoringError;
use types::ids::MatchId;

use crate::classifier::classify;
use crate::config::ScoringConfig;
use crate::events::{Delivery, EventPayload, MatchEvent};
use crate::metrics::{error_kind, EngineMetrics};
use crate::registry::MatchRegistry;
use crate::scorecard::{Mutation, Scorecard};

/// Result of applying one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub match_id: MatchId,
    /// Whether this event created the match's scorecard.
    pub created: bool,
    /// Mutations applied, in order. Empty for setup and participant events.
    pub mutations: Vec<Mutation>,
}

/// Applies events to the scorecards held by a registry.
pub struct Dispatcher<'r> {
    registry: &'r MatchRegistry,
    config: ScoringConfig,
    metrics: Arc<EngineMetrics>,
}

impl<'r> Dispatcher<'r> {
    pub fn new(registry: &'r MatchRegistry, config: ScoringConfig) -> Self {
        Self {
            registry,
            config,
            metrics: Arc::new(EngineMetrics::new()),
        }
    }

    /// Share an existing metrics sink.
    pub fn with_metrics(mut self, metrics: Arc<EngineMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn registry(&self) -> &MatchRegistry {
        self.registry
    }

    pub fn metrics(&self) -> &EngineMetrics {
        &self.metrics
    }

    /// Apply one event.
    pub fn dispatch(&self, event: &MatchEvent) -> Result<DispatchOutcome, ScoringError> {
        let result = self.dispatch_inner(event);
        match &result {
            Ok(outcome) => {
                self.metrics.record_applied(outcome.mutations.len());
                debug!(
                    match_id = %event.match_id,
                    event_type = event.event_type_label(),
                    mutations = outcome.mutations.len(),
                    "Event applied"
                );
            }
            Err(err) => {
                self.metrics.record_rejected(err);
                warn!(
                    match_id = %event.match_id,
                    event_type = event.event_type_label(),
                    kind = error_kind(err),
                    error = %err,
                    "Event rejected"
                );
            }
        }
        result
    }

    fn dispatch_inner(&self, event: &MatchEvent) -> Result<DispatchOutcome, ScoringError> {
        let match_id = &event.match_id;

        let (handle, created) = if event.is_setup() {
            self.registry.get_or_create(match_id, || {
                Scorecard::from_config(match_id.clone(), &self.config)
            })?
        } else {
            (self.registry.require(match_id)?, false)
        };
        if created {
            self.metrics.record_match_created();
        }

        let mutations = MatchRegistry::with_handle(match_id, &handle, |card| {
            self.apply(card, &event.payload)
        })?;

        Ok(DispatchOutcome {
            match_id: match_id.clone(),
            created,
            mutations,
        })
    }

    fn apply(&self, card: &mut Scorecard, payload: &EventPayload) -> Result<Vec<Mutation>, ScoringError> {
        let mut ball = None;
        let mutations = match payload {
            EventPayload::Info { entry } => {
                card.apply_info(entry, &self.config)?;
                Vec::new()
            }
            EventPayload::Participants(participants) => {
                card.set_current_participants(
                    participants.striker.as_str(),
                    participants.non_striker.as_str(),
                    participants.bowler.as_str(),
                )?;
                Vec::new()
            }
            EventPayload::Delivery(delivery) => {
                let mutations = Self::apply_delivery(card, delivery)?;
                ball = delivery.ball.as_deref();
                mutations
            }
            EventPayload::InningsBreak => {
                card.swap_innings()?;
                Vec::new()
            }
        };
        card.record_event(ball);
        Ok(mutations)
    }

    fn apply_delivery(card: &mut Scorecard, delivery: &Delivery) -> Result<Vec<Mutation>, ScoringError> {
        if let Some(innings) = delivery.innings.filter(|&n| n != card.innings()) {
            warn!(
                match_id = %card.match_id(),
                reported = innings,
                current = card.innings(),
                "Delivery innings does not match scorecard innings"
            );
        }
        let mutations = classify(delivery);
        card.apply_delivery(
            delivery.batting_team.as_deref(),
            delivery.participants.as_ref(),
            &mutations,
        )?;
        Ok(mutations)
    }
}
