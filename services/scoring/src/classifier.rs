//! Delivery classification
//!
//! Turns one delivery into the ordered list of scorecard mutations it
//! implies. Outcomes are not mutually exclusive (a bye can be run on the
//! same ball as a run-out), so every rule is evaluated; none short-circuits.

use crate::events::Delivery;
use crate::scorecard::Mutation;

/// Classification rules, evaluated in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Runs off the bat present and > 0.
    RunsOffBat,
    /// Any extras category present and > 0, one mutation per category.
    Extras,
    /// Wicket type present and non-empty.
    Wicket,
    /// The delivery was legal: no wide and no no-ball was called.
    LegalDelivery,
}

impl Rule {
    pub const ALL: [Rule; 4] = [
        Rule::RunsOffBat,
        Rule::Extras,
        Rule::Wicket,
        Rule::LegalDelivery,
    ];

    /// Append this rule's mutations for `delivery` to `out`.
    pub fn emit(&self, delivery: &Delivery, out: &mut Vec<Mutation>) {
        match self {
            Rule::RunsOffBat => {
                if let Some(runs) = delivery.runs_off_bat.filter(|&runs| runs > 0) {
                    out.push(Mutation::RunsOffBat { runs });
                }
            }
            Rule::Extras => {
                out.extend(
                    delivery
                        .extras
                        .present()
                        .map(|(kind, runs)| Mutation::Extra { kind, runs }),
                );
            }
            Rule::Wicket => {
                if delivery.has_wicket() {
                    out.push(Mutation::Wicket);
                }
            }
            Rule::LegalDelivery => {
                if !delivery.extras.voids_delivery() {
                    out.push(Mutation::BallBowled);
                }
            }
        }
    }
}

/// Classify a delivery into scorecard mutations.
pub fn classify(delivery: &Delivery) -> Vec<Mutation> {
    let mut mutations = Vec::with_capacity(4);
    for rule in Rule::ALL {
        rule.emit(delivery, &mut mutations);
    }
    mutations
}
