//! Scoring Service
//!
//! Consumes ball-by-ball provider events and maintains a live scorecard per
//! match:
//! - Match setup (teams, rosters, over length, metadata)
//! - Delivery classification into scorecard mutations
//! - Batting, bowling and team aggregates with extras ledgers
//! - Checksummed scorecard snapshots after every applied event
//! - Cricsheet CSV decoding for replaying recorded matches
//!
//! # Architecture
//!
//! ```text
//!   Provider feed (CSV rows / JSON events)
//!          │
//!      ┌───▼───┐
//!      │ Feed  │  ← Decodes rows into typed events
//!      └───┬───┘
//!          │
//!   ┌──────▼─────┐
//!   │ Dispatcher │  ← Routes by match id, one lock per match
//!   └──────┬─────┘
//!          │
//!   ┌──────▼─────┐     ┌────────────┐
//!   │ Classifier ├────►│ Scorecard  │
//!   └────────────┘     └─────┬──────┘
//!                            │
//!                     ┌──────▼─────┐
//!                     │  Snapshot  │
//!                     └────────────┘
//! ```

pub mod classifier;
pub mod config;
pub mod dispatcher;
pub mod events;
pub mod feed;
pub mod metrics;
pub mod registry;
pub mod scorecard;
pub mod snapshot;

pub use classifier::classify;
pub use config::ScoringConfig;
pub use dispatcher::{DispatchOutcome, Dispatcher};
pub use events::{Delivery, EventPayload, Extras, InfoEntry, MatchEvent, Participants};
pub use metrics::{EngineMetrics, MetricsSnapshot};
pub use registry::MatchRegistry;
pub use scorecard::{Mutation, Scorecard};
pub use snapshot::ScorecardSnapshot;

// Library version
pub const SERVICE_VERSION: &str = "0.1.0";
