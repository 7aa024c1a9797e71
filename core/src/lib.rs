//! Killer/victim reconstruction and antagonist aggregation.
//!
//! Telemetry carries kill and death events with no link between them. This
//! crate pairs them up inside a tolerance window, works out who a player's
//! nemesis and bully were in each match, checks the result against official
//! stats, and folds a match history into per-opponent rival records.

pub mod aggregator;
pub mod batch;
pub mod config;
pub mod duel_analyzer;
pub mod error;
pub mod event;
pub mod pair_reconstructor;
pub mod store;
pub mod types;
pub mod validator;

pub use aggregator::{aggregate, AggregationResult, AntagonistAggregator, AntagonistEntry};
pub use duel_analyzer::{
    analyze_personal_duels, choose_best, AntagonistsResult, EstimatedCount, OpponentDuel,
};
pub use event::{normalize_events, Event, EventKind, RawEvent};
pub use pair_reconstructor::{reconstruct_pairs, KillVictimPair};
pub use validator::{validate_against_official, OfficialPlayerStats, ValidationResult};
