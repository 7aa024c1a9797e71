//! Batch runner over one player's match history.
//!
//! Matches arrive as loosely-typed JSON. Each is parsed and analyzed on its
//! own; a match whose envelope cannot be parsed is logged, counted, and
//! skipped, and never affects the others. A bad event record only costs
//! that record. Parsed matches are ordered by `played_at`
//! (stable, so equal times keep input order) before aggregation.

use crate::{
    aggregator::{AggregationResult, AntagonistAggregator},
    config::DuelConfig,
    duel_analyzer::{analyze_personal_duels, AntagonistsResult},
    error::{DuelError, DuelResult},
    event::{deserialize_records, normalize_events, Event, RawEvent},
    pair_reconstructor::{reconstruct_pairs, KillVictimPair},
    validator::OfficialPlayerStats,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

/// One match as delivered by ingestion.
#[derive(Debug, Clone, Deserialize)]
pub struct MatchInput {
    pub match_id: String,
    pub played_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "deserialize_records")]
    pub events: Vec<RawEvent>,
    #[serde(default)]
    pub official_stats: Vec<OfficialPlayerStats>,
}

impl MatchInput {
    pub fn from_value(value: &Value) -> DuelResult<Self> {
        let match_id = value
            .get("match_id")
            .and_then(Value::as_str)
            .unwrap_or("<unknown>")
            .to_string();
        serde_json::from_value(value.clone()).map_err(|e| DuelError::MalformedMatch {
            match_id,
            reason: e.to_string(),
        })
    }

    /// Usable events only.
    pub fn events(&self) -> Vec<Event> {
        normalize_events(&self.events)
    }

    pub fn official(&self) -> Option<&[OfficialPlayerStats]> {
        (!self.official_stats.is_empty()).then_some(self.official_stats.as_slice())
    }
}

/// Parse every match; returns the usable ones and the count that failed.
pub fn parse_matches(values: &[Value]) -> (Vec<MatchInput>, u32) {
    let mut parsed = Vec::with_capacity(values.len());
    let mut errors = 0;
    for value in values {
        match MatchInput::from_value(value) {
            Ok(m) => parsed.push(m),
            Err(e) => {
                log::warn!("batch: skipping match: {e}");
                errors += 1;
            }
        }
    }
    (parsed, errors)
}

pub struct DuelBatch {
    config: DuelConfig,
}

impl DuelBatch {
    pub fn new(config: DuelConfig) -> DuelResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn analyze(&self, input: &MatchInput, player_xuid: &str) -> AntagonistsResult {
        let events = input.events();
        log::debug!(
            "match={} analyzing {} events for player={player_xuid}",
            input.match_id,
            events.len()
        );
        analyze_personal_duels(&events, player_xuid, self.config.tolerance_ms, input.official())
    }

    /// Reconstructed pairs of one match, for audit storage.
    pub fn audit_pairs(&self, input: &MatchInput) -> Vec<KillVictimPair> {
        reconstruct_pairs(&input.events(), self.config.tolerance_ms)
    }

    /// Parse, analyze and aggregate a raw match history.
    pub fn run(&self, player_xuid: &str, matches: &[Value]) -> AggregationResult {
        let (inputs, errors) = parse_matches(matches);
        self.aggregate_matches(player_xuid, &inputs, errors)
    }

    /// Analyze and aggregate already-parsed matches. `parse_errors` counts
    /// matches the caller had to drop before getting here.
    pub fn aggregate_matches(
        &self,
        player_xuid: &str,
        inputs: &[MatchInput],
        parse_errors: u32,
    ) -> AggregationResult {
        let mut aggregator = AntagonistAggregator::new();
        for _ in 0..parse_errors {
            aggregator.record_error();
        }

        let mut ordered: Vec<&MatchInput> = inputs.iter().collect();
        ordered.sort_by_key(|m| m.played_at);

        for input in ordered {
            let result = self.analyze(input, player_xuid);
            if !result.is_validated && input.official().is_some() {
                log::debug!("match={} {}", input.match_id, result.validation_notes);
            }
            aggregator.record(input.played_at, &result);
        }
        aggregator.finish(self.config.min_encounters)
    }
}
