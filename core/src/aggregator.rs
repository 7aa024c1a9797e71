//! Cross-match antagonist aggregation.
//!
//! Folds one player's per-match duel results into durable per-opponent
//! records. Only the match nemesis and bully are carried per match, so an
//! opponent's entry grows whenever they held one of those roles.

use crate::{
    duel_analyzer::{AntagonistsResult, OpponentDuel},
    types::{compare_xuids, Gamertag, Xuid},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AntagonistEntry {
    pub opponent_xuid: Xuid,
    pub opponent_gamertag: Gamertag,
    /// Times "me" killed this opponent.
    pub times_killed: u32,
    /// Times this opponent killed "me".
    pub times_killed_by: u32,
    pub matches_against: u32,
    pub last_encounter: DateTime<Utc>,
}

impl AntagonistEntry {
    fn first_seen(duel: &OpponentDuel, played_at: DateTime<Utc>) -> Self {
        Self {
            opponent_xuid: duel.xuid.clone(),
            opponent_gamertag: duel.gamertag.clone(),
            times_killed: 0,
            times_killed_by: 0,
            matches_against: 0,
            last_encounter: played_at,
        }
    }

    pub fn net_kills(&self) -> i64 {
        i64::from(self.times_killed) - i64::from(self.times_killed_by)
    }

    pub fn total_duels(&self) -> u32 {
        self.times_killed + self.times_killed_by
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationResult {
    pub entries: Vec<AntagonistEntry>,
    pub matches_processed: u32,
    pub matches_with_events: u32,
    pub matches_with_errors: u32,
    pub total_duels_found: u32,
}

impl AggregationResult {
    pub fn entry(&self, opponent_xuid: &str) -> Option<&AntagonistEntry> {
        self.entries.iter().find(|e| e.opponent_xuid == opponent_xuid)
    }

    /// Opponents who killed "me" most. Ties: fewer times killed by "me" first.
    pub fn top_nemeses(&self, n: usize) -> Vec<&AntagonistEntry> {
        self.ranked(n, |e| (Reverse(e.times_killed_by), e.times_killed))
    }

    /// Opponents "me" killed most. Ties: fewer times killed by them first.
    pub fn top_victims(&self, n: usize) -> Vec<&AntagonistEntry> {
        self.ranked(n, |e| (Reverse(e.times_killed), e.times_killed_by))
    }

    /// Opponents with the most duels either way. Ties: more matches first.
    pub fn top_rivals(&self, n: usize) -> Vec<&AntagonistEntry> {
        self.ranked(n, |e| (Reverse(e.total_duels()), Reverse(e.matches_against)))
    }

    fn ranked<K, F>(&self, n: usize, key: F) -> Vec<&AntagonistEntry>
    where
        K: Ord,
        F: Fn(&AntagonistEntry) -> K,
    {
        let mut ranked: Vec<&AntagonistEntry> = self.entries.iter().collect();
        ranked.sort_by(|a, b| {
            key(*a)
                .cmp(&key(*b))
                .then_with(|| compare_xuids(&a.opponent_xuid, &b.opponent_xuid))
        });
        ranked.truncate(n);
        ranked
    }
}

/// Accumulates match results for one player.
///
/// Feed matches in chronological order; `last_encounter` keeps the latest
/// match time seen and equal times resolve to the later-fed match.
#[derive(Debug, Default)]
pub struct AntagonistAggregator {
    entries: HashMap<Xuid, AntagonistEntry>,
    matches_processed: u32,
    matches_with_events: u32,
    matches_with_errors: u32,
    total_duels_found: u32,
}

impl AntagonistAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, played_at: DateTime<Utc>, result: &AntagonistsResult) {
        self.matches_processed += 1;
        if result.has_events() {
            self.matches_with_events += 1;
        }

        if let Some(nemesis) = &result.nemesis {
            self.apply(played_at, nemesis);
        }
        // A bully who is also the nemesis was fully counted above.
        if let Some(bully) = &result.bully {
            let same_as_nemesis = result
                .nemesis
                .as_ref()
                .is_some_and(|n| n.xuid == bully.xuid);
            if !same_as_nemesis {
                self.apply(played_at, bully);
            }
        }
    }

    /// Count a match that could not be analyzed.
    pub fn record_error(&mut self) {
        self.matches_processed += 1;
        self.matches_with_errors += 1;
    }

    fn apply(&mut self, played_at: DateTime<Utc>, duel: &OpponentDuel) {
        let entry = self
            .entries
            .entry(duel.xuid.clone())
            .or_insert_with(|| AntagonistEntry::first_seen(duel, played_at));

        entry.times_killed_by += duel.opponent_killed_me.total();
        entry.times_killed += duel.me_killed_opponent.total();
        entry.matches_against += 1;
        if played_at >= entry.last_encounter {
            entry.last_encounter = played_at;
            if !duel.gamertag.is_empty() {
                entry.opponent_gamertag = duel.gamertag.clone();
            }
        }
        self.total_duels_found += 1;
    }

    /// Drop opponents met in fewer than `min_encounters` matches.
    pub fn finish(self, min_encounters: u32) -> AggregationResult {
        let min = min_encounters.max(1);
        let seen = self.entries.len();
        let mut entries: Vec<AntagonistEntry> = self
            .entries
            .into_values()
            .filter(|e| e.matches_against >= min)
            .collect();
        entries.sort_by(|a, b| compare_xuids(&a.opponent_xuid, &b.opponent_xuid));

        log::info!(
            "aggregate: {} matches ({} with events, {} errors), {} duels, kept {}/{} opponents (min_encounters={min})",
            self.matches_processed,
            self.matches_with_events,
            self.matches_with_errors,
            self.total_duels_found,
            entries.len(),
            seen,
        );

        AggregationResult {
            entries,
            matches_processed: self.matches_processed,
            matches_with_events: self.matches_with_events,
            matches_with_errors: self.matches_with_errors,
            total_duels_found: self.total_duels_found,
        }
    }
}

/// Aggregate an ordered match history for one player.
pub fn aggregate(
    match_results: &[(DateTime<Utc>, AntagonistsResult)],
    min_encounters: u32,
) -> AggregationResult {
    let mut aggregator = AntagonistAggregator::new();
    for (played_at, result) in match_results {
        aggregator.record(*played_at, result);
    }
    aggregator.finish(min_encounters)
}
