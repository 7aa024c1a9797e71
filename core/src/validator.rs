//! Cross-check of reconstructed totals against official per-match stats.
//!
//! Official stats only ever validate a reconstruction. They never feed into it.

use crate::{
    pair_reconstructor::KillVictimPair,
    types::{compare_xuids, Xuid},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Authoritative per-player totals for one match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfficialPlayerStats {
    pub xuid: Xuid,
    pub kills: i64,
    pub deaths: i64,
    /// Final standing in the match, 1 = best. Absent for some playlists.
    #[serde(default)]
    pub rank: Option<i64>,
}

impl OfficialPlayerStats {
    pub fn new(xuid: impl Into<Xuid>, kills: i64, deaths: i64) -> Self {
        Self {
            xuid: xuid.into(),
            kills,
            deaths,
            rank: None,
        }
    }

    pub fn with_rank(mut self, rank: i64) -> Self {
        self.rank = Some(rank);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub xuid: Xuid,
    pub kills_reconstituted: i64,
    pub kills_official: i64,
    pub deaths_reconstituted: i64,
    pub deaths_official: i64,
}

impl ValidationResult {
    pub fn kills_diff(&self) -> i64 {
        self.kills_reconstituted - self.kills_official
    }

    pub fn deaths_diff(&self) -> i64 {
        self.deaths_reconstituted - self.deaths_official
    }

    pub fn is_consistent(&self) -> bool {
        self.kills_diff() == 0 && self.deaths_diff() == 0
    }
}

/// Compare per-player pair counts with official totals.
///
/// Returns one result per player seen on either side, ordered by id, and
/// whether every one of them agrees. With no official stats there is nothing
/// to contradict: `([], true)`.
pub fn validate_against_official(
    pairs: &[KillVictimPair],
    official: &[OfficialPlayerStats],
) -> (Vec<ValidationResult>, bool) {
    if official.is_empty() {
        return (Vec::new(), true);
    }

    // (kills, deaths) per player. Unnamed sides cannot be checked.
    let mut reconstructed: HashMap<&str, (i64, i64)> = HashMap::new();
    for pair in pairs {
        if !pair.killer_xuid.is_empty() {
            reconstructed.entry(pair.killer_xuid.as_str()).or_default().0 += 1;
        }
        if !pair.victim_xuid.is_empty() {
            reconstructed.entry(pair.victim_xuid.as_str()).or_default().1 += 1;
        }
    }

    let official_by_xuid: HashMap<&str, &OfficialPlayerStats> =
        official.iter().map(|s| (s.xuid.as_str(), s)).collect();

    let mut xuids: Vec<&str> = reconstructed
        .keys()
        .chain(official_by_xuid.keys())
        .copied()
        .collect();
    xuids.sort_by(|a, b| compare_xuids(a, b));
    xuids.dedup();

    let results: Vec<ValidationResult> = xuids
        .into_iter()
        .map(|xuid| {
            let (kills, deaths) = reconstructed.get(xuid).copied().unwrap_or_default();
            let (kills_official, deaths_official) = official_by_xuid
                .get(xuid)
                .map(|s| (s.kills, s.deaths))
                .unwrap_or_default();
            ValidationResult {
                xuid: xuid.to_string(),
                kills_reconstituted: kills,
                kills_official,
                deaths_reconstituted: deaths,
                deaths_official,
            }
        })
        .collect();

    let consistent = results.iter().all(ValidationResult::is_consistent);
    if !consistent {
        let off = results.iter().filter(|r| !r.is_consistent()).count();
        log::info!("validation: {off} of {} players disagree with official stats", results.len());
    }
    (results, consistent)
}
