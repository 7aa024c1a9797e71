//! Personal duel analysis: who killed "me" and whom "I" killed in one match.
//!
//! Each direction is resolved on its own:
//!   - my deaths  ← opponents' kill events   (who killed me)
//!   - my kills   → opponents' death events  (whom I killed)
//!
//! Pass 1 takes every "my" event with exactly one free opponent event in its
//! window and records it as certain. Pass 2 revisits the events that had
//! several candidates and settles them with `choose_best`; those attributions
//! are recorded as estimated. An opponent event is consumed at most once per
//! direction.

use crate::{
    event::{Event, EventKind},
    pair_reconstructor::{sorted_by_time, time_window},
    types::{compare_xuids, Gamertag, TimeMs, Xuid},
    validator::OfficialPlayerStats,
};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

pub const MISSING_IDENTITY_NOTE: &str = "missing identity";
pub const VALIDATION_UNAVAILABLE_NOTE: &str = "official stats unavailable; not validated";
pub const VALIDATED_NOTE: &str = "matches official stats";

/// A count split by how confidently each unit was attributed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstimatedCount {
    pub certain: u32,
    pub estimated: u32,
}

impl EstimatedCount {
    pub fn new(certain: u32, estimated: u32) -> Self {
        Self { certain, estimated }
    }

    pub fn total(&self) -> u32 {
        self.certain + self.estimated
    }
}

/// One opponent's duel record against "me" for a single match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpponentDuel {
    pub xuid: Xuid,
    pub gamertag: Gamertag,
    pub opponent_killed_me: EstimatedCount,
    pub me_killed_opponent: EstimatedCount,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AntagonistsResult {
    pub nemesis: Option<OpponentDuel>,
    pub bully: Option<OpponentDuel>,
    pub my_deaths_total: u32,
    pub my_deaths_assigned_certain: u32,
    pub my_deaths_assigned_total: u32,
    pub my_kills_total: u32,
    pub my_kills_assigned_certain: u32,
    pub my_kills_assigned_total: u32,
    pub is_validated: bool,
    pub validation_notes: String,
}

impl AntagonistsResult {
    fn empty(notes: &str) -> Self {
        Self {
            validation_notes: notes.to_string(),
            ..Self::default()
        }
    }

    /// True when the player had any kill or death in the match.
    pub fn has_events(&self) -> bool {
        self.my_deaths_total > 0 || self.my_kills_total > 0
    }
}

type Tally = HashMap<Xuid, EstimatedCount>;

/// Pick the opponent a contested event most plausibly belongs to.
///
/// Order of preference: most certain attributions so far in this direction,
/// then better (lower) match rank where known, then smallest id.
pub fn choose_best<'a>(
    candidates: &[&'a str],
    certain_tally: &Tally,
    ranks: &HashMap<Xuid, i64>,
) -> Option<&'a str> {
    let certain = |x: &str| certain_tally.get(x).map_or(0, |c| c.certain);
    candidates.iter().copied().min_by(|a, b| {
        certain(*b)
            .cmp(&certain(*a))
            .then_with(|| compare_ranks(ranks.get(*a), ranks.get(*b)))
            .then_with(|| compare_xuids(a, b))
    })
}

/// Known ranks beat unknown ones; lower rank is better.
fn compare_ranks(a: Option<&i64>, b: Option<&i64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.cmp(y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Attribute each of `mine` to at most one event of `theirs`.
fn resolve_direction(
    mine: &[&Event],
    theirs: &[&Event],
    tol: TimeMs,
    ranks: &HashMap<Xuid, i64>,
) -> Tally {
    let times: Vec<TimeMs> = theirs.iter().map(|e| e.time_ms).collect();
    let mut consumed = vec![false; theirs.len()];
    let mut tally = Tally::new();

    let open = |consumed: &[bool], t: TimeMs| -> Vec<usize> {
        time_window(&times, t, tol).filter(|&i| !consumed[i]).collect()
    };

    // Pass 1: unambiguous.
    let mut deferred = Vec::new();
    for event in mine {
        match open(&consumed, event.time_ms).as_slice() {
            [] => {}
            [only] => {
                consumed[*only] = true;
                tally.entry(theirs[*only].xuid.clone()).or_default().certain += 1;
            }
            _ => deferred.push(event.time_ms),
        }
    }

    // Pass 2: contested. Certain counts are frozen from here on.
    let certain_tally = tally.clone();
    for t in deferred {
        let candidates = open(&consumed, t);
        let ids: Vec<&str> = candidates.iter().map(|&i| theirs[i].xuid.as_str()).collect();
        let Some(chosen) = choose_best(&ids, &certain_tally, ranks) else {
            continue;
        };
        // Candidates are in time order, so the first hit is the earliest.
        if let Some(&i) = candidates.iter().find(|&&i| theirs[i].xuid == chosen) {
            consumed[i] = true;
            tally.entry(theirs[i].xuid.clone()).or_default().estimated += 1;
        }
    }

    tally
}

/// Opponent with the highest total; ties go to more certain, then smallest id.
fn top_opponent(tally: &Tally) -> Option<&Xuid> {
    tally
        .iter()
        .filter(|(xuid, count)| !xuid.is_empty() && count.total() > 0)
        .min_by(|(xa, a), (xb, b)| {
            b.total()
                .cmp(&a.total())
                .then_with(|| b.certain.cmp(&a.certain))
                .then_with(|| compare_xuids(xa, xb))
        })
        .map(|(xuid, _)| xuid)
}

/// Most recent non-empty gamertag seen for each player.
fn latest_gamertags(events: &[Event]) -> HashMap<&str, &str> {
    let mut latest: HashMap<&str, (TimeMs, &str)> = HashMap::new();
    for e in events.iter().filter(|e| !e.gamertag.is_empty()) {
        let slot = latest
            .entry(e.xuid.as_str())
            .or_insert((e.time_ms, e.gamertag.as_str()));
        if e.time_ms >= slot.0 {
            *slot = (e.time_ms, e.gamertag.as_str());
        }
    }
    latest.into_iter().map(|(x, (_, tag))| (x, tag)).collect()
}

fn sum(tally: &Tally) -> EstimatedCount {
    tally.values().fold(EstimatedCount::default(), |acc, c| {
        EstimatedCount::new(acc.certain + c.certain, acc.estimated + c.estimated)
    })
}

/// Compute the nemesis/bully picture for `me_xuid` in one match.
///
/// Never fails: an empty identity yields a zeroed result carrying
/// `MISSING_IDENTITY_NOTE`, and a disagreement with official stats is
/// reported through `validation_notes`.
pub fn analyze_personal_duels(
    events: &[Event],
    me_xuid: &str,
    tolerance_ms: TimeMs,
    official_stats: Option<&[OfficialPlayerStats]>,
) -> AntagonistsResult {
    let me = me_xuid.trim();
    if me.is_empty() {
        log::warn!("duels: no player identity supplied, returning empty result");
        return AntagonistsResult::empty(MISSING_IDENTITY_NOTE);
    }
    let tol = tolerance_ms.max(0);
    let official = official_stats.unwrap_or_default();

    let ranks: HashMap<Xuid, i64> = official
        .iter()
        .filter_map(|s| s.rank.map(|r| (s.xuid.clone(), r)))
        .collect();

    let kills = sorted_by_time(events, EventKind::Kill);
    let deaths = sorted_by_time(events, EventKind::Death);
    let (my_kills, their_kills): (Vec<&Event>, Vec<&Event>) =
        kills.into_iter().partition(|e| e.xuid == me);
    let (my_deaths, their_deaths): (Vec<&Event>, Vec<&Event>) =
        deaths.into_iter().partition(|e| e.xuid == me);

    let killed_me = resolve_direction(&my_deaths, &their_kills, tol, &ranks);
    let killed_by_me = resolve_direction(&my_kills, &their_deaths, tol, &ranks);

    let tags = latest_gamertags(events);
    let duel_with = |xuid: &Xuid| OpponentDuel {
        xuid: xuid.clone(),
        gamertag: tags.get(xuid.as_str()).map(|t| t.to_string()).unwrap_or_default(),
        opponent_killed_me: killed_me.get(xuid).copied().unwrap_or_default(),
        me_killed_opponent: killed_by_me.get(xuid).copied().unwrap_or_default(),
    };

    let deaths_assigned = sum(&killed_me);
    let kills_assigned = sum(&killed_by_me);

    let mut result = AntagonistsResult {
        nemesis: top_opponent(&killed_me).map(duel_with),
        bully: top_opponent(&killed_by_me).map(duel_with),
        my_deaths_total: my_deaths.len() as u32,
        my_deaths_assigned_certain: deaths_assigned.certain,
        my_deaths_assigned_total: deaths_assigned.total(),
        my_kills_total: my_kills.len() as u32,
        my_kills_assigned_certain: kills_assigned.certain,
        my_kills_assigned_total: kills_assigned.total(),
        is_validated: false,
        validation_notes: String::new(),
    };

    validate_personal(&mut result, me, official);

    log::debug!(
        "player={me} duels: deaths {}/{} assigned ({} certain), kills {}/{} assigned ({} certain), nemesis={:?} bully={:?}",
        result.my_deaths_assigned_total,
        result.my_deaths_total,
        result.my_deaths_assigned_certain,
        result.my_kills_assigned_total,
        result.my_kills_total,
        result.my_kills_assigned_certain,
        result.nemesis.as_ref().map(|d| d.xuid.as_str()),
        result.bully.as_ref().map(|d| d.xuid.as_str()),
    );
    result
}

fn validate_personal(result: &mut AntagonistsResult, me: &str, official: &[OfficialPlayerStats]) {
    let Some(stats) = official.iter().find(|s| s.xuid == me) else {
        result.is_validated = false;
        result.validation_notes = VALIDATION_UNAVAILABLE_NOTE.to_string();
        return;
    };

    let kills_delta = i64::from(result.my_kills_assigned_total) - stats.kills;
    let deaths_delta = i64::from(result.my_deaths_assigned_total) - stats.deaths;
    if kills_delta == 0 && deaths_delta == 0 {
        result.is_validated = true;
        result.validation_notes = VALIDATED_NOTE.to_string();
        return;
    }

    result.is_validated = false;
    result.validation_notes = format!(
        "kills {} vs official {} ({kills_delta:+}); deaths {} vs official {} ({deaths_delta:+})",
        result.my_kills_assigned_total, stats.kills, result.my_deaths_assigned_total, stats.deaths,
    );
    log::info!("player={me} validation mismatch: {}", result.validation_notes);
}
