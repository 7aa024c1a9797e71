//! Kill→victim pair reconstruction.
//!
//! Telemetry records kills and deaths as two unrelated streams. A kill and a
//! death that land within `tolerance_ms` of each other are taken to be the
//! same engagement. Kills are walked in time order; each takes the closest
//! still-unused death in its window. Every death is used at most once.

use crate::{
    event::{Event, EventKind},
    types::{Gamertag, TimeMs, Xuid},
};
use serde::{Deserialize, Serialize};
use std::ops::Range;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KillVictimPair {
    pub killer_xuid: Xuid,
    pub killer_gamertag: Gamertag,
    pub victim_xuid: Xuid,
    pub victim_gamertag: Gamertag,
    /// Time of the kill event.
    pub time_ms: TimeMs,
}

/// Index range of `times` (sorted ascending) falling in `[t - tol, t + tol]`.
pub(crate) fn time_window(times: &[TimeMs], t: TimeMs, tol: TimeMs) -> Range<usize> {
    let lo = times.partition_point(|&x| x < t.saturating_sub(tol));
    let hi = times.partition_point(|&x| x <= t.saturating_add(tol));
    lo..hi
}

/// Events of one kind, ordered by time. Ties keep input order.
pub(crate) fn sorted_by_time(events: &[Event], kind: EventKind) -> Vec<&Event> {
    let mut out: Vec<&Event> = events.iter().filter(|e| e.kind == kind).collect();
    out.sort_by_key(|e| e.time_ms);
    out
}

/// Rebuild killer→victim pairs from a match's events.
///
/// Negative tolerances are treated as zero. Kills with no free death in
/// their window are dropped. Pairs whose killer or victim id is empty are
/// kept; callers that need named players filter afterwards.
pub fn reconstruct_pairs(events: &[Event], tolerance_ms: TimeMs) -> Vec<KillVictimPair> {
    let tol = tolerance_ms.max(0);
    let kills = sorted_by_time(events, EventKind::Kill);
    let deaths = sorted_by_time(events, EventKind::Death);
    let death_times: Vec<TimeMs> = deaths.iter().map(|e| e.time_ms).collect();

    let mut consumed = vec![false; deaths.len()];
    let mut pairs = Vec::with_capacity(kills.len().min(deaths.len()));

    for kill in &kills {
        let closest = time_window(&death_times, kill.time_ms, tol)
            .filter(|&i| !consumed[i])
            .min_by_key(|&i| ((death_times[i] - kill.time_ms).abs(), i));

        let Some(i) = closest else { continue };
        consumed[i] = true;
        let victim = deaths[i];
        pairs.push(KillVictimPair {
            killer_xuid: kill.xuid.clone(),
            killer_gamertag: kill.gamertag.clone(),
            victim_xuid: victim.xuid.clone(),
            victim_gamertag: victim.gamertag.clone(),
            time_ms: kill.time_ms,
        });
    }

    log::debug!(
        "pairs: {} of {} kills matched against {} deaths (tol={tol}ms)",
        pairs.len(),
        kills.len(),
        deaths.len()
    );
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_bounds_are_inclusive() {
        let times = [990, 995, 1000, 1005, 1010];
        assert_eq!(time_window(&times, 1000, 5), 1..4);
        assert_eq!(time_window(&times, 1000, 0), 2..3);
        assert_eq!(time_window(&times, 2000, 5), 5..5);
    }
}
