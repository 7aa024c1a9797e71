//! Integration tests for cross-match antagonist aggregation.
//!
//! Tests verify:
//! 1. Nemesis and bully updates, including the same opponent in both roles
//! 2. Min-encounter pruning
//! 3. last_encounter / gamertag refresh semantics
//! 4. Ranking views and their tie-breaks

use antagonist_core::{aggregate, AntagonistsResult, EstimatedCount, OpponentDuel};
use chrono::{DateTime, Duration, TimeZone, Utc};

fn day(n: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap() + Duration::days(n)
}

fn duel(xuid: &str, tag: &str, killed_me: (u32, u32), me_killed: (u32, u32)) -> OpponentDuel {
    OpponentDuel {
        xuid: xuid.into(),
        gamertag: tag.into(),
        opponent_killed_me: EstimatedCount::new(killed_me.0, killed_me.1),
        me_killed_opponent: EstimatedCount::new(me_killed.0, me_killed.1),
    }
}

fn result(nemesis: Option<OpponentDuel>, bully: Option<OpponentDuel>) -> AntagonistsResult {
    AntagonistsResult {
        nemesis,
        bully,
        my_deaths_total: 5,
        my_kills_total: 5,
        ..AntagonistsResult::default()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 1: updates
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn same_opponent_in_both_roles_is_counted_once() {
    let d = duel("555", "Five", (3, 1), (1, 1));
    let history = vec![(day(0), result(Some(d.clone()), Some(d)))];

    let agg = aggregate(&history, 1);

    let entry = agg.entry("555").expect("entry for 555");
    assert_eq!(entry.times_killed_by, 4);
    assert_eq!(entry.times_killed, 2);
    assert_eq!(entry.times_killed_by + entry.times_killed, 4 + 2);
    assert_eq!(entry.matches_against, 1);
    assert_eq!(agg.total_duels_found, 1);
}

#[test]
fn distinct_nemesis_and_bully_each_get_an_entry() {
    let history = vec![(
        day(0),
        result(
            Some(duel("200", "Two", (2, 0), (0, 0))),
            Some(duel("300", "Three", (1, 0), (3, 0))),
        ),
    )];

    let agg = aggregate(&history, 1);

    assert_eq!(agg.entries.len(), 2);
    let two = agg.entry("200").unwrap();
    assert_eq!((two.times_killed_by, two.times_killed), (2, 0));
    let three = agg.entry("300").unwrap();
    assert_eq!((three.times_killed_by, three.times_killed), (1, 3));
    assert_eq!(three.net_kills(), 2);
    assert_eq!(agg.total_duels_found, 2);
}

#[test]
fn counters_accumulate_across_matches() {
    let history = vec![
        (day(0), result(Some(duel("200", "Two", (2, 0), (1, 0))), None)),
        (day(1), result(None, Some(duel("200", "Two", (0, 1), (4, 0))))),
        (day(2), result(Some(duel("300", "Three", (1, 0), (0, 0))), None)),
    ];

    let agg = aggregate(&history, 1);

    let two = agg.entry("200").unwrap();
    assert_eq!(two.matches_against, 2);
    assert_eq!(two.times_killed_by, 3);
    assert_eq!(two.times_killed, 5);
    assert_eq!(two.net_kills(), 2);
    assert_eq!(agg.matches_processed, 3);
    assert_eq!(agg.matches_with_events, 3);
    assert_eq!(agg.matches_with_errors, 0);
}

#[test]
fn empty_matches_are_processed_but_not_counted_as_with_events() {
    let history = vec![
        (day(0), AntagonistsResult::default()),
        (day(1), result(Some(duel("200", "", (1, 0), (0, 0))), None)),
    ];
    let agg = aggregate(&history, 1);
    assert_eq!(agg.matches_processed, 2);
    assert_eq!(agg.matches_with_events, 1);
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 2: pruning
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn opponents_below_min_encounters_are_dropped() {
    let history = vec![
        (day(0), result(Some(duel("777", "Lucky", (5, 0), (0, 0))), None)),
        (day(1), result(Some(duel("200", "Two", (1, 0), (0, 0))), None)),
        (day(2), result(Some(duel("200", "Two", (1, 0), (0, 0))), None)),
    ];

    let strict = aggregate(&history, 2);
    assert!(strict.entry("777").is_none());
    assert!(strict.entry("200").is_some());
    // Pruning does not rewrite the run counters.
    assert_eq!(strict.total_duels_found, 3);

    let lenient = aggregate(&history, 1);
    assert!(lenient.entry("777").is_some());
    assert_eq!(lenient.entries.len(), 2);
}

#[test]
fn zero_min_encounters_keeps_everyone() {
    let history = vec![(day(0), result(Some(duel("777", "", (1, 0), (0, 0))), None))];
    assert_eq!(aggregate(&history, 0).entries.len(), 1);
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 3: last encounter
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn newest_match_sets_gamertag_and_last_encounter() {
    let history = vec![
        (day(0), result(Some(duel("200", "OldTag", (1, 0), (0, 0))), None)),
        (day(5), result(Some(duel("200", "NewTag", (1, 0), (0, 0))), None)),
    ];
    let agg = aggregate(&history, 1);
    let entry = agg.entry("200").unwrap();
    assert_eq!(entry.opponent_gamertag, "NewTag");
    assert_eq!(entry.last_encounter, day(5));
}

#[test]
fn older_match_fed_late_does_not_roll_back() {
    let history = vec![
        (day(5), result(Some(duel("200", "NewTag", (1, 0), (0, 0))), None)),
        (day(0), result(Some(duel("200", "OldTag", (1, 0), (0, 0))), None)),
    ];
    let agg = aggregate(&history, 1);
    let entry = agg.entry("200").unwrap();
    assert_eq!(entry.opponent_gamertag, "NewTag");
    assert_eq!(entry.last_encounter, day(5));
    assert_eq!(entry.matches_against, 2);
}

#[test]
fn empty_gamertag_does_not_erase_known_one() {
    let history = vec![
        (day(0), result(Some(duel("200", "Known", (1, 0), (0, 0))), None)),
        (day(1), result(Some(duel("200", "", (1, 0), (0, 0))), None)),
    ];
    let agg = aggregate(&history, 1);
    let entry = agg.entry("200").unwrap();
    assert_eq!(entry.opponent_gamertag, "Known");
    assert_eq!(entry.last_encounter, day(1));
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 4: rankings
// ─────────────────────────────────────────────────────────────────────────────

fn ranking_history() -> Vec<(DateTime<Utc>, AntagonistsResult)> {
    vec![
        // 200: killed me 4, I killed 1
        (day(0), result(Some(duel("200", "", (4, 0), (1, 0))), None)),
        // 300: killed me 4, I killed 3
        (day(1), result(Some(duel("300", "", (4, 0), (3, 0))), None)),
        // 400: killed me 0, I killed 5, over two matches
        (day(2), result(None, Some(duel("400", "", (0, 0), (3, 0))))),
        (day(3), result(None, Some(duel("400", "", (0, 0), (2, 0))))),
        // 500: killed me 2, I killed 5
        (day(4), result(Some(duel("500", "", (2, 0), (5, 0))), None)),
    ]
}

fn ids(entries: &[&antagonist_core::AntagonistEntry]) -> Vec<String> {
    entries.iter().map(|e| e.opponent_xuid.clone()).collect()
}

#[test]
fn top_nemeses_sort_by_times_killed_by() {
    let agg = aggregate(&ranking_history(), 1);
    // 200 and 300 tie on 4; 200 was killed less often, so ranks first.
    assert_eq!(ids(&agg.top_nemeses(3)), vec!["200", "300", "500"]);
}

#[test]
fn top_victims_sort_by_times_killed() {
    let agg = aggregate(&ranking_history(), 1);
    // 400 and 500 tie on 5; 400 never killed me.
    assert_eq!(ids(&agg.top_victims(2)), vec!["400", "500"]);
}

#[test]
fn top_rivals_sort_by_total_duels_then_matches() {
    let agg = aggregate(&ranking_history(), 1);
    // 300: 7 duels in 1 match; 500: 7 in 1; 400: 5 in 2; 200: 5 in 1.
    assert_eq!(ids(&agg.top_rivals(10)), vec!["300", "500", "400", "200"]);
}

#[test]
fn rankings_truncate_to_n() {
    let agg = aggregate(&ranking_history(), 1);
    assert_eq!(agg.top_rivals(1).len(), 1);
    assert!(agg.top_nemeses(0).is_empty());
}
