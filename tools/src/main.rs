//! duel-runner: batch nemesis/bully aggregation over a match history.
//!
//! Usage:
//!   duel-runner --input matches.json --me 2533274800000000
//!   duel-runner --input matches.json --me 2533274800000000 --db duels.db --top 5

use anyhow::{bail, Result};
use antagonist_core::{
    aggregator::{AggregationResult, AntagonistEntry},
    batch::{parse_matches, DuelBatch},
    config::DuelConfig,
    store::DuelStore,
};
use std::env;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let Some(input) = arg_value(&args, "--input") else {
        bail!("missing --input <matches.json>");
    };
    let me = arg_value(&args, "--me").unwrap_or_default();
    let db = arg_value(&args, "--db");

    let mut config = match arg_value(&args, "--config") {
        Some(path) => DuelConfig::load(path)?,
        None => DuelConfig::default(),
    };
    config.tolerance_ms = parse_arg(&args, "--tolerance", config.tolerance_ms);
    config.min_encounters = parse_arg(&args, "--min-encounters", config.min_encounters);
    config.top_n = parse_arg(&args, "--top", config.top_n);

    println!("duel-runner");
    println!("  input:          {input}");
    println!("  player:         {}", if me.is_empty() { "<none>" } else { me });
    println!("  tolerance_ms:   {}", config.tolerance_ms);
    println!("  min_encounters: {}", config.min_encounters);
    println!("  db:             {}", db.unwrap_or("<none>"));
    println!();

    let content = std::fs::read_to_string(input)
        .map_err(|e| anyhow::anyhow!("Cannot read {input}: {e}"))?;
    let values: Vec<serde_json::Value> = serde_json::from_str(&content)?;

    let top_n = config.top_n;
    let batch = DuelBatch::new(config)?;
    let (matches, parse_errors) = parse_matches(&values);
    let result = batch.aggregate_matches(me, &matches, parse_errors);

    if let Some(path) = db {
        let store = DuelStore::open(path)?;
        store.migrate()?;
        for m in &matches {
            store.replace_match_pairs(&m.match_id, &batch.audit_pairs(m))?;
        }
        if !me.is_empty() {
            let written = store.upsert_antagonists(me, &result.entries)?;
            log::info!("player={me} persisted {written} antagonists to {path}");
        }
    }

    print_summary(&result, top_n);
    Ok(())
}

fn print_summary(result: &AggregationResult, top_n: usize) {
    println!("=== RUN SUMMARY ===");
    println!("  matches processed:   {}", result.matches_processed);
    println!("  matches with events: {}", result.matches_with_events);
    println!("  matches with errors: {}", result.matches_with_errors);
    println!("  duels found:         {}", result.total_duels_found);
    println!("  opponents kept:      {}", result.entries.len());

    print_table("TOP NEMESES", &result.top_nemeses(top_n));
    print_table("TOP VICTIMS", &result.top_victims(top_n));
    print_table("TOP RIVALS", &result.top_rivals(top_n));
}

fn print_table(title: &str, rows: &[&AntagonistEntry]) {
    println!();
    println!("=== {title} ===");
    if rows.is_empty() {
        println!("  (none)");
        return;
    }
    for e in rows {
        let name = if e.opponent_gamertag.is_empty() {
            e.opponent_xuid.as_str()
        } else {
            e.opponent_gamertag.as_str()
        };
        println!(
            "  {name:<20} | killed me: {:>4} | I killed: {:>4} | net: {:>+5} | matches: {:>3} | last: {}",
            e.times_killed_by,
            e.times_killed,
            e.net_kills(),
            e.matches_against,
            e.last_encounter.format("%Y-%m-%d %H:%M"),
        );
    }
}

fn arg_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
