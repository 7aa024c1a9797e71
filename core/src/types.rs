//! Shared primitive types used across the engine.

use std::cmp::Ordering;

/// Opaque, stable player identifier.
pub type Xuid = String;

/// Human-readable display name. May change between matches.
pub type Gamertag = String;

/// Milliseconds since the start of a match.
pub type TimeMs = i64;

/// Stable ordering for player ids.
///
/// Purely numeric ids compare by value ("200" < "1000"); numeric ids sort
/// before non-numeric ones; everything else falls back to byte order.
pub fn compare_xuids(a: &str, b: &str) -> Ordering {
    match (numeric_id(a), numeric_id(b)) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

/// Digits only; signs and whitespace make an id textual.
fn numeric_id(id: &str) -> Option<u64> {
    if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    id.parse().ok()
}
