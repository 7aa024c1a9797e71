//! Telemetry events as the engine sees them.
//!
//! Ingestion hands over loosely-typed records (`RawEvent`). They are
//! normalized once into `Event`, and everything downstream works on the
//! normalized form. Records that cannot be placed in time or that carry an
//! unknown kind are dropped here, quietly.

use crate::types::{Gamertag, TimeMs, Xuid};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Mode,
    Death,
    Kill,
}

impl EventKind {
    /// Numeric hint used by the film decoder.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            10 => Some(Self::Mode),
            20 => Some(Self::Death),
            50 => Some(Self::Kill),
            _ => None,
        }
    }

    /// Accepts "kill"/"death"/"mode" in any case, or a stringified code.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        if let Ok(code) = name.parse::<i64>() {
            return Self::from_code(code);
        }
        match name.to_ascii_lowercase().as_str() {
            "kill" => Some(Self::Kill),
            "death" => Some(Self::Death),
            "mode" => Some(Self::Mode),
            _ => None,
        }
    }
}

/// A normalized telemetry event. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub time_ms: TimeMs,
    pub kind: EventKind,
    pub xuid: Xuid,
    pub gamertag: Gamertag,
}

impl Event {
    pub fn new(
        time_ms: TimeMs,
        kind: EventKind,
        xuid: impl Into<Xuid>,
        gamertag: impl Into<Gamertag>,
    ) -> Self {
        Self {
            time_ms,
            kind,
            xuid: xuid.into(),
            gamertag: gamertag.into(),
        }
    }

    pub fn kill(time_ms: TimeMs, xuid: impl Into<Xuid>, gamertag: impl Into<Gamertag>) -> Self {
        Self::new(time_ms, EventKind::Kill, xuid, gamertag)
    }

    pub fn death(time_ms: TimeMs, xuid: impl Into<Xuid>, gamertag: impl Into<Gamertag>) -> Self {
        Self::new(time_ms, EventKind::Death, xuid, gamertag)
    }
}

/// Kind as it may arrive on the wire.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum KindRepr {
    Code(i64),
    Name(String),
    Other(Value),
}

impl KindRepr {
    pub fn resolve(&self) -> Option<EventKind> {
        match self {
            KindRepr::Code(code) => EventKind::from_code(*code),
            KindRepr::Name(name) => EventKind::from_name(name),
            KindRepr::Other(_) => None,
        }
    }
}

/// An event record exactly as ingestion delivers it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawEvent {
    #[serde(default)]
    pub time_ms: Option<Value>,
    #[serde(default, alias = "type", alias = "event_type")]
    pub kind: Option<KindRepr>,
    #[serde(default)]
    pub xuid: Option<Value>,
    #[serde(default)]
    pub gamertag: Option<Value>,
}

impl RawEvent {
    /// `None` when the record is not an event object at all.
    pub fn from_value(value: Value) -> Option<Self> {
        serde_json::from_value(value).ok()
    }

    /// `None` when the record is unusable for matching.
    pub fn normalize(&self) -> Option<Event> {
        let time_ms = self.time_ms.as_ref().and_then(resolve_time_ms)?;
        let kind = self.kind.as_ref().and_then(KindRepr::resolve)?;
        Some(Event {
            time_ms,
            kind,
            xuid: identity_text(self.xuid.as_ref()).trim().to_string(),
            gamertag: identity_text(self.gamertag.as_ref()),
        })
    }
}

fn identity_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// Reads an event array record by record. Records that cannot be read are
/// dropped individually; only a non-array fails.
pub fn deserialize_records<'de, D>(deserializer: D) -> Result<Vec<RawEvent>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Vec::<Value>::deserialize(deserializer)?;
    let total = values.len();
    let records: Vec<RawEvent> = values.into_iter().filter_map(RawEvent::from_value).collect();
    if records.len() < total {
        log::debug!("events: skipped {} unreadable records", total - records.len());
    }
    Ok(records)
}

fn resolve_time_ms(value: &Value) -> Option<TimeMs> {
    let ms = match value {
        Value::Number(n) => match n.as_i64() {
            Some(i) => Some(i),
            None => n.as_f64().and_then(integral_f64),
        },
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(integral_f64))
        }
        _ => None,
    }?;
    (ms >= 0).then_some(ms)
}

fn integral_f64(f: f64) -> Option<i64> {
    (f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64).then_some(f as i64)
}

/// Normalize a match's raw records, dropping the unusable ones.
pub fn normalize_events(raw: &[RawEvent]) -> Vec<Event> {
    let events: Vec<Event> = raw.iter().filter_map(RawEvent::normalize).collect();
    let dropped = raw.len() - events.len();
    if dropped > 0 {
        log::debug!("normalize: dropped {dropped} of {} raw events", raw.len());
    }
    events
}
