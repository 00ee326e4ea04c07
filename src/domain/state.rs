//! State snapshots and the wire envelope that moves them.
//!
//! The sync wire carries exactly one frame shape, a JSON text message:
//!
//! ```json
//! {"diff": <diff value>, "time": 1721390455123}
//! ```
//!
//! `time` is the wall-clock version of the state the diff produces, in
//! milliseconds since the Unix epoch. It is compared peer-by-peer so that
//! older envelopes never clobber newer mirrors.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A JSON document plus the wall-clock version of its last update.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateSnapshot {
    /// The document itself; `null` until the first update.
    pub value: Value,
    /// Milliseconds since the Unix epoch; `0` until the first update.
    pub time: u64,
}

impl StateSnapshot {
    /// Snapshot of a document at a given version.
    #[must_use]
    pub fn new(value: Value, time: u64) -> Self {
        Self { value, time }
    }
}

impl Default for StateSnapshot {
    /// The pre-sync snapshot: a null document at time zero, so any real
    /// envelope supersedes it.
    fn default() -> Self {
        Self::new(Value::Null, 0)
    }
}

/// Wire envelope: one diff and the state version it produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateDiff {
    /// A value in the diff format (see [`crate::diff`]). A full document
    /// is valid here; it acts as a wholesale replacement.
    pub diff: Value,
    /// Version stamp in milliseconds since the Unix epoch.
    pub time: u64,
}

impl StateDiff {
    /// Builds an envelope.
    #[must_use]
    pub fn new(diff: Value, time: u64) -> Self {
        Self { diff, time }
    }
}

/// Current wall-clock time in milliseconds since the Unix epoch, clamped
/// to zero for clocks set before 1970.
#[must_use]
pub fn now_millis() -> u64 {
    u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_snapshot_is_null_at_time_zero() {
        let snapshot = StateSnapshot::default();
        assert_eq!(snapshot.value, Value::Null);
        assert_eq!(snapshot.time, 0);
    }

    #[test]
    fn envelope_uses_the_wire_field_names() {
        let envelope = StateDiff::new(json!({"_t": "A", "0:0": [1]}), 42);
        let json = serde_json::to_value(&envelope).unwrap_or_default();
        assert_eq!(json, json!({"diff": {"_t": "A", "0:0": [1]}, "time": 42}));
    }

    #[test]
    fn envelope_round_trips_through_text() {
        let text = r#"{"diff":{"a":1},"time":7}"#;
        let envelope: Result<StateDiff, _> = serde_json::from_str(text);
        assert_eq!(envelope.ok(), Some(StateDiff::new(json!({"a": 1}), 7)));
    }

    #[test]
    fn envelope_without_time_is_rejected() {
        let parsed: Result<StateDiff, _> = serde_json::from_str(r#"{"diff":{}}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn now_millis_is_past_2020() {
        // 2020-01-01T00:00:00Z in milliseconds.
        assert!(now_millis() > 1_577_836_800_000);
    }
}
