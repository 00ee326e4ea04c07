//! Structural JSON diff engine.
//!
//! A diff is itself a JSON value. Objects carrying the reserved `"_t"`
//! marker declare how they patch their target; every other value replaces
//! the target wholesale:
//!
//! | `"_t"` | kind         | effect                                    |
//! |--------|--------------|-------------------------------------------|
//! | `"X"`  | delete       | remove the targeted object member         |
//! | `"U"`  | unchanged    | leave the target untouched                |
//! | `"S"`  | string patch | reserved; rejected by [`apply`]           |
//! | `"A"`  | array patch  | per-index and per-range array edits       |
//! | `"P"`  | object patch | per-key object edits                      |
//! | none   | replace      | the diff value overwrites the target      |
//!
//! Patch entries are keyed by paths. A path is one or more member names
//! joined by `/` (array patches end in an index `"3"` or a half-open range
//! `"1:4"`); every step but the last descends through object members.
//!
//! [`diff`] produces the smallest of these forms it can prove correct and
//! [`apply`] replays one onto a document, so `apply(a, diff(a, b))`
//! rebuilds `b` for any JSON documents `a` and `b`.
//!
//! `"_t"` is reserved: a document object carrying that member is
//! indistinguishable from a patch and will be treated as one.

pub mod apply;
pub mod compute;

pub use apply::apply;
pub use compute::diff;

use serde_json::{Map, Value};

/// Reserved object key marking a value as a tagged diff.
pub const MARKER_KEY: &str = "_t";

const TAG_DELETE: &str = "X";
const TAG_UNCHANGED: &str = "U";
const TAG_PATCH_STRING: &str = "S";
const TAG_PATCH_ARRAY: &str = "A";
const TAG_PATCH_OBJECT: &str = "P";

/// How a diff value acts on its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffKind {
    /// Remove the targeted object member.
    Delete,
    /// Leave the target untouched.
    Unchanged,
    /// Character-level string patch; reserved and never produced.
    PatchString,
    /// Per-index and per-range array edits.
    PatchArray,
    /// Per-key object edits.
    PatchObject,
    /// The diff value overwrites the target wholesale.
    Replace,
    /// A marker no rule understands.
    Unknown,
}

impl DiffKind {
    /// Classifies a diff value by its `"_t"` marker.
    #[must_use]
    pub fn of(value: &Value) -> Self {
        match value.as_object().and_then(|map| map.get(MARKER_KEY)) {
            None => Self::Replace,
            Some(Value::String(tag)) => match tag.as_str() {
                TAG_DELETE => Self::Delete,
                TAG_UNCHANGED => Self::Unchanged,
                TAG_PATCH_STRING => Self::PatchString,
                TAG_PATCH_ARRAY => Self::PatchArray,
                TAG_PATCH_OBJECT => Self::PatchObject,
                _ => Self::Unknown,
            },
            Some(_) => Self::Unknown,
        }
    }
}

/// Builds the one-member object `{"_t": tag}`.
fn marker(tag: &str) -> Value {
    let mut map = Map::new();
    map.insert(MARKER_KEY.to_owned(), Value::String(tag.to_owned()));
    Value::Object(map)
}

fn unchanged_marker() -> Value {
    marker(TAG_UNCHANGED)
}

fn delete_marker() -> Value {
    marker(TAG_DELETE)
}

/// Errors raised while applying a diff.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiffError {
    /// A compound path step did not lead to an object member.
    #[error("path step `{0}` does not lead to an object member")]
    MissingPath(String),

    /// A delete marker at the top of a diff; deletes are per-member.
    #[error("a delete marker cannot be applied at the diff root")]
    RootDelete,

    /// An object patch aimed at a non-object.
    #[error("object patch target is not an object")]
    NotAnObject,

    /// An array patch aimed at a non-array.
    #[error("array patch target at `{0}` is not an array")]
    NotAnArray(String),

    /// An array entry key that does not parse as an index.
    #[error("invalid array index `{0}`")]
    BadIndex(String),

    /// A range key with unparsable, inverted, or out-of-bounds bounds.
    #[error("invalid array range `{0}`")]
    BadRange(String),

    /// A range entry whose payload is not an array.
    #[error("array range `{0}` expects an array payload")]
    RangePayload(String),

    /// A marker no apply rule understands (`"S"` included).
    #[error("unsupported diff marker `{0}`")]
    UnsupportedMarker(String),
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(text: &str) -> Value {
        serde_json::from_str(text)
            .ok()
            .unwrap_or_else(|| panic!("fixture `{text}` must parse"))
    }

    /// Documents covering every JSON kind, paired in all combinations by
    /// the round-trip test below.
    const DOCUMENTS: &[&str] = &[
        "1",
        "2",
        "3.14",
        "null",
        "true",
        "false",
        "{}",
        "{\"a\":1}",
        "{\"a\":2}",
        "{\"a\":\"hello\"}",
        "{\"a\":\"world\"}",
        "{\"a\":123,\"b\":\"world\"}",
        "{\"a\":123,\"b\":\"world\",\"c\":{\"d\":678}}",
        "\"test_string_1\"",
        "\"test_string_2\"",
        "[]",
        "[1,2,3]",
        "[1,2,3,4,5,6]",
        "[1,2,3,{},5,6]",
        "[1,2,3,4,null,6]",
        "[1,2,3,4,null]",
        "[1,2,3,{\"a\":3},5,6]",
        "[1,2,3,{\"a\":4},5,6]",
    ];

    #[test]
    fn round_trips_between_all_document_pairs() {
        for old_text in DOCUMENTS {
            for new_text in DOCUMENTS {
                let old = parse(old_text);
                let new = parse(new_text);
                let patch = diff(&old, &new);
                let mut rebuilt = old.clone();
                if let Err(err) = apply(&mut rebuilt, &patch) {
                    panic!("apply({old_text} -> {new_text}) failed: {err}");
                }
                assert_eq!(rebuilt, new, "patch {patch} applied to {old_text}");
            }
        }
    }

    /// Successive versions of a job-status document, the kind of payload
    /// the engine is used for in practice.
    const JOB_SEQUENCE: &[&str] = &[
        "{\"job1\":{\"name\":\"Job number 1\",\"status\":\"Scheduled\",\"logs\":[]}}",
        "{\"job1\":{\"name\":\"Job number 1\",\"status\":\"Running\",\"logs\":[]},\"job2\":{\"name\":\"Job number 2\",\"status\":\"Scheduled\",\"logs\":[]}}",
        "{\"job1\":{\"name\":\"Job number 1\",\"status\":\"Running\",\"logs\":[\"log line 1\"]},\"job2\":{\"name\":\"Job number 2\",\"status\":\"Scheduled\",\"logs\":[]}}",
        "{\"job1\":{\"name\":\"Job number 1\",\"status\":\"Running\",\"logs\":[\"log line 1\",\"log line 2\"]},\"job2\":{\"name\":\"Job number 2\",\"status\":\"Running\",\"logs\":[]}}",
        "{\"job1\":{\"name\":\"Job number 1\",\"status\":\"Done\",\"logs\":[\"log line 1\",\"log line 2\"]},\"job2\":{\"name\":\"Job number 2\",\"status\":\"Done\",\"logs\":[\"a log line\"]}}",
    ];

    #[test]
    fn job_sequence_round_trips_with_no_size_regression() {
        for (i, old_text) in JOB_SEQUENCE.iter().enumerate() {
            for new_text in JOB_SEQUENCE.iter().skip(i) {
                let old = parse(old_text);
                let new = parse(new_text);
                let patch = diff(&old, &new);
                let mut rebuilt = old.clone();
                if let Err(err) = apply(&mut rebuilt, &patch) {
                    panic!("apply({old_text} -> {new_text}) failed: {err}");
                }
                assert_eq!(rebuilt, new);

                // A diff must never be bigger than shipping the new
                // document outright.
                let patch_len = patch.to_string().len();
                assert!(
                    patch_len <= new_text.len(),
                    "diff ({patch_len} bytes) larger than document ({} bytes): {patch}",
                    new_text.len(),
                );
            }
        }
    }

    #[test]
    fn classifies_markers() {
        assert_eq!(DiffKind::of(&json!({"_t": "X"})), DiffKind::Delete);
        assert_eq!(DiffKind::of(&json!({"_t": "U"})), DiffKind::Unchanged);
        assert_eq!(DiffKind::of(&json!({"_t": "S"})), DiffKind::PatchString);
        assert_eq!(DiffKind::of(&json!({"_t": "A"})), DiffKind::PatchArray);
        assert_eq!(DiffKind::of(&json!({"_t": "P"})), DiffKind::PatchObject);
        assert_eq!(DiffKind::of(&json!({"_t": "Z"})), DiffKind::Unknown);
        assert_eq!(DiffKind::of(&json!({"_t": 7})), DiffKind::Unknown);
        assert_eq!(DiffKind::of(&json!({"a": 1})), DiffKind::Replace);
        assert_eq!(DiffKind::of(&json!([1, 2])), DiffKind::Replace);
        assert_eq!(DiffKind::of(&json!(null)), DiffKind::Replace);
    }
}
