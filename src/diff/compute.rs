//! Diff computation.
//!
//! Walks two documents in parallel and emits the smallest tagged form it
//! can prove correct: an unchanged marker, a wholesale replacement, or a
//! recursive object/array patch. See the [module docs](crate::diff) for
//! the wire format.

use serde_json::{Map, Value};

use super::{
    DiffKind, MARKER_KEY, TAG_PATCH_ARRAY, TAG_PATCH_OBJECT, delete_marker, unchanged_marker,
};

/// Computes a diff that rewrites `old` into `new`.
#[must_use]
pub fn diff(old: &Value, new: &Value) -> Value {
    match (old, new) {
        (Value::Object(old_map), Value::Object(new_map)) => diff_object(old_map, new_map),
        (Value::Array(old_arr), Value::Array(new_arr)) => diff_array(old_arr, new_arr),
        _ if old == new => unchanged_marker(),
        _ => new.clone(),
    }
}

/// `true` when `old` and `new` diff to an unchanged marker.
///
/// Deliberately not plain equality: two empty objects diff to a
/// replacement, so array positions holding them count as changed.
fn is_unchanged(old: &Value, new: &Value) -> bool {
    DiffKind::of(&diff(old, new)) == DiffKind::Unchanged
}

fn diff_object(old: &Map<String, Value>, new: &Map<String, Value>) -> Value {
    let mut entries = Map::new();
    let mut deleted = 0usize;
    let mut replaced = 0usize;
    let mut array_patches = 0usize;

    for (key, old_child) in old {
        let Some(new_child) = new.get(key) else {
            entries.insert(key.clone(), delete_marker());
            deleted += 1;
            continue;
        };

        let child = diff(old_child, new_child);
        let kind = DiffKind::of(&child);
        if kind == DiffKind::PatchArray {
            array_patches += 1;
        }
        match (kind, child) {
            (DiffKind::Unchanged, _) => {}
            (DiffKind::PatchObject, Value::Object(map)) if map.len() < 4 => {
                // Hoist small nested patches as `key/subkey` entries.
                for (sub, sub_diff) in map {
                    if sub != MARKER_KEY {
                        entries.insert(format!("{key}/{sub}"), sub_diff);
                    }
                }
            }
            (kind, child) => {
                if kind == DiffKind::Replace {
                    replaced += 1;
                }
                entries.insert(key.clone(), child);
            }
        }
    }

    // Nothing of the old object survives: ship the new value whole. An
    // empty old object lands here too, so `diff({}, x)` is a replacement.
    if deleted == old.len() || replaced == old.len() {
        return Value::Object(new.clone());
    }

    for (key, value) in new {
        if !old.contains_key(key) {
            entries.insert(key.clone(), value.clone());
        }
    }

    if entries.is_empty() {
        return unchanged_marker();
    }

    if array_patches == entries.len() {
        // Every entry is an array patch; hoist them all into one patch
        // keyed by `member/index` paths.
        let mut hoisted = Map::new();
        for (path, child) in entries {
            if let Value::Object(map) = child {
                for (sub, sub_diff) in map {
                    if sub != MARKER_KEY {
                        hoisted.insert(format!("{path}/{sub}"), sub_diff);
                    }
                }
            }
        }
        hoisted.insert(MARKER_KEY.to_owned(), TAG_PATCH_ARRAY.into());
        return Value::Object(hoisted);
    }

    entries.insert(MARKER_KEY.to_owned(), TAG_PATCH_OBJECT.into());
    Value::Object(entries)
}

fn diff_array(old: &[Value], new: &[Value]) -> Value {
    let old_len = old.len();
    let new_len = new.len();

    // Longest unchanged prefix.
    let start = old
        .iter()
        .zip(new)
        .take_while(|(old_item, new_item)| is_unchanged(old_item, new_item))
        .count();

    // Longest unchanged suffix above the prefix.
    let mut end = old_len;
    let mut new_end = new_len;
    while end > start && new_end > start {
        match (old.get(end - 1), new.get(new_end - 1)) {
            (Some(old_item), Some(new_item)) if is_unchanged(old_item, new_item) => {
                end -= 1;
                new_end -= 1;
            }
            _ => break,
        }
    }

    if end <= start && old_len == new_len {
        return unchanged_marker();
    }

    let mut entries = Map::new();
    if old_len == new_len {
        // In-place edits only: emit single indices and contiguous runs,
        // keyed by old-array coordinates.
        let mut run: Vec<Value> = Vec::new();
        let mut run_start = start;
        let pairs = old.iter().zip(new).enumerate().take(end).skip(start);
        for (index, (old_item, new_item)) in pairs {
            let child = diff(old_item, new_item);
            if DiffKind::of(&child) == DiffKind::Unchanged {
                flush_run(&mut entries, &mut run, run_start, index);
                run_start = index + 1;
            } else {
                run.push(child);
            }
        }
        flush_run(&mut entries, &mut run, run_start, end);
    } else {
        // Lengths differ: one splice covers everything between the stable
        // prefix and suffix. Element diffs for the overlap, raw values for
        // whatever the new side adds beyond it.
        let overlap_end = end.min(new_end);
        let mut items: Vec<Value> = old
            .iter()
            .zip(new)
            .skip(start)
            .take(overlap_end.saturating_sub(start))
            .map(|(old_item, new_item)| diff(old_item, new_item))
            .collect();
        items.extend(new.iter().take(new_end).skip(overlap_end).cloned());
        entries.insert(format!("{start}:{end}"), Value::Array(items));
    }

    entries.insert(MARKER_KEY.to_owned(), TAG_PATCH_ARRAY.into());
    Value::Object(entries)
}

/// Closes a run of changed elements: a single diff is keyed by its index,
/// longer runs by a `start:end` range over the old array.
fn flush_run(
    entries: &mut Map<String, Value>,
    run: &mut Vec<Value>,
    run_start: usize,
    run_end: usize,
) {
    match run.len() {
        0 => {}
        1 => {
            if let Some(child) = run.pop() {
                entries.insert(run_start.to_string(), child);
            }
        }
        _ => {
            entries.insert(
                format!("{run_start}:{run_end}"),
                Value::Array(std::mem::take(run)),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unchanged_scalar_yields_marker() {
        assert_eq!(diff(&json!(1), &json!(1)), json!({"_t": "U"}));
        assert_eq!(diff(&json!("x"), &json!("x")), json!({"_t": "U"}));
        assert_eq!(diff(&json!(null), &json!(null)), json!({"_t": "U"}));
    }

    #[test]
    fn changed_scalar_is_a_replacement() {
        assert_eq!(diff(&json!(1), &json!(2)), json!(2));
        assert_eq!(diff(&json!("a"), &json!(null)), json!(null));
    }

    #[test]
    fn type_change_is_a_replacement() {
        assert_eq!(diff(&json!({"a": 1}), &json!([1])), json!([1]));
        assert_eq!(diff(&json!([1]), &json!(7)), json!(7));
    }

    #[test]
    fn added_member_appears_verbatim() {
        let old = json!({"a": 123, "b": "world"});
        let new = json!({"a": 123, "b": "world", "c": {"d": 678}});
        assert_eq!(diff(&old, &new), json!({"_t": "P", "c": {"d": 678}}));
    }

    #[test]
    fn removed_member_becomes_delete_marker() {
        let old = json!({"a": 1, "b": 2});
        let new = json!({"a": 1});
        assert_eq!(diff(&old, &new), json!({"_t": "P", "b": {"_t": "X"}}));
    }

    #[test]
    fn small_nested_patch_flattens_to_compound_path() {
        let old = json!({"a": 123, "b": "world", "c": {"d": 678}});
        let new = json!({"a": 123, "b": "world", "c": {"d": 679}});
        assert_eq!(diff(&old, &new), json!({"_t": "P", "c/d": 679}));
    }

    #[test]
    fn object_with_nothing_surviving_is_replaced_whole() {
        // Every old member deleted.
        assert_eq!(diff(&json!({"a": 1}), &json!({"b": 2})), json!({"b": 2}));
        // Every old member replaced.
        assert_eq!(
            diff(&json!({"a": 1, "b": 2}), &json!({"a": 9, "b": 8})),
            json!({"a": 9, "b": 8}),
        );
        // Empty old object.
        assert_eq!(diff(&json!({}), &json!({"a": 1})), json!({"a": 1}));
        assert_eq!(diff(&json!({}), &json!({})), json!({}));
    }

    #[test]
    fn empty_to_one_element_array_is_a_splice() {
        assert_eq!(diff(&json!([]), &json!([1])), json!({"_t": "A", "0:0": [1]}));
    }

    #[test]
    fn equal_length_arrays_use_index_and_range_keys() {
        assert_eq!(
            diff(&json!([1, 2, 3, 4, 5, 6]), &json!([1, 9, 9, 4, 5, 6])),
            json!({"_t": "A", "1:3": [9, 9]}),
        );
        assert_eq!(
            diff(&json!([1, 2, 3]), &json!([1, 7, 3])),
            json!({"_t": "A", "1": 7}),
        );
    }

    #[test]
    fn shrinking_array_emits_empty_splice() {
        assert_eq!(
            diff(&json!([1, 2]), &json!([2])),
            json!({"_t": "A", "0:1": []}),
        );
    }

    #[test]
    fn growing_array_appends_raw_values() {
        assert_eq!(
            diff(&json!([1]), &json!([1, 2])),
            json!({"_t": "A", "1:1": [2]}),
        );
    }

    #[test]
    fn sibling_array_patches_collapse_into_one() {
        let old = json!({"a": [1, 2], "b": [3, 4]});
        let new = json!({"a": [1, 5], "b": [3, 6]});
        assert_eq!(diff(&old, &new), json!({"_t": "A", "a/1": 5, "b/1": 6}));
    }

    #[test]
    fn equal_empty_objects_in_arrays_count_as_changed() {
        // diff({}, {}) is a replacement, so the prefix scan cannot skip
        // these positions.
        assert_eq!(
            diff(&json!([{}]), &json!([{}])),
            json!({"_t": "A", "0": {}}),
        );
    }
}
