//! Diff application.
//!
//! Replays a tagged diff onto a document in place. Malformed patches are
//! rejected with a [`DiffError`] rather than applied loosely; the one
//! deliberate leniency is a single array index at or past the end, which
//! grows the array with nulls before patching.

use serde_json::Value;

use super::{DiffError, DiffKind, MARKER_KEY};

/// Applies `patch` to `target` in place.
///
/// # Errors
///
/// Returns a [`DiffError`] when the patch addresses paths, indices, or
/// ranges the document does not have, carries an unsupported marker, or
/// aims an object/array patch at the wrong kind of value. `target` may be
/// partially modified when an error comes back; callers that need
/// atomicity apply to a scratch copy first.
pub fn apply(target: &mut Value, patch: &Value) -> Result<(), DiffError> {
    match DiffKind::of(patch) {
        DiffKind::Unchanged => Ok(()),
        DiffKind::Replace => {
            *target = patch.clone();
            Ok(())
        }
        DiffKind::Delete => Err(DiffError::RootDelete),
        DiffKind::PatchObject => apply_object(target, patch),
        DiffKind::PatchArray => apply_array(target, patch),
        DiffKind::PatchString | DiffKind::Unknown => {
            Err(DiffError::UnsupportedMarker(marker_text(patch)))
        }
    }
}

/// Renders the `"_t"` marker for error messages.
fn marker_text(patch: &Value) -> String {
    match patch.as_object().and_then(|map| map.get(MARKER_KEY)) {
        Some(Value::String(tag)) => tag.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

/// Walks a compound `a/b/key` path down object members, returning the
/// innermost container and the final key.
fn descend<'doc, 'path>(
    root: &'doc mut Value,
    path: &'path str,
) -> Result<(&'doc mut Value, &'path str), DiffError> {
    let mut container = root;
    let mut rest = path;
    while let Some((step, tail)) = rest.split_once('/') {
        container = container
            .as_object_mut()
            .and_then(|map| map.get_mut(step))
            .ok_or_else(|| DiffError::MissingPath(step.to_owned()))?;
        rest = tail;
    }
    Ok((container, rest))
}

fn apply_object(target: &mut Value, patch: &Value) -> Result<(), DiffError> {
    for (path, child) in patch.as_object().into_iter().flatten() {
        if path == MARKER_KEY {
            continue;
        }
        let (container, key) = descend(target, path)?;
        let map = container.as_object_mut().ok_or(DiffError::NotAnObject)?;
        if !map.contains_key(key) {
            // Unknown member: the child is raw data, delete markers
            // included. Matches the producer, which only diffs members it
            // saw in the old document.
            map.insert(key.to_owned(), child.clone());
        } else if DiffKind::of(child) == DiffKind::Delete {
            map.remove(key);
        } else if let Some(slot) = map.get_mut(key) {
            apply(slot, child)?;
        }
    }
    Ok(())
}

fn apply_array(target: &mut Value, patch: &Value) -> Result<(), DiffError> {
    for (path, child) in patch.as_object().into_iter().flatten() {
        if path == MARKER_KEY {
            continue;
        }
        let (container, key) = descend(target, path)?;
        let Value::Array(arr) = container else {
            return Err(DiffError::NotAnArray(path.clone()));
        };
        match key.split_once(':') {
            None => apply_index(arr, key, child)?,
            Some((lo, hi)) => apply_range(arr, path, lo, hi, child)?,
        }
    }
    Ok(())
}

/// Patches a single element; an index at or past the end grows the array
/// with nulls first.
fn apply_index(arr: &mut Vec<Value>, key: &str, child: &Value) -> Result<(), DiffError> {
    let index: usize = key
        .parse()
        .map_err(|_| DiffError::BadIndex(key.to_owned()))?;
    let needed = index
        .checked_add(1)
        .ok_or_else(|| DiffError::BadIndex(key.to_owned()))?;
    if needed > arr.len() {
        arr.resize(needed, Value::Null);
    }
    if let Some(slot) = arr.get_mut(index) {
        apply(slot, child)?;
    }
    Ok(())
}

/// Splices `[start, end)` out of the array: diffs in the payload patch the
/// overlapping elements, the rest of the payload is inserted raw, and the
/// old tail shifts to follow.
fn apply_range(
    arr: &mut Vec<Value>,
    path: &str,
    lo: &str,
    hi: &str,
    child: &Value,
) -> Result<(), DiffError> {
    let start: usize = lo
        .parse()
        .map_err(|_| DiffError::BadRange(path.to_owned()))?;
    let end: usize = hi
        .parse()
        .map_err(|_| DiffError::BadRange(path.to_owned()))?;
    if start > end || end > arr.len() {
        return Err(DiffError::BadRange(path.to_owned()));
    }
    let Some(items) = child.as_array() else {
        return Err(DiffError::RangePayload(path.to_owned()));
    };

    let tail = arr.split_off(end);
    let overlap = (end - start).min(items.len());
    arr.truncate(start + overlap);

    for (slot, item) in arr.iter_mut().skip(start).zip(items) {
        apply(slot, item)?;
    }
    arr.extend(items.iter().skip(overlap).cloned());
    arr.extend(tail);
    Ok(())
}
