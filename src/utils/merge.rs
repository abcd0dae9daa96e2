//! Set-union helpers for the metadata carried by observed records.
//!
//! All helpers are pure: they only touch the structures handed to them, so
//! they can be called from any thread without coordination.

use crate::models::Headers;
use std::collections::BTreeSet;

/// Append every element of `incoming` that `existing` does not hold yet
///
/// First-seen order of `existing` is kept and new elements are appended in
/// the order they arrive. Applying the same input twice is a no-op.
pub fn merge_strings(existing: &mut Vec<String>, incoming: &[String]) {
    for value in incoming {
        if !existing.contains(value) {
            existing.push(value.clone());
        }
    }
}

/// Deduplicate a list while keeping first-seen order
pub fn dedup_strings(values: &[String]) -> Vec<String> {
    let mut unique = Vec::with_capacity(values.len());
    merge_strings(&mut unique, values);
    unique
}

/// Per-key union of header value lists
///
/// Unknown keys are added with their values deduplicated; known keys gain
/// the values they do not already carry.
pub fn merge_headers(existing: &mut Headers, incoming: &Headers) {
    for (name, values) in incoming {
        let entry = existing.entry(name.clone()).or_default();
        merge_strings(entry, values);
    }
}

/// Union of two lists, sorted alphabetically
pub fn merge_sorted(existing: &[String], incoming: &[String]) -> Vec<String> {
    existing
        .iter()
        .chain(incoming)
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
