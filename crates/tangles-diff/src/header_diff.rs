//! Header map diffing.
//!
//! Each header name is diffed on its own, with the values themselves acting
//! as positional keys. When a value is removed from a slot and a different
//! value is added to that same slot, the pair is reported as a single
//! `Update` carrying a text delta between the two values.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use tangles_types::{DeltaOp, HeaderDelta, Headers};

use crate::config::DiffConfig;
use crate::positional::{diff_positions, PositionalChange};
use crate::text_delta::encode_delta;

/// Value-level changes per header name. Names without changes are absent.
pub fn diff_headers(before: &Headers, after: &Headers, config: &DiffConfig) -> BTreeMap<String, Vec<HeaderDelta>> {
    let names: BTreeSet<&String> = before.keys().chain(after.keys()).collect();
    let mut result = BTreeMap::new();
    for name in names {
        let old = before.get(name).map(Vec::as_slice).unwrap_or_default();
        let new = after.get(name).map(Vec::as_slice).unwrap_or_default();
        let deltas = diff_values(name, old, new, config);
        if !deltas.is_empty() {
            result.insert(name.clone(), deltas);
        }
    }
    result
}

fn diff_values(name: &str, old: &[String], new: &[String], config: &DiffConfig) -> Vec<HeaderDelta> {
    let changes = diff_positions(old, new, |value| value.as_str());

    // Slots that lost one value and gained another.
    let removed_at: HashMap<usize, &str> = changes
        .iter()
        .filter(|c| c.op == DeltaOp::Remove)
        .filter_map(|c| c.from.map(|pos| (pos, c.key)))
        .collect();
    let replaced: HashSet<usize> = changes
        .iter()
        .filter(|c| c.op == DeltaOp::Add)
        .filter_map(|c| c.to)
        .filter(|pos| removed_at.contains_key(pos))
        .collect();

    let mut deltas = Vec::with_capacity(changes.len());
    let mut folded = HashSet::new();
    for change in &changes {
        let slot = match change.op {
            DeltaOp::Remove => change.from,
            DeltaOp::Add => change.to,
            _ => None,
        };
        match slot.filter(|pos| replaced.contains(pos)) {
            Some(pos) => {
                if !folded.insert(pos) {
                    continue;
                }
                let old_value = removed_at.get(&pos).copied().unwrap_or_default();
                let new_value = new.get(pos).map(String::as_str).unwrap_or_default();
                deltas.push(HeaderDelta {
                    op: DeltaOp::Update,
                    header: name.to_string(),
                    from_position: Some(pos),
                    to_position: Some(pos),
                    value: encode_delta(old_value, new_value, config),
                });
            }
            None => deltas.push(raw_delta(name, change)),
        }
    }
    deltas
}

fn raw_delta(name: &str, change: &PositionalChange<&str>) -> HeaderDelta {
    HeaderDelta {
        op: change.op,
        header: name.to_string(),
        from_position: change.from,
        to_position: change.to,
        value: change.key.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(entries: &[(&str, &[&str])]) -> Headers {
        entries
            .iter()
            .map(|(name, values)| (name.to_string(), values.iter().map(|v| v.to_string()).collect()))
            .collect()
    }

    fn diff(before: &Headers, after: &Headers) -> BTreeMap<String, Vec<HeaderDelta>> {
        diff_headers(before, after, &DiffConfig::default())
    }

    #[test]
    fn identical_headers_produce_nothing() {
        let h = headers(&[("Content-Type", &["text/plain"]), ("X-Tag", &["a", "b"])]);
        assert!(diff(&h, &h).is_empty());
    }

    #[test]
    fn swapped_values_report_one_move() {
        let before = headers(&[("X-Tag", &["one", "two"])]);
        let after = headers(&[("X-Tag", &["two", "one"])]);
        let result = diff(&before, &after);
        let deltas = &result["X-Tag"];
        assert_eq!(deltas.len(), 1);
        assert_eq!(deltas[0].op, DeltaOp::Move);
        assert_eq!(deltas[0].header, "X-Tag");
    }

    #[test]
    fn replaced_value_folds_into_update() {
        let before = headers(&[("Content-Type", &["text/plain"])]);
        let after = headers(&[("Content-Type", &["text/html"])]);
        let result = diff(&before, &after);
        let deltas = &result["Content-Type"];
        assert_eq!(deltas.len(), 1);
        let delta = &deltas[0];
        assert_eq!(delta.op, DeltaOp::Update);
        assert_eq!((delta.from_position, delta.to_position), (Some(0), Some(0)));
        assert_eq!(
            crate::text_delta::replay("text/plain", &delta.value),
            "text/html"
        );
    }

    #[test]
    fn added_header_lists_every_value() {
        let before = Headers::new();
        let after = headers(&[("X-Tag", &["a", "b"])]);
        let deltas = &diff(&before, &after)["X-Tag"];
        assert_eq!(deltas.len(), 2);
        assert!(deltas.iter().all(|d| d.op == DeltaOp::Add && d.from_position.is_none()));
        assert_eq!(deltas[0].value, "a");
        assert_eq!(deltas[1].to_position, Some(1));
    }

    #[test]
    fn removed_header_lists_every_value() {
        let before = headers(&[("X-Tag", &["a"])]);
        let deltas = &diff(&before, &Headers::new())["X-Tag"];
        assert_eq!(deltas.len(), 1);
        assert_eq!(deltas[0].op, DeltaOp::Remove);
        assert_eq!(deltas[0].value, "a");
        assert_eq!(deltas[0].to_position, None);
    }

    #[test]
    fn unchanged_names_are_omitted() {
        let before = headers(&[("A", &["1"]), ("B", &["x"])]);
        let after = headers(&[("A", &["1"]), ("B", &["x", "y"])]);
        let result = diff(&before, &after);
        assert!(!result.contains_key("A"));
        assert_eq!(result["B"].len(), 1);
        assert_eq!(result["B"][0].op, DeltaOp::Add);
    }

    #[test]
    fn add_at_a_different_slot_stays_raw() {
        let before = headers(&[("X-Tag", &["a", "b"])]);
        let after = headers(&[("X-Tag", &["a", "c", "d"])]);
        let deltas = &diff(&before, &after)["X-Tag"];
        // "b" is replaced by "c" in slot 1, "d" is a plain addition.
        let ops: Vec<(DeltaOp, &str)> = deltas.iter().map(|d| (d.op, d.value.as_str())).collect();
        assert_eq!(ops.len(), 2);
        assert_eq!(ops[0].0, DeltaOp::Update);
        assert_eq!(ops[1], (DeltaOp::Add, "d"));
    }
}
