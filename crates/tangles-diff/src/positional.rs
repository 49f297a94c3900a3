//! Positional diff of two ordered sequences.
//!
//! Items are identified by a key. A key found only in the new sequence is an
//! addition, one found only in the old sequence is a removal. A key found in
//! both is a move when its order relative to the other shared keys changed:
//! the shared keys are aligned with a longest common subsequence and keys on
//! that subsequence stay put, even if additions or removals shifted their
//! absolute index.
//!
//! Keys are assumed unique within a sequence. When one repeats, its last
//! occurrence gives its position and it is reported at most once.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use similar::{capture_diff_slices, Algorithm, DiffOp};
use tangles_types::{AuthorsDelta, DeltaOp};

/// Where a key sits in the old and new sequence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Placement<K> {
    pub key: K,
    /// Index in the old sequence, `None` if absent.
    pub from: Option<usize>,
    /// Index in the new sequence, `None` if absent.
    pub to: Option<usize>,
    /// `None` when the key kept its place.
    pub op: Option<DeltaOp>,
}

/// A key whose placement changed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PositionalChange<K> {
    pub key: K,
    pub op: DeltaOp,
    pub from: Option<usize>,
    pub to: Option<usize>,
}

/// Place every distinct key of `before` and `after`.
///
/// Keys come out in the order of the longer sequence (the new one on a tie),
/// followed by the keys that only appear in the shorter one.
pub fn place<'a, T, K, F>(before: &'a [T], after: &'a [T], key: F) -> Vec<Placement<K>>
where
    K: Eq + Hash + Ord + Clone,
    F: Fn(&'a T) -> K,
{
    let before_keys: Vec<K> = before.iter().map(&key).collect();
    let after_keys: Vec<K> = after.iter().map(&key).collect();
    let before_pos = index_of(&before_keys);
    let after_pos = index_of(&after_keys);
    let anchored = anchored_keys(&before_pos, &after_pos);

    let (longer, shorter) = if before_keys.len() > after_keys.len() {
        (&before_keys, &after_keys)
    } else {
        (&after_keys, &before_keys)
    };

    let mut seen = HashSet::with_capacity(longer.len());
    let mut placements = Vec::with_capacity(longer.len());
    for k in longer.iter().chain(shorter.iter()) {
        if !seen.insert(k) {
            continue;
        }
        let from = before_pos.get(k).copied();
        let to = after_pos.get(k).copied();
        let op = match (from, to) {
            (None, _) => Some(DeltaOp::Add),
            (_, None) => Some(DeltaOp::Remove),
            _ if anchored.contains(k) => None,
            _ => Some(DeltaOp::Move),
        };
        placements.push(Placement {
            key: k.clone(),
            from,
            to,
            op,
        });
    }
    placements
}

/// Additions, removals and moves between `before` and `after`.
pub fn diff_positions<'a, T, K, F>(before: &'a [T], after: &'a [T], key: F) -> Vec<PositionalChange<K>>
where
    K: Eq + Hash + Ord + Clone,
    F: Fn(&'a T) -> K,
{
    place(before, after, key)
        .into_iter()
        .filter_map(|p| {
            p.op.map(|op| PositionalChange {
                key: p.key,
                op,
                from: p.from,
                to: p.to,
            })
        })
        .collect()
}

/// Changes to a post's author list. Author IDs are opaque: only additions,
/// removals and moves are reported.
pub fn diff_authors(before: &[String], after: &[String]) -> Vec<AuthorsDelta> {
    diff_positions(before, after, |author| author.as_str())
        .into_iter()
        .map(|change| AuthorsDelta {
            op: change.op,
            from_position: change.from,
            to_position: change.to,
            value: change.key.to_string(),
        })
        .collect()
}

fn index_of<K: Eq + Hash + Clone>(keys: &[K]) -> HashMap<K, usize> {
    let mut positions = HashMap::with_capacity(keys.len());
    for (pos, k) in keys.iter().enumerate() {
        positions.insert(k.clone(), pos);
    }
    positions
}

/// Shared keys that keep their relative order.
fn anchored_keys<K>(before_pos: &HashMap<K, usize>, after_pos: &HashMap<K, usize>) -> HashSet<K>
where
    K: Eq + Hash + Ord + Clone,
{
    let old = shared_order(before_pos, after_pos);
    let new = shared_order(after_pos, before_pos);

    let mut anchored = HashSet::with_capacity(old.len());
    for op in capture_diff_slices(Algorithm::Myers, &old, &new) {
        if let DiffOp::Equal { old_index, len, .. } = op {
            anchored.extend(old[old_index..old_index + len].iter().map(|k| (*k).clone()));
        }
    }
    anchored
}

/// Keys of `positions` that `other` also holds, in `positions` order.
fn shared_order<'m, K>(positions: &'m HashMap<K, usize>, other: &HashMap<K, usize>) -> Vec<&'m K>
where
    K: Eq + Hash + Ord,
{
    let mut shared: Vec<(usize, &K)> = positions
        .iter()
        .filter(|(k, _)| other.contains_key(*k))
        .map(|(k, pos)| (*pos, k))
        .collect();
    shared.sort_unstable();
    shared.into_iter().map(|(_, k)| k).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn changes(before: &[&str], after: &[&str]) -> Vec<PositionalChange<String>> {
        diff_positions(&strings(before), &strings(after), |s: &String| s.clone())
    }

    /// Rebuild `after` from `before` and the reported changes.
    fn replay(before: &[u8], changes: &[PositionalChange<u8>]) -> Vec<u8> {
        let displaced: HashSet<u8> = changes
            .iter()
            .filter(|c| c.op != DeltaOp::Add)
            .map(|c| c.key)
            .collect();
        let mut result: Vec<u8> = before.iter().copied().filter(|k| !displaced.contains(k)).collect();
        let mut inserts: Vec<(usize, u8)> = changes
            .iter()
            .filter_map(|c| c.to.filter(|_| c.op != DeltaOp::Remove).map(|to| (to, c.key)))
            .collect();
        inserts.sort_unstable();
        for (to, key) in inserts {
            result.insert(to, key);
        }
        result
    }

    fn unique(items: Vec<u8>) -> Vec<u8> {
        let mut seen = HashSet::new();
        items.into_iter().filter(|k| seen.insert(*k)).collect()
    }

    #[test]
    fn identical_sequences_have_no_changes() {
        assert!(changes(&["a", "b", "c"], &["a", "b", "c"]).is_empty());
        assert!(changes(&[], &[]).is_empty());
    }

    #[test]
    fn rotation_moves_only_the_rotated_item() {
        let result = changes(&["a", "b", "c"], &["b", "c", "a"]);
        assert_eq!(
            result,
            vec![PositionalChange {
                key: "a".to_string(),
                op: DeltaOp::Move,
                from: Some(0),
                to: Some(2),
            }]
        );
    }

    #[test]
    fn replacement_is_an_add_and_a_remove() {
        let result = changes(&["a", "b"], &["a", "c"]);
        assert_eq!(result.len(), 2);
        assert!(result.contains(&PositionalChange {
            key: "c".to_string(),
            op: DeltaOp::Add,
            from: None,
            to: Some(1),
        }));
        assert!(result.contains(&PositionalChange {
            key: "b".to_string(),
            op: DeltaOp::Remove,
            from: Some(1),
            to: None,
        }));
    }

    #[test]
    fn removal_from_the_front_does_not_move_the_rest() {
        let result = changes(&["x", "a", "b"], &["a", "b"]);
        assert_eq!(
            result,
            vec![PositionalChange {
                key: "x".to_string(),
                op: DeltaOp::Remove,
                from: Some(0),
                to: None,
            }]
        );
    }

    #[test]
    fn keys_only_in_the_shorter_sequence_are_reported() {
        // Two removals and one addition: the longer (old) list is walked
        // first, then the new-only key.
        let result = changes(&["a", "b", "c"], &["a", "d"]);
        let ops: Vec<(&str, DeltaOp)> = result.iter().map(|c| (c.key.as_str(), c.op)).collect();
        assert_eq!(
            ops,
            vec![("b", DeltaOp::Remove), ("c", DeltaOp::Remove), ("d", DeltaOp::Add)]
        );
    }

    #[test]
    fn swap_reports_exactly_one_move() {
        let result = changes(&["one", "two"], &["two", "one"]);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].op, DeltaOp::Move);
    }

    #[test]
    fn duplicate_keys_use_last_position_and_report_once() {
        let result = changes(&["a", "b", "a"], &["b", "a"]);
        // "a" last sits at 2 before and 1 after, behind "b" both times.
        assert!(result.is_empty());
    }

    #[test]
    fn placements_include_unchanged_keys() {
        let before = strings(&["a", "b"]);
        let after = strings(&["a", "b", "c"]);
        let placements = place(&before, &after, |s| s.as_str());
        assert_eq!(placements.len(), 3);
        assert_eq!(placements[0].op, None);
        assert_eq!(placements[0].from, Some(0));
        assert_eq!(placements[2].op, Some(DeltaOp::Add));
    }

    #[test]
    fn author_deltas_carry_values_and_positions() {
        let deltas = diff_authors(&strings(&["a", "b"]), &strings(&["a", "c"]));
        let add = deltas.iter().find(|d| d.op == DeltaOp::Add).unwrap();
        assert_eq!(add.value, "c");
        assert_eq!((add.from_position, add.to_position), (None, Some(1)));
        let remove = deltas.iter().find(|d| d.op == DeltaOp::Remove).unwrap();
        assert_eq!(remove.value, "b");
        assert_eq!((remove.from_position, remove.to_position), (Some(1), None));
    }

    proptest! {
        #[test]
        fn changes_rebuild_the_new_sequence(
            before in proptest::collection::vec(0u8..16, 0..12),
            after in proptest::collection::vec(0u8..16, 0..12),
        ) {
            let before = unique(before);
            let after = unique(after);
            let result = diff_positions(&before, &after, |k: &u8| *k);
            prop_assert_eq!(replay(&before, &result), after);
        }

        #[test]
        fn same_sequence_is_a_no_op(items in proptest::collection::vec(0u8..32, 0..16)) {
            let items = unique(items);
            prop_assert!(diff_positions(&items, &items, |k: &u8| *k).is_empty());
        }

        #[test]
        fn every_key_is_classified_once(
            before in proptest::collection::vec(0u8..16, 0..12),
            after in proptest::collection::vec(0u8..16, 0..12),
        ) {
            let before = unique(before);
            let after = unique(after);
            let placements = place(&before, &after, |k: &u8| *k);
            let union: HashSet<u8> = before.iter().chain(after.iter()).copied().collect();
            prop_assert_eq!(placements.len(), union.len());
        }
    }
}
