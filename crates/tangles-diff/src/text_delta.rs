//! Compact text deltas.
//!
//! A delta describes how to turn one string into another as a tab-separated
//! list of edits:
//!
//! - `=N` keep the next N characters
//! - `-N` delete the next N characters
//! - `+text` insert `text` (percent-encoded)
//!
//! `=3\t-2\t+ing` keeps three characters, deletes two and inserts `ing`.
//! Counts are in Unicode scalar values. Identical strings produce the empty
//! delta.
//!
//! Deltas are computed with a character-level Myers diff (the `similar`
//! crate), normalised so that at most one deletion and one insertion sit
//! between two unchanged runs, and then shifted sideways onto word and line
//! boundaries so stored deltas stay readable.

use std::borrow::Cow;
use std::mem;
use std::time::Instant;

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use similar::{Algorithm, ChangeTag, TextDiff};
use tracing::warn;

use crate::config::DiffConfig;
use crate::error::{DiffError, DiffResult};

/// Characters left readable in inserted text; everything else is
/// percent-encoded. Tabs are always encoded since they separate edits.
const INSERT_ESCAPES: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b' ')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b';')
    .remove(b'/')
    .remove(b'?')
    .remove(b':')
    .remove(b'@')
    .remove(b'&')
    .remove(b'=')
    .remove(b'+')
    .remove(b'$')
    .remove(b',')
    .remove(b'#');

/// One decoded step of a delta.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Edit {
    /// Keep this many characters of the old text.
    Keep(usize),
    /// Skip this many characters of the old text.
    Delete(usize),
    /// Insert this text.
    Insert(String),
}

/// Character counts of a delta.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EditSummary {
    pub kept: usize,
    pub deleted: usize,
    pub inserted: usize,
}

impl EditSummary {
    /// Tally a list of edits.
    pub fn of(edits: &[Edit]) -> Self {
        edits.iter().fold(Self::default(), |mut acc, edit| {
            match edit {
                Edit::Keep(n) => acc.kept += n,
                Edit::Delete(n) => acc.deleted += n,
                Edit::Insert(text) => acc.inserted += text.chars().count(),
            }
            acc
        })
    }
}

/// A run of characters sharing one change tag.
#[derive(Clone, Debug, PartialEq, Eq)]
struct Segment {
    tag: ChangeTag,
    text: Vec<char>,
}

impl Segment {
    fn new(tag: ChangeTag, text: Vec<char>) -> Self {
        Self { tag, text }
    }
}

/// Compute the delta turning `old` into `new` with the default configuration.
pub fn text_delta(old: &str, new: &str) -> String {
    encode_delta(old, new, &DiffConfig::default())
}

/// Compute the delta turning `old` into `new`.
pub fn encode_delta(old: &str, new: &str, config: &DiffConfig) -> String {
    if old == new {
        return String::new();
    }
    let mut segments = diff_segments(old, new, config);
    if config.semantic_cleanup {
        cleanup_semantic_lossless(&mut segments);
    }
    to_wire(&segments)
}

/// Decode a delta into its edits.
pub fn parse_delta(delta: &str) -> DiffResult<Vec<Edit>> {
    let mut edits = Vec::new();
    for token in delta.split('\t') {
        // A trailing tab leaves an empty token behind.
        if token.is_empty() {
            continue;
        }
        let mut chars = token.chars();
        let marker = chars.next();
        let param = chars.as_str();
        let edit = match marker {
            Some('+') => {
                let text = percent_decode_str(param)
                    .decode_utf8()
                    .map_err(|e| malformed(token, e))?;
                Edit::Insert(text.into_owned())
            }
            Some('-') => Edit::Delete(parse_count(token, param)?),
            Some('=') => Edit::Keep(parse_count(token, param)?),
            _ => return Err(malformed(token, "unknown edit marker")),
        };
        edits.push(edit);
    }
    Ok(edits)
}

fn parse_count(token: &str, param: &str) -> DiffResult<usize> {
    param.parse().map_err(|e| malformed(token, e))
}

fn malformed(token: &str, reason: impl ToString) -> DiffError {
    DiffError::MalformedDelta {
        token: token.to_string(),
        reason: reason.to_string(),
    }
}

fn to_wire(segments: &[Segment]) -> String {
    segments
        .iter()
        .map(|segment| match segment.tag {
            ChangeTag::Equal => format!("={}", segment.text.len()),
            ChangeTag::Delete => format!("-{}", segment.text.len()),
            ChangeTag::Insert => {
                let text: String = segment.text.iter().collect();
                format!("+{}", utf8_percent_encode(&text, INSERT_ESCAPES))
            }
        })
        .collect::<Vec<_>>()
        .join("\t")
}

/// Run the character diff and group it into merged segments.
fn diff_segments(old: &str, new: &str, config: &DiffConfig) -> Vec<Segment> {
    let mut builder = TextDiff::configure();
    builder.algorithm(Algorithm::Myers);
    if let Some(timeout) = config.text_diff_timeout {
        builder.timeout(timeout);
    }

    let started = Instant::now();
    let diff = builder.diff_chars(old, new);
    if let Some(timeout) = config.text_diff_timeout {
        let elapsed = started.elapsed();
        if elapsed >= timeout {
            warn!(
                ?elapsed,
                old_len = old.len(),
                new_len = new.len(),
                "text diff hit its time budget; delta may not be minimal"
            );
        }
    }

    let mut runs: Vec<Segment> = Vec::new();
    for change in diff.iter_all_changes() {
        let tag = change.tag();
        match runs.last_mut() {
            Some(last) if last.tag == tag => last.text.extend(change.value().chars()),
            _ => runs.push(Segment::new(tag, change.value().chars().collect())),
        }
    }
    merge_edits(runs)
}

/// Collapse every stretch of edits between two unchanged runs into one
/// deletion followed by one insertion, moving any shared prefix or suffix
/// of the two into the surrounding unchanged runs.
fn merge_edits(runs: Vec<Segment>) -> Vec<Segment> {
    let mut merged = Vec::with_capacity(runs.len());
    let mut deleted = Vec::new();
    let mut inserted = Vec::new();

    for run in runs {
        match run.tag {
            ChangeTag::Delete => deleted.extend(run.text),
            ChangeTag::Insert => inserted.extend(run.text),
            ChangeTag::Equal => {
                let carried = flush_edits(&mut merged, &mut deleted, &mut inserted);
                push_equal(&mut merged, &carried);
                push_equal(&mut merged, &run.text);
            }
        }
    }
    let carried = flush_edits(&mut merged, &mut deleted, &mut inserted);
    push_equal(&mut merged, &carried);
    merged
}

/// Emit the pending edits. Returns the common suffix, which belongs at the
/// start of the next unchanged run.
fn flush_edits(merged: &mut Vec<Segment>, deleted: &mut Vec<char>, inserted: &mut Vec<char>) -> Vec<char> {
    let mut carried = Vec::new();
    if !deleted.is_empty() && !inserted.is_empty() {
        let prefix = common_prefix(deleted, inserted);
        if prefix > 0 {
            push_equal(merged, &inserted[..prefix]);
            deleted.drain(..prefix);
            inserted.drain(..prefix);
        }
        let suffix = common_suffix(deleted, inserted);
        if suffix > 0 {
            carried = inserted.split_off(inserted.len() - suffix);
            deleted.truncate(deleted.len() - suffix);
        }
    }
    if !deleted.is_empty() {
        merged.push(Segment::new(ChangeTag::Delete, mem::take(deleted)));
    }
    if !inserted.is_empty() {
        merged.push(Segment::new(ChangeTag::Insert, mem::take(inserted)));
    }
    carried
}

fn push_equal(merged: &mut Vec<Segment>, text: &[char]) {
    if text.is_empty() {
        return;
    }
    match merged.last_mut() {
        Some(last) if last.tag == ChangeTag::Equal => last.text.extend_from_slice(text),
        _ => merged.push(Segment::new(ChangeTag::Equal, text.to_vec())),
    }
}

fn common_prefix(a: &[char], b: &[char]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

fn common_suffix(a: &[char], b: &[char]) -> usize {
    a.iter().rev().zip(b.iter().rev()).take_while(|(x, y)| x == y).count()
}

/// Slide each single edit surrounded by unchanged runs left or right to the
/// most natural boundary. The net edit never changes.
///
/// `The c<ins>at c</ins>ame.` becomes `The <ins>cat </ins>came.`
fn cleanup_semantic_lossless(segments: &mut Vec<Segment>) {
    let mut pointer = 1;
    while pointer + 1 < segments.len() {
        if segments[pointer - 1].tag == ChangeTag::Equal
            && segments[pointer + 1].tag == ChangeTag::Equal
        {
            let mut equality1 = segments[pointer - 1].text.clone();
            let mut edit = segments[pointer].text.clone();
            let mut equality2 = segments[pointer + 1].text.clone();

            // Shift the edit as far left as possible.
            let offset = common_suffix(&equality1, &edit);
            if offset > 0 {
                let common = edit[edit.len() - offset..].to_vec();
                equality1.truncate(equality1.len() - offset);
                edit = [common.as_slice(), &edit[..edit.len() - offset]].concat();
                equality2 = [common.as_slice(), equality2.as_slice()].concat();
            }

            // Then step right one character at a time; the rightmost of
            // equally scored boundaries wins.
            let mut best_score =
                boundary_score(&equality1, &edit) + boundary_score(&edit, &equality2);
            let mut best = (equality1.clone(), edit.clone(), equality2.clone());
            while !edit.is_empty() && !equality2.is_empty() && edit[0] == equality2[0] {
                equality1.push(edit.remove(0));
                edit.push(equality2.remove(0));
                let score = boundary_score(&equality1, &edit) + boundary_score(&edit, &equality2);
                if score >= best_score {
                    best_score = score;
                    best = (equality1.clone(), edit.clone(), equality2.clone());
                }
            }

            let (best_equality1, best_edit, best_equality2) = best;
            if segments[pointer - 1].text != best_equality1 {
                segments[pointer].text = best_edit;
                if best_equality2.is_empty() {
                    segments.remove(pointer + 1);
                } else {
                    segments[pointer + 1].text = best_equality2;
                }
                if best_equality1.is_empty() {
                    segments.remove(pointer - 1);
                    pointer -= 1;
                } else {
                    segments[pointer - 1].text = best_equality1;
                }
            }
        }
        pointer += 1;
    }
}

/// How good a split between `one` and `two` is, from 6 (edge of the text)
/// down to 0 (inside a word).
fn boundary_score(one: &[char], two: &[char]) -> u8 {
    let (Some(&char1), Some(&char2)) = (one.last(), two.first()) else {
        return 6;
    };

    let non_alnum1 = !char1.is_alphanumeric();
    let non_alnum2 = !char2.is_alphanumeric();
    let whitespace1 = non_alnum1 && char1.is_whitespace();
    let whitespace2 = non_alnum2 && char2.is_whitespace();
    let line_break1 = whitespace1 && (char1 == '\r' || char1 == '\n');
    let line_break2 = whitespace2 && (char2 == '\r' || char2 == '\n');
    let blank_line1 = line_break1 && ends_with_blank_line(one);
    let blank_line2 = line_break2 && starts_with_blank_line(two);

    if blank_line1 || blank_line2 {
        5
    } else if line_break1 || line_break2 {
        4
    } else if non_alnum1 && !whitespace1 && whitespace2 {
        // End of sentence.
        3
    } else if whitespace1 || whitespace2 {
        2
    } else if non_alnum1 || non_alnum2 {
        1
    } else {
        0
    }
}

fn ends_with_blank_line(text: &[char]) -> bool {
    text.ends_with(&['\n', '\n']) || text.ends_with(&['\n', '\r', '\n'])
}

fn starts_with_blank_line(text: &[char]) -> bool {
    let text = text.strip_prefix(&['\r']).unwrap_or(text);
    let Some(text) = text.strip_prefix(&['\n']) else {
        return false;
    };
    let text = text.strip_prefix(&['\r']).unwrap_or(text);
    text.starts_with(&['\n'])
}

/// Replay a delta against `old`. Test-only: applying deltas is left to
/// consumers of stored revisions.
#[cfg(test)]
pub(crate) fn replay(old: &str, delta: &str) -> String {
    let chars: Vec<char> = old.chars().collect();
    let mut cursor = 0;
    let mut out = String::new();
    if delta.is_empty() {
        return old.to_string();
    }
    for edit in parse_delta(delta).expect("delta should parse") {
        match edit {
            Edit::Keep(n) => {
                out.extend(&chars[cursor..cursor + n]);
                cursor += n;
            }
            Edit::Delete(n) => cursor += n,
            Edit::Insert(text) => out.push_str(&text),
        }
    }
    assert_eq!(cursor, chars.len(), "delta must consume the whole old text");
    out
}

/// Lossy view of an inline body as text.
pub(crate) fn body_text(body: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(body)
}
