//! Part list diffing.
//!
//! Parts are matched by ID. On top of the positional classification a part
//! that kept its ID is checked for content and header changes, which turn a
//! no-op into `Update` and a `Move` into `MoveUpdate`.
//!
//! Bodies go into the delta according to where content lives on each side:
//!
//! | before | after  | `body`            | `sha256_from` | `sha256_to` |
//! |--------|--------|-------------------|---------------|-------------|
//! | inline | inline | delta(old, new)   |               |             |
//! | blob   | inline | delta("", new)    | old hash      |             |
//! | inline | blob   | delta(old, "")    |               | new hash    |
//! | blob   | blob   |                   | old hash      | new hash    |
//!
//! An added part is diffed against nothing and a removed one against
//! nothing, so their deltas carry the full content and every header value.

use tangles_types::{DeltaOp, Headers, Part, PartContent, PartDelta};

use crate::config::DiffConfig;
use crate::header_diff::diff_headers;
use crate::positional::place;
use crate::text_delta::{body_text, encode_delta};

/// One delta per changed part, in positional order.
pub fn diff_parts(before: &[Part], after: &[Part], config: &DiffConfig) -> Vec<PartDelta> {
    let placements = place(before, after, |part| part.id.as_str());
    let mut deltas = Vec::new();

    for placement in placements {
        let old = placement.from.and_then(|pos| before.get(pos));
        let new = placement.to.and_then(|pos| after.get(pos));

        let headers = diff_headers(
            old.map_or(&EMPTY_HEADERS, |p| &p.headers),
            new.map_or(&EMPTY_HEADERS, |p| &p.headers),
            config,
        );

        let mut op = placement.op;
        if let (Some(old), Some(new)) = (old, new) {
            if !old.content.same_content(&new.content) || !headers.is_empty() {
                op = Some(op.map_or(DeltaOp::Update, DeltaOp::with_update));
            }
        }
        let Some(op) = op else {
            continue;
        };

        let content = ContentChange::between(old.map(|p| &p.content), new.map(|p| &p.content), config);
        deltas.push(PartDelta {
            part_id: placement.key.to_string(),
            op,
            from_position: placement.from,
            to_position: placement.to,
            headers,
            body: content.body,
            sha256_from: content.sha256_from,
            sha256_to: content.sha256_to,
        });
    }
    deltas
}

static EMPTY_HEADERS: Headers = Headers::new();

/// The body related fields of a [`PartDelta`].
#[derive(Debug, Default, PartialEq, Eq)]
struct ContentChange {
    body: String,
    sha256_from: String,
    sha256_to: String,
}

impl ContentChange {
    /// Describe the move from `old` to `new` content. A missing side behaves
    /// like an empty inline body.
    fn between(old: Option<&PartContent>, new: Option<&PartContent>, config: &DiffConfig) -> Self {
        let mut change = Self::default();
        let mut old_text = String::new();
        let mut new_text = String::new();

        match old {
            Some(PartContent::Inline { body }) => old_text = body_text(body).into_owned(),
            Some(PartContent::Blob { sha256 }) => change.sha256_from = sha256.clone(),
            None => {}
        }
        match new {
            Some(PartContent::Inline { body }) => new_text = body_text(body).into_owned(),
            Some(PartContent::Blob { sha256 }) => change.sha256_to = sha256.clone(),
            None => {}
        }

        let any_inline = [old, new]
            .into_iter()
            .flatten()
            .any(|content| matches!(content, PartContent::Inline { .. }));
        if any_inline {
            change.body = encode_delta(&old_text, &new_text, config);
        }
        change
    }
}
