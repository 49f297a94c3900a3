use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::id::RevisionId;

/// The kind of change a delta describes.
///
/// Serializes to the short wire names `add`, `rm`, `up`, `mv` and `mvup`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeltaOp {
    /// The item was added.
    #[serde(rename = "add")]
    Add,
    /// The item was removed.
    #[serde(rename = "rm")]
    Remove,
    /// The item's contents changed in place.
    #[serde(rename = "up")]
    Update,
    /// The item changed position.
    #[serde(rename = "mv")]
    Move,
    /// The item changed position and contents.
    #[serde(rename = "mvup")]
    MoveUpdate,
}

impl DeltaOp {
    /// The wire name of this op.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Remove => "rm",
            Self::Update => "up",
            Self::Move => "mv",
            Self::MoveUpdate => "mvup",
        }
    }

    /// Fold a content change into this op: a move becomes a move-update,
    /// additions and removals already imply their content.
    pub fn with_update(self) -> Self {
        match self {
            Self::Move | Self::MoveUpdate => Self::MoveUpdate,
            Self::Update => Self::Update,
            Self::Add => Self::Add,
            Self::Remove => Self::Remove,
        }
    }

    /// Returns `true` for ops that change an item's position.
    pub fn is_move(&self) -> bool {
        matches!(self, Self::Move | Self::MoveUpdate)
    }
}

impl fmt::Display for DeltaOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeltaOp {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add" => Ok(Self::Add),
            "rm" => Ok(Self::Remove),
            "up" => Ok(Self::Update),
            "mv" => Ok(Self::Move),
            "mvup" => Ok(Self::MoveUpdate),
            other => Err(TypeError::UnknownDeltaOp(other.to_string())),
        }
    }
}

/// An atomic update to a post: every change between two of its snapshots.
///
/// Only changed items are recorded. A revision between identical snapshots
/// has every delta field empty.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revision {
    /// Assigned by the persistence layer when the revision is recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RevisionId>,
    /// Whether the revision is publicly visible or a silent edit.
    #[serde(default)]
    pub public: bool,
    /// Why the revision was made, for public revisions.
    #[serde(default)]
    pub reason: String,
    /// Text delta turning the old title into the new one. Empty when the
    /// title did not change.
    #[serde(default)]
    pub title_delta: String,
    /// Text delta turning the old slug into the new one. Empty when the
    /// slug did not change.
    #[serde(default)]
    pub slug_delta: String,
    #[serde(default)]
    pub authors_deltas: Vec<AuthorsDelta>,
    #[serde(default)]
    pub parts_deltas: Vec<PartDelta>,
    #[serde(default)]
    pub metadata_deltas: Vec<PartDelta>,
}

impl Revision {
    /// Returns `true` if no change was recorded.
    pub fn is_empty(&self) -> bool {
        self.change_count() == 0
    }

    /// Number of recorded changes across all fields.
    pub fn change_count(&self) -> usize {
        usize::from(!self.title_delta.is_empty())
            + usize::from(!self.slug_delta.is_empty())
            + self.authors_deltas.len()
            + self.parts_deltas.len()
            + self.metadata_deltas.len()
    }
}

/// A change to a post's author list.
///
/// Author IDs are opaque, so the op is always `Add`, `Remove` or `Move`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorsDelta {
    pub op: DeltaOp,
    /// Original index, `None` when the author was added.
    ///
    /// Positions are absolute indices. A move is a change of order relative
    /// to the other authors, so additions or removals around an author can
    /// shift its index without making it a move.
    #[serde(with = "position")]
    pub from_position: Option<usize>,
    /// Final index, `None` when the author was removed.
    #[serde(with = "position")]
    pub to_position: Option<usize>,
    /// The author ID.
    pub value: String,
}

/// The change one part went through.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartDelta {
    pub part_id: String,
    pub op: DeltaOp,
    /// Absolute index in the old list, `None` for an added part.
    ///
    /// `from_position` and `to_position` can differ on an `Update` when
    /// parts around it were added or removed: only a change of order
    /// relative to the surviving parts counts as a move.
    #[serde(with = "position")]
    pub from_position: Option<usize>,
    /// Absolute index in the new list, `None` for a removed part.
    #[serde(with = "position")]
    pub to_position: Option<usize>,
    /// Per header name, the value changes. Unchanged headers are absent.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, Vec<HeaderDelta>>,
    /// Text delta of the body when at least one side is inline.
    ///
    /// Inline to blob records the deletion of the whole old body, blob to
    /// inline the creation of the whole new body. Empty when both sides are
    /// blobs.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub body: String,
    /// Hash of the blob the part started as, when that side is not inline.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub sha256_from: String,
    /// Hash of the blob the part ended as, when that side is not inline.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub sha256_to: String,
}

/// The change of one value within a header.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderDelta {
    pub op: DeltaOp,
    /// Header name.
    pub header: String,
    /// Absolute index among the header's old values. Like part positions,
    /// it can differ from `to_position` without the value having moved.
    #[serde(with = "position")]
    pub from_position: Option<usize>,
    /// Absolute index among the header's new values.
    #[serde(with = "position")]
    pub to_position: Option<usize>,
    /// The value itself for additions, removals and moves; a text delta
    /// from the old value to the new one for updates.
    pub value: String,
}

/// Positions go over the wire as integers, `-1` meaning "not present".
mod position {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    const NOT_PRESENT: i64 = -1;

    pub fn serialize<S: Serializer>(pos: &Option<usize>, serializer: S) -> Result<S::Ok, S::Error> {
        match pos {
            Some(p) => {
                let p = i64::try_from(*p).map_err(serde::ser::Error::custom)?;
                serializer.serialize_i64(p)
            }
            None => serializer.serialize_i64(NOT_PRESENT),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<usize>, D::Error> {
        let raw = i64::deserialize(deserializer)?;
        if raw == NOT_PRESENT {
            return Ok(None);
        }
        usize::try_from(raw).map(Some).map_err(D::Error::custom)
    }
}
