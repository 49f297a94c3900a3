use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Identifier of a [`Post`](crate::Post).
///
/// Post IDs are opaque strings (UUIDs in practice). They are stable across
/// every version of a post, which is what lets two snapshots be compared.
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(String);

impl PostId {
    /// Wrap an existing identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh, time-ordered identifier (UUID v7).
    pub fn generate() -> Self {
        Self(uuid::Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the identifier is the empty string.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for PostId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for PostId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Debug for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PostId({})", self.0)
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique identifier for a revision (UUID v7 for time-ordering).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RevisionId(uuid::Uuid);

impl RevisionId {
    /// Generate a new time-ordered revision ID.
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7())
    }

    /// Create from an existing UUID.
    pub fn from_uuid(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }

    /// The underlying UUID.
    pub fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }

    /// Short representation (first 8 characters of UUID).
    pub fn short_id(&self) -> String {
        self.0.to_string()[..8].to_string()
    }
}

impl Default for RevisionId {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for RevisionId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        uuid::Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| TypeError::InvalidId {
                value: s.to_string(),
                reason: e.to_string(),
            })
    }
}

impl fmt::Debug for RevisionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RevisionId({})", self.short_id())
    }
}

impl fmt::Display for RevisionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_post_ids_are_unique() {
        assert_ne!(PostId::generate(), PostId::generate());
    }

    #[test]
    fn post_id_serializes_as_plain_string() {
        let id = PostId::from("post-1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"post-1\"");
        let back: PostId = serde_json::from_str("\"post-1\"").unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn revision_ids_are_time_ordered() {
        let first = RevisionId::new();
        let second = RevisionId::new();
        assert!(first <= second);
    }

    #[test]
    fn revision_id_parse_roundtrip() {
        let id = RevisionId::new();
        let parsed: RevisionId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn revision_id_rejects_garbage() {
        let err = "not-a-uuid".parse::<RevisionId>().unwrap_err();
        assert!(matches!(err, TypeError::InvalidId { .. }));
    }

    #[test]
    fn short_id_is_eight_chars() {
        assert_eq!(RevisionId::new().short_id().len(), 8);
    }
}
