use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

/// Header map of a [`Part`]: header name to an ordered list of values.
///
/// Values are multi-valued and order-significant. Names are kept sorted so
/// that anything derived from a header map is deterministic.
pub type Headers = BTreeMap<String, Vec<String>>;

/// Where the content of a part lives.
///
/// Inline content is stored with the post and diffed as text. Blob content
/// lives in external blob storage and is only ever identified by the
/// SHA-256 of its bytes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "storage", rename_all = "snake_case")]
pub enum PartContent {
    Inline {
        #[serde(with = "body_repr")]
        body: Vec<u8>,
    },
    Blob {
        /// Lowercase hex SHA-256 of the blob's bytes.
        sha256: String,
    },
}

impl PartContent {
    /// Returns `true` if both sides hold the same content.
    ///
    /// Inline bodies compare byte for byte, blobs compare by hash, and an
    /// inline body never equals a blob.
    pub fn same_content(&self, other: &PartContent) -> bool {
        match (self, other) {
            (Self::Inline { body: a }, Self::Inline { body: b }) => a == b,
            (Self::Blob { sha256: a }, Self::Blob { sha256: b }) => a == b,
            _ => false,
        }
    }
}

/// A single, independently editable chunk of a post: usually a paragraph or
/// an image. Parts carry their own headers (content type, rendering
/// options) and keep the same `id` across edits.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
    pub id: String,
    #[serde(default)]
    pub headers: Headers,
    /// Order of the part in its list. Denormalized from the list order.
    #[serde(default)]
    pub position: usize,
    #[serde(flatten)]
    pub content: PartContent,
}

impl Part {
    /// Create a part whose body is stored inline.
    pub fn inline(id: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            id: id.into(),
            headers: Headers::new(),
            position: 0,
            content: PartContent::Inline { body: body.into() },
        }
    }

    /// Create a part referencing a blob by its SHA-256.
    pub fn blob(id: impl Into<String>, sha256: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            headers: Headers::new(),
            position: 0,
            content: PartContent::Blob {
                sha256: sha256.into(),
            },
        }
    }

    /// Create a blob part, hashing `data` to obtain its identifier.
    pub fn blob_from_bytes(id: impl Into<String>, data: &[u8]) -> Self {
        Self::blob(id, sha256_hex(data))
    }

    /// Append a value to the named header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.entry(name.into()).or_default().push(value.into());
        self
    }

    pub fn at_position(mut self, position: usize) -> Self {
        self.position = position;
        self
    }

    pub fn is_inline(&self) -> bool {
        matches!(self.content, PartContent::Inline { .. })
    }

    /// The inline body, if the part is stored inline.
    pub fn body(&self) -> Option<&[u8]> {
        match &self.content {
            PartContent::Inline { body } => Some(body),
            PartContent::Blob { .. } => None,
        }
    }

    /// The blob hash, if the part is stored in blob storage.
    pub fn sha256(&self) -> Option<&str> {
        match &self.content {
            PartContent::Inline { .. } => None,
            PartContent::Blob { sha256 } => Some(sha256),
        }
    }
}

/// Lowercase hex SHA-256 of `data`.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Inline bodies serialize as strings when they are valid UTF-8 and as byte
/// arrays otherwise; both forms are accepted on input.
mod body_repr {
    use super::*;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Text(String),
        Bytes(Vec<u8>),
    }

    pub fn serialize<S: Serializer>(body: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        match std::str::from_utf8(body) {
            Ok(text) => serializer.serialize_str(text),
            Err(_) => body.serialize(serializer),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        Ok(match Repr::deserialize(deserializer)? {
            Repr::Text(text) => text.into_bytes(),
            Repr::Bytes(bytes) => bytes,
        })
    }
}
