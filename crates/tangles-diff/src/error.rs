//! Error types for the diff crate.

use tangles_types::PostId;

/// Errors that can occur while generating or decoding revisions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiffError {
    /// The two snapshots belong to different posts.
    #[error("post IDs must match: {before} != {after}")]
    IdentityMismatch { before: PostId, after: PostId },

    /// A text delta could not be decoded.
    #[error("malformed delta token {token:?}: {reason}")]
    MalformedDelta { token: String, reason: String },
}

/// Convenience alias for diff results.
pub type DiffResult<T> = Result<T, DiffError>;
