use tangles_types::PostId;

/// Errors from post store operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// No post with this ID exists.
    #[error("post not found: {0}")]
    NotFound(PostId),

    /// A post with this ID was already created.
    #[error("post already exists: {0}")]
    AlreadyExists(PostId),

    /// The post lacks a field the store needs to persist it.
    #[error("post is missing required field `{0}`")]
    MissingField(&'static str),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
