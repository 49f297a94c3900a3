use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid identifier {value:?}: {reason}")]
    InvalidId { value: String, reason: String },

    #[error("unknown delta op: {0}")]
    UnknownDeltaOp(String),
}
