//! Data model for Tangles posts.
//!
//! This crate holds the plain value types shared by the diff engine, the
//! persistence layer and the CLI. Nothing here computes a diff; the types
//! only describe posts and the revisions produced between two versions of
//! the same post.
//!
//! # Key Types
//!
//! - [`Post`] -- a versioned composite document
//! - [`Part`] / [`PartContent`] -- an independently editable chunk of a post,
//!   stored inline or referenced by content hash
//! - [`Revision`] -- every change detected between two snapshots of a post
//! - [`AuthorsDelta`] / [`PartDelta`] / [`HeaderDelta`] -- per-item changes
//! - [`DeltaOp`] -- the change classification carried by every delta

pub mod error;
pub mod id;
pub mod part;
pub mod post;
pub mod revision;

pub use error::TypeError;
pub use id::{PostId, RevisionId};
pub use part::{Headers, Part, PartContent};
pub use post::Post;
pub use revision::{AuthorsDelta, DeltaOp, HeaderDelta, PartDelta, Revision};
