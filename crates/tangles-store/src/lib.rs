//! Post persistence for Tangles.
//!
//! Posts are stored as snapshots next to the list of revisions recorded
//! against them. The store is the collaborator that receives the revisions
//! produced by `tangles-diff`; it never interprets their contents.
//!
//! # Storage Backends
//!
//! All backends implement the [`PostStore`] trait:
//!
//! - [`InMemoryPostStore`] -- `HashMap`-based store for tests and embedding
//!
//! # Querying
//!
//! [`PostStore::list`] takes a [`PostFilter`]. List-valued constraints
//! (authors, streams) are matched according to a [`StringListFilterMode`].

pub mod error;
pub mod filter;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use filter::{PostFilter, StringListFilterMode};
pub use memory::InMemoryPostStore;
pub use traits::PostStore;
