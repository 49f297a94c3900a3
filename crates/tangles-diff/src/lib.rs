//! Revision engine for Tangles posts.
//!
//! Given two snapshots of the same post, produces a [`Revision`] listing every
//! addition, removal, reordering and edit of its authors, parts, part headers
//! and text fields. Text changes are stored as compact deltas.
//!
//! # Key Types
//!
//! - [`RevisionGenerator`] / [`generate_revision`] -- Whole-post revisions
//! - [`diff_parts`] -- Part list diff (positional, content and header changes)
//! - [`diff_headers`] -- Per-name header value diff
//! - [`place`] / [`diff_positions`] / [`diff_authors`] -- Positional diff of keyed sequences
//! - [`text_delta`] / [`parse_delta`] / [`Edit`] -- Text delta codec
//! - [`DiffConfig`] -- Tuning knobs
//!
//! [`Revision`]: tangles_types::Revision

pub mod config;
pub mod error;
pub mod generator;
pub mod header_diff;
pub mod part_diff;
pub mod positional;
pub mod text_delta;

pub use config::DiffConfig;
pub use error::{DiffError, DiffResult};
pub use generator::{generate_revision, RevisionGenerator};
pub use header_diff::diff_headers;
pub use part_diff::diff_parts;
pub use positional::{diff_authors, diff_positions, place, Placement, PositionalChange};
pub use text_delta::{encode_delta, parse_delta, text_delta, Edit, EditSummary};
