//! Revision generation: whole-post diffs.

use tangles_types::{Post, Revision};
use tracing::debug;

use crate::config::DiffConfig;
use crate::error::{DiffError, DiffResult};
use crate::part_diff::diff_parts;
use crate::positional::diff_authors;
use crate::text_delta::encode_delta;

/// Produces [`Revision`]s from pairs of post snapshots.
///
/// Generation is a pure function of the two snapshots and the configuration.
/// The order of the snapshots matters: `generate(a, b)` describes how `a`
/// became `b` and is not the inverse of `generate(b, a)`.
#[derive(Clone, Debug, Default)]
pub struct RevisionGenerator {
    config: DiffConfig,
}

impl RevisionGenerator {
    pub fn new(config: DiffConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DiffConfig {
        &self.config
    }

    /// Describe every change from `before` to `after`.
    ///
    /// Fails only when the snapshots belong to different posts. `public`,
    /// `reason` and `id` are left for the caller to fill in.
    pub fn generate(&self, before: &Post, after: &Post) -> DiffResult<Revision> {
        if before.id != after.id {
            return Err(DiffError::IdentityMismatch {
                before: before.id.clone(),
                after: after.id.clone(),
            });
        }

        let mut revision = Revision::default();
        if before.title != after.title {
            revision.title_delta = encode_delta(&before.title, &after.title, &self.config);
        }
        if before.slug != after.slug {
            revision.slug_delta = encode_delta(&before.slug, &after.slug, &self.config);
        }
        revision.authors_deltas = diff_authors(&before.authors, &after.authors);
        revision.parts_deltas = diff_parts(&before.parts, &after.parts, &self.config);
        revision.metadata_deltas = diff_parts(&before.metadata, &after.metadata, &self.config);

        debug!(
            post = %after.id,
            authors = revision.authors_deltas.len(),
            parts = revision.parts_deltas.len(),
            metadata = revision.metadata_deltas.len(),
            "generated revision"
        );
        Ok(revision)
    }
}

/// Generate a revision with the default configuration.
pub fn generate_revision(before: &Post, after: &Post) -> DiffResult<Revision> {
    RevisionGenerator::default().generate(before, after)
}
