use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tangles_types::Post;

/// How a list of strings in a [`PostFilter`] is matched against a post's list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StringListFilterMode {
    /// Same values in the same order.
    Exact,
    /// Same values in any order.
    ExactUnordered,
    /// Every filter value is present; other values may be too.
    #[default]
    ContainsAll,
    /// At least one filter value is present.
    ContainsAny,
    /// None of the filter values is present.
    Excludes,
}

impl StringListFilterMode {
    /// Returns `true` if `values` satisfies `wanted` under this mode.
    pub fn matches(&self, wanted: &[String], values: &[String]) -> bool {
        match self {
            Self::Exact => wanted == values,
            Self::ExactUnordered => {
                let mut a: Vec<&String> = wanted.iter().collect();
                let mut b: Vec<&String> = values.iter().collect();
                a.sort_unstable();
                b.sort_unstable();
                a == b
            }
            Self::ContainsAll => {
                let present: BTreeSet<&String> = values.iter().collect();
                wanted.iter().all(|w| present.contains(w))
            }
            Self::ContainsAny => wanted.iter().any(|w| values.contains(w)),
            Self::Excludes => !wanted.iter().any(|w| values.contains(w)),
        }
    }
}

/// Selects the posts a caller is interested in. Unset fields match every post.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostFilter {
    pub slug: Option<String>,
    /// Applied only when non-empty.
    pub authors: Vec<String>,
    pub authors_mode: StringListFilterMode,
    /// Exclusive upper bound on `published_at`.
    pub published_before: Option<DateTime<Utc>>,
    /// Exclusive lower bound on `published_at`.
    pub published_after: Option<DateTime<Utc>>,
    pub draft: Option<bool>,
    /// Applied only when non-empty.
    pub streams: Vec<String>,
    pub streams_mode: StringListFilterMode,
}

impl PostFilter {
    /// Returns `true` if the filter constrains nothing.
    pub fn is_empty(&self) -> bool {
        self.slug.is_none()
            && self.authors.is_empty()
            && self.published_before.is_none()
            && self.published_after.is_none()
            && self.draft.is_none()
            && self.streams.is_empty()
    }

    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    pub fn with_authors(mut self, authors: Vec<String>, mode: StringListFilterMode) -> Self {
        self.authors = authors;
        self.authors_mode = mode;
        self
    }

    pub fn with_streams(mut self, streams: Vec<String>, mode: StringListFilterMode) -> Self {
        self.streams = streams;
        self.streams_mode = mode;
        self
    }

    pub fn with_draft(mut self, draft: bool) -> Self {
        self.draft = Some(draft);
        self
    }

    /// Restrict to posts published strictly between `after` and `before`.
    pub fn published_between(mut self, after: Option<DateTime<Utc>>, before: Option<DateTime<Utc>>) -> Self {
        self.published_after = after;
        self.published_before = before;
        self
    }

    /// Returns `true` if `post` passes every set constraint.
    ///
    /// A publication bound rejects posts that were never published.
    pub fn matches(&self, post: &Post) -> bool {
        if self.slug.as_ref().is_some_and(|slug| *slug != post.slug) {
            return false;
        }
        if !self.authors.is_empty() && !self.authors_mode.matches(&self.authors, &post.authors) {
            return false;
        }
        if let Some(before) = self.published_before {
            if !post.published_at.is_some_and(|at| at < before) {
                return false;
            }
        }
        if let Some(after) = self.published_after {
            if !post.published_at.is_some_and(|at| at > after) {
                return false;
            }
        }
        if self.draft.is_some_and(|draft| draft != post.draft) {
            return false;
        }
        if !self.streams.is_empty() && !self.streams_mode.matches(&self.streams, &post.streams) {
            return false;
        }
        true
    }
}
