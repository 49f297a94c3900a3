use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::PostId;
use crate::part::Part;

/// A single, self-contained entry in a stream.
///
/// Only `title`, `slug`, `authors`, `parts` and `metadata` take part in
/// revision diffs. The remaining fields are normalized listing state that
/// the persistence layer filters on.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    #[serde(default)]
    pub title: String,
    /// URL component identifying the post, usually derived from the title.
    #[serde(default)]
    pub slug: String,
    /// Opaque author IDs, in credit order.
    #[serde(default)]
    pub authors: Vec<String>,
    /// Body content; every part is rendered as part of the post.
    #[serde(default)]
    pub parts: Vec<Part>,
    /// Information about the post (summary, social cards) that is surfaced
    /// elsewhere but not rendered in the body.
    #[serde(default)]
    pub metadata: Vec<Part>,
    /// IDs of the streams the post belongs to.
    #[serde(default)]
    pub streams: Vec<String>,
    #[serde(default)]
    pub draft: bool,
    /// Soft-deletion marker.
    #[serde(default)]
    pub deleted: bool,
    /// Last time the post was published.
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
}

impl Post {
    /// Create an empty post with the given ID.
    pub fn new(id: impl Into<PostId>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Rewrite every part's `position` to match its index in `parts` and
    /// `metadata`.
    pub fn renumber_parts(&mut self) {
        for (pos, part) in self.parts.iter_mut().enumerate() {
            part.position = pos;
        }
        for (pos, part) in self.metadata.iter_mut().enumerate() {
            part.position = pos;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_post_json_parses() {
        let post: Post = serde_json::from_str(r#"{"id":"p"}"#).unwrap();
        assert_eq!(post, Post::new("p"));
        assert!(post.published_at.is_none());
    }

    #[test]
    fn renumber_parts_follows_list_order() {
        let mut post = Post::new("p");
        post.parts = vec![
            Part::inline("a", "").at_position(7),
            Part::inline("b", "").at_position(7),
        ];
        post.metadata = vec![Part::inline("m", "").at_position(3)];
        post.renumber_parts();
        assert_eq!(post.parts[0].position, 0);
        assert_eq!(post.parts[1].position, 1);
        assert_eq!(post.metadata[0].position, 0);
    }

    #[test]
    fn post_roundtrips_through_json() {
        let mut post = Post::new("p");
        post.title = "Hello".into();
        post.authors = vec!["alice".into()];
        post.parts = vec![Part::inline("a", "body")];
        post.published_at = Some("2024-01-02T03:04:05Z".parse().unwrap());
        let json = serde_json::to_string(&post).unwrap();
        assert_eq!(serde_json::from_str::<Post>(&json).unwrap(), post);
    }
}
