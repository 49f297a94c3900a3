use tangles_types::{Post, PostId, Revision};

use crate::error::StoreResult;
use crate::filter::PostFilter;

/// Persistence for posts and their revision history.
///
/// Implementations must satisfy these invariants:
/// - Revisions are recorded, never interpreted: the store does not apply a
///   revision to the stored snapshot.
/// - Deletion is soft. A deleted post keeps its ID and history and stays
///   readable through [`PostStore::get`].
/// - Every recorded revision has an ID once `update` returns.
pub trait PostStore: Send + Sync {
    /// Persist a new post.
    ///
    /// Fails with `MissingField` when the post has no ID and with
    /// `AlreadyExists` when the ID is taken.
    fn create(&self, post: Post) -> StoreResult<()>;

    /// Record `revision` against the post with the given ID and return it
    /// with its assigned ID.
    fn update(&self, post_id: &PostId, revision: Revision) -> StoreResult<Revision>;

    /// Mark the post as deleted and return it.
    fn delete(&self, id: &PostId) -> StoreResult<Post>;

    /// Read a post by ID.
    fn get(&self, id: &PostId) -> StoreResult<Post>;

    /// Posts matching `filter`, newest publication first. Unpublished posts
    /// come last and deleted posts are left out.
    fn list(&self, filter: &PostFilter) -> StoreResult<Vec<Post>>;

    /// Revisions recorded for a post, oldest first.
    fn revisions(&self, id: &PostId) -> StoreResult<Vec<Revision>>;
}
