use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::RwLock;

use tangles_types::{Post, PostId, Revision, RevisionId};
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::filter::PostFilter;
use crate::traits::PostStore;

struct Entry {
    post: Post,
    revisions: Vec<Revision>,
}

/// In-memory, HashMap-based post store.
///
/// Intended for tests and embedding. Posts are held behind a `RwLock` and
/// cloned on read and write.
pub struct InMemoryPostStore {
    posts: RwLock<HashMap<PostId, Entry>>,
}

impl InMemoryPostStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            posts: RwLock::new(HashMap::new()),
        }
    }

    /// Number of posts stored, deleted ones included.
    pub fn len(&self) -> usize {
        self.posts.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.posts.read().expect("lock poisoned").is_empty()
    }
}

impl Default for InMemoryPostStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PostStore for InMemoryPostStore {
    fn create(&self, mut post: Post) -> StoreResult<()> {
        if post.id.is_empty() {
            return Err(StoreError::MissingField("id"));
        }
        let mut map = self.posts.write().expect("lock poisoned");
        if map.contains_key(&post.id) {
            return Err(StoreError::AlreadyExists(post.id));
        }
        post.renumber_parts();
        debug!(post = %post.id, parts = post.parts.len(), "created post");
        map.insert(
            post.id.clone(),
            Entry {
                post,
                revisions: Vec::new(),
            },
        );
        Ok(())
    }

    fn update(&self, post_id: &PostId, mut revision: Revision) -> StoreResult<Revision> {
        let mut map = self.posts.write().expect("lock poisoned");
        let entry = map
            .get_mut(post_id)
            .ok_or_else(|| StoreError::NotFound(post_id.clone()))?;
        let id = *revision.id.get_or_insert_with(RevisionId::new);
        entry.revisions.push(revision.clone());
        debug!(post = %post_id, revision = %id, changes = revision.change_count(), "recorded revision");
        Ok(revision)
    }

    fn delete(&self, id: &PostId) -> StoreResult<Post> {
        let mut map = self.posts.write().expect("lock poisoned");
        let entry = map.get_mut(id).ok_or_else(|| StoreError::NotFound(id.clone()))?;
        entry.post.deleted = true;
        debug!(post = %id, "deleted post");
        Ok(entry.post.clone())
    }

    fn get(&self, id: &PostId) -> StoreResult<Post> {
        let map = self.posts.read().expect("lock poisoned");
        map.get(id)
            .map(|entry| entry.post.clone())
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    fn list(&self, filter: &PostFilter) -> StoreResult<Vec<Post>> {
        let map = self.posts.read().expect("lock poisoned");
        let mut posts: Vec<Post> = map
            .values()
            .map(|entry| &entry.post)
            .filter(|post| !post.deleted && filter.matches(post))
            .cloned()
            .collect();
        // `None` sorts below every `Some`, so unpublished posts end up last.
        // Ties fall back to ID order to keep listings stable.
        posts.sort_by(|a, b| {
            Reverse(a.published_at)
                .cmp(&Reverse(b.published_at))
                .then_with(|| a.id.as_str().cmp(b.id.as_str()))
        });
        Ok(posts)
    }

    fn revisions(&self, id: &PostId) -> StoreResult<Vec<Revision>> {
        let map = self.posts.read().expect("lock poisoned");
        map.get(id)
            .map(|entry| entry.revisions.clone())
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }
}

impl std::fmt::Debug for InMemoryPostStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.len();
        f.debug_struct("InMemoryPostStore")
            .field("post_count", &count)
            .finish()
    }
}
