pub mod post;
pub mod user;

pub use post::{NewPost, Post, PostPatch};
pub use user::{NewUser, User, UserPatch};

use crate::core::{CacheError, Collection, EntityId, Result};
use std::sync::atomic::{AtomicI64, Ordering};

/// A cacheable resource shape bound to exactly one collection.
///
/// The engine is generic over this trait; `User` and `Post` are the two
/// shapes managed in this deployment.
pub trait Resource: Clone + Send + Sync + 'static {
    /// The collection this shape belongs to.
    const COLLECTION: Collection;

    /// Payload for creating a new entity (carries no id).
    type Draft: Clone + Send + Sync + 'static;

    /// Field-level patch for updating an entity.
    type Patch: Clone + Send + Sync + 'static;

    fn id(&self) -> EntityId;

    /// Build an optimistic entity from a draft plus an allocated id.
    fn from_draft(draft: &Self::Draft, id: EntityId) -> Self;

    /// Shallow-merge the patch into this entity; `None` fields are left
    /// untouched.
    fn apply_patch(&mut self, patch: &Self::Patch);
}

/// Default seed for both counters: above the id range the backing API hands
/// out (users 1..10, posts 1..100), so a provisional id cannot collide with
/// a server id seen in this deployment. The first allocated id is 101.
pub const DEFAULT_PROVISIONAL_SEED: i64 = 100;

/// Monotonic per-collection provisional id source.
///
/// One instance is shared by every pipeline of a cache client. It is an
/// injected object rather than a process-wide static so tests can seed it
/// deterministically and isolated client instances cannot interfere.
pub struct ProvisionalIdAllocator {
    users: AtomicI64,
    posts: AtomicI64,
}

impl ProvisionalIdAllocator {
    pub fn new() -> Self {
        Self::with_seeds(DEFAULT_PROVISIONAL_SEED, DEFAULT_PROVISIONAL_SEED)
    }

    /// Seed each counter explicitly; the first allocated id is `seed + 1`.
    pub fn with_seeds(users: i64, posts: i64) -> Self {
        Self {
            users: AtomicI64::new(users),
            posts: AtomicI64::new(posts),
        }
    }

    /// Next provisional id for the collection, strictly increasing for the
    /// lifetime of this allocator.
    pub fn allocate(&self, collection: Collection) -> Result<EntityId> {
        let counter = match collection {
            Collection::Users => &self.users,
            Collection::Posts => &self.posts,
        };
        let next = counter.fetch_add(1, Ordering::SeqCst) + 1;
        if next == i64::MAX {
            return Err(CacheError::AllocationExhausted(collection));
        }
        Ok(EntityId(next))
    }
}

impl Default for ProvisionalIdAllocator {
    fn default() -> Self {
        Self::new()
    }
}
