// ============================================================================
// Collection Cache
// ============================================================================
//
// One versioned snapshot slot per collection. Snapshots are replaced
// wholesale, never mutated in place, so a reader holding one observes a
// consistent view regardless of what the cache does next. Every write bumps
// a monotonically increasing version; background fetch writeback goes
// through a compare-and-swap on that version, which is how suspended reads
// are prevented from clobbering newer state.

use std::sync::Arc;
use tokio::sync::RwLock;

/// The last known-good ordered sequence of entities for one collection.
pub type Snapshot<R> = Arc<Vec<R>>;

struct Slot<R> {
    version: u64,
    snapshot: Option<Snapshot<R>>,
}

/// Versioned snapshot store for one collection.
pub struct CollectionCache<R> {
    slot: RwLock<Slot<R>>,
}

impl<R> CollectionCache<R> {
    pub fn new() -> Self {
        Self {
            slot: RwLock::new(Slot {
                version: 0,
                snapshot: None,
            }),
        }
    }

    /// Current version and snapshot. The snapshot is `None` until the first
    /// successful read of the collection.
    pub async fn read(&self) -> (u64, Option<Snapshot<R>>) {
        let slot = self.slot.read().await;
        (slot.version, slot.snapshot.clone())
    }

    /// Unconditionally swap in a new snapshot. Returns the new version.
    pub async fn replace(&self, snapshot: Snapshot<R>) -> u64 {
        let mut slot = self.slot.write().await;
        slot.version += 1;
        slot.snapshot = Some(snapshot);
        slot.version
    }

    /// Swap in a new snapshot only if the version is still `expected`.
    /// Returns false, leaving the slot untouched, on a version mismatch.
    pub async fn replace_if(&self, expected: u64, snapshot: Snapshot<R>) -> bool {
        let mut slot = self.slot.write().await;
        if slot.version != expected {
            return false;
        }
        slot.version += 1;
        slot.snapshot = Some(snapshot);
        true
    }

    /// Bump the version without touching the data, invalidating any
    /// in-flight `replace_if` writeback.
    pub async fn fence(&self) -> u64 {
        let mut slot = self.slot.write().await;
        slot.version += 1;
        slot.version
    }

    /// Drop the snapshot, returning the slot to the "no read has completed"
    /// state. Used by rollback when the cache was absent at mutation begin.
    pub async fn clear(&self) -> u64 {
        let mut slot = self.slot.write().await;
        slot.version += 1;
        slot.snapshot = None;
        slot.version
    }
}

impl<R> Default for CollectionCache<R> {
    fn default() -> Self {
        Self::new()
    }
}
