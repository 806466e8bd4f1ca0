// ============================================================================
// Optimistic Mutation Pipeline
// ============================================================================
//
// Runs the four-phase protocol once per mutation:
//
//   1. Begin       — fence background reads, capture the rollback snapshot
//   2. Apply       — patch the cache optimistically, then call the transport
//   3. Reconcile   — fold the server's answer into the current snapshot
//   4. Rollback    — on transport failure, restore the captured snapshot
//
// Phases 3 and 4 are mutually exclusive. Reconciliation reads the *current*
// snapshot, not the phase-1 capture, so unrelated concurrent changes
// survive; rollback restores the phase-1 snapshot reference wholesale, so
// they do not (accepted limitation of snapshot-level restore).

use crate::cache::{CollectionCache, Snapshot};
use crate::core::{CacheError, EntityId, MutationKind, Result};
use crate::model::{ProvisionalIdAllocator, Resource};
use crate::notify::{HighlightSink, NotificationSink};
use crate::query::QueryCoordinator;
use crate::transport::Transport;
use log::{debug, warn};
use std::sync::Arc;

/// One in-flight optimistic operation: what it is, what to restore on
/// failure, and (for creates) the provisional identity it introduced.
struct MutationRecord<R> {
    kind: MutationKind,
    rollback: Option<Snapshot<R>>,
    provisional_id: Option<EntityId>,
}

pub struct MutationPipeline<R: Resource> {
    cache: Arc<CollectionCache<R>>,
    coordinator: Arc<QueryCoordinator<R>>,
    transport: Arc<dyn Transport<R>>,
    allocator: Arc<ProvisionalIdAllocator>,
    notifier: Arc<dyn NotificationSink>,
    highlighter: Arc<dyn HighlightSink>,
    refetch_after_write: bool,
}

impl<R: Resource> MutationPipeline<R> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        cache: Arc<CollectionCache<R>>,
        coordinator: Arc<QueryCoordinator<R>>,
        transport: Arc<dyn Transport<R>>,
        allocator: Arc<ProvisionalIdAllocator>,
        notifier: Arc<dyn NotificationSink>,
        highlighter: Arc<dyn HighlightSink>,
        refetch_after_write: bool,
    ) -> Self {
        Self {
            cache,
            coordinator,
            transport,
            allocator,
            notifier,
            highlighter,
            refetch_after_write,
        }
    }

    /// Optimistically create an entity; resolves to the server-confirmed
    /// row. The cache shows the entity under a provisional id until then.
    pub async fn create(&self, draft: R::Draft) -> Result<R> {
        let (mut record, base) = self.begin(MutationKind::Create).await;

        let provisional_id = self.allocator.allocate(R::COLLECTION)?;
        record.provisional_id = Some(provisional_id);

        let mut patched = base;
        patched.push(R::from_draft(&draft, provisional_id));
        self.cache.replace(Arc::new(patched)).await;

        match self.transport.create(&draft).await {
            Ok(confirmed) => {
                let resolved_id = confirmed.id();
                self.reconcile_create(&record, &confirmed).await;
                self.notifier
                    .mutation_succeeded(R::COLLECTION, MutationKind::Create, resolved_id);
                self.highlighter.entity_created(R::COLLECTION, resolved_id);
                self.settle().await;
                Ok(confirmed)
            }
            Err(err) => {
                self.rollback(&record).await;
                self.notifier.mutation_failed(
                    R::COLLECTION,
                    MutationKind::Create,
                    &err.to_string(),
                );
                Err(CacheError::Transport(err))
            }
        }
    }

    /// Optimistically patch an entity. `Ok(None)` means the server confirmed
    /// without echoing a row; the optimistic version stands as authoritative.
    pub async fn update(&self, id: EntityId, patch: R::Patch) -> Result<Option<R>> {
        let (record, base) = self.begin(MutationKind::Update).await;

        // An absent target is a no-op patch, not a failure.
        match patch_entity(&base, id, &patch) {
            Ok(rows) => {
                self.cache.replace(Arc::new(rows)).await;
            }
            Err(err) => {
                debug!(
                    "update target {}/{id} not optimistically applied: {err}",
                    R::COLLECTION
                );
            }
        }

        match self.transport.update(id, &patch).await {
            Ok(Some(confirmed)) => {
                self.reconcile_update(&confirmed).await;
                self.notifier
                    .mutation_succeeded(R::COLLECTION, MutationKind::Update, id);
                self.settle().await;
                Ok(Some(confirmed))
            }
            Ok(None) => {
                self.notifier
                    .mutation_succeeded(R::COLLECTION, MutationKind::Update, id);
                self.settle().await;
                Ok(None)
            }
            Err(err) => {
                self.rollback(&record).await;
                self.notifier.mutation_failed(
                    R::COLLECTION,
                    MutationKind::Update,
                    &err.to_string(),
                );
                Err(CacheError::Transport(err))
            }
        }
    }

    /// Optimistically remove an entity. On success nothing further happens:
    /// the row is already gone from the phase-2 snapshot.
    pub async fn delete(&self, id: EntityId) -> Result<()> {
        let (record, base) = self.begin(MutationKind::Delete).await;

        match remove_entity(&base, id) {
            Ok(rows) => {
                self.cache.replace(Arc::new(rows)).await;
            }
            Err(err) => {
                debug!(
                    "delete target {}/{id} not optimistically applied: {err}",
                    R::COLLECTION
                );
            }
        }

        match self.transport.delete(id).await {
            Ok(()) => {
                self.notifier
                    .mutation_succeeded(R::COLLECTION, MutationKind::Delete, id);
                self.settle().await;
                Ok(())
            }
            Err(err) => {
                self.rollback(&record).await;
                self.notifier.mutation_failed(
                    R::COLLECTION,
                    MutationKind::Delete,
                    &err.to_string(),
                );
                Err(CacheError::Transport(err))
            }
        }
    }

    /// Phase 1: fence background reads and capture the rollback point.
    /// An absent cache is treated as the empty sequence for patching, but
    /// recorded as absent so rollback can restore exactly that.
    async fn begin(&self, kind: MutationKind) -> (MutationRecord<R>, Vec<R>) {
        self.coordinator.suspend().await;
        let (_, snapshot) = self.cache.read().await;
        let base: Vec<R> = snapshot.as_deref().cloned().unwrap_or_default();
        (
            MutationRecord {
                kind,
                rollback: snapshot,
                provisional_id: None,
            },
            base,
        )
    }

    /// Phase 3 for creates: swap the provisional row for the confirmed one
    /// in place, adopting the server id without moving the row. If a
    /// concurrent mutation removed the provisional row meanwhile, the
    /// confirmed row is appended instead.
    async fn reconcile_create(&self, record: &MutationRecord<R>, confirmed: &R) {
        let (_, current) = self.cache.read().await;
        let mut rows: Vec<R> = current.as_deref().cloned().unwrap_or_default();
        let position = record
            .provisional_id
            .and_then(|pid| rows.iter().position(|e| e.id() == pid));
        match position {
            Some(index) => rows[index] = confirmed.clone(),
            None => {
                debug!(
                    "provisional row vanished from '{}' before reconciliation, appending server row",
                    R::COLLECTION
                );
                rows.push(confirmed.clone());
            }
        }
        self.cache.replace(Arc::new(rows)).await;
    }

    /// Phase 3 for updates: adopt the server echo wherever its id matches in
    /// the current snapshot; a vanished target leaves the cache as is.
    async fn reconcile_update(&self, confirmed: &R) {
        let (_, current) = self.cache.read().await;
        let mut rows: Vec<R> = current.as_deref().cloned().unwrap_or_default();
        if let Some(index) = rows.iter().position(|e| e.id() == confirmed.id()) {
            rows[index] = confirmed.clone();
            self.cache.replace(Arc::new(rows)).await;
        }
    }

    /// Phase 4: restore the exact pre-mutation snapshot reference, or the
    /// absent state if no read had completed when the mutation began.
    async fn rollback(&self, record: &MutationRecord<R>) {
        warn!(
            "rolling back optimistic {} on '{}'",
            record.kind,
            R::COLLECTION
        );
        match &record.rollback {
            Some(snapshot) => {
                self.cache.replace(Arc::clone(snapshot)).await;
            }
            None => {
                self.cache.clear().await;
            }
        }
    }

    /// Post-success policy. The default is no refetch: the backing API does
    /// not persist writes and a refetch would resurrect deleted rows.
    async fn settle(&self) {
        if self.refetch_after_write {
            self.coordinator.mark_stale().await;
        }
    }
}

fn patch_entity<R: Resource>(rows: &[R], id: EntityId, patch: &R::Patch) -> Result<Vec<R>> {
    let mut found = false;
    let rows: Vec<R> = rows
        .iter()
        .map(|entity| {
            if entity.id() == id {
                found = true;
                let mut patched = entity.clone();
                patched.apply_patch(patch);
                patched
            } else {
                entity.clone()
            }
        })
        .collect();
    if !found {
        return Err(CacheError::NotFound(id));
    }
    Ok(rows)
}

fn remove_entity<R: Resource>(rows: &[R], id: EntityId) -> Result<Vec<R>> {
    if !rows.iter().any(|entity| entity.id() == id) {
        return Err(CacheError::NotFound(id));
    }
    Ok(rows
        .iter()
        .filter(|entity| entity.id() != id)
        .cloned()
        .collect())
}
