// ============================================================================
// Query Coordinator
// ============================================================================
//
// Read-through fetches for one collection. Concurrent callers join a single
// shared in-flight future (one transport call total), a completed fetch
// satisfies reads without the transport until the staleness window elapses,
// and writeback is a compare-and-swap against the cache version the fetch
// started from. `suspend` fences that version so a slow background fetch
// can never overwrite state produced by a later optimistic mutation.

use crate::cache::{CollectionCache, Snapshot};
use crate::core::Result;
use crate::model::Resource;
use crate::transport::{Transport, TransportError};
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use log::debug;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

type SharedFetch<R> = Shared<BoxFuture<'static, std::result::Result<Snapshot<R>, TransportError>>>;

struct InFlight<R> {
    generation: u64,
    future: SharedFetch<R>,
}

#[derive(Default)]
struct FetchMeta {
    last_fetched: Option<Instant>,
    last_error: Option<TransportError>,
}

/// Read-through fetch state for one collection, for UI consumption.
#[derive(Debug, Clone)]
pub struct QueryStatus {
    pub is_fetching: bool,
    pub last_fetched: Option<Instant>,
    pub last_error: Option<TransportError>,
}

pub struct QueryCoordinator<R: Resource> {
    cache: Arc<CollectionCache<R>>,
    transport: Arc<dyn Transport<R>>,
    stale_after: Duration,
    inflight: Arc<Mutex<Option<InFlight<R>>>>,
    generation: AtomicU64,
    meta: Arc<Mutex<FetchMeta>>,
}

impl<R: Resource> QueryCoordinator<R> {
    pub fn new(
        cache: Arc<CollectionCache<R>>,
        transport: Arc<dyn Transport<R>>,
        stale_after: Duration,
    ) -> Self {
        Self {
            cache,
            transport,
            stale_after,
            inflight: Arc::new(Mutex::new(None)),
            generation: AtomicU64::new(0),
            meta: Arc::new(Mutex::new(FetchMeta::default())),
        }
    }

    /// Read-through fetch.
    ///
    /// Returns the cached snapshot while it is fresh; otherwise joins the
    /// in-flight fetch for this collection or starts a new one.
    pub async fn fetch(&self) -> Result<Snapshot<R>> {
        if let Some(snapshot) = self.fresh().await {
            return Ok(snapshot);
        }

        let shared = {
            let mut slot = self.inflight.lock().await;
            match slot.as_ref() {
                Some(entry) => entry.future.clone(),
                None => {
                    let (generation, future) = self.start_fetch().await;
                    *slot = Some(InFlight {
                        generation,
                        future: future.clone(),
                    });
                    future
                }
            }
        };

        Ok(shared.await?)
    }

    /// Current cached snapshot without touching the transport.
    pub async fn current(&self) -> Option<Snapshot<R>> {
        self.cache.read().await.1
    }

    /// Fence any in-flight background fetch: its eventual completion must
    /// not overwrite cache state newer than now. Best-effort cancellation;
    /// the transport call itself runs to completion.
    pub async fn suspend(&self) {
        self.cache.fence().await;
        self.inflight.lock().await.take();
    }

    /// Drop freshness so the next `fetch` hits the transport again.
    pub async fn mark_stale(&self) {
        self.meta.lock().await.last_fetched = None;
    }

    pub async fn status(&self) -> QueryStatus {
        let is_fetching = self.inflight.lock().await.is_some();
        let meta = self.meta.lock().await;
        QueryStatus {
            is_fetching,
            last_fetched: meta.last_fetched,
            last_error: meta.last_error.clone(),
        }
    }

    async fn fresh(&self) -> Option<Snapshot<R>> {
        let fetched_at = self.meta.lock().await.last_fetched?;
        if fetched_at.elapsed() >= self.stale_after {
            return None;
        }
        self.cache.read().await.1
    }

    /// Build the shared fetch future. It records the cache version it
    /// started from and writes back with a compare-and-swap, so a fence or
    /// any later optimistic apply silently discards its writeback.
    async fn start_fetch(&self) -> (u64, SharedFetch<R>) {
        let (started_at_version, _) = self.cache.read().await;
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let cache = Arc::clone(&self.cache);
        let transport = Arc::clone(&self.transport);
        let inflight = Arc::clone(&self.inflight);
        let meta = Arc::clone(&self.meta);

        let future = async move {
            let outcome = transport.list().await;

            // Retire our own in-flight slot before publishing the outcome,
            // unless suspend already replaced it.
            {
                let mut slot = inflight.lock().await;
                if slot.as_ref().map(|e| e.generation) == Some(generation) {
                    *slot = None;
                }
            }

            match outcome {
                Ok(rows) => {
                    let snapshot: Snapshot<R> = Arc::new(rows);
                    if cache.replace_if(started_at_version, snapshot.clone()).await {
                        let mut meta = meta.lock().await;
                        meta.last_fetched = Some(Instant::now());
                        meta.last_error = None;
                    } else {
                        debug!(
                            "discarding fenced fetch writeback for '{}'",
                            R::COLLECTION
                        );
                    }
                    Ok(snapshot)
                }
                Err(err) => {
                    meta.lock().await.last_error = Some(err.clone());
                    Err(err)
                }
            }
        }
        .boxed()
        .shared();

        (generation, future)
    }
}
