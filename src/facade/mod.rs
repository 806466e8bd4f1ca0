// ============================================================================
// High-level Client API
// ============================================================================

use crate::cache::{CollectionCache, Snapshot};
use crate::config::CacheConfig;
use crate::core::{EntityId, Result};
use crate::model::{Post, ProvisionalIdAllocator, Resource, User};
use crate::mutation::MutationPipeline;
use crate::notify::{HighlightSink, LogSink, NotificationSink};
use crate::query::{QueryCoordinator, QueryStatus};
use crate::transport::{HttpTransport, Transport};
use std::sync::Arc;

/// One wired cache stack for a single collection: versioned snapshot cache,
/// read coordinator, and mutation pipeline over a shared transport.
pub struct ResourceHandle<R: Resource> {
    coordinator: Arc<QueryCoordinator<R>>,
    pipeline: MutationPipeline<R>,
}

impl<R: Resource> ResourceHandle<R> {
    pub fn new(
        transport: Arc<dyn Transport<R>>,
        allocator: Arc<ProvisionalIdAllocator>,
        notifier: Arc<dyn NotificationSink>,
        highlighter: Arc<dyn HighlightSink>,
        config: &CacheConfig,
    ) -> Self {
        let cache = Arc::new(CollectionCache::new());
        let coordinator = Arc::new(QueryCoordinator::new(
            Arc::clone(&cache),
            Arc::clone(&transport),
            config.stale_after,
        ));
        let pipeline = MutationPipeline::new(
            cache,
            Arc::clone(&coordinator),
            transport,
            allocator,
            notifier,
            highlighter,
            config.refetch_after_write,
        );
        Self {
            coordinator,
            pipeline,
        }
    }

    /// Read-through fetch of the collection (coalesced, staleness-aware).
    pub async fn fetch(&self) -> Result<Snapshot<R>> {
        self.coordinator.fetch().await
    }

    /// Current cached snapshot without touching the transport.
    pub async fn current(&self) -> Option<Snapshot<R>> {
        self.coordinator.current().await
    }

    /// Loading/error status of the collection's read path.
    pub async fn status(&self) -> QueryStatus {
        self.coordinator.status().await
    }

    /// Optimistically create an entity; resolves to the server-confirmed row.
    pub async fn create(&self, draft: R::Draft) -> Result<R> {
        self.pipeline.create(draft).await
    }

    /// Optimistically patch an entity. `Ok(None)` means the server confirmed
    /// without echoing a row and the optimistic version stands.
    pub async fn update(&self, id: EntityId, patch: R::Patch) -> Result<Option<R>> {
        self.pipeline.update(id, patch).await
    }

    /// Optimistically remove an entity.
    pub async fn delete(&self, id: EntityId) -> Result<()> {
        self.pipeline.delete(id).await
    }
}

/// Cache client managing the two collections of this deployment.
///
/// This is the recommended entry point: one instance per client session,
/// with one shared provisional id allocator and an HTTP transport per
/// collection.
///
/// # Examples
///
/// ```no_run
/// use opticache::{CacheClient, NewUser};
///
/// # async fn demo() -> opticache::Result<()> {
/// let client = CacheClient::new();
///
/// let users = client.users().fetch().await?;
/// println!("{} users cached", users.len());
///
/// client
///     .users()
///     .create(NewUser {
///         name: "Ada Lovelace".into(),
///         username: "ada".into(),
///         email: "ada@example.com".into(),
///     })
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct CacheClient {
    users: ResourceHandle<User>,
    posts: ResourceHandle<Post>,
}

impl CacheClient {
    /// Client with default configuration: JSONPlaceholder base URL, 2 minute
    /// staleness window, no refetch after write, log-backed sinks.
    pub fn new() -> Self {
        Self::with_config(CacheConfig::default())
    }

    /// Client with custom configuration and log-backed sinks.
    pub fn with_config(config: CacheConfig) -> Self {
        let notifier: Arc<dyn NotificationSink> = Arc::new(LogSink);
        let highlighter: Arc<dyn HighlightSink> = Arc::new(LogSink);
        Self::with_sinks(config, notifier, highlighter)
    }

    /// Client with custom sinks; this is how a UI layer plugs in its toast
    /// surface and the scroll/flash side effect.
    pub fn with_sinks(
        config: CacheConfig,
        notifier: Arc<dyn NotificationSink>,
        highlighter: Arc<dyn HighlightSink>,
    ) -> Self {
        let http = reqwest::Client::new();
        let allocator = Arc::new(ProvisionalIdAllocator::new());

        let users_transport: Arc<dyn Transport<User>> =
            Arc::new(HttpTransport::new(http.clone(), config.base_url.clone()));
        let posts_transport: Arc<dyn Transport<Post>> =
            Arc::new(HttpTransport::new(http, config.base_url.clone()));

        Self {
            users: ResourceHandle::new(
                users_transport,
                Arc::clone(&allocator),
                Arc::clone(&notifier),
                Arc::clone(&highlighter),
                &config,
            ),
            posts: ResourceHandle::new(
                posts_transport,
                allocator,
                notifier,
                highlighter,
                &config,
            ),
        }
    }

    pub fn users(&self) -> &ResourceHandle<User> {
        &self.users
    }

    pub fn posts(&self) -> &ResourceHandle<Post> {
        &self.posts
    }
}

impl Default for CacheClient {
    fn default() -> Self {
        Self::new()
    }
}
