// ============================================================================
// opticache — optimistic cache synchronization engine
// ============================================================================
//
// A read-through, in-memory snapshot cache for REST collections whose
// mutations must feel synchronous: every create/update/delete patches the
// cache before the network round-trip completes, provisional identities are
// reconciled with server-assigned ones on success, and failures roll the
// cache back to the exact pre-mutation snapshot.
//
// The backing API in this deployment does not durably persist writes, so the
// cache is the source of truth for the session: successful mutations do not
// trigger a refetch by default (see CacheConfig::refetch_after_write).

pub mod cache;
pub mod config;
pub mod core;
pub mod facade;
pub mod model;
pub mod mutation;
pub mod notify;
pub mod query;
pub mod transport;

// Re-export main types for convenience
pub use cache::{CollectionCache, Snapshot};
pub use config::CacheConfig;
pub use core::{CacheError, Collection, EntityId, MutationKind, Result};
pub use facade::{CacheClient, ResourceHandle};
pub use model::{
    NewPost, NewUser, Post, PostPatch, ProvisionalIdAllocator, Resource, User, UserPatch,
};
pub use mutation::MutationPipeline;
pub use notify::{HighlightSink, LogSink, NotificationSink};
pub use query::{QueryCoordinator, QueryStatus};
pub use transport::{HttpTransport, Transport, TransportError};
