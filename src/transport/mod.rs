pub mod http;

pub use http::{DEFAULT_BASE_URL, HttpTransport};

use crate::core::EntityId;
use crate::model::Resource;
use async_trait::async_trait;
use thiserror::Error;

/// Failure surfaced by a transport call.
///
/// The mutation pipeline treats every variant uniformly (rollback plus a
/// failure notification); the split exists for diagnostics only. Cloneable
/// so a coalesced fetch can hand the same failure to every joined caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Server responded with status {0}")]
    Status(u16),

    #[error("Request timed out")]
    Timeout,

    #[error("Malformed response body: {0}")]
    Decode(String),
}

/// Async boundary to the remote collection API.
///
/// `update` resolves to `None` when the server confirmed the write without
/// echoing an entity back; the caller keeps its optimistic row in that case.
#[async_trait]
pub trait Transport<R: Resource>: Send + Sync {
    async fn list(&self) -> Result<Vec<R>, TransportError>;

    async fn create(&self, draft: &R::Draft) -> Result<R, TransportError>;

    async fn update(&self, id: EntityId, patch: &R::Patch)
    -> Result<Option<R>, TransportError>;

    async fn delete(&self, id: EntityId) -> Result<(), TransportError>;
}
