use crate::transport::DEFAULT_BASE_URL;
use std::time::Duration;

/// Configuration for a cache client instance.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Base URL of the backing collection API.
    pub base_url: String,

    /// How long a completed fetch satisfies subsequent reads without
    /// hitting the transport.
    pub stale_after: Duration,

    /// Invalidate the read cache after every successful mutation.
    ///
    /// Off by default: the backing API in this deployment does not persist
    /// writes, so a refetch would silently resurrect deleted or overwritten
    /// rows. Turn it on when fronting a real persistent store.
    pub refetch_after_write: bool,
}

impl CacheConfig {
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            stale_after: Duration::from_secs(120), // 2 minutes
            refetch_after_write: false,
        }
    }

    /// Set the base URL of the backing API.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the staleness window for reads.
    pub fn stale_after(mut self, window: Duration) -> Self {
        self.stale_after = window;
        self
    }

    /// Enable or disable refetch-after-write.
    pub fn refetch_after_write(mut self, enabled: bool) -> Self {
        self.refetch_after_write = enabled;
        self
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::new()
    }
}
