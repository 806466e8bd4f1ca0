use crate::core::types::{Collection, EntityId};
use crate::transport::TransportError;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum CacheError {
    #[error("Transport failure: {0}")]
    Transport(#[from] TransportError),

    #[error("Entity {0} not found in cached snapshot")]
    NotFound(EntityId),

    #[error("Provisional id space exhausted for collection '{0}'")]
    AllocationExhausted(Collection),
}

pub type Result<T> = std::result::Result<T, CacheError>;
