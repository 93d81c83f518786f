//! Pool storage errors

use thiserror::Error;
use types::PoolId;

/// Errors raised by pool state storage.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("pool state not found for {pool_id}")]
    PoolNotFound { pool_id: PoolId },

    #[error("snapshot I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}
