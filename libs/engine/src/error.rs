//! Engine errors

use amm::AmmError;
use state_pool::StoreError;
use thiserror::Error;
use types::PoolId;

/// Errors raised by pool engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("pool not found: {pool_id}")]
    PoolNotFound { pool_id: PoolId },

    #[error(transparent)]
    Math(#[from] AmmError),

    #[error("storage failure: {0}")]
    Store(StoreError),
}

impl From<StoreError> for EngineError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::PoolNotFound { pool_id } => Self::PoolNotFound { pool_id },
            other => Self::Store(other),
        }
    }
}
