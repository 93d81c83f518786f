//! Observer seam for committed mutations
//!
//! Observers are invoked synchronously, in subscription order, after a
//! mutation commits. A failed operation never notifies.

use types::{PoolId, PoolState};

/// Callback interface for state-changed notifications.
pub trait PoolObserver: Send + Sync {
    /// Called once per committed mutation with the new state.
    fn pool_updated(&self, pool_id: &PoolId, state: &PoolState);
}
