//! Pool state storage
//!
//! The store serializes writers per pool: `update_with` runs its closure
//! under the pool's entry guard, so two mutations of the same pool can never
//! interleave. The closure computes the full replacement state in memory;
//! an error from the closure leaves the stored state untouched.

use crate::StoreError;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use types::{PoolId, PoolState};

/// Storage interface the engine is built against.
///
/// Implementations own their lifecycle; there is no process-global instance,
/// so tests can supply isolated stores.
pub trait PoolStateStore: Send + Sync {
    /// Snapshot of one pool's current state.
    fn get(&self, pool_id: &PoolId) -> Option<PoolState>;

    /// Insert unless already present.
    ///
    /// Returns the winning state and whether this call created it.
    fn insert_if_absent(&self, state: PoolState) -> (PoolState, bool);

    /// Atomic read-modify-write of one pool.
    ///
    /// The closure receives the current state and returns the full
    /// replacement plus a caller-chosen value; the replacement is committed
    /// in one step. When the closure errors nothing is written.
    fn update_with<T, E, F>(&self, pool_id: &PoolId, f: F) -> Result<T, E>
    where
        F: FnOnce(&PoolState) -> Result<(PoolState, T), E>,
        E: From<StoreError>;

    /// All pool states, unordered.
    fn all(&self) -> Vec<PoolState>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// DashMap-backed store with no durability.
#[derive(Debug, Default)]
pub struct InMemoryPoolStore {
    pools: DashMap<PoolId, PoolState>,
}

impl InMemoryPoolStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-populated with the given states.
    pub fn from_states(states: impl IntoIterator<Item = PoolState>) -> Self {
        let store = Self::new();
        for state in states {
            store.pools.insert(state.pool_id.clone(), state);
        }
        store
    }
}

impl PoolStateStore for InMemoryPoolStore {
    fn get(&self, pool_id: &PoolId) -> Option<PoolState> {
        self.pools.get(pool_id).map(|entry| entry.value().clone())
    }

    fn insert_if_absent(&self, state: PoolState) -> (PoolState, bool) {
        match self.pools.entry(state.pool_id.clone()) {
            Entry::Occupied(existing) => (existing.get().clone(), false),
            Entry::Vacant(vacant) => (vacant.insert(state).value().clone(), true),
        }
    }

    fn update_with<T, E, F>(&self, pool_id: &PoolId, f: F) -> Result<T, E>
    where
        F: FnOnce(&PoolState) -> Result<(PoolState, T), E>,
        E: From<StoreError>,
    {
        let mut entry = self.pools.get_mut(pool_id).ok_or_else(|| {
            E::from(StoreError::PoolNotFound {
                pool_id: pool_id.clone(),
            })
        })?;
        let (new_state, value) = f(entry.value())?;
        *entry.value_mut() = new_state;
        Ok(value)
    }

    fn all(&self) -> Vec<PoolState> {
        self.pools.iter().map(|entry| entry.value().clone()).collect()
    }

    fn len(&self) -> usize {
        self.pools.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn state(pool_id: &str, base: Decimal) -> PoolState {
        PoolState {
            pool_id: PoolId::from(pool_id),
            base_reserve: base,
            quote_reserve: dec!(1000),
            lp_supply: dec!(1000),
            volume_24h: Decimal::ZERO,
            fees_24h: Decimal::ZERO,
            last_update_ns: 1,
        }
    }

    #[test]
    fn insert_if_absent_keeps_the_first_state() {
        let store = InMemoryPoolStore::new();
        let (first, created) = store.insert_if_absent(state("p1", dec!(500)));
        assert!(created);
        assert_eq!(first.base_reserve, dec!(500));

        let (second, created) = store.insert_if_absent(state("p1", dec!(999)));
        assert!(!created);
        assert_eq!(second.base_reserve, dec!(500));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn update_with_commits_the_replacement() {
        let store = InMemoryPoolStore::new();
        store.insert_if_absent(state("p1", dec!(500)));

        let out: Result<Decimal, StoreError> = store.update_with(&PoolId::from("p1"), |s| {
            let mut next = s.clone();
            next.base_reserve = dec!(600);
            Ok((next, s.base_reserve))
        });
        assert_eq!(out.unwrap(), dec!(500));
        assert_eq!(store.get(&PoolId::from("p1")).unwrap().base_reserve, dec!(600));
    }

    #[test]
    fn update_with_leaves_state_untouched_on_error() {
        let store = InMemoryPoolStore::new();
        store.insert_if_absent(state("p1", dec!(500)));

        let out: Result<(), StoreError> = store.update_with(&PoolId::from("p1"), |s| {
            Err(StoreError::PoolNotFound {
                pool_id: s.pool_id.clone(),
            })
        });
        assert!(out.is_err());
        assert_eq!(store.get(&PoolId::from("p1")).unwrap().base_reserve, dec!(500));
    }

    #[test]
    fn update_with_unknown_pool_is_not_found() {
        let store = InMemoryPoolStore::new();
        let out: Result<(), StoreError> =
            store.update_with(&PoolId::from("nope"), |s| Ok((s.clone(), ())));
        assert!(matches!(out, Err(StoreError::PoolNotFound { .. })));
    }
}
