//! Market registry seam
//!
//! The registry owns the `market → pool` mapping; the engine treats
//! `pool_id` as an opaque foreign key and never invents or rewrites one.
//! Production registries live in the surrounding application; the static
//! variant here serves embedding and tests.

use dashmap::DashMap;
use types::{Market, MarketId, PoolId};

/// Lookup interface for market context.
pub trait MarketRegistry: Send + Sync {
    fn market(&self, market_id: &MarketId) -> Option<Market>;

    /// The market whose pool is `pool_id`, if any.
    fn market_for_pool(&self, pool_id: &PoolId) -> Option<Market>;
}

/// In-memory registry with a secondary pool index.
#[derive(Default)]
pub struct StaticMarketRegistry {
    markets: DashMap<MarketId, Market>,
    pool_index: DashMap<PoolId, MarketId>,
}

impl StaticMarketRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a market, reindexing its pool link.
    pub fn upsert(&self, market: Market) {
        if let Some(pool_id) = &market.pool_id {
            self.pool_index
                .insert(pool_id.clone(), market.market_id.clone());
        }
        self.markets.insert(market.market_id.clone(), market);
    }

    pub fn len(&self) -> usize {
        self.markets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markets.is_empty()
    }
}

impl MarketRegistry for StaticMarketRegistry {
    fn market(&self, market_id: &MarketId) -> Option<Market> {
        self.markets.get(market_id).map(|entry| entry.value().clone())
    }

    fn market_for_pool(&self, pool_id: &PoolId) -> Option<Market> {
        let market_id = self.pool_index.get(pool_id)?;
        self.market(market_id.value())
    }
}
