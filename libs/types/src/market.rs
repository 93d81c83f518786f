//! Market context and per-market price observations
//!
//! `Market` is owned by the surrounding application (the market registry
//! collaborator); the engine reads it to resolve which market a pool belongs
//! to and never mutates it.

use crate::{MarketId, PoolId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A binary-outcome question linked to its YES/NO token pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Market {
    pub market_id: MarketId,
    pub question: String,
    /// Identifier of the YES outcome token.
    pub yes_mint: String,
    /// Identifier of the NO outcome token.
    pub no_mint: String,
    pub creator: String,
    pub created_at_ns: u64,
    /// Pool backing this market, once one exists.
    pub pool_id: Option<PoolId>,
    /// LP token identifier, once a pool exists.
    pub lp_mint: Option<String>,
}

/// One observed price for a market.
///
/// `price` is `quote_reserve / base_reserve` at the moment of observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub time_ns: u64,
    pub price: Decimal,
}
