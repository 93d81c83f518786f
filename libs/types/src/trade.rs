//! Trade journal records
//!
//! One record per committed pool mutation, appended by the engine and read
//! back newest-first for activity displays. Never pruned.

use crate::PoolId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Kind of committed pool mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeKind {
    SwapYes,
    SwapNo,
    AddLiquidity,
    RemoveLiquidity,
}

/// One committed pool mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub pool_id: PoolId,
    pub kind: TradeKind,
    /// Input amount for swaps, total contributed or burned for liquidity ops.
    pub amount: Decimal,
    pub time_ns: u64,
}
