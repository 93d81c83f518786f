//! Typed quote and receipt records
//!
//! Each quote is a distinct record rather than a loosely-typed bag of fields:
//! a quote is computed against a snapshot of pool state and is never stored.

use crate::PoolState;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Which token a swap spends.
///
/// `Yes` spends base/YES tokens (side A); `No` spends quote/NO tokens
/// (side B).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Yes,
    No,
}

/// Result of a read-only swap quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwapQuote {
    /// Tokens received for the quoted input.
    pub output_amount: Decimal,
    /// Fee retained by the pool, denominated in the input token.
    pub fee: Decimal,
    /// Percentage move of the marginal price caused by the trade.
    pub price_impact_pct: Decimal,
    /// Worst acceptable output under the caller's slippage tolerance.
    pub minimum_received: Decimal,
}

/// Result of a committed swap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwapReceipt {
    pub output_amount: Decimal,
    /// Spot price after the swap committed.
    pub new_price: Decimal,
    /// Pool state after the swap committed.
    pub state: PoolState,
}

/// Result of an add-liquidity quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiquidityQuote {
    pub lp_tokens_received: Decimal,
    /// Depositor's share of the pool after minting, in percent.
    pub share_percentage: Decimal,
}

/// Result of a remove-liquidity quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WithdrawalQuote {
    pub amount_base: Decimal,
    pub amount_quote: Decimal,
    /// Share of the pool being withdrawn, in percent.
    pub share_percentage: Decimal,
}
