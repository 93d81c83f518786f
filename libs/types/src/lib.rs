//! # Futarch Types - Shared Domain Types
//!
//! Common types used across the Futarch pool engine crates: opaque
//! identifiers, pool and market state, price history points, trade journal
//! records, and the typed quote results returned by the engine.
//!
//! All monetary quantities are [`rust_decimal::Decimal`] so that reserve
//! arithmetic carries no binary floating-point drift between crates.

pub mod identifiers;
pub mod market;
pub mod pool;
pub mod quotes;
pub mod time;
pub mod trade;

pub use identifiers::{MarketId, PoolId};
pub use market::{Market, PricePoint};
pub use pool::PoolState;
pub use quotes::{LiquidityQuote, Side, SwapQuote, SwapReceipt, WithdrawalQuote};
pub use time::now_ns;
pub use trade::{TradeKind, TradeRecord};
