//! Error types for reserve mathematics

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised by constant-product calculations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AmmError {
    /// Non-positive input, non-positive reserve, or fee rate outside `[0, 1)`.
    #[error("invalid amount: {reason}")]
    InvalidAmount { reason: String },

    /// LP token burn exceeds outstanding supply.
    #[error("insufficient liquidity: requested {requested} LP tokens, supply is {supply}")]
    InsufficientLiquidity {
        requested: Decimal,
        supply: Decimal,
    },

    /// Checked Decimal arithmetic exhausted the representable range.
    #[error("arithmetic overflow in reserve calculation")]
    Overflow,

    /// Square root of a negative quantity.
    #[error("cannot take square root of negative value {0}")]
    NegativeSqrt(Decimal),
}

impl AmmError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidAmount {
            reason: reason.into(),
        }
    }
}
