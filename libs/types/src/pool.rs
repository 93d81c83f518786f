//! Pool state for a single binary-outcome market
//!
//! One `PoolState` exists per pool. Reserves follow the constant-product
//! invariant: `base_reserve * quote_reserve` is non-decreasing across swaps
//! (the retained fee grows it) and is preserved in exact ratio across
//! proportional liquidity operations.

use crate::PoolId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Complete state of a single pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolState {
    pub pool_id: PoolId,
    /// YES token reserve.
    pub base_reserve: Decimal,
    /// NO token reserve.
    pub quote_reserve: Decimal,
    /// Total outstanding liquidity-provider claims.
    pub lp_supply: Decimal,
    /// Accumulated swap input volume. Monotonic; never reset.
    pub volume_24h: Decimal,
    /// Accumulated swap fees. Monotonic; never reset.
    pub fees_24h: Decimal,
    /// Nanosecond wall-clock timestamp of the last mutation.
    pub last_update_ns: u64,
}

impl PoolState {
    /// True once the pool holds reserves and outstanding LP claims.
    pub fn is_funded(&self) -> bool {
        self.base_reserve > Decimal::ZERO
            && self.quote_reserve > Decimal::ZERO
            && self.lp_supply > Decimal::ZERO
    }

    /// Spot price of the YES token, `quote_reserve / base_reserve`.
    ///
    /// `None` when the base reserve is empty (drained or uninitialized pool).
    pub fn spot_price(&self) -> Option<Decimal> {
        if self.base_reserve > Decimal::ZERO {
            Some(self.quote_reserve / self.base_reserve)
        } else {
            None
        }
    }

    /// Implied probability of the YES outcome, `quote / (base + quote)`.
    pub fn implied_yes_probability(&self) -> Option<Decimal> {
        let total = self.base_reserve + self.quote_reserve;
        if total > Decimal::ZERO {
            Some(self.quote_reserve / total)
        } else {
            None
        }
    }

    /// Implied probability of the NO outcome, `base / (base + quote)`.
    pub fn implied_no_probability(&self) -> Option<Decimal> {
        let total = self.base_reserve + self.quote_reserve;
        if total > Decimal::ZERO {
            Some(self.base_reserve / total)
        } else {
            None
        }
    }

    /// Constant-product invariant value `base_reserve * quote_reserve`.
    pub fn invariant(&self) -> Option<Decimal> {
        self.base_reserve.checked_mul(self.quote_reserve)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn pool(base: Decimal, quote: Decimal) -> PoolState {
        PoolState {
            pool_id: PoolId::from("pool_test"),
            base_reserve: base,
            quote_reserve: quote,
            lp_supply: dec!(1000),
            volume_24h: Decimal::ZERO,
            fees_24h: Decimal::ZERO,
            last_update_ns: 0,
        }
    }

    #[test]
    fn spot_price_is_reserve_ratio() {
        let p = pool(dec!(1000), dec!(500));
        assert_eq!(p.spot_price(), Some(dec!(0.5)));
    }

    #[test]
    fn spot_price_none_on_empty_base() {
        let p = pool(Decimal::ZERO, dec!(500));
        assert_eq!(p.spot_price(), None);
    }

    #[test]
    fn implied_probabilities_sum_to_one() {
        let p = pool(dec!(300), dec!(700));
        let yes = p.implied_yes_probability().unwrap();
        let no = p.implied_no_probability().unwrap();
        assert_eq!(yes + no, Decimal::ONE);
        assert_eq!(yes, dec!(0.7));
    }

    #[test]
    fn funded_requires_all_three_positive() {
        let mut p = pool(dec!(1), dec!(1));
        assert!(p.is_funded());
        p.lp_supply = Decimal::ZERO;
        assert!(!p.is_funded());
    }
}
