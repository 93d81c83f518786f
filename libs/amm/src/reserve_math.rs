//! Constant-product reserve math with exact calculations
//!
//! Preserves full precision using the Decimal type so swap quotes, price
//! impact, and liquidity accounting agree bit-for-bit between the quote path
//! and the commit path.

use crate::error::AmmError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::warn;
use types::{LiquidityQuote, WithdrawalQuote};

/// Newton iteration budget for [`ReserveMath::sqrt`].
const MAX_SQRT_ITERATIONS: usize = 100;

/// Post-swap reserve picture produced by [`ReserveMath::quote_swap`].
///
/// Carries the new reserves alongside the output so the commit path can apply
/// the exact quoted transition instead of recomputing it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SwapOutcome {
    pub output_amount: Decimal,
    /// Fee retained by the pool, denominated in the input token.
    pub fee: Decimal,
    pub new_input_reserve: Decimal,
    pub new_output_reserve: Decimal,
}

/// Constant-product math functions over `x * y = k`.
pub struct ReserveMath;

impl ReserveMath {
    /// Calculate the exact swap output using the constant-product formula.
    ///
    /// The fee is taken from the input before it enters the pool:
    /// `new_input = input_reserve + input * (1 - fee_rate)`,
    /// `new_output = k / new_input`. The output is structurally less than
    /// `output_reserve`, so a swap can never fully drain one side.
    pub fn quote_swap(
        input_reserve: Decimal,
        output_reserve: Decimal,
        input_amount: Decimal,
        fee_rate: Decimal,
    ) -> Result<SwapOutcome, AmmError> {
        if input_amount <= Decimal::ZERO {
            return Err(AmmError::invalid(format!(
                "input amount {input_amount} must be positive"
            )));
        }
        if input_reserve <= Decimal::ZERO || output_reserve <= Decimal::ZERO {
            return Err(AmmError::invalid(format!(
                "reserves must be positive, got {input_reserve}/{output_reserve}"
            )));
        }
        if fee_rate < Decimal::ZERO || fee_rate >= Decimal::ONE {
            return Err(AmmError::invalid(format!(
                "fee rate {fee_rate} outside [0, 1)"
            )));
        }

        let fee = input_amount.checked_mul(fee_rate).ok_or(AmmError::Overflow)?;
        let input_after_fee = input_amount - fee;
        let new_input_reserve = input_reserve
            .checked_add(input_after_fee)
            .ok_or(AmmError::Overflow)?;
        let k = input_reserve
            .checked_mul(output_reserve)
            .ok_or(AmmError::Overflow)?;
        let new_output_reserve = k.checked_div(new_input_reserve).ok_or(AmmError::Overflow)?;
        let output_amount = output_reserve - new_output_reserve;

        Ok(SwapOutcome {
            output_amount,
            fee,
            new_input_reserve,
            new_output_reserve,
        })
    }

    /// Percentage change of the marginal price caused by a trade.
    ///
    /// Compares `output_reserve / input_reserve` before and after.
    pub fn price_impact(
        input_reserve: Decimal,
        output_reserve: Decimal,
        new_input_reserve: Decimal,
        new_output_reserve: Decimal,
    ) -> Result<Decimal, AmmError> {
        if input_reserve <= Decimal::ZERO || new_input_reserve <= Decimal::ZERO {
            return Err(AmmError::invalid(
                "input reserves must be positive for price impact",
            ));
        }
        let current_price = output_reserve / input_reserve;
        if current_price <= Decimal::ZERO {
            return Err(AmmError::invalid("current price must be positive"));
        }
        let new_price = new_output_reserve / new_input_reserve;

        Ok(((new_price - current_price) / current_price).abs() * dec!(100))
    }

    /// Worst acceptable output under a slippage tolerance in percent.
    ///
    /// Floored at zero; a tolerance above 100% cannot produce a negative
    /// floor.
    pub fn minimum_received(output_amount: Decimal, slippage_tolerance_pct: Decimal) -> Decimal {
        let floor = output_amount * (Decimal::ONE - slippage_tolerance_pct / dec!(100));
        floor.max(Decimal::ZERO)
    }

    /// LP tokens minted for the first deposit into an empty pool:
    /// `sqrt(amount_base * amount_quote)`.
    pub fn initial_liquidity(
        amount_base: Decimal,
        amount_quote: Decimal,
    ) -> Result<Decimal, AmmError> {
        if amount_base <= Decimal::ZERO || amount_quote <= Decimal::ZERO {
            return Err(AmmError::invalid(format!(
                "seed amounts must be positive, got {amount_base}/{amount_quote}"
            )));
        }
        let product = amount_base
            .checked_mul(amount_quote)
            .ok_or(AmmError::Overflow)?;
        Self::sqrt(product)
    }

    /// Quote the LP tokens minted for a deposit.
    ///
    /// An empty pool mints `sqrt(amount_base * amount_quote)` for a 100%
    /// share. Otherwise deposit ratios against the two reserves are averaged,
    /// not min'd: unbalanced deposits are not penalized.
    pub fn quote_add_liquidity(
        base_reserve: Decimal,
        quote_reserve: Decimal,
        lp_supply: Decimal,
        amount_base: Decimal,
        amount_quote: Decimal,
    ) -> Result<LiquidityQuote, AmmError> {
        if amount_base <= Decimal::ZERO || amount_quote <= Decimal::ZERO {
            return Err(AmmError::invalid(format!(
                "deposit amounts must be positive, got {amount_base}/{amount_quote}"
            )));
        }

        if base_reserve == Decimal::ZERO && quote_reserve == Decimal::ZERO {
            let lp_tokens = Self::initial_liquidity(amount_base, amount_quote)?;
            return Ok(LiquidityQuote {
                lp_tokens_received: lp_tokens,
                share_percentage: dec!(100),
            });
        }

        if base_reserve <= Decimal::ZERO || quote_reserve <= Decimal::ZERO
            || lp_supply <= Decimal::ZERO
        {
            return Err(AmmError::invalid(format!(
                "funded pool required, got reserves {base_reserve}/{quote_reserve}, supply {lp_supply}"
            )));
        }

        let ratio_base = amount_base / base_reserve;
        let ratio_quote = amount_quote / quote_reserve;
        let avg_ratio = (ratio_base + ratio_quote) / dec!(2);
        let lp_tokens = lp_supply.checked_mul(avg_ratio).ok_or(AmmError::Overflow)?;
        let share_percentage = lp_tokens / (lp_supply + lp_tokens) * dec!(100);

        Ok(LiquidityQuote {
            lp_tokens_received: lp_tokens,
            share_percentage,
        })
    }

    /// Quote the proportional withdrawal for an LP token burn.
    ///
    /// The burn may exceed the supply only by a 1e-9 relative rounding
    /// tolerance; the withdrawal share is capped at 100% so reserves can
    /// never go negative.
    pub fn quote_remove_liquidity(
        base_reserve: Decimal,
        quote_reserve: Decimal,
        lp_supply: Decimal,
        lp_tokens: Decimal,
    ) -> Result<WithdrawalQuote, AmmError> {
        if lp_tokens <= Decimal::ZERO {
            return Err(AmmError::invalid(format!(
                "lp token burn {lp_tokens} must be positive"
            )));
        }
        if lp_supply <= Decimal::ZERO {
            return Err(AmmError::invalid(format!(
                "lp supply {lp_supply} must be positive"
            )));
        }

        let supply_ceiling = lp_supply * dec!(1.000000001);
        if lp_tokens > supply_ceiling {
            return Err(AmmError::InsufficientLiquidity {
                requested: lp_tokens,
                supply: lp_supply,
            });
        }

        let share = (lp_tokens / lp_supply).min(Decimal::ONE);

        Ok(WithdrawalQuote {
            amount_base: base_reserve * share,
            amount_quote: quote_reserve * share,
            share_percentage: share * dec!(100),
        })
    }

    /// Square root of a Decimal via Newton's method.
    ///
    /// Converges to a 1e-10 step; returns the best approximation with a
    /// warning if the iteration budget runs out first.
    pub fn sqrt(value: Decimal) -> Result<Decimal, AmmError> {
        if value < Decimal::ZERO {
            return Err(AmmError::NegativeSqrt(value));
        }
        if value == Decimal::ZERO {
            return Ok(Decimal::ZERO);
        }

        let epsilon = dec!(0.0000000001);
        let two = dec!(2);
        let mut x = value;
        for _ in 0..MAX_SQRT_ITERATIONS {
            let next = (x + value / x) / two;
            if (next - x).abs() < epsilon {
                return Ok(next);
            }
            x = next;
        }

        warn!(%value, "sqrt did not converge within iteration budget");
        Ok(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swap_quote_worked_example() {
        // 1000/1000 pool, 100 in, 0.3% fee taken from the input
        let outcome = ReserveMath::quote_swap(dec!(1000), dec!(1000), dec!(100), dec!(0.003))
            .unwrap();

        assert_eq!(outcome.fee, dec!(0.3));
        assert_eq!(outcome.new_input_reserve, dec!(1099.7));
        assert!((outcome.new_output_reserve - dec!(909.3389)).abs() < dec!(0.001));
        assert!((outcome.output_amount - dec!(90.6611)).abs() < dec!(0.001));

        let new_price = outcome.new_output_reserve / outcome.new_input_reserve;
        assert!((new_price - dec!(0.8270)).abs() < dec!(0.001));
    }

    #[test]
    fn swap_output_is_bounded_by_output_reserve() {
        // Input 100x the pool depth still cannot drain the output side
        let outcome =
            ReserveMath::quote_swap(dec!(1000), dec!(1000), dec!(100000), dec!(0.003)).unwrap();
        assert!(outcome.output_amount < dec!(1000));
        assert!(outcome.new_output_reserve > Decimal::ZERO);
    }

    #[test]
    fn swap_preserves_the_product() {
        // The fee is deducted before the input enters the reserve, so the
        // post-swap product equals k up to division rounding.
        let outcome =
            ReserveMath::quote_swap(dec!(1000), dec!(1000), dec!(100), dec!(0.003)).unwrap();
        let new_product = outcome.new_input_reserve * outcome.new_output_reserve;
        assert!((new_product - dec!(1000000)).abs() < dec!(0.000001));
    }

    #[test]
    fn swap_rejects_non_positive_input() {
        let err =
            ReserveMath::quote_swap(dec!(1000), dec!(1000), Decimal::ZERO, dec!(0.003)).unwrap_err();
        assert!(matches!(err, AmmError::InvalidAmount { .. }));

        let err =
            ReserveMath::quote_swap(dec!(1000), dec!(1000), dec!(-5), dec!(0.003)).unwrap_err();
        assert!(matches!(err, AmmError::InvalidAmount { .. }));
    }

    #[test]
    fn swap_rejects_empty_reserves() {
        let err =
            ReserveMath::quote_swap(Decimal::ZERO, dec!(1000), dec!(10), dec!(0.003)).unwrap_err();
        assert!(matches!(err, AmmError::InvalidAmount { .. }));
    }

    #[test]
    fn swap_rejects_fee_rate_of_one_or_more() {
        let err = ReserveMath::quote_swap(dec!(1000), dec!(1000), dec!(10), Decimal::ONE)
            .unwrap_err();
        assert!(matches!(err, AmmError::InvalidAmount { .. }));
    }

    #[test]
    fn price_impact_of_a_ten_percent_swap() {
        let outcome =
            ReserveMath::quote_swap(dec!(1000), dec!(1000), dec!(100), dec!(0.003)).unwrap();
        let impact = ReserveMath::price_impact(
            dec!(1000),
            dec!(1000),
            outcome.new_input_reserve,
            outcome.new_output_reserve,
        )
        .unwrap();

        // Price moves from 1.0 to ~0.8269, a ~17.3% impact
        assert!((impact - dec!(17.31)).abs() < dec!(0.01));
    }

    #[test]
    fn minimum_received_applies_tolerance() {
        assert_eq!(
            ReserveMath::minimum_received(dec!(100), dec!(0.5)),
            dec!(99.5)
        );
        // A tolerance above 100% floors at zero
        assert_eq!(
            ReserveMath::minimum_received(dec!(100), dec!(150)),
            Decimal::ZERO
        );
    }

    #[test]
    fn initial_deposit_mints_geometric_mean() {
        let quote = ReserveMath::quote_add_liquidity(
            Decimal::ZERO,
            Decimal::ZERO,
            Decimal::ZERO,
            dec!(1000),
            dec!(1000),
        )
        .unwrap();
        assert!((quote.lp_tokens_received - dec!(1000)).abs() < dec!(0.0001));
        assert_eq!(quote.share_percentage, dec!(100));
    }

    #[test]
    fn add_liquidity_averages_deposit_ratios() {
        // A pool shortly after an unbalancing swap
        let base = dec!(1099.7);
        let quote_reserve = dec!(909.33891);
        let supply = dec!(1000);

        let quote =
            ReserveMath::quote_add_liquidity(base, quote_reserve, supply, dec!(100), dec!(100))
                .unwrap();

        let expected = supply * (dec!(100) / base + dec!(100) / quote_reserve) / dec!(2);
        assert!((quote.lp_tokens_received - expected).abs() < dec!(0.0001));
        assert!((quote.lp_tokens_received - dec!(100.45)).abs() < dec!(0.01));
        assert!(quote.share_percentage > Decimal::ZERO && quote.share_percentage < dec!(100));
    }

    #[test]
    fn full_burn_withdraws_full_reserves() {
        let w = ReserveMath::quote_remove_liquidity(dec!(1099.7), dec!(909.33891), dec!(1000), dec!(1000))
            .unwrap();
        assert_eq!(w.amount_base, dec!(1099.7));
        assert_eq!(w.amount_quote, dec!(909.33891));
        assert_eq!(w.share_percentage, dec!(100));
    }

    #[test]
    fn burn_beyond_supply_is_rejected() {
        let err =
            ReserveMath::quote_remove_liquidity(dec!(1000), dec!(1000), dec!(1000), dec!(1000.1))
                .unwrap_err();
        assert!(matches!(err, AmmError::InsufficientLiquidity { .. }));
    }

    #[test]
    fn burn_within_rounding_tolerance_is_capped_at_full_share() {
        let supply = dec!(1000);
        let w = ReserveMath::quote_remove_liquidity(
            dec!(500),
            dec!(500),
            supply,
            supply * dec!(1.0000000005),
        )
        .unwrap();
        assert_eq!(w.amount_base, dec!(500));
        assert_eq!(w.share_percentage, dec!(100));
    }

    #[test]
    fn sqrt_accuracy() {
        let result = ReserveMath::sqrt(dec!(100)).unwrap();
        assert!((result - dec!(10)).abs() < dec!(0.0001));

        let result = ReserveMath::sqrt(dec!(2)).unwrap();
        assert!((result - dec!(1.41421356)).abs() < dec!(0.0001));

        assert_eq!(ReserveMath::sqrt(Decimal::ZERO).unwrap(), Decimal::ZERO);
        assert!(matches!(
            ReserveMath::sqrt(dec!(-1)),
            Err(AmmError::NegativeSqrt(_))
        ));
    }
}
