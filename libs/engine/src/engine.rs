//! Pool engine
//!
//! Every state-changing operation runs quote → re-validate → commit. The
//! commit path recomputes the transition from the state it reads under the
//! pool's write guard; quotes taken earlier are display data only. A failed
//! commit leaves state, history, journal, and observers untouched.

use crate::{EngineError, MarketRegistry, PoolObserver};
use amm::{AmmError, ReserveMath};
use config::EngineConfig;
use parking_lot::RwLock;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use state_pool::{PoolStateStore, PriceHistoryLog, TradeLog};
use std::sync::Arc;
use tracing::{debug, info};
use types::{
    now_ns, LiquidityQuote, MarketId, PoolId, PoolState, PricePoint, Side, SwapQuote, SwapReceipt,
    TradeKind, TradeRecord, WithdrawalQuote,
};

/// Price reported for a pool that does not exist yet: the uninitialized 1:1
/// assumption. Callers distinguish "no pool" via [`PoolEngine::pool`].
const DEFAULT_PRICE: Decimal = dec!(0.5);

/// Orchestrates the pool state store and the reserve math.
pub struct PoolEngine<S: PoolStateStore> {
    store: Arc<S>,
    history: Arc<PriceHistoryLog>,
    trades: Arc<TradeLog>,
    registry: Option<Arc<dyn MarketRegistry>>,
    observers: RwLock<Vec<Arc<dyn PoolObserver>>>,
    config: EngineConfig,
}

impl<S: PoolStateStore> PoolEngine<S> {
    pub fn new(
        store: Arc<S>,
        history: Arc<PriceHistoryLog>,
        trades: Arc<TradeLog>,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            history,
            trades,
            registry: None,
            observers: RwLock::new(Vec::new()),
            config,
        }
    }

    /// Attach the registry used to resolve pools to their markets.
    pub fn with_registry(mut self, registry: Arc<dyn MarketRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Register an observer notified synchronously after every commit.
    pub fn subscribe(&self, observer: Arc<dyn PoolObserver>) {
        self.observers.write().push(observer);
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Snapshot of a pool's state, if the pool exists.
    pub fn pool(&self, pool_id: &PoolId) -> Option<PoolState> {
        self.store.get(pool_id)
    }

    /// Recent price points for chart displays, bounded by the configured
    /// display limit.
    pub fn recent_history(&self, market_id: &MarketId) -> Vec<PricePoint> {
        self.history
            .recent(market_id, self.config.history.display_limit)
    }

    /// Create a pool with seed reserves.
    ///
    /// Idempotent: when the pool already exists its state is returned
    /// unchanged and no side effects fire, so repeated UI-driven
    /// initialization calls are harmless. The initial LP supply is the
    /// geometric mean of the seeds.
    pub fn initialize(
        &self,
        pool_id: &PoolId,
        seed_base: Decimal,
        seed_quote: Decimal,
    ) -> Result<PoolState, EngineError> {
        let lp_supply = ReserveMath::initial_liquidity(seed_base, seed_quote)?;
        let candidate = PoolState {
            pool_id: pool_id.clone(),
            base_reserve: seed_base,
            quote_reserve: seed_quote,
            lp_supply,
            volume_24h: Decimal::ZERO,
            fees_24h: Decimal::ZERO,
            last_update_ns: now_ns(),
        };

        let (state, created) = self.store.insert_if_absent(candidate);
        if created {
            info!(%pool_id, %seed_base, %seed_quote, "initialized pool");
            if let (Some(price), Some(market_id)) = (state.spot_price(), self.market_for(pool_id))
            {
                self.history.seed_if_empty(&market_id, price);
            }
            self.notify(&state);
        } else {
            debug!(%pool_id, "pool already initialized, returning existing state");
        }
        Ok(state)
    }

    /// [`Self::initialize`] with the configured seed reserves.
    pub fn initialize_with_defaults(&self, pool_id: &PoolId) -> Result<PoolState, EngineError> {
        self.initialize(
            pool_id,
            self.config.engine.seed_base_reserve,
            self.config.engine.seed_quote_reserve,
        )
    }

    /// Spot price of the YES token, or the 1:1 default when the pool does
    /// not exist.
    pub fn current_price(&self, pool_id: &PoolId) -> Decimal {
        self.store
            .get(pool_id)
            .and_then(|state| state.spot_price())
            .unwrap_or(DEFAULT_PRICE)
    }

    /// Read-only swap quote against the current snapshot.
    ///
    /// `slippage_tolerance_pct` falls back to the configured default.
    pub fn quote_swap(
        &self,
        pool_id: &PoolId,
        side: Side,
        input_amount: Decimal,
        fee_rate: Decimal,
        slippage_tolerance_pct: Option<Decimal>,
    ) -> Result<SwapQuote, EngineError> {
        let state = self.require_pool(pool_id)?;
        let (input_reserve, output_reserve) = oriented_reserves(&state, side);
        let outcome = ReserveMath::quote_swap(input_reserve, output_reserve, input_amount, fee_rate)?;
        let price_impact_pct = ReserveMath::price_impact(
            input_reserve,
            output_reserve,
            outcome.new_input_reserve,
            outcome.new_output_reserve,
        )?;
        let tolerance =
            slippage_tolerance_pct.unwrap_or(self.config.engine.slippage_tolerance_pct);

        Ok(SwapQuote {
            output_amount: outcome.output_amount,
            fee: outcome.fee,
            price_impact_pct,
            minimum_received: ReserveMath::minimum_received(outcome.output_amount, tolerance),
        })
    }

    /// Commit a swap.
    ///
    /// The input side spends into the pool and the opposite side pays out;
    /// `volume_24h` accumulates the input, `fees_24h` the fee.
    pub fn swap(
        &self,
        pool_id: &PoolId,
        side: Side,
        input_amount: Decimal,
        fee_rate: Decimal,
    ) -> Result<SwapReceipt, EngineError> {
        let (state, output_amount, new_price) =
            self.store
                .update_with::<_, EngineError, _>(pool_id, |state| {
                    let (input_reserve, output_reserve) = oriented_reserves(state, side);
                    let outcome = ReserveMath::quote_swap(
                        input_reserve,
                        output_reserve,
                        input_amount,
                        fee_rate,
                    )?;
                    let (base_reserve, quote_reserve) = match side {
                        Side::Yes => (outcome.new_input_reserve, outcome.new_output_reserve),
                        Side::No => (outcome.new_output_reserve, outcome.new_input_reserve),
                    };
                    let new_state = PoolState {
                        pool_id: state.pool_id.clone(),
                        base_reserve,
                        quote_reserve,
                        lp_supply: state.lp_supply,
                        volume_24h: state.volume_24h + input_amount,
                        fees_24h: state.fees_24h + outcome.fee,
                        last_update_ns: now_ns(),
                    };
                    let new_price = new_state
                        .spot_price()
                        .filter(|price| *price > Decimal::ZERO)
                        .ok_or(AmmError::Overflow)?;
                    Ok((
                        new_state.clone(),
                        (new_state, outcome.output_amount, new_price),
                    ))
                })?;

        self.after_commit(&state, swap_kind(side), input_amount, Some(new_price));
        Ok(SwapReceipt {
            output_amount,
            new_price,
            state,
        })
    }

    /// Read-only add-liquidity quote against the current snapshot.
    pub fn quote_add_liquidity(
        &self,
        pool_id: &PoolId,
        amount_base: Decimal,
        amount_quote: Decimal,
    ) -> Result<LiquidityQuote, EngineError> {
        let state = self.require_pool(pool_id)?;
        Ok(ReserveMath::quote_add_liquidity(
            state.base_reserve,
            state.quote_reserve,
            state.lp_supply,
            amount_base,
            amount_quote,
        )?)
    }

    /// Commit a deposit, minting LP tokens into the supply.
    pub fn add_liquidity(
        &self,
        pool_id: &PoolId,
        amount_base: Decimal,
        amount_quote: Decimal,
    ) -> Result<(PoolState, LiquidityQuote), EngineError> {
        let (state, quote, new_price) =
            self.store
                .update_with::<_, EngineError, _>(pool_id, |state| {
                    let quote = ReserveMath::quote_add_liquidity(
                        state.base_reserve,
                        state.quote_reserve,
                        state.lp_supply,
                        amount_base,
                        amount_quote,
                    )?;
                    let new_state = PoolState {
                        pool_id: state.pool_id.clone(),
                        base_reserve: state.base_reserve + amount_base,
                        quote_reserve: state.quote_reserve + amount_quote,
                        lp_supply: state.lp_supply + quote.lp_tokens_received,
                        volume_24h: state.volume_24h,
                        fees_24h: state.fees_24h,
                        last_update_ns: now_ns(),
                    };
                    let new_price = new_state
                        .spot_price()
                        .filter(|price| *price > Decimal::ZERO)
                        .ok_or(AmmError::Overflow)?;
                    Ok((new_state.clone(), (new_state, quote, new_price)))
                })?;

        self.after_commit(
            &state,
            TradeKind::AddLiquidity,
            amount_base + amount_quote,
            Some(new_price),
        );
        Ok((state, quote))
    }

    /// Read-only remove-liquidity quote against the current snapshot.
    pub fn quote_remove_liquidity(
        &self,
        pool_id: &PoolId,
        lp_tokens: Decimal,
    ) -> Result<WithdrawalQuote, EngineError> {
        let state = self.require_pool(pool_id)?;
        Ok(ReserveMath::quote_remove_liquidity(
            state.base_reserve,
            state.quote_reserve,
            state.lp_supply,
            lp_tokens,
        )?)
    }

    /// Commit an LP token burn, withdrawing the proportional reserves.
    pub fn remove_liquidity(
        &self,
        pool_id: &PoolId,
        lp_tokens: Decimal,
    ) -> Result<(PoolState, WithdrawalQuote), EngineError> {
        let (state, withdrawal, new_price) =
            self.store
                .update_with::<_, EngineError, _>(pool_id, |state| {
                    let withdrawal = ReserveMath::quote_remove_liquidity(
                        state.base_reserve,
                        state.quote_reserve,
                        state.lp_supply,
                        lp_tokens,
                    )?;
                    let new_state = PoolState {
                        pool_id: state.pool_id.clone(),
                        base_reserve: state.base_reserve - withdrawal.amount_base,
                        quote_reserve: state.quote_reserve - withdrawal.amount_quote,
                        lp_supply: (state.lp_supply - lp_tokens).max(Decimal::ZERO),
                        volume_24h: state.volume_24h,
                        fees_24h: state.fees_24h,
                        last_update_ns: now_ns(),
                    };
                    if new_state.base_reserve < Decimal::ZERO
                        || new_state.quote_reserve < Decimal::ZERO
                    {
                        return Err(EngineError::Math(AmmError::Overflow));
                    }
                    // None when the burn emptied the pool
                    let new_price = new_state.spot_price();
                    Ok((new_state.clone(), (new_state, withdrawal, new_price)))
                })?;

        self.after_commit(&state, TradeKind::RemoveLiquidity, lp_tokens, new_price);
        Ok((state, withdrawal))
    }

    fn require_pool(&self, pool_id: &PoolId) -> Result<PoolState, EngineError> {
        self.store.get(pool_id).ok_or_else(|| EngineError::PoolNotFound {
            pool_id: pool_id.clone(),
        })
    }

    fn market_for(&self, pool_id: &PoolId) -> Option<MarketId> {
        self.registry
            .as_ref()?
            .market_for_pool(pool_id)
            .map(|market| market.market_id)
    }

    /// Side effects of a committed mutation, in order: trade journal, price
    /// history, observers.
    fn after_commit(
        &self,
        state: &PoolState,
        kind: TradeKind,
        amount: Decimal,
        price: Option<Decimal>,
    ) {
        self.trades.record(TradeRecord {
            pool_id: state.pool_id.clone(),
            kind,
            amount,
            time_ns: state.last_update_ns,
        });

        match (price, self.market_for(&state.pool_id)) {
            (Some(price), Some(market_id)) => self.history.append(&market_id, price),
            (Some(_), None) => {
                debug!(pool_id = %state.pool_id, "no market mapped to pool, skipping price history")
            }
            (None, _) => {
                debug!(pool_id = %state.pool_id, "pool drained, skipping price history")
            }
        }

        self.notify(state);
        debug!(pool_id = %state.pool_id, ?kind, %amount, "committed pool mutation");
    }

    fn notify(&self, state: &PoolState) {
        for observer in self.observers.read().iter() {
            observer.pool_updated(&state.pool_id, state);
        }
    }
}

fn oriented_reserves(state: &PoolState, side: Side) -> (Decimal, Decimal) {
    match side {
        Side::Yes => (state.base_reserve, state.quote_reserve),
        Side::No => (state.quote_reserve, state.base_reserve),
    }
}

fn swap_kind(side: Side) -> TradeKind {
    match side {
        Side::Yes => TradeKind::SwapYes,
        Side::No => TradeKind::SwapNo,
    }
}
