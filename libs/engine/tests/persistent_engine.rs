//! The engine over snapshot-backed stores survives a restart.

use config::EngineConfig;
use engine::{PoolEngine, StaticMarketRegistry};
use rust_decimal_macros::dec;
use state_pool::{PersistentPoolStore, PriceHistoryLog, TradeLog};
use std::path::PathBuf;
use std::sync::Arc;
use types::{Market, MarketId, PoolId, Side};

fn config_for(dir: &std::path::Path) -> EngineConfig {
    let mut config = EngineConfig::default();
    config.persistence.state_file = Some(dir.join("pools.json"));
    config.persistence.history_file = Some(dir.join("history.json"));
    config.persistence.trade_file = Some(dir.join("trades.json"));
    config
}

fn registry_for(pool_id: &PoolId, market_id: &MarketId) -> Arc<StaticMarketRegistry> {
    let registry = Arc::new(StaticMarketRegistry::new());
    registry.upsert(Market {
        market_id: market_id.clone(),
        question: "Will the release land on time?".to_string(),
        yes_mint: "yes_mint".to_string(),
        no_mint: "no_mint".to_string(),
        creator: "creator".to_string(),
        created_at_ns: 1,
        pool_id: Some(pool_id.clone()),
        lp_mint: None,
    });
    registry
}

fn build_engine(
    config: &EngineConfig,
    registry: Arc<StaticMarketRegistry>,
) -> PoolEngine<PersistentPoolStore> {
    let state_file: &PathBuf = config.persistence.state_file.as_ref().unwrap();
    let history_file: &PathBuf = config.persistence.history_file.as_ref().unwrap();
    let trade_file: &PathBuf = config.persistence.trade_file.as_ref().unwrap();

    PoolEngine::new(
        Arc::new(PersistentPoolStore::open(state_file).unwrap()),
        Arc::new(PriceHistoryLog::open(history_file).unwrap()),
        Arc::new(TradeLog::open(trade_file).unwrap()),
        config.clone(),
    )
    .with_registry(registry)
}

#[test]
fn engine_state_survives_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(dir.path());
    let pool_id = PoolId::from("pool_1");
    let market_id = MarketId::from("mkt_1");

    let receipt = {
        let engine = build_engine(&config, registry_for(&pool_id, &market_id));
        engine.initialize_with_defaults(&pool_id).unwrap();
        let receipt = engine
            .swap(&pool_id, Side::Yes, dec!(100), config.engine.fee_rate)
            .unwrap();
        // Writers drain their queues when the engine's stores drop
        receipt
    };

    // The journal reached disk before the restart
    {
        let journal = TradeLog::open(config.persistence.trade_file.as_ref().unwrap()).unwrap();
        let records = journal.all(&pool_id);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].kind, types::TradeKind::SwapYes);
    }

    let engine = build_engine(&config, registry_for(&pool_id, &market_id));
    let restored = engine.pool(&pool_id).unwrap();
    assert_eq!(restored, receipt.state);
    assert_eq!(engine.current_price(&pool_id), receipt.new_price);

    // Seed point plus the swap observation
    assert_eq!(engine.recent_history(&market_id).len(), 2);

    // New mutations keep applying on top of the restored state
    engine.add_liquidity(&pool_id, dec!(50), dec!(50)).unwrap();
    let grown = engine.pool(&pool_id).unwrap();
    assert_eq!(grown.base_reserve, restored.base_reserve + dec!(50));
}
