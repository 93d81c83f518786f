//! Per-pool trade journal
//!
//! One record per committed pool mutation. Reads return newest-first for
//! activity displays. Never pruned in scope.

use crate::persistence::SnapshotWriter;
use crate::StoreError;
use dashmap::DashMap;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use tracing::{error, info};
use types::{PoolId, TradeRecord};

/// Append-only journal of committed pool mutations.
#[derive(Default)]
pub struct TradeLog {
    entries: DashMap<PoolId, Vec<TradeRecord>>,
    writer: Option<SnapshotWriter>,
}

impl TradeLog {
    /// In-memory journal with no durability.
    pub fn new() -> Self {
        Self::default()
    }

    /// Journal backed by a JSON snapshot file, replayed at open.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let entries = DashMap::new();
        match fs::read_to_string(&path) {
            Ok(raw) => {
                let map: BTreeMap<String, Vec<TradeRecord>> = serde_json::from_str(&raw)?;
                info!(path = %path.display(), pools = map.len(), "loaded trade journal");
                for (pool_id, records) in map {
                    entries.insert(PoolId::from(pool_id), records);
                }
            }
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "no trade journal yet, starting empty");
            }
            Err(error) => return Err(error.into()),
        }
        let writer = SnapshotWriter::spawn(path)?;
        Ok(Self {
            entries,
            writer: Some(writer),
        })
    }

    /// Append one committed mutation.
    pub fn record(&self, record: TradeRecord) {
        self.entries
            .entry(record.pool_id.clone())
            .or_default()
            .push(record);
        self.schedule_snapshot();
    }

    /// All records for a pool, newest first.
    pub fn all(&self, pool_id: &PoolId) -> Vec<TradeRecord> {
        self.entries
            .get(pool_id)
            .map(|entry| entry.value().iter().rev().cloned().collect())
            .unwrap_or_default()
    }

    /// Up to `limit` most recent records for a pool, newest first.
    pub fn recent(&self, pool_id: &PoolId, limit: usize) -> Vec<TradeRecord> {
        self.entries
            .get(pool_id)
            .map(|entry| entry.value().iter().rev().take(limit).cloned().collect())
            .unwrap_or_default()
    }

    /// Number of records for a pool.
    pub fn len(&self, pool_id: &PoolId) -> usize {
        self.entries
            .get(pool_id)
            .map(|entry| entry.value().len())
            .unwrap_or(0)
    }

    /// Block until the latest snapshot has reached disk. No-op when the
    /// journal is purely in-memory.
    pub fn flush(&self) {
        if let Some(writer) = &self.writer {
            writer.flush();
        }
    }

    fn schedule_snapshot(&self) {
        let Some(writer) = &self.writer else { return };
        let map: BTreeMap<String, Vec<TradeRecord>> = self
            .entries
            .iter()
            .map(|entry| (entry.key().to_string(), entry.value().clone()))
            .collect();
        match serde_json::to_string_pretty(&map) {
            Ok(payload) => writer.submit(payload),
            Err(error) => error!(%error, "trade journal serialization failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use types::TradeKind;

    fn record(pool_id: &str, kind: TradeKind, time_ns: u64) -> TradeRecord {
        TradeRecord {
            pool_id: PoolId::from(pool_id),
            kind,
            amount: dec!(100),
            time_ns,
        }
    }

    #[test]
    fn reads_are_newest_first() {
        let log = TradeLog::new();
        log.record(record("p1", TradeKind::SwapYes, 1));
        log.record(record("p1", TradeKind::AddLiquidity, 2));
        log.record(record("p1", TradeKind::SwapNo, 3));

        let all = log.all(&PoolId::from("p1"));
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].kind, TradeKind::SwapNo);
        assert_eq!(all[2].kind, TradeKind::SwapYes);

        let recent = log.recent(&PoolId::from("p1"), 2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].time_ns, 3);
        assert_eq!(recent[1].time_ns, 2);
    }

    #[test]
    fn pools_are_journaled_independently() {
        let log = TradeLog::new();
        log.record(record("p1", TradeKind::SwapYes, 1));
        log.record(record("p2", TradeKind::RemoveLiquidity, 2));
        assert_eq!(log.len(&PoolId::from("p1")), 1);
        assert_eq!(log.len(&PoolId::from("p2")), 1);
        assert!(log.all(&PoolId::from("p3")).is_empty());
    }
}
