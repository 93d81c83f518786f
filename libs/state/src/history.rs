//! Per-market price history
//!
//! Append-only series of observed prices used to reconstruct charts and seed
//! new series. Derived data: the pool state is authoritative, so points are
//! deduplicated by near-equality rather than kept exactly. The log never
//! prunes automatically.

use crate::persistence::SnapshotWriter;
use crate::StoreError;
use dashmap::DashMap;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use tracing::{error, info};
use types::{now_ns, MarketId, PricePoint};

/// A new price within this distance of the last recorded one refreshes the
/// last point in place instead of growing the series.
const PRICE_EPSILON: Decimal = dec!(0.0001);

/// Append-only per-market price log.
#[derive(Default)]
pub struct PriceHistoryLog {
    series: DashMap<MarketId, Vec<PricePoint>>,
    writer: Option<SnapshotWriter>,
}

impl PriceHistoryLog {
    /// In-memory log with no durability.
    pub fn new() -> Self {
        Self::default()
    }

    /// Log backed by a JSON snapshot file, replayed at open.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let series = DashMap::new();
        match fs::read_to_string(&path) {
            Ok(raw) => {
                let map: BTreeMap<String, Vec<PricePoint>> = serde_json::from_str(&raw)?;
                info!(path = %path.display(), markets = map.len(), "loaded price history");
                for (market_id, points) in map {
                    series.insert(MarketId::from(market_id), points);
                }
            }
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "no price history yet, starting empty");
            }
            Err(error) => return Err(error.into()),
        }
        let writer = SnapshotWriter::spawn(path)?;
        Ok(Self {
            series,
            writer: Some(writer),
        })
    }

    /// Record an observed price for a market.
    ///
    /// Dedup is by near-equality: within [`PRICE_EPSILON`] of the last point
    /// the last point's price and timestamp are refreshed in place.
    pub fn append(&self, market_id: &MarketId, price: Decimal) {
        let mut series = self.series.entry(market_id.clone()).or_default();
        let point = PricePoint {
            time_ns: now_ns(),
            price,
        };
        match series.last_mut() {
            Some(last) if (last.price - price).abs() <= PRICE_EPSILON => *last = point,
            _ => series.push(point),
        }
        drop(series);
        self.schedule_snapshot();
    }

    /// Insert a single baseline point when a market has no history yet.
    pub fn seed_if_empty(&self, market_id: &MarketId, price: Decimal) {
        let mut seeded = false;
        {
            let mut series = self.series.entry(market_id.clone()).or_default();
            if series.is_empty() {
                series.push(PricePoint {
                    time_ns: now_ns(),
                    price,
                });
                seeded = true;
            }
        }
        if seeded {
            self.schedule_snapshot();
        }
    }

    /// Full ordered series for a market.
    pub fn all(&self, market_id: &MarketId) -> Vec<PricePoint> {
        self.series
            .get(market_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    /// Last `limit` points, oldest first.
    pub fn recent(&self, market_id: &MarketId, limit: usize) -> Vec<PricePoint> {
        self.series
            .get(market_id)
            .map(|entry| {
                let points = entry.value();
                let start = points.len().saturating_sub(limit);
                points[start..].to_vec()
            })
            .unwrap_or_default()
    }

    /// Percentage move from the first to the last recorded point.
    ///
    /// `None` until a market has at least two points.
    pub fn change_percent(&self, market_id: &MarketId) -> Option<Decimal> {
        let series = self.series.get(market_id)?;
        let points = series.value();
        if points.len() < 2 {
            return None;
        }
        let first = points.first()?.price;
        let last = points.last()?.price;
        if first <= Decimal::ZERO {
            return None;
        }
        Some((last - first) / first * dec!(100))
    }

    /// Number of recorded points for a market.
    pub fn len(&self, market_id: &MarketId) -> usize {
        self.series
            .get(market_id)
            .map(|entry| entry.value().len())
            .unwrap_or(0)
    }

    /// Block until the latest snapshot has reached disk. No-op when the log
    /// is purely in-memory.
    pub fn flush(&self) {
        if let Some(writer) = &self.writer {
            writer.flush();
        }
    }

    fn schedule_snapshot(&self) {
        let Some(writer) = &self.writer else { return };
        let map: BTreeMap<String, Vec<PricePoint>> = self
            .series
            .iter()
            .map(|entry| (entry.key().to_string(), entry.value().clone()))
            .collect();
        match serde_json::to_string_pretty(&map) {
            Ok(payload) => writer.submit(payload),
            Err(error) => error!(%error, "price history serialization failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn market() -> MarketId {
        MarketId::from("mkt_1")
    }

    #[test]
    fn near_equal_appends_refresh_in_place() {
        let log = PriceHistoryLog::new();
        log.append(&market(), dec!(0.5));
        log.append(&market(), dec!(0.50005));
        assert_eq!(log.len(&market()), 1);
        // The refreshed point carries the newest price
        assert_eq!(log.all(&market())[0].price, dec!(0.50005));

        log.append(&market(), dec!(0.51));
        assert_eq!(log.len(&market()), 2);
    }

    #[test]
    fn seed_only_fills_an_empty_series() {
        let log = PriceHistoryLog::new();
        log.seed_if_empty(&market(), dec!(0.5));
        log.seed_if_empty(&market(), dec!(0.9));
        let points = log.all(&market());
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].price, dec!(0.5));
    }

    #[test]
    fn recent_returns_a_bounded_suffix() {
        let log = PriceHistoryLog::new();
        let mut price = dec!(0.1);
        for _ in 0..10 {
            log.append(&market(), price);
            price += dec!(0.01);
        }
        assert_eq!(log.len(&market()), 10);

        let tail = log.recent(&market(), 3);
        assert_eq!(tail.len(), 3);
        assert_eq!(tail[2].price, log.all(&market())[9].price);

        assert_eq!(log.recent(&market(), 100).len(), 10);
        assert!(log.recent(&MarketId::from("unknown"), 5).is_empty());
    }

    #[test]
    fn change_percent_spans_the_series() {
        let log = PriceHistoryLog::new();
        assert_eq!(log.change_percent(&market()), None);
        log.append(&market(), dec!(0.5));
        assert_eq!(log.change_percent(&market()), None);
        log.append(&market(), dec!(0.75));
        assert_eq!(log.change_percent(&market()), Some(dec!(50)));
    }
}
