//! # Pool State Management - Reserve Tracking and Persistence
//!
//! ## Purpose
//!
//! Durable representation of every pool's reserves, LP supply, and rolling
//! volume/fee counters, plus the per-market price history and the per-pool
//! trade journal. All reads are snapshot-based; all writes go through an
//! atomic per-pool read-modify-write so reserves are never read and written
//! non-atomically.
//!
//! ## Architecture Role
//!
//! ```text
//! Engine Commits → [Pool Store] → [Snapshot Writer] → JSON on disk
//!       ↓               ↓                ↓
//! Atomic RMW      In-Memory Map    Background Thread
//! Price Points    Price History    Temp-File + Rename
//! Trade Records   Trade Journal    Burst Collapsing
//! ```
//!
//! The in-memory map is the source of truth (read-after-write consistency);
//! the snapshot file provides durability across restarts and never sits on
//! the commit hot path.

pub mod error;
pub mod history;
pub mod persistence;
pub mod store;
pub mod trade_log;

pub use error::StoreError;
pub use history::PriceHistoryLog;
pub use persistence::{PersistentPoolStore, SnapshotWriter};
pub use store::{InMemoryPoolStore, PoolStateStore};
pub use trade_log::TradeLog;
