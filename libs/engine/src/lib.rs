//! # Futarch Pool Engine - Quote, Validate, Commit
//!
//! ## Purpose
//!
//! Orchestrates the pool state store and the reserve math to answer "what
//! happens if I swap/add/remove X" and to apply the resulting state
//! transition. Every state change goes through quote → re-validate → commit:
//! commits re-read state under the pool's write guard, so a stale quote is
//! never applied.
//!
//! ## Integration Points
//!
//! - **Input Sources**: Caller trade parameters, pool snapshots from the
//!   injected [`state_pool::PoolStateStore`]
//! - **Output Destinations**: Committed pool states, the per-market price
//!   history, the per-pool trade journal, subscribed observers
//! - **Collaborator Seams**: [`MarketRegistry`] resolves pools to markets;
//!   [`PoolObserver`] replaces any event-loop assumption with a synchronous
//!   callback list
//!
//! ## Architecture Role
//!
//! ```text
//! Caller → [PoolEngine] → [ReserveMath] → [PoolStateStore]
//!              ↓                                ↓
//!        Typed Quotes                   Atomic Commit
//!              ↓                                ↓
//!        Trade Journal ← Price History ← Observers
//! ```
//!
//! The engine produces quotes and local state updates only; constructing and
//! submitting any real value transfer belongs to the settlement collaborator.

pub mod engine;
pub mod error;
pub mod notify;
pub mod registry;

pub use engine::PoolEngine;
pub use error::EngineError;
pub use notify::PoolObserver;
pub use registry::{MarketRegistry, StaticMarketRegistry};
