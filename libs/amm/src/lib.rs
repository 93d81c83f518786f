//! # Futarch AMM Library - Constant-Product Pool Mathematics
//!
//! ## Purpose
//!
//! Pure mathematical functions for the binary-outcome prediction-market pool:
//! swap quotes, price impact, slippage floors, and liquidity-token accounting
//! over the constant-product invariant `x * y = k`. All arithmetic uses
//! `Decimal` so quotes carry no binary floating-point drift.
//!
//! ## Integration Points
//!
//! - **Input Sources**: Pool reserve snapshots from the pool state store,
//!   trade parameters from the engine
//! - **Output Destinations**: The pool engine's quote and commit paths
//! - **Precision**: `rust_decimal` throughout; checked multiplication and
//!   division map exhaustion to [`AmmError::Overflow`] instead of panicking
//!
//! ## Architecture Role
//!
//! ```text
//! Reserve Snapshot → [ReserveMath] → SwapOutcome / LiquidityQuote
//!        ↓                ↓                      ↓
//! Engine Quote Path   Pure Functions      Engine Commit Path
//! ```
//!
//! No state, no I/O: every function is deterministic over its arguments.

pub mod error;
pub mod reserve_math;

pub use error::AmmError;
pub use reserve_math::{ReserveMath, SwapOutcome};

/// Common numeric types for AMM calculations
pub use rust_decimal::Decimal;
pub use rust_decimal_macros::dec;
