//! Core simulation components.
//!
//! This module provides the fundamental types for backtesting:
//! - `Candle`: OHLC data with the strategy signal and risk levels.
//! - `Order`: one spot or futures position, from open to close.
//! - `Account`: realized funds, committed value and fees.
//! - `Buyer`: reads candles and trades their signals.
//! - `Backtest`: replays a candle series through a buyer.

mod account;
mod backtest;
mod buyer;
mod candle;
mod order;
mod position;

pub use account::*;
pub use backtest::*;
pub use buyer::*;
pub use candle::*;
pub use order::*;
pub use position::*;

pub use crate::utils::IdSequence;
