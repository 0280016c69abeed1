//! # Backtrade: position simulation for spot and futures strategies
//!
//! **Backtrade** replays historical candles, already labelled with trading signals,
//! through a simulated trading account and reports what the strategy would have earned.
//! It models commissions on both legs, leverage, stop-loss, take-profit and liquidation,
//! and condenses every run into a summary of trade statistics.
//!
//! ## Core Components
//! | Component   | Description                                                                                     |
//! |-------------|-------------------------------------------------------------------------------------------------|
//! | **`Candle`** | OHLC data of one period, with the strategy signal and optional risk levels.                   |
//! | **`Order`**  | One spot or futures position from open to close, with its profit/loss and commissions.        |
//! | **`Buyer`** | A trading account that reads candles and trades their signals.                                 |
//! | **`Backtest`** | Replays a candle series through a buyer and records its funds after every candle.          |
//! | **`Summary`** | Final funds, win rate, profit factor, trade rates, streaks and drawdown.                     |
//! | **`Optimizer`** | Grid and genetic search over strategy parameters *(EMA periods, leverage, RR, etc...)*.   |
//!
//! ## Buyers
//! | Buyer       | Behaviour                                                                                       |
//! |-------------|-------------------------------------------------------------------------------------------------|
//! | **Spot**    | One long position at a time: opens on a buy signal, closes on a sell signal.                   |
//! | **Futures** | Opens a long on every buy signal and a short on every sell signal, with leverage.             |
//!
//! Open positions are checked on every candle, liquidation first, then take-profit, then stop-loss.
//! A futures order needs a take-profit: given by the candle, or derived from its stop-loss and the
//! buyer's risk/reward ratio.
//!
//! ## Getting Started
//! ```rust
//! use std::sync::Arc;
//!
//! use backtrade::prelude::*;
//! use chrono::{DateTime, Duration};
//!
//! let start = DateTime::default();
//! let buy = CandleBuilder::builder()
//!     .open(99.0)
//!     .high(101.0)
//!     .low(98.0)
//!     .close(100.0)
//!     .timestamp(start)
//!     .signal(Signal::Buy)
//!     .build()
//!     .unwrap();
//! let sell = CandleBuilder::builder()
//!     .open(100.0)
//!     .high(109.0)
//!     .low(100.0)
//!     .close(108.0)
//!     .timestamp(start + Duration::hours(1))
//!     .signal(Signal::Sell)
//!     .build()
//!     .unwrap();
//!
//! let mut backtest = Backtest::new(Arc::from_iter(vec![buy, sell])).unwrap();
//! let mut buyer = Buyer::spot(1000.0, 100.0, 0.0).unwrap();
//! let report = backtest.run(&mut buyer).unwrap();
//!
//! assert_eq!(report.summary.total_trades, 1);
//! println!("{}", report.summary);
//! ```
//!
//! ### Output:
//! ```bash
//! === Backtest Summary ===
//! Initial Funds: 1000.00
//! Final Funds: 1008.00 (+0.80%)
//! ...
//! ```
//!
//! ## Features
//! | Feature     | Purpose                                                                                     |
//! |-------------|---------------------------------------------------------------------------------------------|
//! | `serde`     | Serialize candles, configs, order records and reports; read candles from JSON files.        |
//! | `optimizer` | Parallel grid search and genetic search, with [`rayon`](https://crates.io/crates/rayon).    |
//! | `cli`       | The `backtrade` binary, reading TOML configs.                                               |
//! | `wasm`      | WebAssembly support for the optimizer.                                                      |
//!
//! ## Error Handling
//! Every fallible operation returns [`errors::Result`]. Invalid candles, buyer terms or
//! risk levels are rejected with a dedicated [`errors::Error`] variant; an order error
//! aborts the run it happened in.
//!
//! ## License
//! MIT
#![warn(missing_docs)]

/// Core simulation components: candles, orders, buyers, and the backtest runner.
pub mod engine;

/// Error types for the library.
pub mod errors;

/// Buyer and backtest configuration.
pub mod config;

/// Performance metrics: drawdown, profit factor, win rate, trade rates and streaks.
pub mod metrics;

/// Utility functions and helpers.
pub mod utils;

/// Strategy parameter optimization.
#[cfg(feature = "optimizer")]
pub mod optimizer;

/// Re-exports of commonly used types and traits for convenience.
pub mod prelude {
    pub use super::*;
    pub use crate::config::*;
    pub use crate::engine::*;
    pub use crate::errors::*;
    pub use crate::metrics::*;

    #[cfg(feature = "serde")]
    pub use crate::utils::get_data_from_file;

    #[cfg(feature = "optimizer")]
    pub use crate::optimizer::*;
}

use std::ops::{Add, Div, Mul, Sub};

/// Trait for performing percentage-based calculations.
///
/// This trait provides methods to add, subtract, and calculate percentages
/// for numeric types, enabling common financial calculations.
pub trait PercentCalculus<Rhs = Self> {
    /// Adds a percentage to the value.
    ///
    /// ### Arguments
    /// * `rhs` - The percentage to add (e.g., 10.0 for 10%).
    ///
    /// ### Returns
    /// The value increased by the given percentage.
    fn addpercent(self, rhs: Rhs) -> Self;

    /// Subtracts a percentage from the value.
    ///
    /// ### Arguments
    /// * `rhs` - The percentage to subtract (e.g., 10.0 for 10%).
    ///
    /// ### Returns
    /// The value decreased by the given percentage.
    fn subpercent(self, rhs: Rhs) -> Self;

    /// Calculates the percentage change between two values.
    ///
    /// ### Arguments
    /// * `new` - The new value to compare with.
    ///
    /// ### Returns
    /// The percentage change from the original value to the new value.
    fn change(self, new: Self) -> Self;
}

impl PercentCalculus for f64 {
    fn addpercent(self, percent: Self) -> Self {
        self.add(self.mul(percent.div(100.0)))
    }

    fn subpercent(self, percent: Self) -> Self {
        self.sub(self.mul(percent.div(100.0)))
    }

    fn change(self, new: Self) -> Self {
        new.sub(self).div(self).mul(100.0)
    }
}
