//! Performance metrics of a backtest run.
//!
//! The runner records a [`FundsPoint`] after every candle; once the run ends,
//! the [`Summary`] condenses those points and the buyer counters into:
//! - final funds and return
//! - win/lose trades, win rate and profit factor
//! - max/min trade rate and max win/lose streaks
//! - max drawdown, the lowest realized funds of the run

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::PercentCalculus;
use crate::engine::{Buyer, OrderRecord};

/// Funds of the buyer after one candle.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FundsPoint {
    /// Candle timestamp.
    pub timestamp: DateTime<Utc>,
    /// Realized funds.
    pub funds: f64,
    /// Funds plus unrealized profit/loss.
    pub equity: f64,
    /// Lowest realized funds up to this point, initial funds included.
    pub drawdown: f64,
}

/// Lowest value among `initial` and the realized funds of `points`.
pub fn max_drawdown(initial: f64, points: &[FundsPoint]) -> f64 {
    points.iter().map(|p| p.funds).fold(initial, f64::min)
}

/// Largest peak-to-trough decline of the equity curve, in percent.
pub fn max_equity_drawdown_percent(initial: f64, points: &[FundsPoint]) -> f64 {
    let mut peak = initial;
    let mut drawdown = 0.0_f64;
    for point in points {
        peak = peak.max(point.equity);
        if peak > 0.0 {
            drawdown = drawdown.max((peak - point.equity) / peak);
        }
    }
    drawdown * 100.0
}

/// Aggregated statistics of a run.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    /// Funds at the start.
    pub initial_funds: f64,
    /// Realized funds at the end.
    pub final_funds: f64,
    /// Funds plus the unrealized profit/loss of orders left open.
    pub final_equity: f64,
    /// Closed orders.
    pub total_trades: usize,
    /// Winners.
    pub win_trades: usize,
    /// Losers, break-even included.
    pub lose_trades: usize,
    /// Share of winners, in percent.
    pub win_rate: f64,
    /// Gross profit over gross loss. Infinite without losses.
    pub profit_factor: f64,
    /// Commissions paid.
    pub fees: f64,
    /// Highest trade rate of the closed orders, 1 without trades.
    pub max_trade_rate: f64,
    /// Lowest trade rate of the closed orders, 1 without trades.
    pub min_trade_rate: f64,
    /// Longest run of winners.
    pub max_win_streak: usize,
    /// Longest run of losers.
    pub max_lose_streak: usize,
    /// Lowest realized funds, initial funds included.
    pub max_drawdown: f64,
    /// Largest equity decline from a peak, in percent.
    pub max_equity_drawdown: f64,
    /// Orders still open at the end.
    pub open_orders: usize,
}

impl Summary {
    /// Builds the summary of `buyer` after a run that recorded `points`.
    pub fn new(buyer: &Buyer, points: &[FundsPoint]) -> Self {
        let stats = buyer.stats();
        let initial_funds = buyer.account().initial_balance();

        let win_rate = if stats.total_trades == 0 {
            0.0
        } else {
            stats.win_trades as f64 / stats.total_trades as f64 * 100.0
        };
        let profit_factor = if stats.gross_loss == 0.0 {
            f64::INFINITY
        } else {
            stats.gross_profit / stats.gross_loss
        };

        Self {
            initial_funds,
            win_rate,
            profit_factor,
            final_funds: buyer.funds(),
            final_equity: buyer.equity(),
            total_trades: stats.total_trades,
            win_trades: stats.win_trades,
            lose_trades: stats.lose_trades,
            fees: buyer.account().fees_paid(),
            max_trade_rate: stats.max_trade_rate,
            min_trade_rate: stats.min_trade_rate,
            max_win_streak: stats.max_win_streak,
            max_lose_streak: stats.max_lose_streak,
            max_drawdown: max_drawdown(initial_funds, points),
            max_equity_drawdown: max_equity_drawdown_percent(initial_funds, points),
            open_orders: buyer.active_orders().count(),
        }
    }

    /// Return over the initial funds, in percent.
    pub fn total_return(&self) -> f64 {
        self.initial_funds.change(self.final_funds)
    }

    /// Metric name to value.
    pub fn to_map(&self) -> BTreeMap<&'static str, f64> {
        BTreeMap::from([
            ("final_funds", self.final_funds),
            ("final_equity", self.final_equity),
            ("total_return", self.total_return()),
            ("total_trades", self.total_trades as f64),
            ("win_trades", self.win_trades as f64),
            ("lose_trades", self.lose_trades as f64),
            ("win_rate", self.win_rate),
            ("profit_factor", self.profit_factor),
            ("fees", self.fees),
            ("max_trade_rate", self.max_trade_rate),
            ("min_trade_rate", self.min_trade_rate),
            ("max_win_streak", self.max_win_streak as f64),
            ("max_lose_streak", self.max_lose_streak as f64),
            ("max_drawdown", self.max_drawdown),
            ("max_equity_drawdown", self.max_equity_drawdown),
            ("open_orders", self.open_orders as f64),
        ])
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Backtest Summary ===")?;
        writeln!(f, "Initial Funds: {:.2}", self.initial_funds)?;
        writeln!(f, "Final Funds: {:.2} ({:+.2}%)", self.final_funds, self.total_return())?;
        writeln!(f, "Final Equity: {:.2}", self.final_equity)?;
        writeln!(f, "Fees paid: {:.2}", self.fees)?;
        #[allow(clippy::writeln_empty_string)]
        writeln!(f, "")?;
        writeln!(f, "Total Trades: {}", self.total_trades)?;
        writeln!(f, "Win Trades: {}", self.win_trades)?;
        writeln!(f, "Lose Trades: {}", self.lose_trades)?;
        writeln!(f, "Win Rate: {:.2}%", self.win_rate)?;
        writeln!(f, "Profit Factor: {:.2}", self.profit_factor)?;
        writeln!(f, "Max Trade Rate: {:.4}", self.max_trade_rate)?;
        writeln!(f, "Min Trade Rate: {:.4}", self.min_trade_rate)?;
        writeln!(f, "Max Win Streak: {}", self.max_win_streak)?;
        writeln!(f, "Max Lose Streak: {}", self.max_lose_streak)?;
        writeln!(f, "Max Drawdown: {:.2}", self.max_drawdown)?;
        writeln!(f, "Max Equity Drawdown: {:.2}%", self.max_equity_drawdown)?;
        writeln!(f, "Open Orders: {}", self.open_orders)
    }
}

/// Everything a run produced.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    /// Aggregated statistics.
    pub summary: Summary,
    /// Funds after every candle.
    pub funds: Vec<FundsPoint>,
    /// Closed orders, in closing order.
    pub orders: Vec<OrderRecord>,
}

#[cfg(test)]
fn points(funds: &[f64]) -> Vec<FundsPoint> {
    funds
        .iter()
        .map(|&funds| FundsPoint {
            timestamp: DateTime::default(),
            funds,
            equity: funds,
            drawdown: funds,
        })
        .collect()
}

#[cfg(test)]
#[test]
fn drawdown_is_the_lowest_funds() {
    let series = points(&[10000.0, 12000.0, 9000.0, 11000.0]);
    assert_eq!(max_drawdown(10000.0, &series), 9000.0);
    assert_eq!(max_equity_drawdown_percent(10000.0, &series), 25.0); // (12000 - 9000) / 12000
}

#[cfg(test)]
#[test]
fn drawdown_of_monotone_series() {
    let rising = points(&[100.0, 101.0, 102.0, 103.0]);
    assert_eq!(max_drawdown(100.0, &rising), 100.0);
    assert_eq!(max_equity_drawdown_percent(100.0, &rising), 0.0);

    let falling = points(&[99.0, 98.0, 97.0]);
    assert_eq!(max_drawdown(100.0, &falling), 97.0);
}

#[cfg(test)]
#[test]
fn drawdown_without_points() {
    assert_eq!(max_drawdown(100.0, &[]), 100.0);
    assert_eq!(max_equity_drawdown_percent(100.0, &[]), 0.0);
}

#[cfg(test)]
#[test]
fn summary_without_trades() {
    let buyer = Buyer::spot(1000.0, 100.0, 0.001).unwrap();
    let summary = Summary::new(&buyer, &points(&[1000.0, 1000.0]));

    assert_eq!(summary.final_funds, 1000.0);
    assert_eq!(summary.total_trades, 0);
    assert_eq!(summary.win_rate, 0.0);
    assert_eq!(summary.profit_factor, f64::INFINITY);
    assert_eq!(summary.max_trade_rate, 1.0);
    assert_eq!(summary.min_trade_rate, 1.0);
    assert_eq!(summary.max_drawdown, 1000.0);
    assert_eq!(summary.total_return(), 0.0);

    let map = summary.to_map();
    assert_eq!(map["final_funds"], 1000.0);
    assert_eq!(map["open_orders"], 0.0);
    assert!(summary.to_string().starts_with("=== Backtest Summary ==="));
}
