//! # EMA crossover on the spot market
//!
//! Buys when the 12-period EMA crosses above the 26-period EMA and sells on the opposite
//! cross, one position at a time, paying 0.1% on each leg.

mod utils;

use std::sync::Arc;

use backtrade::prelude::*;

fn main() -> anyhow::Result<()> {
    let candles = utils::ema_cross(&utils::example_candles(), 12, 26)?;
    let mut backtest = Backtest::new(Arc::from_iter(candles))?;
    let mut buyer = Buyer::spot(1_000.0, 100.0, 0.001)?;

    let report = backtest.run(&mut buyer)?;
    println!("{}", report.summary);

    let stats = buyer.get_order_stats();
    println!(
        "{} orders, {} winners ({:.2}%), total P&L {:.2}",
        stats.total_orders, stats.winning_orders, stats.win_rate, stats.total_profit_loss
    );

    Ok(())
}
