//! # Leveraged EMA crossover with stop-loss and 1/3 risk/reward
//!
//! Every crossover opens a new 10x futures position, long on a bullish cross and short on a
//! bearish one. Each position gets a 1% stop-loss and a take-profit three times further away.

mod utils;

use std::sync::Arc;

use backtrade::prelude::*;

fn main() -> anyhow::Result<()> {
    let candles = utils::ema_cross(&utils::example_candles(), 9, 21)?;
    let candles = utils::with_stop_loss(candles, 1.0);

    let config = BacktestConfig {
        initial_funds: 1_000.0,
        buyer: BuyerKind::Futures(FuturesConfig {
            margin: 20.0,
            leverage: 10.0,
            taker_commission: 0.0004,
            maker_commission: 0.0002,
            risk_reward: Some(3.0),
        }),
    };

    let mut backtest = Backtest::new(Arc::from_iter(candles))?;
    let mut buyer = Buyer::new(config.initial_funds, config.buyer)?;
    let report = backtest.run(&mut buyer)?;

    println!("{}", report.summary);
    for record in report.orders.iter().take(5) {
        println!(
            "#{} {:?} {:?}: {:.2} -> {:.2}, P&L {:.2}",
            record.id,
            record.side.unwrap_or(PositionSide::Long),
            record.exit_reason.unwrap_or(ExitReason::Market),
            record.open_price.unwrap_or_default(),
            record.close_price.unwrap_or_default(),
            record.profit_loss.unwrap_or_default(),
        );
    }

    Ok(())
}
