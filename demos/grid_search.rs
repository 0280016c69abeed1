//! # Parallel grid search of EMA periods
//!
//! Relabels the candles for every (fast, slow) pair and keeps the pair with the highest
//! final funds. Pairs where the fast period is not below the slow one are rejected.

mod utils;

use std::sync::Arc;

use backtrade::prelude::*;

struct EmaPeriods;

impl ParameterCombination for EmaPeriods {
    type Output = (usize, usize);

    fn generate() -> Vec<Self::Output> {
        (5..=20).flat_map(|fast| (10..=50).step_by(5).map(move |slow| (fast, slow))).collect()
    }
}

fn main() -> anyhow::Result<()> {
    let config = BacktestConfig {
        initial_funds: 1_000.0,
        buyer: BuyerKind::Spot(SpotConfig {
            trade_value: 100.0,
            commission: 0.001,
        }),
    };

    let optimizer = Optimizer::<EmaPeriods>::new(Arc::from_iter(utils::example_candles()));
    let search = optimizer.with(|candles, &(fast, slow)| {
        if fast >= slow {
            return Err(Error::Msg(format!("fast period {fast} is not below {slow}")));
        }
        let labelled = utils::ema_cross(candles, fast, slow).map_err(|e| Error::Msg(e.to_string()))?;
        Backtest::new(Arc::from_iter(labelled))?.evaluate(&config)
    })?;

    println!(
        "{} combinations evaluated, {} rejected",
        search.results.len(),
        search.rejected.len()
    );
    if let Some(((fast, slow), funds)) = search.best() {
        println!("best: fast {fast}, slow {slow} -> {funds:.2}");
    }

    Ok(())
}
