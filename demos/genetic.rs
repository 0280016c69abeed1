//! # Genetic search of futures terms
//!
//! Evolves the EMA periods, leverage and risk/reward ratio of a futures buyer.

mod utils;

use std::sync::Arc;

use backtrade::prelude::*;

fn main() -> anyhow::Result<()> {
    let candles = utils::example_candles();

    let optimizer = GeneticOptimizer::new([
        ("fast", ParameterRange::integers(5..=20)?),
        ("slow", ParameterRange::integers(20..=60)?),
        ("leverage", ParameterRange::stepped(1.0, 20.0, 1.0)?),
        ("risk_reward", ParameterRange::stepped(1.0, 4.0, 0.5)?),
    ])?
    .population_size(40)
    .elite_size(4)
    .seed(7);

    let evolution = optimizer.optimize(25, |params| {
        let labelled = utils::ema_cross(&candles, params["fast"] as usize, params["slow"] as usize)
            .map_err(|e| Error::Msg(e.to_string()))?;
        let labelled = utils::with_stop_loss(labelled, 1.5);

        let config = BacktestConfig {
            initial_funds: 1_000.0,
            buyer: BuyerKind::Futures(FuturesConfig {
                margin: 20.0,
                leverage: params["leverage"],
                taker_commission: 0.0004,
                maker_commission: 0.0002,
                risk_reward: Some(params["risk_reward"]),
            }),
        };
        Backtest::new(Arc::from_iter(labelled))?.evaluate(&config)
    })?;

    println!("best {:?} -> {:.2}", evolution.best, evolution.best_fitness);
    println!("{} restarts", evolution.restarts);
    for (generation, (fitness, diversity)) in evolution
        .fitness_history
        .iter()
        .zip(&evolution.diversity_history)
        .enumerate()
    {
        println!("generation {:>2}: {fitness:.2} (diversity {diversity:.2})", generation + 1);
    }

    Ok(())
}
