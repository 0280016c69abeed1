use std::sync::Arc;

use tracing::info;

use crate::config::BacktestConfig;
use crate::engine::{Buyer, Candle, IdSequence};
use crate::errors::{Error, Result};
use crate::metrics::{FundsPoint, Report, Summary};

/// Replays a candle series through a buyer.
#[derive(Debug, Clone)]
pub struct Backtest {
    data: Arc<[Candle]>,
    ids: IdSequence,
}

impl Backtest {
    /// Creates a backtest over `data`.
    ///
    /// ### Errors
    /// - [`Error::CandleDataEmpty`] without candles.
    /// - [`Error::InvalidPrice`] or [`Error::InvalidCandle`] for a malformed candle.
    /// - [`Error::UnorderedCandles`] when timestamps are not strictly ascending,
    ///   with the index of the first offending candle.
    ///
    /// ### Example
    /// ```rust
    /// use std::sync::Arc;
    ///
    /// use backtrade::prelude::*;
    /// use chrono::DateTime;
    ///
    /// let candle = CandleBuilder::builder()
    ///     .open(100.0)
    ///     .high(110.0)
    ///     .low(95.0)
    ///     .close(105.0)
    ///     .timestamp(DateTime::default())
    ///     .signal(Signal::Buy)
    ///     .build()
    ///     .unwrap();
    ///
    /// let mut backtest = Backtest::new(Arc::from_iter(vec![candle])).unwrap();
    /// let mut buyer = Buyer::spot(1000.0, 100.0, 0.001).unwrap();
    /// let report = backtest.run(&mut buyer).unwrap();
    /// assert_eq!(report.summary.open_orders, 1);
    /// ```
    pub fn new(data: Arc<[Candle]>) -> Result<Self> {
        if data.is_empty() {
            return Err(Error::CandleDataEmpty);
        }
        for candle in data.iter() {
            candle.validate()?;
        }
        if let Some(index) = data
            .windows(2)
            .position(|pair| pair[1].timestamp() <= pair[0].timestamp())
        {
            return Err(Error::UnorderedCandles(index + 1));
        }

        Ok(Self {
            data,
            ids: IdSequence::default(),
        })
    }

    /// Returns an iterator over the data.
    pub fn candles(&self) -> std::slice::Iter<'_, Candle> {
        self.data.iter()
    }

    /// Returns the shared data.
    pub fn data(&self) -> Arc<[Candle]> {
        Arc::clone(&self.data)
    }

    /// Returns the order id sequence, shared by every run of this backtest.
    pub fn ids(&self) -> &IdSequence {
        &self.ids
    }

    /// Feeds every candle to `buyer` and records its funds after each one.
    ///
    /// Orders still open at the end are left open and counted in the summary.
    /// The first order error aborts the run.
    pub fn run(&mut self, buyer: &mut Buyer) -> Result<Report> {
        info!("backtest: {} candles, initial funds {:.2}", self.data.len(), buyer.funds());

        let candles = Arc::clone(&self.data);
        let mut funds = Vec::with_capacity(candles.len());
        let mut drawdown = buyer.account().initial_balance();
        for candle in candles.iter() {
            buyer.read_chart(candle, &mut self.ids)?;
            drawdown = drawdown.min(buyer.funds());
            funds.push(FundsPoint {
                drawdown,
                timestamp: candle.timestamp(),
                funds: buyer.funds(),
                equity: buyer.equity(),
            });
        }

        let summary = Summary::new(buyer, &funds);
        info!(
            "backtest done: final funds {:.2}, {} trades, {} open",
            summary.final_funds, summary.total_trades, summary.open_orders
        );

        Ok(Report {
            summary,
            funds,
            orders: buyer.order_history().to_vec(),
        })
    }

    /// Final funds of a fresh buyer built from `config` after a full run.
    ///
    /// Does not touch this backtest's id sequence, so it can be shared across threads.
    pub fn evaluate(&self, config: &BacktestConfig) -> Result<f64> {
        let mut buyer = Buyer::new(config.initial_funds, config.buyer)?;
        let mut ids = IdSequence::default();
        for candle in self.data.iter() {
            buyer.read_chart(candle, &mut ids)?;
        }
        Ok(buyer.funds())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BuyerKind, FuturesConfig, SpotConfig};
    use crate::engine::{CandleBuilder, ExitReason, PositionSide, Signal};
    use chrono::{DateTime, Duration};

    const EPSILON: f64 = 1e-9;

    fn candle(i: i64, open: f64, high: f64, low: f64, close: f64) -> Candle {
        CandleBuilder::builder()
            .open(open)
            .high(high)
            .low(low)
            .close(close)
            .timestamp(DateTime::from_timestamp(1_515_151_515, 0).unwrap() + Duration::hours(i))
            .build()
            .unwrap()
    }

    fn spot_data() -> Arc<[Candle]> {
        Arc::from_iter(vec![
            candle(0, 99.0, 101.0, 98.0, 100.0).with_signal(Signal::Buy),
            candle(1, 100.0, 106.0, 99.0, 105.0),
            candle(2, 105.0, 106.0, 102.0, 103.0).with_signal(Signal::Hold),
            candle(3, 103.0, 109.0, 103.0, 108.0).with_signal(Signal::Sell),
        ])
    }

    #[test]
    fn empty_data() {
        let result = Backtest::new(Arc::from_iter(Vec::<Candle>::new()));
        assert!(matches!(result, Err(Error::CandleDataEmpty)));
    }

    #[test]
    fn unordered_data() {
        let data = Arc::from_iter(vec![
            candle(0, 100.0, 101.0, 99.0, 100.0),
            candle(2, 100.0, 101.0, 99.0, 100.0),
            candle(1, 100.0, 101.0, 99.0, 100.0),
        ]);
        assert!(matches!(Backtest::new(data), Err(Error::UnorderedCandles(2))));

        let data = Arc::from_iter(vec![candle(0, 100.0, 101.0, 99.0, 100.0), candle(0, 100.0, 101.0, 99.0, 100.0)]);
        assert!(matches!(Backtest::new(data), Err(Error::UnorderedCandles(1))));
    }

    #[test]
    fn scenario_spot_signals() {
        let mut backtest = Backtest::new(spot_data()).unwrap();
        let mut buyer = Buyer::spot(1000.0, 100.0, 0.0).unwrap();
        let report = backtest.run(&mut buyer).unwrap();

        assert_eq!(report.orders.len(), 1);
        assert!((report.orders[0].close_value.unwrap() - 108.0).abs() < EPSILON);

        let funds = report.funds.iter().map(|p| p.funds).collect::<Vec<_>>();
        assert_eq!(&funds[..3], &[1000.0, 1000.0, 1000.0]);
        assert!((funds[3] - 1008.0).abs() < EPSILON);
        assert!((report.funds[1].equity - 1005.0).abs() < EPSILON);

        let summary = &report.summary;
        assert_eq!(summary.total_trades, 1);
        assert_eq!(summary.win_trades, 1);
        assert_eq!(summary.max_drawdown, 1000.0);
        assert!((summary.max_trade_rate - 1.08).abs() < EPSILON);
        assert!((summary.min_trade_rate - 1.08).abs() < EPSILON);
        assert_eq!(summary.open_orders, 0);
    }

    #[test]
    fn drawdown_never_increases() {
        let closes = [100.0, 110.0, 110.0, 88.0, 100.0, 90.0, 90.0, 99.0];
        let data = Arc::from_iter(closes.iter().enumerate().map(|(i, &close)| {
            let signal = if i % 2 == 0 { Signal::Buy } else { Signal::Sell };
            candle(i as i64, close, close, close, close).with_signal(signal)
        }));
        let mut backtest = Backtest::new(data).unwrap();
        let mut buyer = Buyer::spot(1000.0, 100.0, 0.0).unwrap();
        let report = backtest.run(&mut buyer).unwrap();

        assert_eq!(report.summary.win_trades, 2);
        assert_eq!(report.summary.lose_trades, 2);
        assert!((report.summary.final_funds - 990.0).abs() < EPSILON);

        let mut running = report.summary.initial_funds;
        for pair in report.funds.windows(2) {
            assert!(pair[1].drawdown <= pair[0].drawdown);
        }
        for point in &report.funds {
            running = running.min(point.funds);
            assert!((point.drawdown - running).abs() < EPSILON);
        }
        let last = report.funds.last().unwrap();
        assert!((last.drawdown - 980.0).abs() < EPSILON);
        assert_eq!(last.drawdown, report.summary.max_drawdown);
    }

    #[test]
    fn scenario_futures_take_profit() {
        let data = Arc::from_iter(vec![
            candle(0, 99.0, 101.0, 98.0, 100.0)
                .with_signal(Signal::Buy)
                .with_risk(Some(110.0), Some(95.0)),
            candle(1, 100.0, 111.0, 99.0, 105.0),
        ]);
        let mut backtest = Backtest::new(data).unwrap();
        let mut buyer = Buyer::futures(1000.0, 50.0, 10.0, 0.0004, 0.0002).unwrap();
        let report = backtest.run(&mut buyer).unwrap();

        let record = &report.orders[0];
        assert_eq!(record.side, Some(PositionSide::Long));
        assert_eq!(record.exit_reason, Some(ExitReason::TakeProfit));
        assert!((record.profit_loss.unwrap() - 49.69).abs() < EPSILON);
        assert!((record.close_value.unwrap() - 99.69).abs() < EPSILON);
        assert!((report.summary.final_funds - 1049.69).abs() < EPSILON);
        assert!((report.summary.fees - 0.31).abs() < EPSILON);
    }

    #[test]
    fn scenario_futures_stop_loss_and_liquidation() {
        let data = Arc::from_iter(vec![
            candle(0, 99.0, 101.0, 98.0, 100.0)
                .with_signal(Signal::Buy)
                .with_risk(Some(110.0), Some(95.0)),
            candle(1, 100.0, 101.0, 99.0, 100.0)
                .with_signal(Signal::Buy)
                .with_risk(Some(110.0), Some(80.0)),
            // stop-loss of the first order at 95
            candle(2, 100.0, 100.0, 94.0, 96.0),
            // second order stops below its liquidation price of 90
            candle(3, 96.0, 97.0, 89.0, 92.0),
        ]);
        let mut backtest = Backtest::new(data).unwrap();
        let mut buyer = Buyer::futures(1000.0, 50.0, 10.0, 0.0, 0.0).unwrap();
        let report = backtest.run(&mut buyer).unwrap();

        let reasons = report.orders.iter().map(|r| r.exit_reason).collect::<Vec<_>>();
        assert_eq!(reasons, vec![Some(ExitReason::StopLoss), Some(ExitReason::Liquidation)]);
        assert!((report.orders[0].profit_loss.unwrap() + 25.0).abs() < EPSILON);
        assert!((report.orders[1].profit_loss.unwrap() + 50.0).abs() < EPSILON);
        assert_eq!(report.summary.lose_trades, 2);
        assert_eq!(report.summary.max_lose_streak, 2);
        assert!(report.summary.min_trade_rate.abs() < EPSILON);
        assert!((report.summary.max_trade_rate - 0.5).abs() < EPSILON);
        assert!((report.summary.final_funds - 925.0).abs() < EPSILON);
        assert!((report.summary.max_drawdown - 925.0).abs() < EPSILON);
    }

    #[test]
    fn order_error_aborts_run() {
        let data = Arc::from_iter(vec![candle(0, 99.0, 101.0, 98.0, 100.0).with_signal(Signal::Buy)]);
        let mut backtest = Backtest::new(data).unwrap();
        let mut buyer = Buyer::futures(1000.0, 50.0, 10.0, 0.0, 0.0).unwrap();
        assert!(matches!(backtest.run(&mut buyer), Err(Error::MissingExitTarget(_))));
    }

    #[test]
    fn open_orders_are_left_open() {
        let data = Arc::from_iter(vec![
            candle(0, 99.0, 101.0, 98.0, 100.0).with_signal(Signal::Buy),
            candle(1, 100.0, 104.0, 99.0, 103.0),
        ]);
        let mut backtest = Backtest::new(data).unwrap();
        let mut buyer = Buyer::spot(1000.0, 100.0, 0.0).unwrap();
        let report = backtest.run(&mut buyer).unwrap();

        assert!(report.orders.is_empty());
        assert_eq!(report.summary.open_orders, 1);
        assert_eq!(report.summary.final_funds, 1000.0);
        assert!((report.summary.final_equity - 1003.0).abs() < EPSILON);
    }

    #[test]
    fn ids_are_not_reset_between_runs() {
        let mut backtest = Backtest::new(spot_data()).unwrap();
        backtest.run(&mut Buyer::spot(1000.0, 100.0, 0.0).unwrap()).unwrap();
        let report = backtest.run(&mut Buyer::spot(1000.0, 100.0, 0.0).unwrap()).unwrap();
        assert_eq!(report.orders[0].id, 1);
        assert_eq!(backtest.ids().peek(), 2);
    }

    #[test]
    fn evaluate_configs() {
        let backtest = Backtest::new(spot_data()).unwrap();
        let config = BacktestConfig {
            initial_funds: 1000.0,
            buyer: BuyerKind::Spot(SpotConfig {
                trade_value: 200.0,
                commission: 0.0,
            }),
        };
        assert!((backtest.evaluate(&config).unwrap() - 1016.0).abs() < EPSILON);

        let config = BacktestConfig {
            initial_funds: 1000.0,
            buyer: BuyerKind::Futures(FuturesConfig {
                margin: 50.0,
                leverage: 0.0,
                taker_commission: 0.0,
                maker_commission: 0.0,
                risk_reward: None,
            }),
        };
        assert!(matches!(backtest.evaluate(&config), Err(Error::InvalidLeverage(_))));
    }
}
