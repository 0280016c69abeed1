use backtrade::PercentCalculus;
use backtrade::engine::{Candle, CandleBuilder, Signal};
use chrono::{DateTime, Duration};
use ta::Next;
use ta::indicators::ExponentialMovingAverage;

/// Generates deterministic candle data.
pub fn generate_sample_candles(max: i32, seed: i32, base_price: f64) -> Vec<Candle> {
    let mut timestamp = DateTime::default();
    let mut open = base_price;

    (0..=max)
        .map(|i| {
            // Base price with trend (+ 0.05*i)
            let base_price = base_price + 0.05 * (i as f64);

            // Price variation using simple trigonometric function with seed
            let variation = 8.0 * ((i as f64 * 0.07 + seed as f64).sin() * 0.5 + 0.5);

            let close = base_price + variation + ((i as f64 * 1.3).cos() * 0.8);
            let high = open.max(close) + 0.3 * variation.abs();
            let low = open.min(close) - 0.3 * variation.abs();

            let candle = CandleBuilder::builder()
                .open(open)
                .high(high)
                .low(low)
                .close(close)
                .timestamp(timestamp)
                .build()
                .unwrap();

            timestamp += Duration::hours(1);
            open = close;
            candle
        })
        .collect()
}

pub fn example_candles() -> Vec<Candle> {
    generate_sample_candles(3000, 42, 100.0)
}

/// Labels candles with EMA crossovers: buy when the fast average crosses above the slow one,
/// sell when it crosses below.
pub fn ema_cross(candles: &[Candle], fast: usize, slow: usize) -> anyhow::Result<Vec<Candle>> {
    let mut fast = ExponentialMovingAverage::new(fast)?;
    let mut slow = ExponentialMovingAverage::new(slow)?;
    let mut above = None;

    Ok(candles
        .iter()
        .map(|candle| {
            let is_above = fast.next(candle.close()) > slow.next(candle.close());
            let signal = match above.replace(is_above) {
                Some(false) if is_above => Signal::Buy,
                Some(true) if !is_above => Signal::Sell,
                _ => Signal::Hold,
            };
            candle.with_signal(signal)
        })
        .collect())
}

/// Adds a stop-loss `percent` away from the close of every signalled candle.
#[allow(dead_code)]
pub fn with_stop_loss(candles: Vec<Candle>, percent: f64) -> Vec<Candle> {
    candles
        .into_iter()
        .map(|candle| match candle.signal() {
            Some(Signal::Buy) => candle.with_risk(None, Some(candle.close().subpercent(percent))),
            Some(Signal::Sell) => candle.with_risk(None, Some(candle.close().addpercent(percent))),
            _ => candle,
        })
        .collect()
}
