use chrono::{DateTime, Utc};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

/// Trading signal attached to a candle by the strategy stage.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "i8", into = "i8"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// `+1`
    Buy,
    /// `-1`
    Sell,
    /// `0`
    Hold,
}

impl TryFrom<i8> for Signal {
    type Error = Error;

    fn try_from(value: i8) -> Result<Self> {
        match value {
            1 => Ok(Self::Buy),
            -1 => Ok(Self::Sell),
            0 => Ok(Self::Hold),
            v => Err(Error::Msg(format!("unknown signal {v}"))),
        }
    }
}

impl From<Signal> for i8 {
    fn from(value: Signal) -> Self {
        match value {
            Signal::Buy => 1,
            Signal::Sell => -1,
            Signal::Hold => 0,
        }
    }
}

/// One period of market data as consumed by the buyers.
///
/// Besides OHLC prices, a candle carries what the upstream strategy decided for
/// this period: an optional signal and the optional take-profit / stop-loss
/// levels an order opened on this candle should use.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candle {
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    #[cfg_attr(feature = "serde", serde(alias = "open_time", with = "chrono::serde::ts_milliseconds"))]
    timestamp: DateTime<Utc>,
    #[cfg_attr(feature = "serde", serde(default))]
    signal: Option<Signal>,
    #[cfg_attr(feature = "serde", serde(default))]
    take_profit: Option<f64>,
    #[cfg_attr(feature = "serde", serde(default))]
    stop_loss: Option<f64>,
}

impl Candle {
    /// Returns the open price.
    pub fn open(&self) -> f64 {
        self.open
    }

    /// Returns the high price.
    pub fn high(&self) -> f64 {
        self.high
    }

    /// Returns the low price.
    pub fn low(&self) -> f64 {
        self.low
    }

    /// Returns the close price.
    pub fn close(&self) -> f64 {
        self.close
    }

    /// Returns the candle timestamp.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Returns the trading signal, if any.
    pub fn signal(&self) -> Option<Signal> {
        self.signal
    }

    /// Returns the take-profit price proposed for orders opened on this candle.
    pub fn take_profit(&self) -> Option<f64> {
        self.take_profit
    }

    /// Returns the stop-loss price proposed for orders opened on this candle.
    pub fn stop_loss(&self) -> Option<f64> {
        self.stop_loss
    }

    /// Checks that prices and risk levels are positive and the range contains open and close.
    pub(crate) fn validate(&self) -> Result<()> {
        let Self { open, high, low, close, .. } = *self;
        for price in [open, high, low, close] {
            if price <= 0.0 || !price.is_finite() {
                return Err(Error::InvalidPrice(price));
            }
        }
        if high < open.max(close) || low > open.min(close) {
            return Err(Error::InvalidCandle { open, high, low, close });
        }
        for level in [self.take_profit, self.stop_loss].into_iter().flatten() {
            if level <= 0.0 || !level.is_finite() {
                return Err(Error::InvalidPrice(level));
            }
        }
        Ok(())
    }

    /// Returns a copy of this candle carrying `signal`.
    pub fn with_signal(mut self, signal: Signal) -> Self {
        self.signal = Some(signal);
        self
    }

    /// Returns a copy of this candle with new risk levels.
    pub fn with_risk(mut self, take_profit: Option<f64>, stop_loss: Option<f64>) -> Self {
        self.take_profit = take_profit;
        self.stop_loss = stop_loss;
        self
    }
}

/// Builder for [`Candle`].
#[derive(Debug, Default)]
pub struct CandleBuilder {
    open: Option<f64>,
    high: Option<f64>,
    low: Option<f64>,
    close: Option<f64>,
    timestamp: Option<DateTime<Utc>>,
    signal: Option<Signal>,
    take_profit: Option<f64>,
    stop_loss: Option<f64>,
}

impl CandleBuilder {
    /// Starts an empty builder.
    pub fn builder() -> Self {
        Self::default()
    }

    /// Sets the open price.
    pub fn open(mut self, open: f64) -> Self {
        self.open = Some(open);
        self
    }

    /// Sets the high price.
    pub fn high(mut self, high: f64) -> Self {
        self.high = Some(high);
        self
    }

    /// Sets the low price.
    pub fn low(mut self, low: f64) -> Self {
        self.low = Some(low);
        self
    }

    /// Sets the close price.
    pub fn close(mut self, close: f64) -> Self {
        self.close = Some(close);
        self
    }

    /// Sets the timestamp.
    pub fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Sets the signal.
    pub fn signal(mut self, signal: Signal) -> Self {
        self.signal = Some(signal);
        self
    }

    /// Sets the take-profit price.
    pub fn take_profit(mut self, price: f64) -> Self {
        self.take_profit = Some(price);
        self
    }

    /// Sets the stop-loss price.
    pub fn stop_loss(mut self, price: f64) -> Self {
        self.stop_loss = Some(price);
        self
    }

    /// Validates the fields and builds the candle.
    pub fn build(self) -> Result<Candle> {
        let open = self.open.ok_or(Error::MissingCandleField("open"))?;
        let high = self.high.ok_or(Error::MissingCandleField("high"))?;
        let low = self.low.ok_or(Error::MissingCandleField("low"))?;
        let close = self.close.ok_or(Error::MissingCandleField("close"))?;
        let timestamp = self.timestamp.ok_or(Error::MissingCandleField("timestamp"))?;

        let candle = Candle {
            open,
            high,
            low,
            close,
            timestamp,
            signal: self.signal,
            take_profit: self.take_profit,
            stop_loss: self.stop_loss,
        };
        candle.validate()?;
        Ok(candle)
    }
}
