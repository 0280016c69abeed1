//! Buyer and backtest configuration.
//!
//! With the `serde` feature the types deserialize from any serde format; the
//! `cli` feature adds [`BacktestConfig::from_file`] for TOML files such as:
//!
//! ```toml
//! initial_funds = 1000.0
//!
//! [buyer]
//! kind = "futures"
//! margin = 50.0
//! leverage = 10.0
//! taker_commission = 0.0004
//! maker_commission = 0.0002
//! risk_reward = 2.0
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

/// Terms of a spot buyer.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpotConfig {
    /// Value committed by every order.
    pub trade_value: f64,
    /// Fraction charged on each leg (e.g. `0.001` for 0.1%).
    pub commission: f64,
}

/// Terms of a futures buyer.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FuturesConfig {
    /// Margin committed by every order.
    pub margin: f64,
    /// Position size multiplier over the margin.
    pub leverage: f64,
    /// Fraction charged on the entry notional.
    pub taker_commission: f64,
    /// Fraction charged on the exit notional.
    pub maker_commission: f64,
    /// Reward/risk ratio deriving the take-profit of candles that only carry a stop-loss.
    #[cfg_attr(feature = "serde", serde(default))]
    pub risk_reward: Option<f64>,
}

/// Market a buyer trades on.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BuyerKind {
    /// One unleveraged long position at a time.
    Spot(SpotConfig),
    /// Any number of leveraged positions, long or short.
    Futures(FuturesConfig),
}

fn check_commission(commission: f64) -> Result<()> {
    if !(0.0..1.0).contains(&commission) {
        return Err(Error::InvalidCommission(commission));
    }
    Ok(())
}

impl BuyerKind {
    /// Checks every term, failing on the first invalid one.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Spot(SpotConfig { trade_value, commission }) => {
                if *trade_value <= 0.0 || !trade_value.is_finite() {
                    return Err(Error::NegZeroValue(*trade_value));
                }
                check_commission(*commission)
            }
            Self::Futures(FuturesConfig {
                margin,
                leverage,
                taker_commission,
                maker_commission,
                risk_reward,
            }) => {
                if *margin <= 0.0 || !margin.is_finite() {
                    return Err(Error::NegZeroValue(*margin));
                }
                if *leverage < 1.0 || !leverage.is_finite() {
                    return Err(Error::InvalidLeverage(*leverage));
                }
                check_commission(*taker_commission)?;
                check_commission(*maker_commission)?;
                if let Some(ratio) = risk_reward
                    && (*ratio <= 0.0 || !ratio.is_finite())
                {
                    return Err(Error::InvalidRiskConfiguration(format!(
                        "risk/reward ratio must be positive, got {ratio}"
                    )));
                }
                Ok(())
            }
        }
    }

    /// Value committed by one order.
    pub fn order_value(&self) -> f64 {
        match self {
            Self::Spot(config) => config.trade_value,
            Self::Futures(config) => config.margin,
        }
    }
}

/// Everything needed to replay a candle series with a fresh buyer.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BacktestConfig {
    /// Starting funds of the buyer.
    pub initial_funds: f64,
    /// Buyer terms.
    pub buyer: BuyerKind,
}

impl BacktestConfig {
    /// Reads a configuration from a TOML file.
    #[cfg(feature = "cli")]
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }
}
