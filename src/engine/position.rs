#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Direction of a position.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionSide {
    /// Profits when the price goes up.
    Long,
    /// Profits when the price goes down.
    Short,
}

impl PositionSide {
    /// Signed price move in favour of this side.
    pub(crate) fn gain(&self, entry: f64, exit: f64) -> f64 {
        match self {
            Self::Long => exit - entry,
            Self::Short => entry - exit,
        }
    }

    /// True when `price` lies strictly on the losing side of `entry`.
    pub(crate) fn is_losing_side(&self, entry: f64, price: f64) -> bool {
        self.gain(entry, price) < 0.0
    }

    /// Price at which the exchange force-closes a position opened at `entry`.
    ///
    /// Only leverage above 1x can be liquidated.
    pub(crate) fn liquidation_price(&self, entry: f64, leverage: f64) -> Option<f64> {
        if leverage <= 1.0 {
            return None;
        }
        match self {
            Self::Long => Some(entry * (1.0 - 1.0 / leverage)),
            Self::Short => Some(entry * (1.0 + 1.0 / leverage)),
        }
    }
}

/// Why an order was closed.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// Forced close at the liquidation price.
    Liquidation,
    /// Take-profit level reached.
    TakeProfit,
    /// Stop-loss level reached.
    StopLoss,
    /// Closed at the candle close, e.g. on an opposite signal.
    Market,
}

/// A fill decided for an open order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Exit {
    /// Trigger.
    pub reason: ExitReason,
    /// Fill price.
    pub price: f64,
}

impl From<(ExitReason, f64)> for Exit {
    fn from((reason, price): (ExitReason, f64)) -> Self {
        Self { reason, price }
    }
}

#[cfg(test)]
#[test]
fn liquidation_long() {
    assert_eq!(PositionSide::Long.liquidation_price(100.0, 10.0), Some(90.0));
    assert_eq!(PositionSide::Long.liquidation_price(100.0, 2.0), Some(50.0));
}

#[cfg(test)]
#[test]
fn liquidation_short() {
    let price = PositionSide::Short.liquidation_price(100.0, 10.0).unwrap();
    assert!((price - 110.0).abs() < 1e-9);
}

#[cfg(test)]
#[test]
fn no_liquidation_without_leverage() {
    assert_eq!(PositionSide::Long.liquidation_price(100.0, 1.0), None);
    assert_eq!(PositionSide::Short.liquidation_price(100.0, 1.0), None);
}

#[cfg(test)]
#[test]
fn losing_side() {
    assert!(PositionSide::Long.is_losing_side(100.0, 95.0));
    assert!(!PositionSide::Long.is_losing_side(100.0, 105.0));
    assert!(PositionSide::Short.is_losing_side(100.0, 105.0));
    assert!(!PositionSide::Short.is_losing_side(100.0, 100.0));
}
