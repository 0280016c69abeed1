use chrono::{DateTime, Utc};
use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::engine::{Candle, Exit, ExitReason, PositionSide};
use crate::errors::{Error, Result};

/// Identifier allocated by an [`IdSequence`](crate::engine::IdSequence).
pub type OrderId = u64;

/// Lifecycle status of an order.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    /// Created, not opened yet.
    Pending,
    /// Position is live.
    Open,
    /// Position was closed and its P&L realized.
    Closed,
    /// Cancelled before being opened.
    Cancelled,
}

/// Market the order trades on, with the terms copied from the buyer.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OrderKind {
    /// Unleveraged long-only order, charged `commission` on both legs.
    Spot {
        /// Fraction charged per leg.
        commission: f64,
    },
    /// Leveraged order on margin.
    Futures {
        /// Position size multiplier over the margin.
        leverage: f64,
        /// Fraction charged on the entry notional.
        taker_commission: f64,
        /// Fraction charged on the exit notional.
        maker_commission: f64,
    },
}

impl OrderKind {
    fn leverage(&self) -> f64 {
        match self {
            Self::Spot { .. } => 1.0,
            Self::Futures { leverage, .. } => *leverage,
        }
    }
}

/// Parameters to open an order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Entry {
    price: f64,
    value: f64,
    date: DateTime<Utc>,
    side: PositionSide,
    stop_loss: Option<f64>,
    take_profit: Option<f64>,
    risk_reward: Option<f64>,
}

impl Entry {
    /// Entry at `price` committing `value` (margin for futures) on `side`.
    pub fn new(price: f64, value: f64, date: DateTime<Utc>, side: PositionSide) -> Self {
        Self {
            price,
            value,
            date,
            side,
            stop_loss: None,
            take_profit: None,
            risk_reward: None,
        }
    }

    /// Sets the stop-loss price.
    pub fn stop_loss(mut self, price: Option<f64>) -> Self {
        self.stop_loss = price;
        self
    }

    /// Sets the take-profit price.
    pub fn take_profit(mut self, price: Option<f64>) -> Self {
        self.take_profit = price;
        self
    }

    /// Sets the reward/risk ratio used to derive a missing take-profit from the stop-loss.
    pub fn risk_reward(mut self, ratio: Option<f64>) -> Self {
        self.risk_reward = ratio;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Opened {
    price: f64,
    value: f64,
    position_size: f64,
    date: DateTime<Utc>,
    side: PositionSide,
    stop_loss: Option<f64>,
    take_profit: Option<f64>,
    liquidation_price: Option<f64>,
}

impl Opened {
    fn units(&self) -> f64 {
        self.position_size / self.price
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Closed {
    price: f64,
    value: f64,
    date: DateTime<Utc>,
    profit_loss: f64,
    trade_rate: f64,
    entry_commission: f64,
    exit_commission: f64,
    reason: ExitReason,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Lifecycle {
    Pending,
    Open(Opened),
    Closed(Opened, Closed),
    Cancelled,
}

/// One position from open to close.
#[derive(Debug, Clone)]
pub struct Order {
    id: OrderId,
    kind: OrderKind,
    lifecycle: Lifecycle,
}

impl PartialEq for Order {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Order {
    /// Creates a pending order.
    pub fn new(id: OrderId, kind: OrderKind) -> Self {
        Self {
            id,
            kind,
            lifecycle: Lifecycle::Pending,
        }
    }

    /// Returns the order id.
    pub fn id(&self) -> OrderId {
        self.id
    }

    /// Returns the order kind.
    pub fn kind(&self) -> &OrderKind {
        &self.kind
    }

    /// Returns the current status.
    pub fn status(&self) -> OrderStatus {
        match self.lifecycle {
            Lifecycle::Pending => OrderStatus::Pending,
            Lifecycle::Open(_) => OrderStatus::Open,
            Lifecycle::Closed(..) => OrderStatus::Closed,
            Lifecycle::Cancelled => OrderStatus::Cancelled,
        }
    }

    /// True while the position is live.
    pub fn is_open(&self) -> bool {
        matches!(self.lifecycle, Lifecycle::Open(_))
    }

    fn opened(&self) -> Option<&Opened> {
        match &self.lifecycle {
            Lifecycle::Open(opened) | Lifecycle::Closed(opened, _) => Some(opened),
            _ => None,
        }
    }

    fn closed(&self) -> Option<&Closed> {
        match &self.lifecycle {
            Lifecycle::Closed(_, closed) => Some(closed),
            _ => None,
        }
    }

    fn invalid_state(&self, action: &'static str) -> Error {
        Error::InvalidOrderState {
            id: self.id,
            status: self.status(),
            action,
        }
    }

    /// Returns the side, once opened.
    pub fn side(&self) -> Option<PositionSide> {
        self.opened().map(|o| o.side)
    }

    /// Returns the entry price.
    pub fn open_price(&self) -> Option<f64> {
        self.opened().map(|o| o.price)
    }

    /// Returns the committed value (margin for futures).
    pub fn open_value(&self) -> Option<f64> {
        self.opened().map(|o| o.value)
    }

    /// Returns the notional traded.
    pub fn position_size(&self) -> Option<f64> {
        self.opened().map(|o| o.position_size)
    }

    /// Returns the open date.
    pub fn open_date(&self) -> Option<DateTime<Utc>> {
        self.opened().map(|o| o.date)
    }

    /// Returns the stop-loss price.
    pub fn stop_loss(&self) -> Option<f64> {
        self.opened().and_then(|o| o.stop_loss)
    }

    /// Returns the take-profit price, given or derived.
    pub fn take_profit(&self) -> Option<f64> {
        self.opened().and_then(|o| o.take_profit)
    }

    /// Returns the liquidation price of a leveraged position.
    pub fn liquidation_price(&self) -> Option<f64> {
        self.opened().and_then(|o| o.liquidation_price)
    }

    /// Returns the fill price of the close.
    pub fn close_price(&self) -> Option<f64> {
        self.closed().map(|c| c.price)
    }

    /// Returns the value given back to the account on close.
    pub fn close_value(&self) -> Option<f64> {
        self.closed().map(|c| c.value)
    }

    /// Returns the close date.
    pub fn close_date(&self) -> Option<DateTime<Utc>> {
        self.closed().map(|c| c.date)
    }

    /// Returns the realized profit/loss, net of commissions.
    pub fn profit_loss(&self) -> Option<f64> {
        self.closed().map(|c| c.profit_loss)
    }

    /// Returns `close_value / open_value`.
    pub fn trade_rate(&self) -> Option<f64> {
        self.closed().map(|c| c.trade_rate)
    }

    /// Returns the commissions paid on both legs.
    pub fn commissions(&self) -> Option<f64> {
        self.closed().map(|c| c.entry_commission + c.exit_commission)
    }

    /// Returns the close trigger.
    pub fn exit_reason(&self) -> Option<ExitReason> {
        self.closed().map(|c| c.reason)
    }

    /// Opens the position.
    ///
    /// ### Errors
    /// - [`Error::InvalidOrderState`] unless the order is pending.
    /// - [`Error::InvalidRiskConfiguration`] when the stop-loss is not on the losing side,
    ///   the take-profit is not on the winning side, or a spot order is opened short.
    /// - [`Error::MissingExitTarget`] when a futures order has no take-profit and
    ///   none can be derived from the risk/reward ratio.
    pub fn open(&mut self, entry: Entry) -> Result<()> {
        if !matches!(self.lifecycle, Lifecycle::Pending) {
            return Err(self.invalid_state("open"));
        }
        if entry.price <= 0.0 || !entry.price.is_finite() {
            return Err(Error::InvalidPrice(entry.price));
        }
        if entry.value <= 0.0 || !entry.value.is_finite() {
            return Err(Error::NegZeroValue(entry.value));
        }

        let side = entry.side;
        let position_size = match self.kind {
            OrderKind::Spot { commission } => {
                if side == PositionSide::Short {
                    return Err(Error::InvalidRiskConfiguration(format!(
                        "spot order {} cannot be opened short",
                        self.id
                    )));
                }
                entry.value * (1.0 - commission)
            }
            OrderKind::Futures { leverage, .. } => {
                if leverage < 1.0 || !leverage.is_finite() {
                    return Err(Error::InvalidLeverage(leverage));
                }
                entry.value * leverage
            }
        };

        if let Some(stop_loss) = entry.stop_loss
            && (!stop_loss.is_finite() || stop_loss <= 0.0 || !side.is_losing_side(entry.price, stop_loss))
        {
            return Err(Error::InvalidRiskConfiguration(format!(
                "{side:?} stop-loss {stop_loss} must be on the losing side of {}",
                entry.price
            )));
        }

        let take_profit = match (entry.take_profit, entry.stop_loss, entry.risk_reward) {
            (Some(take_profit), ..) => Some(take_profit),
            (None, Some(stop_loss), Some(ratio)) if ratio > 0.0 => {
                let reward = ratio * (entry.price - stop_loss).abs();
                match side {
                    PositionSide::Long => Some(entry.price + reward),
                    PositionSide::Short => Some(entry.price - reward),
                }
            }
            _ => None,
        };
        if let Some(take_profit) = take_profit
            && (!take_profit.is_finite() || take_profit <= 0.0 || side.gain(entry.price, take_profit) <= 0.0)
        {
            return Err(Error::InvalidRiskConfiguration(format!(
                "{side:?} take-profit {take_profit} must be on the winning side of {}",
                entry.price
            )));
        }
        if take_profit.is_none() && matches!(self.kind, OrderKind::Futures { .. }) {
            return Err(Error::MissingExitTarget(self.id));
        }

        let opened = Opened {
            side,
            take_profit,
            position_size,
            price: entry.price,
            value: entry.value,
            date: entry.date,
            stop_loss: entry.stop_loss,
            liquidation_price: side.liquidation_price(entry.price, self.kind.leverage()),
        };
        debug!(
            "open {side:?} order {}: price {} value {} size {} leverage {}x",
            self.id,
            opened.price,
            opened.value,
            opened.position_size,
            self.kind.leverage()
        );
        self.lifecycle = Lifecycle::Open(opened);
        Ok(())
    }

    /// Checks the exit rules of an open order against a candle.
    ///
    /// Liquidation is checked first, then take-profit, then stop-loss.
    /// Returns `None` for orders that are not open or when nothing triggers.
    pub fn evaluate_close_conditions(&self, candle: &Candle) -> Option<Exit> {
        let Lifecycle::Open(opened) = &self.lifecycle else {
            return None;
        };
        let (high, low) = (candle.high(), candle.low());

        let against = |level: f64| match opened.side {
            PositionSide::Long => low <= level,
            PositionSide::Short => high >= level,
        };
        let along = |level: f64| match opened.side {
            PositionSide::Long => high >= level,
            PositionSide::Short => low <= level,
        };

        if let Some(price) = opened.liquidation_price
            && against(price)
        {
            return Some((ExitReason::Liquidation, price).into());
        }
        if let Some(price) = opened.take_profit
            && along(price)
        {
            return Some((ExitReason::TakeProfit, price).into());
        }
        if let Some(price) = opened.stop_loss
            && against(price)
        {
            return Some((ExitReason::StopLoss, price).into());
        }
        None
    }

    /// True when [`Self::evaluate_close_conditions`] triggers.
    pub fn should_close(&self, candle: &Candle) -> bool {
        self.evaluate_close_conditions(candle).is_some()
    }

    /// Closes the position on `candle` and returns the realized profit/loss.
    ///
    /// The fill follows [`Self::evaluate_close_conditions`], or the candle close when no
    /// exit rule triggers.
    pub fn close(&mut self, candle: &Candle) -> Result<f64> {
        let exit = self
            .evaluate_close_conditions(candle)
            .unwrap_or((ExitReason::Market, candle.close()).into());
        self.settle(exit, candle.timestamp())
    }

    fn settle(&mut self, exit: Exit, date: DateTime<Utc>) -> Result<f64> {
        let Lifecycle::Open(opened) = self.lifecycle else {
            return Err(self.invalid_state("close"));
        };
        if exit.price <= 0.0 || !exit.price.is_finite() {
            return Err(Error::InvalidPrice(exit.price));
        }

        let units = opened.units();
        let (value, entry_commission, exit_commission) = match self.kind {
            OrderKind::Spot { commission } => {
                let price_rate = exit.price / opened.price;
                let value = opened.value * price_rate * (1.0 - commission).powi(2);
                (value, opened.value * commission, units * exit.price * commission)
            }
            OrderKind::Futures {
                taker_commission,
                maker_commission,
                ..
            } => {
                let gross = units * opened.side.gain(opened.price, exit.price);
                let entry_commission = opened.position_size * taker_commission;
                let exit_commission = units * exit.price * maker_commission;
                let value = opened.value + gross - entry_commission - exit_commission;
                (value, entry_commission, exit_commission)
            }
        };
        let profit_loss = value - opened.value;

        let closed = Closed {
            value,
            date,
            profit_loss,
            entry_commission,
            exit_commission,
            price: exit.price,
            reason: exit.reason,
            trade_rate: 1.0 + profit_loss / opened.value,
        };
        debug!(
            "close {:?} order {} ({:?}): price {} value {:.2} pnl {:.2}",
            opened.side, self.id, exit.reason, exit.price, value, profit_loss
        );
        self.lifecycle = Lifecycle::Closed(opened, closed);
        Ok(profit_loss)
    }

    /// Cancels a pending order.
    pub fn cancel(&mut self) -> Result<()> {
        if !matches!(self.lifecycle, Lifecycle::Pending) {
            return Err(self.invalid_state("cancel"));
        }
        debug!("cancel order {}", self.id);
        self.lifecycle = Lifecycle::Cancelled;
        Ok(())
    }

    /// Estimated profit/loss if the position were closed at `price`.
    ///
    /// Closed orders return their realized profit/loss, pending and cancelled ones zero.
    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        match &self.lifecycle {
            Lifecycle::Open(opened) => match self.kind {
                OrderKind::Spot { commission } => {
                    opened.position_size * (price / opened.price) * (1.0 - commission) - opened.value
                }
                OrderKind::Futures {
                    taker_commission,
                    maker_commission,
                    ..
                } => {
                    let gross = opened.units() * opened.side.gain(opened.price, price);
                    gross - opened.position_size * (taker_commission + maker_commission)
                }
            },
            Lifecycle::Closed(_, closed) => closed.profit_loss,
            _ => 0.0,
        }
    }

    /// Flattens the order into a record.
    pub fn to_record(&self) -> OrderRecord {
        let opened = self.opened();
        let closed = self.closed();
        let (leverage, taker_commission, maker_commission) = match self.kind {
            OrderKind::Spot { commission } => (1.0, commission, commission),
            OrderKind::Futures {
                leverage,
                taker_commission,
                maker_commission,
            } => (leverage, taker_commission, maker_commission),
        };

        OrderRecord {
            id: self.id,
            leverage,
            taker_commission,
            maker_commission,
            status: self.status(),
            futures: matches!(self.kind, OrderKind::Futures { .. }),
            side: opened.map(|o| o.side),
            open_price: opened.map(|o| o.price),
            open_value: opened.map(|o| o.value),
            position_size: opened.map(|o| o.position_size),
            open_date: opened.map(|o| o.date),
            stop_loss: opened.and_then(|o| o.stop_loss),
            take_profit: opened.and_then(|o| o.take_profit),
            liquidation_price: opened.and_then(|o| o.liquidation_price),
            close_price: closed.map(|c| c.price),
            close_value: closed.map(|c| c.value),
            close_date: closed.map(|c| c.date),
            profit_loss: closed.map(|c| c.profit_loss),
            trade_rate: closed.map(|c| c.trade_rate),
            commissions: closed.map(|c| c.entry_commission + c.exit_commission),
            exit_reason: closed.map(|c| c.reason),
        }
    }
}

/// Flat view of an order, as kept in the buyer's history.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRecord {
    /// Order id.
    pub id: OrderId,
    /// Status when the record was taken.
    pub status: OrderStatus,
    /// True for a leveraged order.
    pub futures: bool,
    /// Position side.
    pub side: Option<PositionSide>,
    /// Leverage, 1 for spot orders.
    pub leverage: f64,
    /// Entry commission rate.
    pub taker_commission: f64,
    /// Exit commission rate.
    pub maker_commission: f64,
    /// Entry price.
    pub open_price: Option<f64>,
    /// Committed value.
    pub open_value: Option<f64>,
    /// Notional traded.
    pub position_size: Option<f64>,
    /// Open date.
    pub open_date: Option<DateTime<Utc>>,
    /// Stop-loss price.
    pub stop_loss: Option<f64>,
    /// Take-profit price.
    pub take_profit: Option<f64>,
    /// Liquidation price.
    pub liquidation_price: Option<f64>,
    /// Fill price of the close.
    pub close_price: Option<f64>,
    /// Value returned on close.
    pub close_value: Option<f64>,
    /// Close date.
    pub close_date: Option<DateTime<Utc>>,
    /// Realized profit/loss.
    pub profit_loss: Option<f64>,
    /// `close_value / open_value`.
    pub trade_rate: Option<f64>,
    /// Commissions paid on both legs.
    pub commissions: Option<f64>,
    /// Close trigger.
    pub exit_reason: Option<ExitReason>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::CandleBuilder;

    const EPSILON: f64 = 1e-9;

    fn futures(leverage: f64) -> Order {
        Order::new(
            1,
            OrderKind::Futures {
                leverage,
                taker_commission: 0.0004,
                maker_commission: 0.0002,
            },
        )
    }

    fn candle(high: f64, low: f64, close: f64) -> Candle {
        CandleBuilder::builder()
            .open(close)
            .high(high)
            .low(low)
            .close(close)
            .timestamp(DateTime::from_timestamp(1_700_000_000, 0).unwrap())
            .build()
            .unwrap()
    }

    fn long_entry() -> Entry {
        Entry::new(100.0, 50.0, DateTime::default(), PositionSide::Long)
            .stop_loss(Some(95.0))
            .take_profit(Some(110.0))
    }

    #[test]
    fn open_futures_long() {
        let mut order = futures(10.0);
        assert_eq!(order.status(), OrderStatus::Pending);
        order.open(long_entry()).unwrap();

        assert_eq!(order.status(), OrderStatus::Open);
        assert_eq!(order.position_size(), Some(500.0));
        assert!((order.liquidation_price().unwrap() - 90.0).abs() < EPSILON);
        assert!(order.close_price().is_none());
    }

    #[test]
    fn open_twice() {
        let mut order = futures(10.0);
        order.open(long_entry()).unwrap();
        let result = order.open(long_entry());
        assert!(matches!(
            result,
            Err(Error::InvalidOrderState {
                status: OrderStatus::Open,
                action: "open",
                ..
            })
        ));
    }

    #[test]
    fn stop_loss_on_winning_side() {
        let mut order = futures(10.0);
        let result = order.open(long_entry().stop_loss(Some(101.0)));
        assert!(matches!(result, Err(Error::InvalidRiskConfiguration(_))));
        assert_eq!(order.status(), OrderStatus::Pending);

        let entry = Entry::new(100.0, 50.0, DateTime::default(), PositionSide::Short)
            .stop_loss(Some(99.0))
            .take_profit(Some(90.0));
        let result = futures(10.0).open(entry);
        assert!(matches!(result, Err(Error::InvalidRiskConfiguration(_))));
    }

    #[test]
    fn take_profit_on_losing_side() {
        let mut order = futures(10.0);
        let result = order.open(long_entry().take_profit(Some(90.0)));
        assert!(matches!(result, Err(Error::InvalidRiskConfiguration(_))));
    }

    #[test]
    fn non_finite_risk_levels() {
        for level in [f64::NAN, f64::INFINITY] {
            let mut order = futures(10.0);
            let result = order.open(long_entry().take_profit(Some(level)));
            assert!(matches!(result, Err(Error::InvalidRiskConfiguration(_))));
            assert_eq!(order.status(), OrderStatus::Pending);

            let result = futures(10.0).open(long_entry().stop_loss(Some(level)));
            assert!(matches!(result, Err(Error::InvalidRiskConfiguration(_))));
        }

        let derived = long_entry().take_profit(None).risk_reward(Some(f64::INFINITY));
        assert!(matches!(futures(10.0).open(derived), Err(Error::InvalidRiskConfiguration(_))));
    }

    #[test]
    fn missing_take_profit() {
        let mut order = futures(10.0);
        let result = order.open(long_entry().take_profit(None));
        assert!(matches!(result, Err(Error::MissingExitTarget(1))));
    }

    #[test]
    fn take_profit_from_risk_reward() {
        let mut long = futures(10.0);
        long.open(long_entry().take_profit(None).risk_reward(Some(2.0))).unwrap();
        assert!((long.take_profit().unwrap() - 110.0).abs() < EPSILON);

        let entry = Entry::new(100.0, 50.0, DateTime::default(), PositionSide::Short)
            .stop_loss(Some(105.0))
            .risk_reward(Some(3.0));
        let mut short = futures(10.0);
        short.open(entry).unwrap();
        assert!((short.take_profit().unwrap() - 85.0).abs() < EPSILON);
    }

    #[test]
    fn leverage_below_one() {
        let mut order = futures(0.5);
        assert!(matches!(order.open(long_entry()), Err(Error::InvalidLeverage(_))));
    }

    #[test]
    fn spot_cannot_short() {
        let mut order = Order::new(2, OrderKind::Spot { commission: 0.001 });
        let entry = Entry::new(100.0, 50.0, DateTime::default(), PositionSide::Short);
        assert!(matches!(order.open(entry), Err(Error::InvalidRiskConfiguration(_))));
    }

    #[test]
    fn close_at_take_profit_before_stop_loss() {
        let mut order = futures(10.0);
        order.open(long_entry()).unwrap();

        let candle = candle(111.0, 99.0, 105.0);
        let exit = order.evaluate_close_conditions(&candle).unwrap();
        assert_eq!(exit.reason, ExitReason::TakeProfit);

        let pnl = order.close(&candle).unwrap();
        // units 5, gross 50, commissions 0.2 + 0.11
        assert!((pnl - 49.69).abs() < EPSILON);
        assert!((order.close_value().unwrap() - 99.69).abs() < EPSILON);
        assert!((order.commissions().unwrap() - 0.31).abs() < EPSILON);
        assert!((order.trade_rate().unwrap() - (1.0 + 49.69 / 50.0)).abs() < EPSILON);
        assert_eq!(order.close_price(), Some(110.0));
        assert_eq!(order.status(), OrderStatus::Closed);
    }

    #[test]
    fn stop_loss_when_above_liquidation() {
        let mut order = futures(10.0);
        order.open(long_entry()).unwrap();

        let candle = candle(100.0, 94.0, 96.0);
        let exit = order.evaluate_close_conditions(&candle).unwrap();
        assert_eq!(exit, (ExitReason::StopLoss, 95.0).into());

        order.close(&candle).unwrap();
        assert_eq!(order.close_price(), Some(95.0));
        assert_eq!(order.exit_reason(), Some(ExitReason::StopLoss));
    }

    #[test]
    fn liquidation_overrides_take_profit() {
        let mut order = futures(10.0);
        order.open(long_entry()).unwrap();

        // both the take-profit and the liquidation price are inside the candle
        let candle = candle(115.0, 89.0, 100.0);
        let exit = order.evaluate_close_conditions(&candle).unwrap();
        assert_eq!(exit.reason, ExitReason::Liquidation);
        assert!((exit.price - 90.0).abs() < EPSILON);

        order.close(&candle).unwrap();
        assert_eq!(order.exit_reason(), Some(ExitReason::Liquidation));
    }

    #[test]
    fn short_exit_rules() {
        let entry = Entry::new(100.0, 50.0, DateTime::default(), PositionSide::Short)
            .stop_loss(Some(105.0))
            .take_profit(Some(90.0));

        let mut order = futures(10.0);
        order.open(entry).unwrap();
        assert!(order.evaluate_close_conditions(&candle(104.0, 91.0, 100.0)).is_none());
        assert_eq!(
            order.evaluate_close_conditions(&candle(104.0, 89.0, 95.0)).unwrap().reason,
            ExitReason::TakeProfit
        );
        assert_eq!(
            order.evaluate_close_conditions(&candle(106.0, 95.0, 100.0)).unwrap().reason,
            ExitReason::StopLoss
        );
        assert_eq!(
            order.evaluate_close_conditions(&candle(111.0, 89.0, 100.0)).unwrap().reason,
            ExitReason::Liquidation
        );

        // short gains when the price falls
        let pnl = order.close(&candle(104.0, 89.0, 95.0)).unwrap();
        let expected = 5.0 * 10.0 - 500.0 * 0.0004 - 5.0 * 90.0 * 0.0002;
        assert!((pnl - expected).abs() < EPSILON);
    }

    #[test]
    fn close_at_market_without_trigger() {
        let mut order = futures(10.0);
        order.open(long_entry()).unwrap();
        order.close(&candle(104.0, 98.0, 102.0)).unwrap();
        assert_eq!(order.close_price(), Some(102.0));
        assert_eq!(order.exit_reason(), Some(ExitReason::Market));
    }

    #[test]
    fn futures_round_trip_costs_commissions() {
        let mut order = futures(10.0);
        order.open(long_entry()).unwrap();
        let pnl = order.close(&candle(100.0, 100.0, 100.0)).unwrap();
        let commissions = 500.0 * 0.0004 + 5.0 * 100.0 * 0.0002;
        assert!((pnl + commissions).abs() < EPSILON);
        assert!((order.commissions().unwrap() - commissions).abs() < EPSILON);
    }

    #[test]
    fn spot_round_trip_costs_commissions() {
        let commission = 0.001;
        let mut order = Order::new(3, OrderKind::Spot { commission });
        order
            .open(Entry::new(100.0, 1000.0, DateTime::default(), PositionSide::Long))
            .unwrap();
        let pnl = order.close(&candle(100.0, 100.0, 100.0)).unwrap();

        let commissions = order.commissions().unwrap();
        assert!((pnl + commissions).abs() < EPSILON);
        assert!((order.close_value().unwrap() - 1000.0 * (1.0 - commission).powi(2)).abs() < EPSILON);
    }

    #[test]
    fn spot_squared_commission() {
        let commission = 0.01;
        let mut order = Order::new(4, OrderKind::Spot { commission });
        order
            .open(Entry::new(100.0, 100.0, DateTime::default(), PositionSide::Long))
            .unwrap();
        order.close(&candle(121.0, 119.0, 120.0)).unwrap();

        let expected = 100.0 * 1.2 * 0.99 * 0.99;
        assert!((order.close_value().unwrap() - expected).abs() < EPSILON);
        assert!((order.trade_rate().unwrap() - expected / 100.0).abs() < EPSILON);
    }

    #[test]
    fn deep_loss_gives_negative_trade_rate() {
        let mut order = Order::new(
            5,
            OrderKind::Futures {
                leverage: 10.0,
                taker_commission: 0.0,
                maker_commission: 0.0,
            },
        );
        let entry = Entry::new(100.0, 50.0, DateTime::default(), PositionSide::Short).take_profit(Some(50.0));
        order.open(entry).unwrap();
        // short liquidation is at 110, fill there; loss is the whole margin
        order.close(&candle(130.0, 100.0, 125.0)).unwrap();
        assert!(order.trade_rate().unwrap().abs() < EPSILON);

        let mut order = Order::new(
            6,
            OrderKind::Futures {
                leverage: 1.0,
                taker_commission: 0.0,
                maker_commission: 0.0,
            },
        );
        let entry = Entry::new(100.0, 50.0, DateTime::default(), PositionSide::Short).take_profit(Some(50.0));
        order.open(entry).unwrap();
        assert_eq!(order.liquidation_price(), None);
        // price triples against an unleveraged short: rate 1 - 2 = -1
        order.close(&candle(300.0, 250.0, 300.0)).unwrap();
        assert!((order.trade_rate().unwrap() + 1.0).abs() < EPSILON);
        assert!((order.profit_loss().unwrap() + 100.0).abs() < EPSILON);
    }

    #[test]
    fn close_not_open() {
        let mut order = futures(10.0);
        let result = order.close(&candle(100.0, 100.0, 100.0));
        assert!(matches!(
            result,
            Err(Error::InvalidOrderState {
                status: OrderStatus::Pending,
                action: "close",
                ..
            })
        ));

        order.open(long_entry()).unwrap();
        order.close(&candle(100.0, 100.0, 100.0)).unwrap();
        let value = order.close_value();
        assert!(order.close(&candle(120.0, 100.0, 120.0)).is_err());
        assert_eq!(order.close_value(), value);
    }

    #[test]
    fn cancel_only_pending() {
        let mut order = futures(10.0);
        order.cancel().unwrap();
        assert_eq!(order.status(), OrderStatus::Cancelled);
        assert!(order.open(long_entry()).is_err());

        let mut order = futures(10.0);
        order.open(long_entry()).unwrap();
        assert!(matches!(order.cancel(), Err(Error::InvalidOrderState { .. })));
    }

    #[test]
    fn unrealized_pnl() {
        let mut order = futures(10.0);
        assert_eq!(order.unrealized_pnl(105.0), 0.0);
        order.open(long_entry()).unwrap();
        let expected = 5.0 * 5.0 - 500.0 * (0.0004 + 0.0002);
        assert!((order.unrealized_pnl(105.0) - expected).abs() < EPSILON);
    }

    #[test]
    fn record_of_closed_order() {
        let mut order = futures(10.0);
        order.open(long_entry()).unwrap();
        order.close(&candle(111.0, 99.0, 105.0)).unwrap();

        let record = order.to_record();
        assert_eq!(record.id, 1);
        assert!(record.futures);
        assert_eq!(record.status, OrderStatus::Closed);
        assert_eq!(record.side, Some(PositionSide::Long));
        assert_eq!(record.close_price, Some(110.0));
        assert_eq!(record.exit_reason, Some(ExitReason::TakeProfit));
        assert_eq!(record.profit_loss, order.profit_loss());
    }
}
