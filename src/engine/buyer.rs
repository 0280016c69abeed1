use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::{BuyerKind, FuturesConfig, SpotConfig};
use crate::engine::{Account, Candle, Entry, IdSequence, Order, OrderId, OrderKind, OrderRecord, PositionSide, Signal};
use crate::errors::{Error, Result};

/// Counters updated every time a buyer closes an order.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct TradeStats {
    /// Closed orders.
    pub total_trades: usize,
    /// Closed orders with a positive profit/loss.
    pub win_trades: usize,
    /// Closed orders with a null or negative profit/loss.
    pub lose_trades: usize,
    /// Longest run of consecutive winners.
    pub max_win_streak: usize,
    /// Longest run of consecutive losers.
    pub max_lose_streak: usize,
    /// Highest trade rate of the closed orders, 1 before any close.
    pub max_trade_rate: f64,
    /// Lowest trade rate of the closed orders, 1 before any close.
    pub min_trade_rate: f64,
    /// Sum of the winning profits.
    pub gross_profit: f64,
    /// Sum of the losses, as a positive amount.
    pub gross_loss: f64,
    win_streak: usize,
    lose_streak: usize,
}

impl TradeStats {
    /// Empty stats.
    pub fn new() -> Self {
        Self {
            total_trades: 0,
            win_trades: 0,
            lose_trades: 0,
            max_win_streak: 0,
            max_lose_streak: 0,
            max_trade_rate: 1.0,
            min_trade_rate: 1.0,
            gross_profit: 0.0,
            gross_loss: 0.0,
            win_streak: 0,
            lose_streak: 0,
        }
    }

    /// Books one closed trade.
    pub(crate) fn record(&mut self, profit_loss: f64, trade_rate: f64) {
        if self.total_trades == 0 {
            self.max_trade_rate = trade_rate;
            self.min_trade_rate = trade_rate;
        }
        self.total_trades += 1;
        if profit_loss > 0.0 {
            self.win_trades += 1;
            self.gross_profit += profit_loss;
            self.win_streak += 1;
            self.lose_streak = 0;
            self.max_win_streak = self.max_win_streak.max(self.win_streak);
        } else {
            self.lose_trades += 1;
            self.gross_loss += profit_loss.abs();
            self.lose_streak += 1;
            self.win_streak = 0;
            self.max_lose_streak = self.max_lose_streak.max(self.lose_streak);
        }
        self.max_trade_rate = self.max_trade_rate.max(trade_rate);
        self.min_trade_rate = self.min_trade_rate.min(trade_rate);
    }
}

impl Default for TradeStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Summary of the closed orders of a buyer.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderStats {
    /// Closed orders.
    pub total_orders: usize,
    /// Closed orders with a positive profit/loss.
    pub winning_orders: usize,
    /// Share of winners, in percent. Zero without closed orders.
    pub win_rate: f64,
    /// Sum of the realized profits and losses.
    pub total_profit_loss: f64,
}

/// A trading account that reads candles one by one and trades their signals.
///
/// Spot buyers hold at most one long position and close it on a sell signal.
/// Futures buyers open a new long on every buy signal and a new short on every
/// sell signal, whatever is already open. In both cases positions are closed
/// by their exit rules (liquidation, take-profit, stop-loss) first.
#[derive(Debug, Clone)]
pub struct Buyer {
    kind: BuyerKind,
    account: Account,
    orders: Vec<Order>,
    order_history: Vec<OrderRecord>,
    market_history: Vec<Candle>,
    current_candle: Option<Candle>,
    in_order: bool,
    exited_on_tick: bool,
    stats: TradeStats,
}

impl Buyer {
    /// Creates a buyer after validating its funds and terms.
    pub fn new(initial_funds: f64, kind: BuyerKind) -> Result<Self> {
        let account = Account::new(initial_funds)?;
        kind.validate()?;

        Ok(Self {
            kind,
            account,
            orders: Vec::new(),
            order_history: Vec::new(),
            market_history: Vec::new(),
            current_candle: None,
            in_order: false,
            exited_on_tick: false,
            stats: TradeStats::new(),
        })
    }

    /// Shortcut for a spot buyer.
    pub fn spot(initial_funds: f64, trade_value: f64, commission: f64) -> Result<Self> {
        Self::new(initial_funds, BuyerKind::Spot(SpotConfig { trade_value, commission }))
    }

    /// Shortcut for a futures buyer without risk/reward ratio.
    pub fn futures(
        initial_funds: f64,
        margin: f64,
        leverage: f64,
        taker_commission: f64,
        maker_commission: f64,
    ) -> Result<Self> {
        Self::new(
            initial_funds,
            BuyerKind::Futures(FuturesConfig {
                margin,
                leverage,
                taker_commission,
                maker_commission,
                risk_reward: None,
            }),
        )
    }

    /// Returns the buyer terms.
    pub fn kind(&self) -> &BuyerKind {
        &self.kind
    }

    /// Returns the account.
    pub fn account(&self) -> &Account {
        &self.account
    }

    /// Returns every order, in opening order.
    pub fn orders(&self) -> std::slice::Iter<'_, Order> {
        self.orders.iter()
    }

    /// Returns the open orders.
    pub fn active_orders(&self) -> impl Iterator<Item = &Order> {
        self.orders.iter().filter(|order| order.is_open())
    }

    /// Returns the records of the closed orders, in closing order.
    pub fn order_history(&self) -> &[OrderRecord] {
        &self.order_history
    }

    /// Returns every candle read so far.
    pub fn market_history(&self) -> &[Candle] {
        &self.market_history
    }

    /// Returns the candle being processed.
    pub fn current_candle(&self) -> Option<&Candle> {
        self.current_candle.as_ref()
    }

    /// True while a spot buyer holds its position.
    pub fn in_order(&self) -> bool {
        self.in_order
    }

    /// Returns the trade counters.
    pub fn stats(&self) -> &TradeStats {
        &self.stats
    }

    /// Realized funds: initial funds plus every closed profit/loss.
    pub fn funds(&self) -> f64 {
        self.account.balance()
    }

    /// Funds plus the unrealized profit/loss of open orders at the current close.
    pub fn equity(&self) -> f64 {
        let unrealized = match self.current_candle {
            Some(candle) => self.active_orders().map(|o| o.unrealized_pnl(candle.close())).sum::<f64>(),
            None => 0.0,
        };
        self.funds() + unrealized
    }

    /// Processes one candle: exit rules of open orders first, then its signal.
    pub fn read_chart(&mut self, candle: &Candle, ids: &mut IdSequence) -> Result<()> {
        self.current_candle = Some(*candle);
        self.market_history.push(*candle);
        self.manage_orders()?;
        self.manage_signal(ids)
    }

    /// Closes every open order whose exit rules trigger on the current candle.
    ///
    /// Returns the number of closed orders.
    pub fn manage_orders(&mut self) -> Result<usize> {
        self.exited_on_tick = false;
        let Some(candle) = self.current_candle else {
            return Ok(0);
        };

        let triggered = self
            .orders
            .iter()
            .enumerate()
            .filter(|(_, order)| order.should_close(&candle))
            .map(|(index, _)| index)
            .collect::<Vec<_>>();
        for &index in &triggered {
            self.close_order(index)?;
        }

        self.exited_on_tick = !triggered.is_empty();
        Ok(triggered.len())
    }

    /// Trades the signal of the current candle.
    pub fn manage_signal(&mut self, ids: &mut IdSequence) -> Result<()> {
        let Some(signal) = self.current_candle.and_then(|c| c.signal()) else {
            return Ok(());
        };

        match (self.kind, signal) {
            (BuyerKind::Spot(_), Signal::Buy) => {
                if !self.in_order && !self.exited_on_tick {
                    self.open_order(ids, PositionSide::Long)?;
                }
            }
            (BuyerKind::Spot(_), Signal::Sell) => {
                let open = self
                    .orders
                    .iter()
                    .enumerate()
                    .filter(|(_, order)| order.is_open())
                    .map(|(index, _)| index)
                    .collect::<Vec<_>>();
                for index in open {
                    self.close_order(index)?;
                }
            }
            (BuyerKind::Futures(_), Signal::Buy) => {
                self.open_order(ids, PositionSide::Long)?;
            }
            (BuyerKind::Futures(_), Signal::Sell) => {
                self.open_order(ids, PositionSide::Short)?;
            }
            (_, Signal::Hold) => {}
        }
        Ok(())
    }

    /// Opens an order at the close of the current candle, using its risk levels.
    pub fn open_order(&mut self, ids: &mut IdSequence, side: PositionSide) -> Result<OrderId> {
        let candle = self.current_candle.ok_or(Error::CandleNotFound)?;

        let (kind, risk_reward) = match self.kind {
            BuyerKind::Spot(SpotConfig { commission, .. }) => (OrderKind::Spot { commission }, None),
            BuyerKind::Futures(FuturesConfig {
                leverage,
                taker_commission,
                maker_commission,
                risk_reward,
                ..
            }) => (
                OrderKind::Futures {
                    leverage,
                    taker_commission,
                    maker_commission,
                },
                risk_reward,
            ),
        };
        let value = self.kind.order_value();
        let entry = Entry::new(candle.close(), value, candle.timestamp(), side)
            .stop_loss(candle.stop_loss())
            .take_profit(candle.take_profit())
            .risk_reward(risk_reward);

        let mut order = Order::new(ids.next_id(), kind);
        order.open(entry)?;
        let id = order.id();

        self.account.lock(value);
        self.orders.push(order);
        if matches!(self.kind, BuyerKind::Spot(_)) {
            self.in_order = true;
        }
        Ok(id)
    }

    /// Closes the order at `index` on the current candle and books its result.
    pub fn close_order(&mut self, index: usize) -> Result<f64> {
        let candle = self.current_candle.ok_or(Error::CandleNotFound)?;
        let order = self.orders.get_mut(index).ok_or(Error::OrderNotFound)?;

        let profit_loss = order.close(&candle)?;
        let record = order.to_record();
        let open_value = record.open_value.unwrap_or_default();
        let trade_rate = record.trade_rate.unwrap_or(1.0);

        self.account
            .settle(open_value, profit_loss, record.commissions.unwrap_or_default());
        self.stats.record(profit_loss, trade_rate);
        debug!(
            "order {} booked, funds {:.2} after {} trades",
            record.id,
            self.account.balance(),
            self.stats.total_trades
        );
        self.order_history.push(record);

        if matches!(self.kind, BuyerKind::Spot(_)) {
            self.in_order = self.orders.iter().any(Order::is_open);
        }
        Ok(profit_loss)
    }

    /// Summarizes the closed orders.
    pub fn get_order_stats(&self) -> OrderStats {
        let total_orders = self.order_history.len();
        let winning_orders = self
            .order_history
            .iter()
            .filter(|r| r.profit_loss.is_some_and(|pnl| pnl > 0.0))
            .count();
        let win_rate = if total_orders == 0 {
            0.0
        } else {
            winning_orders as f64 / total_orders as f64 * 100.0
        };

        OrderStats {
            total_orders,
            winning_orders,
            win_rate,
            total_profit_loss: self.order_history.iter().filter_map(|r| r.profit_loss).sum(),
        }
    }

    /// Forgets every order and candle and restores the initial funds.
    pub fn reset(&mut self) {
        self.account.reset();
        self.orders.clear();
        self.order_history.clear();
        self.market_history.clear();
        self.current_candle = None;
        self.in_order = false;
        self.exited_on_tick = false;
        self.stats = TradeStats::new();
    }
}
