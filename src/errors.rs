use crate::engine::{OrderId, OrderStatus};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The candle data provided is empty. Backtesting requires at least one candle.
    #[error("Candle data is empty: backtesting requires at least one candle")]
    CandleDataEmpty,

    /// Candles must be replayed in strictly ascending timestamp order.
    #[error("Candle at index {0} is not later than the previous one")]
    UnorderedCandles(usize),

    /// A required candle field was not provided to the builder.
    #[error("Missing candle field: {0}")]
    MissingCandleField(&'static str),

    /// The candle range does not contain its open and close prices.
    #[error("Invalid candle: high {high}, low {low}, open {open}, close {close}")]
    InvalidCandle {
        /// Open price.
        open: f64,
        /// High price.
        high: f64,
        /// Low price.
        low: f64,
        /// Close price.
        close: f64,
    },

    /// No candle has been read yet.
    #[error("Candle not found")]
    CandleNotFound,

    /// A price must be positive and finite.
    #[error("Price must be positive and finite (got: {0})")]
    InvalidPrice(f64),

    /// The initial funds, trade value or margin is not positive.
    #[error("Value must be positive (got: {0})")]
    NegZeroValue(f64),

    /// Commissions are fractions in `[0, 1)`.
    #[error("Commission must be in [0, 1) (got: {0})")]
    InvalidCommission(f64),

    /// Leverage below 1x makes no sense for a futures position.
    #[error("Leverage must be at least 1 (got: {0})")]
    InvalidLeverage(f64),

    /// The order cannot perform `action` from its current status.
    #[error("Order {id} cannot {action} while {status:?}")]
    InvalidOrderState {
        /// Order id.
        id: OrderId,
        /// Status at the time of the call.
        status: OrderStatus,
        /// Rejected transition.
        action: &'static str,
    },

    /// Stop-loss or take-profit on the wrong side of the entry price.
    #[error("Invalid risk configuration: {0}")]
    InvalidRiskConfiguration(String),

    /// A leveraged order needs a take-profit, given or derived from a risk/reward ratio.
    #[error("Order {0} has no take-profit and none can be derived")]
    MissingExitTarget(OrderId),

    /// The order was not found.
    #[error("Order not found")]
    OrderNotFound,

    /// Invalid optimizer settings.
    #[error("Optimizer error: {0}")]
    Optimizer(String),

    /// Generic error.
    #[error("{0}")]
    Msg(String),

    /// I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization/deserialization error occurred.
    #[cfg(feature = "serde")]
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// TOML configuration could not be parsed.
    #[cfg(feature = "cli")]
    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),
}
