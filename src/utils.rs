use crate::engine::OrderId;

#[cfg(feature = "serde")]
use crate::engine::Candle;

/// Monotonic order id allocator.
///
/// Owned by whoever drives the simulation and lent to the buyer on each tick,
/// so ids are unique within a run and reproducible across runs.
#[derive(Debug, Clone, Default)]
pub struct IdSequence {
    next: OrderId,
}

impl IdSequence {
    /// Starts the sequence at `first`.
    pub fn starting_at(first: OrderId) -> Self {
        Self { next: first }
    }

    /// Returns the next id.
    pub fn next_id(&mut self) -> OrderId {
        let id = self.next;
        self.next += 1;
        id
    }

    /// Returns the id the next call will hand out.
    pub fn peek(&self) -> OrderId {
        self.next
    }
}

#[cfg(feature = "serde")]
/// Reads candles from the JSON array at `filepath`.
///
/// Timestamps are epoch milliseconds (`timestamp` or `open_time`), signals are `-1`, `0` or `1`.
pub fn get_data_from_file(filepath: impl AsRef<std::path::Path>) -> crate::errors::Result<Vec<Candle>> {
    use crate::errors::Error;
    use std::{fs::File, io::BufReader};

    let file = File::open(filepath)?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader).map_err(Error::from)
}

#[cfg(test)]
#[test]
fn sequence_is_monotonic() {
    let mut ids = IdSequence::default();
    assert_eq!(ids.next_id(), 0);
    assert_eq!(ids.next_id(), 1);
    assert_eq!(ids.peek(), 2);

    let mut ids = IdSequence::starting_at(41);
    assert_eq!(ids.next_id(), 41);
    assert_eq!(ids.next_id(), 42);
}

#[cfg(all(test, feature = "serde"))]
#[test]
fn read_candles_from_json() {
    use crate::engine::Signal;

    let path = std::env::temp_dir().join(format!("backtrade-candles-{}.json", std::process::id()));
    let json = r#"[
        {"open": 100.0, "high": 111.0, "low": 99.0, "close": 110.0, "open_time": 1700000000000, "signal": 1, "stop_loss": 95.0},
        {"open": 110.0, "high": 112.0, "low": 100.0, "close": 101.0, "timestamp": 1700003600000}
    ]"#;
    std::fs::write(&path, json).unwrap();

    let candles = get_data_from_file(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(candles.len(), 2);
    assert_eq!(candles[0].signal(), Some(Signal::Buy));
    assert_eq!(candles[0].stop_loss(), Some(95.0));
    assert_eq!(candles[0].take_profit(), None);
    assert_eq!(candles[1].signal(), None);
    assert_eq!(candles[1].timestamp().timestamp(), 1_700_003_600);
}
