#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

/// Funds of a buyer: realized balance, value committed to open orders and fees paid.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone)]
pub struct Account {
    // Initial balance used for reset
    initial_balance: f64,
    // Initial balance plus every realized profit/loss
    balance: f64,
    // Value committed to open orders
    locked: f64,
    // Cumulative commissions paid
    fees: f64,
}

impl Account {
    /// Creates an account with the given initial balance.
    /// Non-positive balances are rejected.
    pub fn new(balance: f64) -> Result<Self> {
        if balance <= 0.0 || !balance.is_finite() {
            return Err(Error::NegZeroValue(balance));
        }

        Ok(Self {
            balance,
            fees: 0.0,
            locked: 0.0,
            initial_balance: balance,
        })
    }

    /// Returns the initial balance.
    pub fn initial_balance(&self) -> f64 {
        self.initial_balance
    }

    /// Returns the realized balance.
    pub fn balance(&self) -> f64 {
        self.balance
    }

    /// Returns the value committed to open orders.
    pub fn locked(&self) -> f64 {
        self.locked
    }

    /// Returns the balance not committed to open orders. Negative when over-committed.
    pub fn free_balance(&self) -> f64 {
        self.balance - self.locked
    }

    /// Returns the commissions paid.
    pub fn fees_paid(&self) -> f64 {
        self.fees
    }

    /// Commits `amount` to a newly opened order.
    pub(crate) fn lock(&mut self, amount: f64) {
        self.locked += amount;
    }

    /// Releases the value of a closed order and books its result.
    pub(crate) fn settle(&mut self, open_value: f64, profit_loss: f64, fees: f64) {
        self.locked = (self.locked - open_value).max(0.0);
        self.balance += profit_loss;
        self.fees += fees;
    }

    /// Resets the account to its initial balance.
    pub(crate) fn reset(&mut self) {
        self.fees = 0.0;
        self.locked = 0.0;
        self.balance = self.initial_balance;
    }
}

#[cfg(test)]
#[test]
fn new_account_valid_balance() {
    let account = Account::new(100.0).unwrap();
    assert_eq!(account.balance(), 100.0);
    assert_eq!(account.free_balance(), 100.0);
    assert_eq!(account.locked(), 0.0);
}

#[cfg(test)]
#[test]
fn new_account_invalid_balance() {
    let result = Account::new(0.0);
    assert!(matches!(result, Err(Error::NegZeroValue(_))));

    let result = Account::new(-10.0);
    assert!(matches!(result, Err(Error::NegZeroValue(_))));
}

#[cfg(test)]
#[test]
fn lock_and_settle_profit() {
    let mut account = Account::new(100.0).unwrap();

    account.lock(20.0);
    assert_eq!(account.balance(), 100.0);
    assert_eq!(account.free_balance(), 80.0);

    account.settle(20.0, 10.0, 0.5);
    assert_eq!(account.balance(), 110.0);
    assert_eq!(account.locked(), 0.0);
    assert_eq!(account.free_balance(), 110.0);
    assert_eq!(account.fees_paid(), 0.5);
}

#[cfg(test)]
#[test]
fn lock_and_settle_loss() {
    let mut account = Account::new(100.0).unwrap();
    account.lock(20.0);
    account.settle(20.0, -30.0, 0.0);
    assert_eq!(account.balance(), 70.0);
    assert_eq!(account.free_balance(), 70.0);
}

#[cfg(test)]
#[test]
fn over_committed() {
    let mut account = Account::new(100.0).unwrap();
    account.lock(80.0);
    account.lock(80.0);
    assert_eq!(account.free_balance(), -60.0);
}

#[cfg(test)]
#[test]
fn reset_account() {
    let mut account = Account::new(100.0).unwrap();
    account.lock(20.0);
    account.settle(20.0, 5.0, 0.2);

    account.reset();
    assert_eq!(account.fees_paid(), 0.0);
    assert_eq!(account.locked(), 0.0);
    assert_eq!(account.balance(), 100.0);
}
