//! Treasury abstraction and the in-memory account book
//!
//! A treasury atomically moves the fungible unit between accounts and
//! reports success or failure. Wallet custody pools are ordinary
//! accounts named by the wallet's address.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Custody-related errors
#[derive(Error, Debug)]
pub enum CustodyError {
    #[error("Insufficient funds: have {have}, need {need}")]
    InsufficientFunds { have: u64, need: u64 },
    #[error("Transfer rejected: {0}")]
    TransferRejected(String),
}

/// Atomic value movement between accounts
///
/// Implementations must either fully apply a movement or leave both
/// accounts untouched; callers rely on this to keep their own state
/// changes all-or-nothing.
pub trait Treasury {
    /// Move `amount` units from `from` to `to`
    fn move_value(&mut self, from: &str, to: &str, amount: u64) -> Result<(), CustodyError>;

    /// Current balance of an account (zero for unknown accounts)
    fn balance_of(&self, account: &str) -> u64;
}

/// In-memory ledger of account balances
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AccountBook {
    /// Balances: account -> amount
    balances: HashMap<String, u64>,
}

impl AccountBook {
    /// Create an empty account book
    pub fn new() -> Self {
        Self {
            balances: HashMap::new(),
        }
    }

    /// Credit newly issued value to an account, returning its new balance
    ///
    /// This is the environment's value-supply primitive; the
    /// authorization engine itself never mints.
    pub fn issue(&mut self, account: &str, amount: u64) -> u64 {
        let balance = self.balances.entry(account.to_string()).or_insert(0);
        *balance += amount;
        *balance
    }

    /// Number of accounts holding a non-zero balance
    pub fn holder_count(&self) -> usize {
        self.balances.values().filter(|&&b| b > 0).count()
    }
}

impl Treasury for AccountBook {
    fn move_value(&mut self, from: &str, to: &str, amount: u64) -> Result<(), CustodyError> {
        let have = self.balance_of(from);
        if have < amount {
            return Err(CustodyError::InsufficientFunds { have, need: amount });
        }

        *self.balances.entry(from.to_string()).or_insert(0) -= amount;
        *self.balances.entry(to.to_string()).or_insert(0) += amount;

        Ok(())
    }

    fn balance_of(&self, account: &str) -> u64 {
        *self.balances.get(account).unwrap_or(&0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_and_balance() {
        let mut book = AccountBook::new();
        assert_eq!(book.balance_of("alice"), 0);

        assert_eq!(book.issue("alice", 100), 100);
        assert_eq!(book.issue("alice", 50), 150);
        assert_eq!(book.balance_of("alice"), 150);
        assert_eq!(book.holder_count(), 1);
    }

    #[test]
    fn test_move_value() {
        let mut book = AccountBook::new();
        book.issue("alice", 100);

        book.move_value("alice", "bob", 40).unwrap();
        assert_eq!(book.balance_of("alice"), 60);
        assert_eq!(book.balance_of("bob"), 40);
    }

    #[test]
    fn test_move_insufficient_funds() {
        let mut book = AccountBook::new();
        book.issue("alice", 10);

        let result = book.move_value("alice", "bob", 11);
        assert!(matches!(
            result,
            Err(CustodyError::InsufficientFunds { have: 10, need: 11 })
        ));

        // Nothing moved
        assert_eq!(book.balance_of("alice"), 10);
        assert_eq!(book.balance_of("bob"), 0);
    }

    #[test]
    fn test_move_zero_always_succeeds() {
        let mut book = AccountBook::new();
        book.move_value("nobody", "bob", 0).unwrap();
        assert_eq!(book.balance_of("bob"), 0);
    }

    #[test]
    fn test_move_to_self_is_noop() {
        let mut book = AccountBook::new();
        book.issue("alice", 25);

        book.move_value("alice", "alice", 25).unwrap();
        assert_eq!(book.balance_of("alice"), 25);
    }
}
