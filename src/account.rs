//! Account collaborator contract and the in-memory bank account.
//!
//! The ATM never owns an account balance. It reads and debits the balance
//! through the [`Account`] trait; the bank side decides how much is
//! actually debited.

use crate::decimal::Decimal4;
use std::cell::RefCell;
use std::rc::Rc;

#[cfg(test)]
use mockall::automock;

/// A bank account reachable through an inserted card.
#[cfg_attr(test, automock)]
pub trait Account {
    /// Current balance. Never negative.
    fn balance(&self) -> Decimal4;

    /// Debits up to `amount` and returns the amount actually debited.
    ///
    /// The returned value must not exceed `amount`, and `balance()` must
    /// already reflect the debit when this returns.
    fn withdraw(&mut self, amount: Decimal4) -> Decimal4;
}

/// An in-memory account with a non-negative balance.
///
/// # Invariants
///
/// - `balance >= 0` after every operation
/// - A withdrawal larger than the balance debits only what is there
#[derive(Debug, Clone, PartialEq)]
pub struct BankAccount {
    balance: Decimal4,
}

impl BankAccount {
    /// Opens an account with the given balance. Negative openings are clamped to zero.
    pub fn new(opening_balance: Decimal4) -> Self {
        let balance = if opening_balance.is_negative() {
            Decimal4::ZERO
        } else {
            opening_balance
        };
        BankAccount { balance }
    }
}

impl Account for BankAccount {
    fn balance(&self) -> Decimal4 {
        self.balance
    }

    fn withdraw(&mut self, amount: Decimal4) -> Decimal4 {
        if amount.is_negative() {
            return Decimal4::ZERO;
        }

        let debited = amount.min(self.balance);
        self.balance -= debited;
        debited
    }
}

/// Shared handle to a [`BankAccount`] held by the bank.
///
/// Cloning the handle does not copy the account: every clone debits the
/// same balance. Single-threaded by construction.
#[derive(Debug, Clone)]
pub struct AccountHandle(Rc<RefCell<BankAccount>>);

impl AccountHandle {
    /// Wraps an account so cards and the bank can share it.
    pub fn new(account: BankAccount) -> Self {
        AccountHandle(Rc::new(RefCell::new(account)))
    }
}

impl Account for AccountHandle {
    fn balance(&self) -> Decimal4 {
        self.0.borrow().balance()
    }

    fn withdraw(&mut self, amount: Decimal4) -> Decimal4 {
        self.0.borrow_mut().withdraw(amount)
    }
}
