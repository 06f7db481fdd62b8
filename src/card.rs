//! Card collaborator contract and the in-memory bank card.

use crate::account::{Account, AccountHandle};
use serde::Deserialize;

/// A PIN as typed on the keypad.
///
/// Kept as the digit string so leading zeros are significant: `0123` and
/// `123` are different PINs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Pin(String);

impl From<&str> for Pin {
    fn from(digits: &str) -> Self {
        Pin(digits.to_string())
    }
}

impl From<String> for Pin {
    fn from(digits: String) -> Self {
        Pin(digits)
    }
}

/// A bank card that can be inserted into the machine.
pub trait Card {
    /// Account type the card is linked to.
    type Account: Account;

    /// Returns `true` if the issuing bank has blocked the card.
    fn is_blocked(&self) -> bool;

    /// Returns `true` if `pin` matches the card's PIN.
    fn check_pin(&self, pin: &Pin) -> bool;

    /// The account linked to this card. Fixed for the card's lifetime.
    fn account(&self) -> &Self::Account;

    /// Mutable access to the linked account, used for debits.
    fn account_mut(&mut self) -> &mut Self::Account;
}

/// A card issued by the in-memory bank.
///
/// Cloning the card clones the account handle, so a card in the machine and
/// the bank's roster copy debit the same balance.
#[derive(Debug, Clone)]
pub struct BankCard {
    number: u32,
    blocked: bool,
    pin: Pin,
    account: AccountHandle,
}

impl BankCard {
    /// Issues a card for an existing account.
    pub fn new(number: u32, pin: Pin, account: AccountHandle) -> Self {
        BankCard {
            number,
            blocked: false,
            pin,
            account,
        }
    }

    /// Card number as printed on the card.
    pub fn number(&self) -> u32 {
        self.number
    }

    /// Marks the card as blocked (or unblocks it).
    pub fn set_blocked(&mut self, blocked: bool) {
        self.blocked = blocked;
    }
}

impl Card for BankCard {
    type Account = AccountHandle;

    fn is_blocked(&self) -> bool {
        self.blocked
    }

    fn check_pin(&self, pin: &Pin) -> bool {
        self.pin == *pin
    }

    fn account(&self) -> &AccountHandle {
        &self.account
    }

    fn account_mut(&mut self) -> &mut AccountHandle {
        &mut self.account
    }
}
