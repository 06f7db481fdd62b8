//! CSV record models for the card roster and the session script.

use crate::card::Pin;
use crate::decimal::Decimal4;
use serde::Deserialize;
use std::str::FromStr;

/// One row of the card roster: `card,blocked,pin,balance`.
#[derive(Debug, Deserialize)]
pub struct CardRecord {
    /// Card number
    pub card: u32,

    /// Whether the bank has blocked the card
    pub blocked: bool,

    /// PIN digits
    pub pin: Pin,

    /// Opening balance of the linked account
    pub balance: Decimal4,
}

/// Raw session step as read from CSV: `op,card,pin,amount`.
///
/// Only `insert` uses `card` and `pin`; only `withdraw` uses `amount`.
#[derive(Debug, Deserialize)]
pub struct SessionRecord {
    /// Operation: insert, balance, withdraw, eject
    pub op: String,

    pub card: Option<u32>,

    pub pin: Option<String>,

    pub amount: Option<String>,
}

impl SessionRecord {
    /// Parses the raw record into a typed operation.
    ///
    /// Returns `None` for unknown operations or missing required fields.
    pub fn parse(&self) -> Option<SessionOp> {
        match self.op.trim().to_lowercase().as_str() {
            "insert" => Some(SessionOp::Insert {
                card: self.card?,
                pin: Pin::from(self.pin.clone()?),
            }),
            "balance" => Some(SessionOp::Balance),
            "withdraw" => Some(SessionOp::Withdraw(self.parse_amount()?)),
            "eject" => Some(SessionOp::Eject),
            _ => None,
        }
    }

    /// Amounts with more than 4 decimal places are rejected, not rounded.
    fn parse_amount(&self) -> Option<Decimal4> {
        let trimmed = self.amount.as_ref()?.trim();
        if trimmed.is_empty() {
            return None;
        }
        Decimal4::from_str(trimmed).ok()
    }
}

/// A parsed session step.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionOp {
    /// Insert a card from the roster and validate it with a PIN.
    Insert { card: u32, pin: Pin },

    /// Ask for the balance of the inserted card's account.
    Balance,

    /// Withdraw cash.
    Withdraw(Decimal4),

    /// Take the card back.
    Eject,
}

impl SessionOp {
    /// Operation name as written in output.
    pub fn name(&self) -> &'static str {
        match self {
            SessionOp::Insert { .. } => "insert",
            SessionOp::Balance => "balance",
            SessionOp::Withdraw(_) => "withdraw",
            SessionOp::Eject => "eject",
        }
    }
}
