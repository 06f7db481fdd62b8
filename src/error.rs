//! Error types for the ATM engine and the session replay host.

use crate::decimal::Decimal4;
use thiserror::Error;

/// Errors from parsing a monetary amount.
#[derive(Error, Debug)]
pub enum AmountError {
    /// Not a decimal number
    #[error("not a decimal number: {0}")]
    Invalid(#[from] rust_decimal::Error),

    /// More decimal places than the money type carries
    #[error("'{value}' has more than {max} decimal places")]
    TooPrecise { value: String, max: u32 },
}

/// Result type alias for ATM operations
pub type Result<T> = std::result::Result<T, AtmError>;

/// Errors that can occur while operating the machine or replaying a session.
#[derive(Error, Debug)]
pub enum AtmError {
    /// The machine was seeded with a negative cash float
    #[error("Invalid argument: cash on hand must not be negative (got {cash})")]
    InvalidArgument { cash: Decimal4 },

    /// No card object was supplied to card validation
    #[error("Enter real card")]
    NullCard,

    /// Balance or withdrawal requested without an accepted card
    #[error("No card inserted")]
    NoCardInserted,

    /// The PIN did not match the card while PIN checking is enabled
    #[error("Invalid PIN")]
    InvalidPin,

    /// Withdrawal amount below zero
    #[error("Invalid withdrawal amount {amount}")]
    InvalidAmount { amount: Decimal4 },

    /// The linked account cannot cover the withdrawal
    #[error("Not enough money in account: requested {requested}, balance {balance}")]
    NotEnoughMoneyInAccount {
        requested: Decimal4,
        balance: Decimal4,
    },

    /// The machine float cannot cover the withdrawal
    #[error("Not enough money in ATM: requested {requested}, available {available}")]
    NotEnoughMoneyInAtm {
        requested: Decimal4,
        available: Decimal4,
    },

    /// Failed to open or read an input file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing or writing error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The cash argument is not a valid amount
    #[error("Invalid cash amount '{value}': {source}")]
    InvalidCash { value: String, source: AmountError },

    /// An option the CLI does not know
    #[error("Unknown option '{flag}'. Usage: atm-engine <cash> <cards.csv> <session.csv> [--verify-pin]")]
    UnknownFlag { flag: String },

    /// Missing command-line arguments
    #[error("Missing arguments. Usage: atm-engine <cash> <cards.csv> <session.csv> [--verify-pin]")]
    MissingArgument,
}

impl AtmError {
    /// Stable snake-case name of the failure, used in replay output.
    pub fn kind(&self) -> &'static str {
        match self {
            AtmError::InvalidArgument { .. } => "invalid_argument",
            AtmError::NullCard => "null_card",
            AtmError::NoCardInserted => "no_card_inserted",
            AtmError::InvalidPin => "invalid_pin",
            AtmError::InvalidAmount { .. } => "invalid_amount",
            AtmError::NotEnoughMoneyInAccount { .. } => "not_enough_money_in_account",
            AtmError::NotEnoughMoneyInAtm { .. } => "not_enough_money_in_atm",
            AtmError::Io(_) => "io",
            AtmError::Csv(_) => "csv",
            AtmError::InvalidCash { .. } => "invalid_cash",
            AtmError::UnknownFlag { .. } => "unknown_flag",
            AtmError::MissingArgument => "missing_argument",
        }
    }
}
