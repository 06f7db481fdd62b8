//! # ATM Engine
//!
//! A single automated teller machine: one cash float, one card at a time,
//! balance inquiry and cash withdrawal against an account held by the bank.
//!
//! ## Design Principles
//!
//! - **Fixed-point arithmetic**: Uses 4 decimal places via `rust_decimal`
//! - **All-or-nothing steps**: every check runs before any state changes
//! - **Account before machine**: insufficient funds is reported ahead of an
//!   empty machine
//! - **Collaborators as traits**: cards and accounts are reached through
//!   [`Card`] and [`Account`]
//!
//! ## Example
//!
//! ```
//! use atm_engine::{AccountHandle, Atm, BankAccount, BankCard, Decimal4, Pin};
//!
//! let account = AccountHandle::new(BankAccount::new(Decimal4::from(10000)));
//! let card = BankCard::new(1, Pin::from("1111"), account);
//!
//! let mut atm = Atm::new(Decimal4::from(10000)).unwrap();
//! assert!(atm.validate_card(Some(card), Pin::from("1111")).unwrap());
//! assert_eq!(atm.get_cash(Decimal4::from(1000)).unwrap(), Decimal4::from(9000));
//! assert_eq!(atm.cash_on_hand(), Decimal4::from(9000));
//! ```

pub mod account;
pub mod atm;
pub mod card;
pub mod decimal;
pub mod error;
pub mod replay;
pub mod session;

pub use account::{Account, AccountHandle, BankAccount};
pub use atm::{Atm, PinPolicy};
pub use card::{BankCard, Card, Pin};
pub use decimal::Decimal4;
pub use error::{AmountError, AtmError, Result};
pub use replay::{SessionReplay, StepOutcome};
pub use session::{CardRecord, SessionOp, SessionRecord};
