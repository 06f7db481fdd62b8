//! Session replay host.
//!
//! Loads a card roster, drives one [`Atm`] through a scripted session, and
//! records the outcome of every step. Both inputs are streamed CSV; rows that
//! cannot be parsed are logged at warn level and skipped.

use crate::account::{Account, AccountHandle, BankAccount};
use crate::atm::{Atm, PinPolicy};
use crate::card::{BankCard, Card};
use crate::decimal::Decimal4;
use crate::error::{AtmError, Result};
use crate::session::{CardRecord, SessionOp, SessionRecord};
use csv::{ReaderBuilder, Trim, WriterBuilder};
use log::{debug, warn};
use serde::Serialize;
use std::collections::HashMap;
use std::io::{Read, Write};

/// Result of one replayed step, serialized as one output row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepOutcome {
    /// 1-based position among the steps that were executed
    pub step: usize,

    /// Operation name
    pub op: &'static str,

    /// `ok`, `accepted`, `rejected`, `ejected`, `empty`, or an error kind
    pub outcome: &'static str,

    /// Account balance reported by a successful balance or withdraw step
    pub balance: Option<Decimal4>,

    /// Machine float after the step
    pub cash: Decimal4,
}

/// Replays session scripts against a single machine.
pub struct SessionReplay {
    atm: Atm<BankCard>,

    /// Cards known to the bank, indexed by card number.
    roster: HashMap<u32, BankCard>,

    outcomes: Vec<StepOutcome>,
}

impl SessionReplay {
    /// Creates a replay around a fresh machine with the given float.
    pub fn new(cash: Decimal4, pin_policy: PinPolicy) -> Result<Self> {
        Ok(SessionReplay {
            atm: Atm::with_pin_policy(cash, pin_policy)?,
            roster: HashMap::new(),
            outcomes: Vec::new(),
        })
    }

    /// Loads cards from a `card,blocked,pin,balance` CSV reader.
    ///
    /// Each card gets its own account. Duplicate card numbers keep the first row.
    pub fn load_cards<R: Read>(&mut self, reader: R) -> Result<()> {
        let mut csv_reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(reader);

        for (row_idx, result) in csv_reader.deserialize::<CardRecord>().enumerate() {
            let row_num = row_idx + 2; // 1-indexed, accounting for header row

            let record = match result {
                Ok(record) => record,
                Err(e) => {
                    warn!("Cards row {}: CSV parse error: {}", row_num, e);
                    continue;
                }
            };

            if self.roster.contains_key(&record.card) {
                warn!(
                    "Cards row {}: Duplicate card {}, ignoring",
                    row_num, record.card
                );
                continue;
            }

            let account = AccountHandle::new(BankAccount::new(record.balance));
            let mut card = BankCard::new(record.card, record.pin, account);
            card.set_blocked(record.blocked);
            debug!("Cards row {}: Issued card {}", row_num, card.number());
            self.roster.insert(card.number(), card);
        }

        Ok(())
    }

    /// Replays an `op,card,pin,amount` session script.
    pub fn run_session<R: Read>(&mut self, reader: R) -> Result<()> {
        let mut csv_reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(reader);

        for (row_idx, result) in csv_reader.deserialize::<SessionRecord>().enumerate() {
            let row_num = row_idx + 2;

            match result {
                Ok(record) => match record.parse() {
                    Some(op) => self.execute(op),
                    None => warn!("Session row {}: Failed to parse session step", row_num),
                },
                Err(e) => warn!("Session row {}: CSV parse error: {}", row_num, e),
            }
        }

        Ok(())
    }

    /// Executes one step and records its outcome.
    fn execute(&mut self, op: SessionOp) {
        let step = self.outcomes.len() + 1;
        let name = op.name();
        let (outcome, balance) = match op {
            SessionOp::Insert { card, pin } => {
                self.atm.eject_card();
                let card = self.roster.get(&card).cloned();
                match self.atm.validate_card(card, pin) {
                    Ok(true) => ("accepted", None),
                    Ok(false) => ("rejected", None),
                    Err(e) => Self::failed(step, e),
                }
            }
            SessionOp::Balance => match self.atm.check_balance() {
                Ok(balance) => ("ok", Some(balance)),
                Err(e) => Self::failed(step, e),
            },
            SessionOp::Withdraw(amount) => match self.atm.get_cash(amount) {
                Ok(balance) => ("ok", Some(balance)),
                Err(e) => Self::failed(step, e),
            },
            SessionOp::Eject => match self.atm.eject_card() {
                Some(_) => ("ejected", None),
                None => ("empty", None),
            },
        };

        self.outcomes.push(StepOutcome {
            step,
            op: name,
            outcome,
            balance,
            cash: self.atm.cash_on_hand(),
        });
    }

    fn failed(step: usize, error: AtmError) -> (&'static str, Option<Decimal4>) {
        debug!("Step {}: {}", step, error);
        (error.kind(), None)
    }

    /// Outcomes of every executed step, in order.
    pub fn outcomes(&self) -> &[StepOutcome] {
        &self.outcomes
    }

    /// Current machine float.
    pub fn cash_on_hand(&self) -> Decimal4 {
        self.atm.cash_on_hand()
    }

    /// Current balance of a roster card's account.
    pub fn card_balance(&self, card: u32) -> Option<Decimal4> {
        self.roster.get(&card).map(|c| c.account().balance())
    }

    /// Writes step outcomes as `step,op,outcome,balance,cash` CSV.
    pub fn write_output<W: Write>(&self, writer: W) -> Result<()> {
        // header written by hand so an empty session still gets one
        let mut csv_writer = WriterBuilder::new().has_headers(false).from_writer(writer);

        csv_writer.write_record(["step", "op", "outcome", "balance", "cash"])?;

        for outcome in &self.outcomes {
            csv_writer.serialize(outcome)?;
        }

        csv_writer.flush()?;
        Ok(())
    }
}
