//! The ATM session state machine.
//!
//! One machine holds a cash float and at most one accepted card. Every
//! operation either fails before touching any state or completes in full.

use crate::account::Account;
use crate::card::{Card, Pin};
use crate::decimal::Decimal4;
use crate::error::{AtmError, Result};
use log::{debug, warn};

/// Whether card validation consults the PIN.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PinPolicy {
    /// The PIN is accepted but never checked against the card.
    #[default]
    Unchecked,

    /// The PIN must match the card, otherwise validation fails with
    /// [`AtmError::InvalidPin`].
    Verify,
}

/// An automated teller machine serving one card at a time.
///
/// # Invariants
///
/// - `cash_on_hand` is never negative
/// - A failed operation leaves both the float and the account untouched
///
/// The machine is single-session: it is not meant to be shared across
/// threads. Hosts that need that must wrap it in their own lock.
#[derive(Debug)]
pub struct Atm<C: Card> {
    /// Dispensable cash held by the machine.
    cash_on_hand: Decimal4,

    /// The currently accepted card, if any.
    current_card: Option<C>,

    pin_policy: PinPolicy,
}

impl<C: Card> Atm<C> {
    /// Creates a machine with the given cash float and no card accepted.
    ///
    /// Fails with [`AtmError::InvalidArgument`] if `cash_on_hand` is negative.
    pub fn new(cash_on_hand: Decimal4) -> Result<Self> {
        Self::with_pin_policy(cash_on_hand, PinPolicy::default())
    }

    /// Creates a machine with an explicit PIN policy.
    pub fn with_pin_policy(cash_on_hand: Decimal4, pin_policy: PinPolicy) -> Result<Self> {
        if cash_on_hand.is_negative() {
            return Err(AtmError::InvalidArgument { cash: cash_on_hand });
        }

        Ok(Atm {
            cash_on_hand,
            current_card: None,
            pin_policy,
        })
    }

    /// Returns the cash currently held by the machine.
    pub fn cash_on_hand(&self) -> Decimal4 {
        self.cash_on_hand
    }

    /// Returns `true` if a card has been accepted and not yet ejected.
    pub fn has_card(&self) -> bool {
        self.current_card.is_some()
    }

    /// Validates a card and accepts it for this session.
    ///
    /// Returns `Ok(false)` for a blocked card, which is then not accepted.
    /// Accepting a card replaces any previously accepted one.
    ///
    /// # Errors
    ///
    /// - [`AtmError::NullCard`] if no card is supplied
    /// - [`AtmError::InvalidPin`] if the policy is [`PinPolicy::Verify`]
    ///   and the PIN does not match
    pub fn validate_card(&mut self, card: Option<C>, pin: Pin) -> Result<bool> {
        let card = card.ok_or(AtmError::NullCard)?;

        if card.is_blocked() {
            debug!("Rejected blocked card");
            return Ok(false);
        }

        if self.pin_policy == PinPolicy::Verify && !card.check_pin(&pin) {
            debug!("Rejected card: PIN mismatch");
            return Err(AtmError::InvalidPin);
        }

        self.current_card = Some(card);
        debug!("Card accepted");
        Ok(true)
    }

    /// Returns the balance of the accepted card's account.
    pub fn check_balance(&self) -> Result<Decimal4> {
        let card = self.current_card.as_ref().ok_or(AtmError::NoCardInserted)?;
        Ok(card.account().balance())
    }

    /// Dispenses `amount` from the accepted card's account.
    ///
    /// The account is checked before the machine float. On success the float
    /// drops by the amount the account actually debited, capped to
    /// `[0, amount]`, and the account's post-withdrawal balance is returned.
    pub fn get_cash(&mut self, amount: Decimal4) -> Result<Decimal4> {
        let card = self.current_card.as_mut().ok_or(AtmError::NoCardInserted)?;

        if amount.is_negative() {
            return Err(AtmError::InvalidAmount { amount });
        }

        let account = card.account_mut();
        let balance = account.balance();
        if balance < amount {
            return Err(AtmError::NotEnoughMoneyInAccount {
                requested: amount,
                balance,
            });
        }

        if self.cash_on_hand < amount {
            return Err(AtmError::NotEnoughMoneyInAtm {
                requested: amount,
                available: self.cash_on_hand,
            });
        }

        let debited = account.withdraw(amount);
        let dispensed = if debited > amount {
            warn!(
                "Account debited {} for a request of {}, dispensing only the request",
                debited, amount
            );
            amount
        } else if debited.is_negative() {
            warn!("Account reported a negative debit {}, dispensing nothing", debited);
            Decimal4::ZERO
        } else {
            if debited != amount {
                warn!("Account debited {} of requested {}", debited, amount);
            }
            debited
        };
        self.cash_on_hand -= dispensed;

        let new_balance = account.balance();
        debug!(
            "Dispensed {}, account balance {}, cash on hand {}",
            dispensed, new_balance, self.cash_on_hand
        );
        Ok(new_balance)
    }

    /// Ends the session and hands back the accepted card, if any.
    pub fn eject_card(&mut self) -> Option<C> {
        let card = self.current_card.take();
        if card.is_some() {
            debug!("Card ejected");
        }
        card
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::MockAccount;
    use mockall::predicate::eq;
    use mockall::Sequence;

    struct TestCard {
        blocked: bool,
        pin: Pin,
        account: MockAccount,
    }

    impl TestCard {
        fn with_account(account: MockAccount) -> Self {
            TestCard {
                blocked: false,
                pin: Pin::from("1111"),
                account,
            }
        }

        fn blocked() -> Self {
            TestCard {
                blocked: true,
                pin: Pin::from("1111"),
                account: MockAccount::new(),
            }
        }
    }

    impl Card for TestCard {
        type Account = MockAccount;

        fn is_blocked(&self) -> bool {
            self.blocked
        }

        fn check_pin(&self, pin: &Pin) -> bool {
            self.pin == *pin
        }

        fn account(&self) -> &MockAccount {
            &self.account
        }

        fn account_mut(&mut self) -> &mut MockAccount {
            &mut self.account
        }
    }

    fn account_with_balance(balance: i64) -> MockAccount {
        let mut account = MockAccount::new();
        account
            .expect_balance()
            .return_const(Decimal4::from(balance));
        account
    }

    fn atm_with_card(cash: i64, account: MockAccount) -> Atm<TestCard> {
        let mut atm = Atm::new(Decimal4::from(cash)).unwrap();
        assert!(atm
            .validate_card(Some(TestCard::with_account(account)), Pin::from("1111"))
            .unwrap());
        atm
    }

    #[test]
    fn test_negative_cash_is_rejected() {
        let result = Atm::<TestCard>::new(Decimal4::from(-5));
        assert!(matches!(result, Err(AtmError::InvalidArgument { .. })));
    }

    #[test]
    fn test_cash_on_hand_matches_seed() {
        let atm = Atm::<TestCard>::new(Decimal4::from(45)).unwrap();
        assert_eq!(atm.cash_on_hand(), Decimal4::from(45));
        assert_ne!(atm.cash_on_hand(), Decimal4::from(46));
        assert!(!atm.has_card());
    }

    #[test]
    fn test_zero_cash_is_allowed() {
        let atm = Atm::<TestCard>::new(Decimal4::ZERO).unwrap();
        assert_eq!(atm.cash_on_hand(), Decimal4::ZERO);
    }

    #[test]
    fn test_missing_card_fails_with_null_card() {
        let mut atm = Atm::<TestCard>::new(Decimal4::from(5)).unwrap();
        let result = atm.validate_card(None, Pin::from("5"));
        assert!(matches!(result, Err(AtmError::NullCard)));
    }

    #[test]
    fn test_blocked_card_is_not_accepted() {
        let mut atm = Atm::new(Decimal4::from(5)).unwrap();
        assert!(!atm.validate_card(Some(TestCard::blocked()), Pin::from("5")).unwrap());
        assert!(!atm.has_card());
        assert!(matches!(atm.check_balance(), Err(AtmError::NoCardInserted)));
    }

    #[test]
    fn test_pin_is_ignored_by_default() {
        let mut atm = Atm::new(Decimal4::from(5)).unwrap();
        let card = TestCard::with_account(MockAccount::new());
        assert!(atm.validate_card(Some(card), Pin::from("9999")).unwrap());
    }

    #[test]
    fn test_wrong_pin_fails_when_verifying() {
        let mut atm = Atm::with_pin_policy(Decimal4::from(5), PinPolicy::Verify).unwrap();
        let card = TestCard::with_account(MockAccount::new());
        let result = atm.validate_card(Some(card), Pin::from("9999"));
        assert!(matches!(result, Err(AtmError::InvalidPin)));
        assert!(!atm.has_card());
    }

    #[test]
    fn test_right_pin_is_accepted_when_verifying() {
        let mut atm = Atm::with_pin_policy(Decimal4::from(5), PinPolicy::Verify).unwrap();
        let card = TestCard::with_account(MockAccount::new());
        assert!(atm.validate_card(Some(card), Pin::from("1111")).unwrap());
    }

    #[test]
    fn test_check_balance_without_card() {
        let atm = Atm::<TestCard>::new(Decimal4::from(5)).unwrap();
        assert!(matches!(atm.check_balance(), Err(AtmError::NoCardInserted)));
    }

    #[test]
    fn test_check_balance_returns_account_balance() {
        let atm = atm_with_card(5, account_with_balance(1000));
        assert_eq!(atm.check_balance().unwrap(), Decimal4::from(1000));
        assert_ne!(atm.check_balance().unwrap(), Decimal4::from(1001));
    }

    #[test]
    fn test_get_cash_without_card() {
        let mut atm = Atm::<TestCard>::new(Decimal4::from(1000)).unwrap();
        let result = atm.get_cash(Decimal4::from(123));
        assert!(matches!(result, Err(AtmError::NoCardInserted)));
        assert_eq!(atm.cash_on_hand(), Decimal4::from(1000));
    }

    #[test]
    fn test_get_cash_not_enough_money_in_account() {
        // withdraw expectation absent: any debit would panic the mock
        let mut atm = atm_with_card(5, account_with_balance(1000));
        let result = atm.get_cash(Decimal4::from(1001));
        assert!(matches!(
            result,
            Err(AtmError::NotEnoughMoneyInAccount { .. })
        ));
        assert_eq!(atm.cash_on_hand(), Decimal4::from(5));
    }

    #[test]
    fn test_get_cash_not_enough_money_in_atm() {
        let mut atm = atm_with_card(5, account_with_balance(1005));
        let result = atm.get_cash(Decimal4::from(1001));
        assert!(matches!(result, Err(AtmError::NotEnoughMoneyInAtm { .. })));
        assert_eq!(atm.cash_on_hand(), Decimal4::from(5));
    }

    #[test]
    fn test_account_shortfall_reported_before_machine_shortfall() {
        let mut atm = atm_with_card(5, account_with_balance(10));
        let result = atm.get_cash(Decimal4::from(20));
        assert!(matches!(
            result,
            Err(AtmError::NotEnoughMoneyInAccount { .. })
        ));
    }

    #[test]
    fn test_negative_amount_is_rejected() {
        let mut atm = atm_with_card(5, MockAccount::new());
        let result = atm.get_cash(Decimal4::from(-1));
        assert!(matches!(result, Err(AtmError::InvalidAmount { .. })));
        assert_eq!(atm.cash_on_hand(), Decimal4::from(5));
    }

    #[test]
    fn test_get_cash_reads_balance_before_withdraw() {
        let mut seq = Sequence::new();
        let mut account = MockAccount::new();
        account
            .expect_balance()
            .times(1)
            .in_sequence(&mut seq)
            .return_const(Decimal4::from(10000));
        account
            .expect_withdraw()
            .with(eq(Decimal4::from(1000)))
            .times(1)
            .in_sequence(&mut seq)
            .return_const(Decimal4::from(1000));
        account
            .expect_balance()
            .times(1)
            .in_sequence(&mut seq)
            .return_const(Decimal4::from(9000));

        let mut atm = atm_with_card(10000, account);
        let balance = atm.get_cash(Decimal4::from(1000)).unwrap();

        assert_eq!(balance, Decimal4::from(9000));
        assert_eq!(atm.cash_on_hand(), Decimal4::from(9000));
    }

    #[test]
    fn test_float_drops_by_debited_amount() {
        let mut account = MockAccount::new();
        account
            .expect_balance()
            .times(1)
            .return_const(Decimal4::from(500));
        account
            .expect_withdraw()
            .times(1)
            .return_const(Decimal4::from(60));
        account
            .expect_balance()
            .times(1)
            .return_const(Decimal4::from(440));

        let mut atm = atm_with_card(1000, account);
        assert_eq!(atm.get_cash(Decimal4::from(100)).unwrap(), Decimal4::from(440));
        assert_eq!(atm.cash_on_hand(), Decimal4::from(940));
    }

    #[test]
    fn test_float_never_drops_below_request_for_overdebit() {
        let mut account = MockAccount::new();
        account
            .expect_balance()
            .times(1)
            .return_const(Decimal4::from(500));
        account
            .expect_withdraw()
            .with(eq(Decimal4::from(100)))
            .times(1)
            .return_const(Decimal4::from(200));
        account
            .expect_balance()
            .times(1)
            .return_const(Decimal4::from(300));

        let mut atm = atm_with_card(100, account);
        assert_eq!(atm.get_cash(Decimal4::from(100)).unwrap(), Decimal4::from(300));
        assert_eq!(atm.cash_on_hand(), Decimal4::ZERO);
        assert!(!atm.cash_on_hand().is_negative());
    }

    #[test]
    fn test_negative_debit_dispenses_nothing() {
        let mut account = MockAccount::new();
        account
            .expect_balance()
            .times(1)
            .return_const(Decimal4::from(500));
        account
            .expect_withdraw()
            .times(1)
            .return_const(Decimal4::from(-10));
        account
            .expect_balance()
            .times(1)
            .return_const(Decimal4::from(510));

        let mut atm = atm_with_card(100, account);
        atm.get_cash(Decimal4::from(50)).unwrap();
        assert_eq!(atm.cash_on_hand(), Decimal4::from(100));
    }

    #[test]
    fn test_eject_returns_card_and_ends_session() {
        let mut atm = atm_with_card(5, account_with_balance(10));
        assert!(atm.eject_card().is_some());
        assert!(!atm.has_card());
        assert!(atm.eject_card().is_none());
        assert!(matches!(atm.check_balance(), Err(AtmError::NoCardInserted)));
    }
}
