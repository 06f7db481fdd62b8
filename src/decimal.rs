//! Fixed-point decimal type with 4 decimal places precision.
//!
//! Uses `rust_decimal` internally with scale enforcement so cash floats and
//! account balances never pick up floating-point drift.

use crate::error::AmountError;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::SubAssign;
use std::str::FromStr;

/// A monetary amount that always carries exactly 4 decimal places.
///
/// Parsing is strict: input with more than 4 significant decimal places is
/// rejected instead of rounded.
///
/// # Examples
///
/// ```
/// use std::str::FromStr;
/// use atm_engine::Decimal4;
///
/// let amount = Decimal4::from_str("10.5").unwrap();
/// assert_eq!(amount.to_string(), "10.5000");
/// assert!(Decimal4::from_str("0.00005").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Decimal4(Decimal);

impl Decimal4 {
    /// The number of decimal places to maintain.
    pub const SCALE: u32 = 4;

    /// Zero value.
    pub const ZERO: Self = Decimal4(Decimal::ZERO);

    /// Creates a new `Decimal4` from a `Decimal`, normalizing to 4 decimal places.
    pub fn new(value: Decimal) -> Self {
        let mut normalized = value;
        normalized.rescale(Self::SCALE);
        Decimal4(normalized)
    }

    /// Returns `true` if this value is strictly below zero.
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }
}

impl From<i64> for Decimal4 {
    fn from(value: i64) -> Self {
        Decimal4::new(Decimal::from(value))
    }
}

impl FromStr for Decimal4 {
    type Err = AmountError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim();
        let decimal = Decimal::from_str(trimmed)?;

        // trailing zeros beyond the scale are harmless
        if decimal.normalize().scale() > Self::SCALE {
            return Err(AmountError::TooPrecise {
                value: trimmed.to_string(),
                max: Self::SCALE,
            });
        }

        Ok(Decimal4::new(decimal))
    }
}

impl fmt::Display for Decimal4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}", self.0)
    }
}

impl SubAssign for Decimal4 {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
        self.0.rescale(Self::SCALE);
    }
}

impl Serialize for Decimal4 {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Decimal4 {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Decimal4::from_str(&s).map_err(serde::de::Error::custom)
    }
}
