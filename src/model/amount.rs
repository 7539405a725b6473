//! Amount type for monetary values.
//!
//! `Amount` wraps `Decimal` so arithmetic stays exact. It parses values that may carry a leading
//! currency sign or thousands separators (as typed into a CLI) and serializes as a plain JSON
//! number with every digit kept, which is what the ledger file stores.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use std::str::FromStr;

/// Represents the amount of a single expense.
///
/// Whether an amount is acceptable for a record (strictly positive) is decided by the store, not
/// by this type, so that parsing and validation report different errors.
///
/// # Examples
///
/// ```
/// # use expense_ledger::model::Amount;
/// # use std::str::FromStr;
/// let amount = Amount::from_str("$1,250.50").unwrap();
/// assert_eq!(amount.to_string(), "1250.50");
/// assert_eq!(amount.grouped(), "1,250.50");
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Amount(#[serde(with = "rust_decimal::serde::arbitrary_precision")] Decimal);

impl Amount {
    pub const ZERO: Amount = Amount(Decimal::ZERO);

    pub const fn new(value: Decimal) -> Self {
        Self(value)
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns true if the amount is strictly greater than zero.
    pub fn is_positive(&self) -> bool {
        !self.is_zero() && self.0.is_sign_positive()
    }

    pub fn is_negative(&self) -> bool {
        !self.is_zero() && self.0.is_sign_negative()
    }

    /// Formats the amount with thousands separators and two decimal places, e.g. `1,250.50`.
    pub fn grouped(&self) -> String {
        format_grouped(self.0)
    }
}

fn format_grouped(value: Decimal) -> String {
    format_num::format_num!(",.2", value.to_f64().unwrap_or_default())
}

/// An error that can occur when parsing strings into `Amount` values.
pub struct AmountError(rust_decimal::Error);

impl Debug for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(&self.0, f)
    }
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid amount: {}", self.0)
    }
}

impl std::error::Error for AmountError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.0)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();

        // "-$5.00" and "$5.00" are both accepted; the sign is kept for the store to reject
        let (negative, unsigned) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        let unsigned = unsigned.strip_prefix('$').unwrap_or(unsigned);
        let digits = unsigned.replace(',', "");

        let value = Decimal::from_str(&digits).map_err(AmountError)?;
        Ok(Amount(if negative { -value } else { value }))
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Amount) -> Amount {
        Amount(self.0 + rhs.0)
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Amount) {
        self.0 += rhs.0;
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Amount {
        iter.fold(Amount::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Amount> for Amount {
    fn sum<I: Iterator<Item = &'a Amount>>(iter: I) -> Amount {
        iter.copied().sum()
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount::new(value)
    }
}

impl From<u32> for Amount {
    fn from(value: u32) -> Self {
        Amount::new(Decimal::from(value))
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_plain() {
        let amount = Amount::from_str("50.00").unwrap();
        assert_eq!(amount.value(), dec("50.00"));
    }

    #[test]
    fn test_parse_with_dollar_sign_and_commas() {
        let amount = Amount::from_str("$1,234,567.89").unwrap();
        assert_eq!(amount.value(), dec("1234567.89"));
    }

    #[test]
    fn test_parse_negative_with_dollar_sign() {
        let amount = Amount::from_str("-$50.00").unwrap();
        assert_eq!(amount.value(), dec("-50.00"));
        assert!(amount.is_negative());
    }

    #[test]
    fn test_parse_whitespace() {
        let amount = Amount::from_str("  120  ").unwrap();
        assert_eq!(amount.value(), dec("120"));
    }

    #[test]
    fn test_parse_garbage() {
        let err = Amount::from_str("twelve").unwrap_err();
        assert!(err.to_string().starts_with("Invalid amount"));
        assert!(Amount::from_str("").is_err());
    }

    #[test]
    fn test_zero_is_not_positive_or_negative() {
        let zero = Amount::from_str("0.00").unwrap();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());
    }

    #[test]
    fn test_serialize_as_number() {
        let amount = Amount::from_str("12.5").unwrap();
        assert_eq!(serde_json::to_string(&amount).unwrap(), "12.5");
    }

    #[test]
    fn test_serialize_keeps_every_digit() {
        let amount = Amount::from_str("1234567.123456789012").unwrap();
        let json = serde_json::to_string(&amount).unwrap();
        assert_eq!(json, "1234567.123456789012");
        let back: Amount = serde_json::from_str(&json).unwrap();
        assert_eq!(back, amount);
    }

    #[test]
    fn test_deserialize_integer_and_float() {
        let a: Amount = serde_json::from_str("100").unwrap();
        assert_eq!(a.value(), dec("100"));
        let b: Amount = serde_json::from_str("3.25").unwrap();
        assert_eq!(b.value(), dec("3.25"));
    }

    #[test]
    fn test_sum() {
        let total: Amount = [Amount::from(10), Amount::from(5), Amount::from(3)]
            .iter()
            .sum();
        assert_eq!(total, Amount::from(18));
        assert_eq!(std::iter::empty::<Amount>().sum::<Amount>(), Amount::ZERO);
    }

    #[test]
    fn test_grouped() {
        assert_eq!(Amount::from(1500).grouped(), "1,500.00");
        assert_eq!(format_grouped(dec("20")), "20.00");
    }
}
