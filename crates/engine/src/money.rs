use std::{
    fmt,
    ops::Neg,
    str::FromStr,
};

use crate::{EngineError, ResultEngine};

/// Signed money amount represented as **integer cents**.
///
/// Balances and ledger amounts are fixed-point with two fractional digits;
/// storing them as cents avoids floating-point drift.
///
/// # Examples
///
/// ```rust
/// use engine::Money;
///
/// let amount = Money::new(12_34);
/// assert_eq!(amount.cents(), 1234);
/// assert_eq!(amount.to_string(), "12.34");
/// ```
///
/// Parsing user input rejects more than two decimals:
///
/// ```rust
/// use engine::Money;
///
/// assert_eq!("10".parse::<Money>().unwrap().cents(), 1000);
/// assert_eq!("6.75".parse::<Money>().unwrap().cents(), 675);
/// assert!("12.345".parse::<Money>().is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Largest amount a single entry may carry: one billion units.
    ///
    /// Keeps sums over any realistic ledger far away from `i64` overflow.
    pub const MAX_AMOUNT: Money = Money(100_000_000_000);

    /// Creates a new amount from integer cents.
    #[must_use]
    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    /// Returns the raw value in cents.
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Checked addition (returns `None` on overflow).
    #[must_use]
    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).map(Money)
    }

    /// Checked subtraction (returns `None` on overflow).
    #[must_use]
    pub fn checked_sub(self, rhs: Money) -> Option<Money> {
        self.0.checked_sub(rhs.0).map(Money)
    }

    /// Add `rhs` in place, failing instead of wrapping.
    pub(crate) fn accumulate(&mut self, rhs: Money) -> ResultEngine<()> {
        *self = self.checked_add(rhs).ok_or_else(out_of_range)?;
        Ok(())
    }
}

pub(crate) fn out_of_range() -> EngineError {
    EngineError::InvalidArgument("amount out of range".to_string())
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Self::Output {
        Money(-self.0)
    }
}

impl FromStr for Money {
    type Err = EngineError;

    /// Parses a decimal string into cents.
    ///
    /// Accepts an optional leading `+`/`-` and at most 2 fractional digits.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EngineError::InvalidArgument(format!("invalid amount: {s}"));
        let overflow = || EngineError::InvalidArgument("amount too large".to_string());

        let trimmed = s.trim();
        let (negative, rest) = match trimmed.strip_prefix('-') {
            Some(stripped) => (true, stripped),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };
        if rest.is_empty() {
            return Err(invalid());
        }

        let (units_str, frac_str) = match rest.split_once('.') {
            Some((units, frac)) => (units, frac),
            None => (rest, ""),
        };
        if units_str.is_empty() || !units_str.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        if !frac_str.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }

        let units: i64 = units_str.parse().map_err(|_| overflow())?;
        // `serde_json` renders whole floats as `100.0`, so trailing zeros past
        // the second digit are accepted.
        let frac = frac_str.trim_end_matches('0');
        let cents: i64 = match frac.len() {
            0 => 0,
            1 => frac.parse::<i64>().map_err(|_| invalid())? * 10,
            2 => frac.parse::<i64>().map_err(|_| invalid())?,
            _ => {
                return Err(EngineError::InvalidArgument(
                    "amount has more than two decimals".to_string(),
                ));
            }
        };

        let total = units
            .checked_mul(100)
            .and_then(|v| v.checked_add(cents))
            .ok_or_else(overflow)?;
        if total > Self::MAX_AMOUNT.0 {
            return Err(overflow());
        }

        Ok(Money(if negative { -total } else { total }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats_two_decimals() {
        assert_eq!(Money::new(0).to_string(), "0.00");
        assert_eq!(Money::new(1).to_string(), "0.01");
        assert_eq!(Money::new(1050).to_string(), "10.50");
        assert_eq!(Money::new(-1050).to_string(), "-10.50");
    }

    #[test]
    fn parse_accepts_signs_and_whole_floats() {
        assert_eq!("10.5".parse::<Money>().unwrap().cents(), 1050);
        assert_eq!("-0.01".parse::<Money>().unwrap().cents(), -1);
        assert_eq!("+1.00".parse::<Money>().unwrap().cents(), 100);
        assert_eq!("100.0".parse::<Money>().unwrap().cents(), 10000);
        assert_eq!("-5".parse::<Money>().unwrap().cents(), -500);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!("12.345".parse::<Money>().is_err());
        assert!("abc".parse::<Money>().is_err());
        assert!("".parse::<Money>().is_err());
        assert!("1e3".parse::<Money>().is_err());
        assert!(".5".parse::<Money>().is_err());
        assert!("NaN".parse::<Money>().is_err());
    }

    #[test]
    fn parse_caps_the_amount() {
        assert_eq!(
            "1000000000".parse::<Money>().unwrap(),
            Money::MAX_AMOUNT
        );
        assert_eq!(
            "1000000000.01".parse::<Money>(),
            Err(EngineError::InvalidArgument("amount too large".to_string()))
        );
        assert_eq!(
            "-92233720368547758.07".parse::<Money>(),
            Err(EngineError::InvalidArgument("amount too large".to_string()))
        );
    }

    #[test]
    fn accumulate_refuses_to_wrap() {
        let mut total = Money::new(i64::MAX - 1);
        assert!(total.accumulate(Money::new(1)).is_ok());
        assert_eq!(total.cents(), i64::MAX);
        assert!(total.accumulate(Money::new(1)).is_err());
        assert_eq!(total.cents(), i64::MAX);
    }
}
