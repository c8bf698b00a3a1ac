//! Exact-decimal currency amounts.
//!
//! Amounts are held in smallest currency units (e.g. cents) so that order
//! totals never pass through floating point. The JSON representation is a
//! decimal string such as `"10.00"`.

use core::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::DomainError;

/// A non-negative currency amount in smallest currency units.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(u64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub fn from_minor_units(minor: u64) -> Self {
        Self(minor)
    }

    pub fn minor_units(&self) -> u64 {
        self.0
    }

    /// Checked addition; fails on overflow.
    pub fn checked_add(self, other: Money) -> Result<Money, DomainError> {
        self.0
            .checked_add(other.0)
            .map(Money)
            .ok_or_else(|| DomainError::validation("money overflow in addition"))
    }

    /// Checked multiplication by a quantity; fails on overflow.
    pub fn checked_mul(self, quantity: u64) -> Result<Money, DomainError> {
        self.0
            .checked_mul(quantity)
            .map(Money)
            .ok_or_else(|| DomainError::validation("money overflow in multiplication"))
    }
}

impl core::fmt::Display for Money {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl FromStr for Money {
    type Err = DomainError;

    /// Parse a decimal string with at most two fraction digits (`"10"`,
    /// `"10.5"`, `"10.00"`). Negative amounts are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.starts_with('-') || s.starts_with('+') {
            return Err(DomainError::validation(format!("invalid money amount: {s:?}")));
        }

        let (units, fraction) = match s.split_once('.') {
            // A dot with nothing after it ("1.") is malformed, not zero cents.
            Some((_, "")) => {
                return Err(DomainError::validation(format!("invalid money amount: {s:?}")));
            }
            Some((u, f)) => (u, f),
            None => (s, ""),
        };

        if units.is_empty() || fraction.len() > 2 {
            return Err(DomainError::validation(format!("invalid money amount: {s:?}")));
        }

        let units: u64 = units
            .parse()
            .map_err(|_| DomainError::validation(format!("invalid money amount: {s:?}")))?;

        let cents: u64 = if fraction.is_empty() {
            0
        } else {
            let parsed: u64 = fraction
                .parse()
                .map_err(|_| DomainError::validation(format!("invalid money amount: {s:?}")))?;
            if fraction.len() == 1 { parsed * 10 } else { parsed }
        };

        units
            .checked_mul(100)
            .and_then(|minor| minor.checked_add(cents))
            .map(Money)
            .ok_or_else(|| DomainError::validation(format!("money amount out of range: {s:?}")))
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parses_whole_and_fractional_amounts() {
        assert_eq!("10".parse::<Money>().unwrap(), Money::from_minor_units(1000));
        assert_eq!("10.5".parse::<Money>().unwrap(), Money::from_minor_units(1050));
        assert_eq!("10.00".parse::<Money>().unwrap(), Money::from_minor_units(1000));
        assert_eq!("0.07".parse::<Money>().unwrap(), Money::from_minor_units(7));
    }

    #[test]
    fn rejects_malformed_amounts() {
        for bad in ["", "-1", "+1", "1.234", "1.", "abc", "1,50"] {
            assert!(bad.parse::<Money>().is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn formats_with_two_fraction_digits() {
        assert_eq!(Money::from_minor_units(2000).to_string(), "20.00");
        assert_eq!(Money::from_minor_units(7).to_string(), "0.07");
        assert_eq!(Money::from_minor_units(1050).to_string(), "10.50");
    }

    #[test]
    fn checked_arithmetic_detects_overflow() {
        let max = Money::from_minor_units(u64::MAX);
        assert!(max.checked_add(Money::from_minor_units(1)).is_err());
        assert!(max.checked_mul(2).is_err());
        assert_eq!(
            Money::from_minor_units(1000).checked_mul(2).unwrap(),
            Money::from_minor_units(2000)
        );
    }

    #[test]
    fn serializes_as_decimal_string() {
        let v = serde_json::to_value(Money::from_minor_units(2000)).unwrap();
        assert_eq!(v, serde_json::json!("20.00"));
        let back: Money = serde_json::from_value(v).unwrap();
        assert_eq!(back, Money::from_minor_units(2000));
    }

    proptest! {
        #[test]
        fn display_parse_roundtrip(minor in 0u64..=10_000_000_00) {
            let m = Money::from_minor_units(minor);
            let parsed: Money = m.to_string().parse().unwrap();
            prop_assert_eq!(m, parsed);
        }

        #[test]
        fn subtotal_sum_matches_total(prices in proptest::collection::vec((1u64..=100_000, 1u64..=20), 1..8)) {
            let mut total = Money::ZERO;
            for (unit, qty) in &prices {
                let subtotal = Money::from_minor_units(*unit).checked_mul(*qty).unwrap();
                total = total.checked_add(subtotal).unwrap();
            }
            let expected: u64 = prices.iter().map(|(u, q)| u * q).sum();
            prop_assert_eq!(total.minor_units(), expected);
        }
    }
}
