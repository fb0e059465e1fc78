//! Monetary values and discount arithmetic
//!
//! Summary and final-calculation money is decimal end to end, never floating
//! point. The order service writes monetary fields as strings with two
//! decimal places (`"180.00"`), but older records carry bare JSON numbers,
//! so deserialization accepts either and degrades unreadable input to zero
//! rather than failing the whole snapshot. Arithmetic saturates at the
//! decimal range; wire figures of any size can flow through a
//! recalculation without panicking.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};

use rust_decimal::prelude::*;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Decimal places used for display and wire formatting.
pub const MONEY_SCALE: u32 = 2;

/// A monetary amount.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Money(Decimal);

impl Money {
    /// Zero amount.
    pub const ZERO: Money = Money(Decimal::ZERO);

    pub fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Parse a user- or service-provided string.
    ///
    /// Tolerates surrounding whitespace and thousands separators
    /// (`"1,200.50"`). Returns `None` for anything else.
    pub fn parse(s: &str) -> Option<Self> {
        let cleaned = s.trim().replace(',', "");
        if cleaned.is_empty() {
            return None;
        }
        Decimal::from_str(&cleaned).ok().map(Money)
    }

    /// Like [`parse`](Money::parse) but degrades to zero.
    pub fn parse_lossy(s: &str) -> Self {
        Self::parse(s).unwrap_or(Money::ZERO)
    }

    /// The raw decimal amount.
    pub fn amount(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// `self * percent / 100`, saturating at the decimal range.
    ///
    /// Divides before multiplying so a percentage of a near-range total
    /// still comes out exact.
    pub fn percent_of(self, percent: Decimal) -> Self {
        Money((self.0 / Decimal::ONE_HUNDRED).saturating_mul(percent))
    }

    /// Subtraction clamped at zero. Payable amounts never go negative.
    pub fn saturating_sub(self, rhs: Self) -> Self {
        Money(self.0.saturating_sub(rhs.0).max(Decimal::ZERO))
    }
}

impl fmt::Display for Money {
    /// Always two decimal places, half-away-from-zero.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut scaled = self
            .0
            .round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero);
        scaled.rescale(MONEY_SCALE);
        write!(f, "{scaled}")
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Money(amount)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        *self = *self + rhs;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0.saturating_sub(rhs.0))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Number(f64),
            Text(String),
            Null,
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::Number(n) => Decimal::from_f64(n).map(Money).unwrap_or(Money::ZERO),
            Repr::Text(s) => Money::parse_lossy(&s),
            Repr::Null => Money::ZERO,
        })
    }
}

/// How a discount or margin value is interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscountType {
    /// The value is a percentage of the base amount.
    #[default]
    Percent,
    /// The value is a flat amount.
    Amount,
}

impl DiscountType {
    /// The concrete amount a discount `value` takes off `base`.
    pub fn amount_of(self, base: Money, value: Decimal) -> Money {
        match self {
            DiscountType::Percent => base.percent_of(value),
            DiscountType::Amount => Money::new(value),
        }
    }
}

/// Serde adapter for raw decimal inputs (discount and margin values) that
/// arrive as either strings or numbers.
pub mod lossy_decimal {
    use super::*;

    pub fn serialize<S: Serializer>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Number(f64),
            Text(String),
            Null,
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::Number(n) => Decimal::from_f64(n).unwrap_or(Decimal::ZERO),
            Repr::Text(s) => Decimal::from_str(s.trim()).unwrap_or(Decimal::ZERO),
            Repr::Null => Decimal::ZERO,
        })
    }
}
