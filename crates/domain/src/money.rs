//! Monetary amounts with explicit 2-decimal round-half-up semantics.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A monetary amount in the club's currency.
///
/// Wraps a [`Decimal`] so that arithmetic stays exact and rounding happens
/// only where a calculation explicitly calls [`Money::round2`]. Downstream
/// POS reconciliation expects every line item to already be rounded to
/// 2 decimal places with half-up semantics, so rounding is a visible step
/// rather than a side effect of arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Creates a money amount from a decimal value.
    pub fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Creates a money amount from a whole number of currency units.
    pub fn from_major(units: i64) -> Self {
        Self(Decimal::from(units))
    }

    /// Returns zero money.
    pub fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    /// Returns the underlying decimal value.
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// Rounds to 2 decimal places, half away from zero.
    ///
    /// This is the single rounding rule for the whole system; both the
    /// pricing calculator and the POS line items use it.
    pub fn round2(&self) -> Self {
        Self(
            self.0
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
        )
    }

    /// Returns true if the amount is positive.
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl std::ops::Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl std::ops::Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl std::ops::Mul<Decimal> for Money {
    type Output = Money;

    fn mul(self, rhs: Decimal) -> Money {
        Money(self.0 * rhs)
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl std::str::FromStr for Money {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<Decimal>().map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn round2_half_goes_up() {
        assert_eq!(Money::new(dec!(1.005)).round2(), Money::new(dec!(1.01)));
        assert_eq!(Money::new(dec!(2.675)).round2(), Money::new(dec!(2.68)));
        assert_eq!(Money::new(dec!(1.004)).round2(), Money::new(dec!(1.00)));
    }

    #[test]
    fn round2_negative_half_goes_away_from_zero() {
        assert_eq!(Money::new(dec!(-1.005)).round2(), Money::new(dec!(-1.01)));
    }

    #[test]
    fn arithmetic_is_exact_until_rounded() {
        let a = Money::new(dec!(0.1));
        let b = Money::new(dec!(0.2));
        assert_eq!((a + b).as_decimal(), dec!(0.3));

        let taxed = Money::new(dec!(19)) * dec!(0.0825);
        assert_eq!(taxed.as_decimal(), dec!(1.5675));
        assert_eq!(taxed.round2(), Money::new(dec!(1.57)));
    }

    #[test]
    fn display_always_shows_two_places() {
        assert_eq!(Money::from_major(149).to_string(), "149.00");
        assert_eq!(Money::new(dec!(0.5)).to_string(), "0.50");
    }

    #[test]
    fn parses_from_decimal_strings() {
        let m: Money = "149.00".parse().unwrap();
        assert_eq!(m, Money::from_major(149));
        assert!("abc".parse::<Money>().is_err());
    }

    #[test]
    fn serde_roundtrip() {
        let m = Money::new(dec!(149.00));
        let json = serde_json::to_string(&m).unwrap();
        let back: Money = serde_json::from_str(&json).unwrap();
        assert_eq!(m, back);
    }
}
