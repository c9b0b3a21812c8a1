//! Pricing calculator for prorated dues, fees, and tax.
//!
//! Every intermediate value is rounded to 2 decimal places half-up, not
//! just the final total. POS reconciliation compares line items one by
//! one, so each must already carry the rounded amount it will be posted
//! with.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::money::Money;

/// Inputs to the pricing calculation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricingInput {
    pub prorated_dues: Money,
    pub prorated_addons_total: Money,
    pub tax_rate: Decimal,
    pub initiation_fee: Money,
    pub pt_package_amount: Money,
}

impl PricingInput {
    /// Creates an input with the standard $19 initiation fee and no
    /// personal-training package.
    pub fn new(prorated_dues: Money, prorated_addons_total: Money, tax_rate: Decimal) -> Self {
        Self {
            prorated_dues,
            prorated_addons_total,
            tax_rate,
            initiation_fee: Money::from_major(19),
            pt_package_amount: Money::zero(),
        }
    }

    /// Overrides the initiation fee.
    pub fn with_initiation_fee(mut self, fee: Money) -> Self {
        self.initiation_fee = fee;
        self
    }

    /// Adds a personal-training package amount.
    pub fn with_pt_package(mut self, amount: Money) -> Self {
        self.pt_package_amount = amount;
        self
    }
}

/// Line-item totals, each already rounded to 2 decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub combined_base: Money,
    pub tax_on_base: Money,
    pub tax_on_fee: Money,
    pub subtotal: Money,
    pub tax_total: Money,
    pub total_today: Money,
}

/// Computes the amounts due today.
///
/// Pure and deterministic: identical inputs yield bit-identical outputs.
pub fn calculate_totals(input: &PricingInput) -> Totals {
    let combined_base = (input.prorated_dues + input.prorated_addons_total).round2();
    let tax_on_base = (combined_base * input.tax_rate).round2();
    let tax_on_fee = (input.initiation_fee * input.tax_rate).round2();
    let subtotal = (combined_base + input.initiation_fee + input.pt_package_amount).round2();
    let tax_total = (tax_on_base + tax_on_fee).round2();
    let total_today = (subtotal + tax_total).round2();

    Totals {
        combined_base,
        tax_on_base,
        tax_on_fee,
        subtotal,
        tax_total,
        total_today,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn money(d: Decimal) -> Money {
        Money::new(d)
    }

    #[test]
    fn standard_purchase() {
        let input = PricingInput::new(money(dec!(43.50)), money(dec!(12.25)), dec!(0.0825))
            .with_pt_package(money(dec!(149.00)));
        let totals = calculate_totals(&input);

        assert_eq!(totals.combined_base, money(dec!(55.75)));
        // 55.75 * 0.0825 = 4.599375 -> 4.60
        assert_eq!(totals.tax_on_base, money(dec!(4.60)));
        // 19 * 0.0825 = 1.5675 -> 1.57
        assert_eq!(totals.tax_on_fee, money(dec!(1.57)));
        assert_eq!(totals.subtotal, money(dec!(223.75)));
        assert_eq!(totals.tax_total, money(dec!(6.17)));
        assert_eq!(totals.total_today, money(dec!(229.92)));
    }

    #[test]
    fn intermediate_rounding_is_half_up() {
        // combined base 10.005 must round to 10.01 before tax is applied
        let input = PricingInput::new(money(dec!(5.0025)), money(dec!(5.0025)), dec!(0.10));
        let totals = calculate_totals(&input);
        assert_eq!(totals.combined_base, money(dec!(10.01)));
        assert_eq!(totals.tax_on_base, money(dec!(1.00)));
    }

    #[test]
    fn zero_tax_rate() {
        let input = PricingInput::new(money(dec!(40.00)), Money::zero(), Decimal::ZERO);
        let totals = calculate_totals(&input);
        assert_eq!(totals.tax_total, Money::zero().round2());
        assert_eq!(totals.total_today, money(dec!(59.00)));
    }

    #[test]
    fn default_fee_is_19_and_overridable() {
        let input = PricingInput::new(Money::zero(), Money::zero(), Decimal::ZERO);
        assert_eq!(input.initiation_fee, Money::from_major(19));

        let waived = input.with_initiation_fee(Money::zero());
        let totals = calculate_totals(&waived);
        assert_eq!(totals.total_today, Money::zero().round2());
    }

    #[test]
    fn idempotent_for_identical_inputs() {
        let input = PricingInput::new(money(dec!(33.333)), money(dec!(66.667)), dec!(0.0975))
            .with_pt_package(money(dec!(249.99)));
        let a = calculate_totals(&input);
        let b = calculate_totals(&input);
        assert_eq!(a, b);
    }
}
