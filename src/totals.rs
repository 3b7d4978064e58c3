//! Document totals: subtotal, discount, tax and grand total.
//!
//! Invoices and quotes share this calculation. Stored totals are always
//! recomputed here from the line items and adjustments.

use serde::{Deserialize, Serialize};

text_enum! {
    /// How a discount or tax value is applied.
    pub enum AdjustmentKind {
        /// Value is a percentage of the base amount.
        Percentage => "percentage",
        /// Value is an absolute amount.
        Fixed => "fixed",
    }
}

impl Default for AdjustmentKind {
    fn default() -> Self {
        AdjustmentKind::Percentage
    }
}

/// A discount or tax applied to a document.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Adjustment {
    pub kind: AdjustmentKind,
    pub value: f64,
}

impl Adjustment {
    pub fn percentage(value: f64) -> Self {
        Self { kind: AdjustmentKind::Percentage, value }
    }

    pub fn fixed(value: f64) -> Self {
        Self { kind: AdjustmentKind::Fixed, value }
    }

    pub fn none() -> Self {
        Self::fixed(0.0)
    }

    /// Amount this adjustment contributes when applied to `base`.
    pub fn amount_of(&self, base: f64) -> f64 {
        let value = finite_or_zero(self.value);
        match self.kind {
            AdjustmentKind::Percentage => base * value / 100.0,
            AdjustmentKind::Fixed => value,
        }
    }
}

/// Quantity and unit price of a single line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    pub quantity: f64,
    pub unit_price: f64,
}

impl Line {
    pub fn new(quantity: f64, unit_price: f64) -> Self {
        Self { quantity, unit_price }
    }

    pub fn amount(&self) -> f64 {
        line_amount(self.quantity, self.unit_price)
    }
}

/// Computed totals of an invoice or quote.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Totals {
    pub subtotal: f64,
    pub discount_amount: f64,
    pub taxable_amount: f64,
    pub tax_amount: f64,
    pub total: f64,
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

/// Amount of one line. Non-finite inputs count as zero.
pub fn line_amount(quantity: f64, unit_price: f64) -> f64 {
    finite_or_zero(quantity) * finite_or_zero(unit_price)
}

/// Compute document totals from its lines, discount and tax.
///
/// The discount is applied to the subtotal, the tax to the discounted
/// (taxable) amount.
pub fn calculate<I>(lines: I, discount: Adjustment, tax: Adjustment) -> Totals
where
    I: IntoIterator<Item = Line>,
{
    let subtotal: f64 = lines.into_iter().map(|line| line.amount()).sum();
    let discount_amount = discount.amount_of(subtotal);
    let taxable_amount = subtotal - discount_amount;
    let tax_amount = tax.amount_of(taxable_amount);

    Totals {
        subtotal,
        discount_amount,
        taxable_amount,
        tax_amount,
        total: taxable_amount + tax_amount,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn worked_example_matches() {
        let totals = calculate(
            [Line::new(2.0, 10.0), Line::new(1.0, 5.0)],
            Adjustment::percentage(10.0),
            Adjustment::percentage(5.0),
        );

        assert_eq!(totals.subtotal, 25.0);
        assert_eq!(totals.discount_amount, 2.5);
        assert_eq!(totals.taxable_amount, 22.5);
        assert_eq!(totals.tax_amount, 1.125);
        assert_eq!(totals.total, 23.625);
    }

    #[rstest]
    #[case(AdjustmentKind::Percentage, 20.0, 200.0, 40.0)]
    #[case(AdjustmentKind::Percentage, 0.0, 200.0, 0.0)]
    #[case(AdjustmentKind::Fixed, 15.0, 200.0, 15.0)]
    #[case(AdjustmentKind::Fixed, 15.0, 0.0, 15.0)]
    fn discount_follows_kind(
        #[case] kind: AdjustmentKind,
        #[case] value: f64,
        #[case] subtotal: f64,
        #[case] expected: f64,
    ) {
        let totals = calculate(
            [Line::new(1.0, subtotal)],
            Adjustment { kind, value },
            Adjustment::none(),
        );
        assert_eq!(totals.discount_amount, expected);
    }

    #[test]
    fn fixed_tax_is_added_as_is() {
        let totals = calculate(
            [Line::new(4.0, 25.0)],
            Adjustment::fixed(10.0),
            Adjustment::fixed(7.5),
        );
        assert_eq!(totals.subtotal, 100.0);
        assert_eq!(totals.taxable_amount, 90.0);
        assert_eq!(totals.tax_amount, 7.5);
        assert_eq!(totals.total, 97.5);
    }

    #[test]
    fn total_identity_holds() {
        let lines = [Line::new(3.0, 19.99), Line::new(0.5, 120.0), Line::new(7.0, 0.25)];
        let totals = calculate(lines, Adjustment::percentage(12.5), Adjustment::percentage(8.0));

        let expected_subtotal: f64 = lines.iter().map(|l| l.quantity * l.unit_price).sum();
        assert!((totals.subtotal - expected_subtotal).abs() < 1e-9);
        assert!(
            (totals.total - (totals.subtotal - totals.discount_amount + totals.tax_amount)).abs()
                < 1e-9
        );
        assert!(totals.total >= 0.0);
    }

    #[test]
    fn non_finite_inputs_count_as_zero() {
        let totals = calculate(
            [Line::new(f64::NAN, 10.0), Line::new(2.0, f64::INFINITY), Line::new(1.0, 3.0)],
            Adjustment::percentage(f64::NAN),
            Adjustment::fixed(f64::NEG_INFINITY),
        );
        assert_eq!(totals.subtotal, 3.0);
        assert_eq!(totals.discount_amount, 0.0);
        assert_eq!(totals.tax_amount, 0.0);
        assert_eq!(totals.total, 3.0);
    }

    #[test]
    fn empty_document_totals_zero() {
        let totals = calculate(
            Vec::<Line>::new(),
            Adjustment::percentage(10.0),
            Adjustment::percentage(5.0),
        );
        assert_eq!(totals, Totals::default());
    }
}
