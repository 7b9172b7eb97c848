//! Bill computation for a service entry.
//!
//! Pure functions only: given line amounts, a discount and a tax rate they
//! produce the bill figures. Persisting the result is the engine's job, so
//! these stay trivially testable.

use crate::{EngineError, Money, ResultEngine};

/// Default GST rate, in basis points (18%).
pub const DEFAULT_TAX_RATE_BPS: u32 = 1800;

/// One billable line: unit price and quantity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BillLine {
    pub price: Money,
    pub quantity: i64,
}

impl BillLine {
    #[must_use]
    pub const fn new(price: Money, quantity: i64) -> Self {
        Self { price, quantity }
    }
}

/// Figures of a computed bill.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BillTotals {
    pub subtotal: Money,
    pub tax_amount: Money,
    /// Subtotal plus tax, before discount.
    pub total_amount: Money,
    pub discount: Money,
}

impl BillTotals {
    /// The amount actually owed: `total_amount - discount`.
    #[must_use]
    pub fn total_due(&self) -> Money {
        self.total_amount - self.discount
    }
}

/// Amounts of a split-tender payment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SplitPayment {
    pub cash: Money,
    pub upi: Money,
    pub card: Money,
}

impl SplitPayment {
    #[must_use]
    pub fn total(&self) -> Money {
        self.cash + self.upi + self.card
    }
}

/// Computes subtotal, tax and total for a set of bill lines.
///
/// The discount is validated against `0 <= discount <= subtotal + tax` and
/// carried in the result; it is the caller's decision whether to subtract it
/// (billing completion does, plain item recomputation does not). Out-of-range
/// values are rejected, never clamped.
pub fn compute_totals(
    lines: &[BillLine],
    discount: Money,
    tax_rate_bps: u32,
) -> ResultEngine<BillTotals> {
    let mut subtotal = Money::ZERO;
    for line in lines {
        if line.quantity < 1 {
            return Err(EngineError::Validation(format!(
                "quantity must be >= 1, got {}",
                line.quantity
            )));
        }
        if line.price.is_negative() {
            return Err(EngineError::Validation(format!(
                "price must not be negative, got {}",
                line.price
            )));
        }
        let amount = line
            .price
            .checked_mul(line.quantity)
            .and_then(|amount| subtotal.checked_add(amount))
            .ok_or_else(|| EngineError::Validation("bill amount overflow".to_string()))?;
        subtotal = amount;
    }

    let tax_amount = subtotal
        .portion_bps(tax_rate_bps)
        .ok_or_else(|| EngineError::Validation("bill amount overflow".to_string()))?;
    let total_amount = subtotal
        .checked_add(tax_amount)
        .ok_or_else(|| EngineError::Validation("bill amount overflow".to_string()))?;

    if discount.is_negative() || discount > total_amount {
        return Err(EngineError::Validation(format!(
            "discount {discount} outside 0..={total_amount}"
        )));
    }

    Ok(BillTotals {
        subtotal,
        tax_amount,
        total_amount,
        discount,
    })
}

/// Checks that the split amounts cover the bill exactly.
///
/// Amounts are integer paise, so equality is exact; there is no rounding
/// tolerance to allow.
pub fn validate_split_payment(split: &SplitPayment, bill_total: Money) -> ResultEngine<()> {
    for (tender, amount) in [
        ("cash", split.cash),
        ("upi", split.upi),
        ("card", split.card),
    ] {
        if amount.is_negative() {
            return Err(EngineError::Validation(format!(
                "split {tender} amount must not be negative"
            )));
        }
    }

    if split.total() != bill_total {
        return Err(EngineError::Validation(format!(
            "split payments {} do not match bill total {bill_total}",
            split.total()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(price: i64, quantity: i64) -> BillLine {
        BillLine::new(Money::new(price), quantity)
    }

    #[test]
    fn totals_with_default_tax() {
        let totals =
            compute_totals(&[line(50_000, 1)], Money::ZERO, DEFAULT_TAX_RATE_BPS).unwrap();
        assert_eq!(totals.subtotal, Money::new(50_000));
        assert_eq!(totals.tax_amount, Money::new(9_000));
        assert_eq!(totals.total_amount, Money::new(59_000));
        assert_eq!(totals.total_due(), Money::new(59_000));
    }

    #[test]
    fn discount_is_carried_not_subtracted() {
        let totals =
            compute_totals(&[line(10_000, 2)], Money::new(2_000), DEFAULT_TAX_RATE_BPS).unwrap();
        assert_eq!(totals.total_amount, Money::new(23_600));
        assert_eq!(totals.discount, Money::new(2_000));
        assert_eq!(totals.total_due(), Money::new(21_600));
    }

    #[test]
    fn discount_above_total_is_rejected() {
        // 2 x ₹100.00 -> subtotal ₹200.00, tax ₹36.00, total ₹236.00.
        let err =
            compute_totals(&[line(10_000, 2)], Money::new(25_000), DEFAULT_TAX_RATE_BPS)
                .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[test]
    fn negative_discount_is_rejected() {
        let err = compute_totals(&[line(100, 1)], Money::new(-1), DEFAULT_TAX_RATE_BPS)
            .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[test]
    fn tax_on_a_huge_subtotal_is_rejected_not_panicked() {
        // A single absurd but in-range price must come back as a validation
        // error once tax no longer fits, not abort the process.
        let err = compute_totals(&[line(i64::MAX / 1000, 1)], Money::ZERO, DEFAULT_TAX_RATE_BPS)
            .unwrap_err();
        assert_eq!(
            err,
            EngineError::Validation("bill amount overflow".to_string())
        );
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let err = compute_totals(&[line(100, 0)], Money::ZERO, DEFAULT_TAX_RATE_BPS).unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[test]
    fn split_payment_must_sum_to_total() {
        let split = SplitPayment {
            cash: Money::new(30_000),
            upi: Money::new(20_000),
            card: Money::ZERO,
        };
        assert!(validate_split_payment(&split, Money::new(50_000)).is_ok());

        let short = SplitPayment {
            cash: Money::new(30_000),
            upi: Money::new(15_000),
            card: Money::ZERO,
        };
        assert!(validate_split_payment(&short, Money::new(50_000)).is_err());
    }

    #[test]
    fn split_payment_rejects_negative_tender() {
        let split = SplitPayment {
            cash: Money::new(60_000),
            upi: Money::new(-10_000),
            card: Money::ZERO,
        };
        assert!(validate_split_payment(&split, Money::new(50_000)).is_err());
    }
}
