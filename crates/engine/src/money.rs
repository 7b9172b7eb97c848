use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
};

/// Money amount represented as **integer paise** (minor units).
///
/// Use this type for **all** monetary values in the engine (prices, totals,
/// advances) to avoid floating-point drift.
///
/// # Examples
///
/// ```rust
/// use engine::Money;
///
/// let amount = Money::new(12_34);
/// assert_eq!(amount.minor(), 1234);
/// assert_eq!(amount.to_string(), "₹12.34");
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Creates a new amount from integer paise.
    #[must_use]
    pub const fn new(minor: i64) -> Self {
        Self(minor)
    }

    /// Returns the raw value in paise.
    #[must_use]
    pub const fn minor(self) -> i64 {
        self.0
    }

    /// Returns `true` if the amount is 0.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if the amount is negative.
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

    /// Checked multiplication by a unitless quantity.
    #[must_use]
    pub fn checked_mul(self, quantity: i64) -> Option<Money> {
        self.0.checked_mul(quantity).map(Money)
    }

    /// Returns the given fraction of the amount, expressed in basis points
    /// (1 bps = 0.01%), rounded half-up. `None` when the result does not
    /// fit in an `i64`.
    ///
    /// Used for tax computation: `Money::new(50_000).portion_bps(1800)` is
    /// 18% of ₹500.00, i.e. ₹90.00.
    #[must_use]
    pub const fn portion_bps(self, bps: u32) -> Option<Money> {
        let widened = (self.0 as i128 * bps as i128 + 5_000) / 10_000;
        if widened < i64::MIN as i128 || widened > i64::MAX as i128 {
            return None;
        }
        Some(Money(widened as i64))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let rupees = abs / 100;
        let paise = abs % 100;
        write!(f, "{sign}₹{rupees}.{paise:02}")
    }
}

impl From<i64> for Money {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<Money> for i64 {
    fn from(value: Money) -> Self {
        value.0
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Self::Output {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Self::Output {
        Money(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Money) {
        self.0 -= rhs.0;
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Self::Output {
        Money(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, Add::add)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats_inr() {
        assert_eq!(Money::new(0).to_string(), "₹0.00");
        assert_eq!(Money::new(1).to_string(), "₹0.01");
        assert_eq!(Money::new(10).to_string(), "₹0.10");
        assert_eq!(Money::new(1050).to_string(), "₹10.50");
        assert_eq!(Money::new(-1050).to_string(), "-₹10.50");
    }

    #[test]
    fn portion_bps_rounds_half_up() {
        // 18% of ₹500.00 is ₹90.00.
        assert_eq!(Money::new(50_000).portion_bps(1800), Some(Money::new(9_000)));
        // 18% of ₹0.01 is 0.18 paise, rounds to 0.
        assert_eq!(Money::new(1).portion_bps(1800), Some(Money::ZERO));
        // 18% of ₹0.03 is 0.54 paise, rounds to 1.
        assert_eq!(Money::new(3).portion_bps(1800), Some(Money::new(1)));
        assert_eq!(Money::new(100).portion_bps(0), Some(Money::ZERO));
    }

    #[test]
    fn portion_bps_reports_overflow() {
        assert_eq!(Money::new(i64::MAX / 1000).portion_bps(1800), None);
        assert_eq!(Money::new(i64::MAX).portion_bps(10_000), Some(Money::new(i64::MAX)));
    }

    #[test]
    fn sum_over_line_amounts() {
        let total: Money = [Money::new(500), Money::new(250), Money::new(250)]
            .into_iter()
            .sum();
        assert_eq!(total, Money::new(1000));
    }
}
