//! # Money Module
//!
//! Integer money for challan amounts.
//!
//! All monetary values are paise (1/100 rupee) held in an `i64`. Floats
//! appear only at the input boundary (`from_rupees`, for form fields) and
//! are rounded half away from zero exactly once. Line amounts are computed
//! on the aggregated quantity, never per unit, so totals cannot drift by a
//! paisa across sets.
//!
//! ## Usage
//! ```rust
//! use challan_core::money::{line_amounts, Money};
//! use challan_core::types::TaxRate;
//!
//! let rate = Money::from_rupees(1250.50);
//! let amounts = line_amounts(rate, 6, TaxRate::from_bps(1800));
//!
//! assert_eq!(amounts.taxable.paise(), 750_300);
//! assert_eq!(amounts.tax.paise(), 135_054);
//! assert_eq!(amounts.total.paise(), 885_354);
//! ```

use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};

use serde::{Deserialize, Serialize};

use crate::types::TaxRate;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in paise (smallest currency unit).
///
/// Signed so that corrections and reversals can be represented.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from paise.
    #[inline]
    pub const fn from_paise(paise: i64) -> Self {
        Money(paise)
    }

    /// Creates a Money value from a rupee amount, rounding half away from
    /// zero to whole paise. This is the only place a float becomes money.
    pub fn from_rupees(rupees: f64) -> Self {
        Money((rupees * 100.0).round() as i64)
    }

    /// Returns the value in paise.
    #[inline]
    pub const fn paise(&self) -> i64 {
        self.0
    }

    /// Returns the value in rupees (display only).
    #[inline]
    pub fn rupees(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Multiplies by a unit count (quantity), saturating on overflow.
    #[inline]
    pub const fn times(&self, quantity: i64) -> Self {
        Money(self.0.saturating_mul(quantity))
    }

    /// Computes tax on this amount at the given rate.
    ///
    /// Integer math in paise·bps, rounded half away from zero to whole
    /// paise in a single step.
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        let numerator = self.0 as i128 * rate.bps() as i128;
        let denominator = 10_000i128;

        let quotient = numerator / denominator;
        let remainder = numerator % denominator;
        let rounded = if remainder.abs() * 2 >= denominator {
            quotient + numerator.signum()
        } else {
            quotient
        };

        Money(rounded as i64)
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

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Money) {
        *self = *self - rhs;
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

// =============================================================================
// Line Amounts
// =============================================================================

/// Taxable / tax / total amounts for one challan line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineAmounts {
    pub taxable: Money,
    pub tax: Money,
    pub total: Money,
}

impl LineAmounts {
    /// All-zero amounts, used for official-challan lines.
    pub const fn zero() -> Self {
        LineAmounts {
            taxable: Money::zero(),
            tax: Money::zero(),
            total: Money::zero(),
        }
    }
}

/// Computes the amounts for a line carrying `quantity` units at `rate`.
///
/// taxable = rate × quantity (exact in paise), tax = taxable at `tax_rate`
/// rounded once on the aggregate, total = taxable + tax.
pub fn line_amounts(rate: Money, quantity: i64, tax_rate: TaxRate) -> LineAmounts {
    let taxable = rate.times(quantity);
    let tax = taxable.calculate_tax(tax_rate);

    LineAmounts {
        taxable,
        tax,
        total: taxable + tax,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
