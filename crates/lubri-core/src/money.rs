//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    200 × 0.9 × 1.18 = 212.39999999999998  ❌ WRONG!                     │
//! │                                                                         │
//! │  Summing itemized lines drifts away from the global-mode total          │
//! │  one ulp at a time.                                                     │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Paise                                            │
//! │    20000 paise - 2000 = 18000, + 3240 tax = 21240 paise (₹212.40)       │
//! │    Every intermediate value is exact; rounding happens at one place    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use lubri_core::money::Money;
//!
//! let price = Money::from_paise(10000); // ₹100.00
//! let line = price * 2;                 // ₹200.00
//! assert_eq!(line.paise(), 20000);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use ts_rs::TS;

use crate::types::Rate;

/// Basis points in one whole (100%).
const BPS_SCALE: i128 = 10_000;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (paise).
///
/// ## Design Decisions
/// - **i64 (signed)**: Negative values appear for ledger balances and for
///   negative discounts, which are deliberately not clamped on input
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Transparent in SQLite**: Stored as an `INTEGER` column
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Product.price ──► CartLine.unit_price ──► LineBreakdown.base          │
/// │                                                                         │
/// │  BillTotals.total ──► Bill.total_amount ──► LedgerEntry.amount         │
/// │                                   │                                     │
/// │                                   └──► Bill.amount_paid / balance_due   │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from paise (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use lubri_core::money::Money;
    ///
    /// let price = Money::from_paise(1099); // ₹10.99
    /// assert_eq!(price.paise(), 1099);
    /// ```
    #[inline]
    pub const fn from_paise(paise: i64) -> Self {
        Money(paise)
    }

    /// Creates a Money value from rupees and paise.
    ///
    /// ## Example
    /// ```rust
    /// use lubri_core::money::Money;
    ///
    /// let price = Money::from_major_minor(212, 40);
    /// assert_eq!(price.paise(), 21240);
    ///
    /// let negative = Money::from_major_minor(-5, 50);
    /// assert_eq!(negative.paise(), -550);
    /// ```
    ///
    /// ## Note
    /// For negative amounts, only the major unit should be negative.
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in paise.
    #[inline]
    pub const fn paise(&self) -> i64 {
        self.0
    }

    /// Returns the whole-rupee portion.
    #[inline]
    pub const fn rupees(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the paise portion (always 0-99).
    #[inline]
    pub const fn paise_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Floors the value at zero.
    ///
    /// This is the only clamp the billing engine applies: the amount left
    /// after a discount can never go below nothing.
    ///
    /// ```rust
    /// use lubri_core::money::Money;
    ///
    /// assert_eq!(Money::from_paise(-300).max_zero(), Money::zero());
    /// assert_eq!(Money::from_paise(300).max_zero().paise(), 300);
    /// ```
    #[inline]
    pub fn max_zero(self) -> Self {
        Money(self.0.max(0))
    }

    /// Adds two amounts, `None` if the sum leaves `i64`.
    ///
    /// ```rust
    /// use lubri_core::money::Money;
    ///
    /// assert_eq!(Money::from_paise(5).checked_add(Money::from_paise(7)), Some(Money::from_paise(12)));
    /// assert_eq!(Money::from_paise(i64::MAX).checked_add(Money::from_paise(1)), None);
    /// ```
    #[inline]
    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    /// Multiplies money by a quantity.
    ///
    /// ```rust
    /// use lubri_core::money::Money;
    ///
    /// let unit_price = Money::from_paise(45000); // ₹450 per litre
    /// assert_eq!(unit_price.multiply_quantity(3).paise(), 135000);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Returns `rate` percent of this amount, rounded half-up to the paisa.
    ///
    /// ## Rounding
    /// Half-up here means half away from zero, so `-0.5` paise becomes `-1`.
    /// Integer math: `(amount × bps ± 5000) / 10000`, computed in i128 so a
    /// large amount times a large rate cannot overflow.
    ///
    /// ## Example
    /// ```rust
    /// use lubri_core::money::Money;
    /// use lubri_core::types::Rate;
    ///
    /// let base = Money::from_paise(20000);            // ₹200.00
    /// let ten_percent = base.percent_of(Rate::from_bps(1000));
    /// assert_eq!(ten_percent.paise(), 2000);           // ₹20.00
    ///
    /// // ₹0.05 at 50% = 2.5 paise → 3 paise
    /// assert_eq!(Money::from_paise(5).percent_of(Rate::from_bps(5000)).paise(), 3);
    /// ```
    pub fn percent_of(&self, rate: Rate) -> Money {
        self.apply_bps(rate.bps() as i64)
    }

    /// Like [`Money::percent_of`] but accepts signed basis points.
    ///
    /// Percent discounts are not clamped on input, so a negative percentage
    /// must resolve to a negative amount with the same rounding.
    pub fn apply_bps(&self, bps: i64) -> Money {
        let scaled = self.0 as i128 * bps as i128;
        Money::from_paise(div_round_half_up(scaled, BPS_SCALE) as i64)
    }

    /// Calculates tax on this amount at the given rate.
    ///
    /// ## User Workflow
    /// ```text
    /// After discount: ₹180.00
    ///      │
    ///      ▼
    /// calculate_tax(18% GST) ← THIS FUNCTION
    ///      │
    ///      ▼
    /// Tax: ₹32.40
    /// ```
    #[inline]
    pub fn calculate_tax(&self, rate: Rate) -> Money {
        self.percent_of(rate)
    }
}

/// Integer division rounding halves away from zero.
fn div_round_half_up(numerator: i128, denominator: i128) -> i128 {
    let half = denominator / 2;
    if numerator >= 0 {
        (numerator + half) / denominator
    } else {
        (numerator - half) / denominator
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// ## Note
/// This is for logs and the seed report. The UI formats with the shop's
/// configured currency symbol.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}₹{}.{:02}", sign, self.rupees().abs(), self.paise_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

/// Multiplication by a quantity.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + *m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_paise() {
        let money = Money::from_paise(1099);
        assert_eq!(money.paise(), 1099);
        assert_eq!(money.rupees(), 10);
        assert_eq!(money.paise_part(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_paise(21240)), "₹212.40");
        assert_eq!(format!("{}", Money::from_paise(500)), "₹5.00");
        assert_eq!(format!("{}", Money::from_paise(-550)), "-₹5.50");
        assert_eq!(format!("{}", Money::zero()), "₹0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_paise(1000);
        let b = Money::from_paise(500);

        assert_eq!((a + b).paise(), 1500);
        assert_eq!((a - b).paise(), 500);
        assert_eq!((-a).paise(), -1000);
        assert_eq!((a * 3).paise(), 3000);

        let total: Money = [a, b, b].iter().sum();
        assert_eq!(total.paise(), 2000);
    }

    #[test]
    fn test_percent_of_exact() {
        let base = Money::from_paise(18000);
        assert_eq!(base.percent_of(Rate::from_bps(1800)).paise(), 3240);
    }

    #[test]
    fn test_percent_of_rounds_half_up() {
        // ₹10.00 at 8.25% = 82.5 paise → 83
        assert_eq!(Money::from_paise(1000).percent_of(Rate::from_bps(825)).paise(), 83);
        // 1 paisa at 50% = 0.5 → 1
        assert_eq!(Money::from_paise(1).percent_of(Rate::from_bps(5000)).paise(), 1);
        // 1 paisa at 49.99% → 0
        assert_eq!(Money::from_paise(1).percent_of(Rate::from_bps(4999)).paise(), 0);
    }

    #[test]
    fn test_percent_of_negative_rounds_away_from_zero() {
        assert_eq!(Money::from_paise(-1).percent_of(Rate::from_bps(5000)).paise(), -1);
    }

    #[test]
    fn test_percent_of_large_amount_does_not_overflow() {
        let big = Money::from_paise(i64::MAX / 2);
        let tax = big.percent_of(Rate::from_bps(10_000));
        assert_eq!(tax, big);
    }

    #[test]
    fn test_max_zero() {
        assert_eq!(Money::from_paise(-1).max_zero(), Money::zero());
        assert_eq!(Money::from_paise(0).max_zero(), Money::zero());
        assert_eq!(Money::from_paise(7).max_zero().paise(), 7);
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        let negative = Money::from_paise(-100);
        assert!(negative.is_negative());
        assert_eq!(negative.abs().paise(), 100);
    }
}
