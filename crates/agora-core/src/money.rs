//! # Money Module
//!
//! Monetary values and percentage rates for cart arithmetic.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In the JavaScript storefront this engine replaces:                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌                                  │
//! │                                                                         │
//! │  A cart total must be a deterministic function of its inputs.           │
//! │  Accumulating floats across subtotal → discount → fee → shipping        │
//! │  makes "same cart, same total" a property that only holds up to an      │
//! │  epsilon.                                                               │
//! │                                                                         │
//! │  OUR SOLUTION: integer minor units (cents) everywhere, rates in         │
//! │  basis points. Equality of totals is exact.                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use agora_core::money::{Money, Rate};
//!
//! let subtotal = Money::from_minor(50_000);      // 500.00
//! let discounted = subtotal.less(Rate::from_percent(10)); // 450.00
//! let fee = discounted.portion(Rate::from_bps(300));      // 3% escrow fee
//! assert_eq!((discounted + fee).minor(), 46_350);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary amount in the smallest unit of its currency (cents for USD).
///
/// The currency itself is tracked once per aggregate, not per amount; every
/// `Money` inside one cart is denominated in the aggregate's buyer currency
/// (or, for the seller-price passthrough, the seller currency).
///
/// ## Design Decisions
/// - **i64 (signed)**: discounts and corrections can go negative transiently
/// - **Single-field tuple struct**: zero-cost wrapper over i64
/// - **No float constructor**: amounts enter the engine already in minor units
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units (cents).
    #[inline]
    pub const fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    /// Creates a Money value from major and minor units.
    ///
    /// For negative amounts only the major unit carries the sign:
    /// `from_major_minor(-5, 50)` is -5.50, not -4.50.
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn minor(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion (truncated toward zero).
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit remainder (always 0-99).
    #[inline]
    pub const fn minor_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Zero amount.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies the amount by a line-item quantity.
    #[inline]
    pub const fn times(&self, quantity: u32) -> Self {
        Money(self.0 * quantity as i64)
    }

    /// Returns the given rate's portion of this amount, rounded to the
    /// nearest minor unit (half away from zero).
    ///
    /// This is the single rounding point in the engine: discount amounts and
    /// payment surcharges both go through here, so the worked checkout
    /// examples come out exact.
    ///
    /// ```rust
    /// use agora_core::money::{Money, Rate};
    ///
    /// let discounted = Money::from_minor(45_000);     // 450.00
    /// let fee = discounted.portion(Rate::from_bps(300)); // 3%
    /// assert_eq!(fee.minor(), 1_350);                 // 13.50
    /// ```
    pub fn portion(&self, rate: Rate) -> Money {
        // i128 intermediate prevents overflow on large carts
        let half = if self.0 >= 0 { 5000 } else { -5000 };
        let minor = (self.0 as i128 * rate.bps() as i128 + half) / 10_000;
        Money(minor as i64)
    }

    /// Returns this amount reduced by the given rate.
    ///
    /// `less(r)` and `portion(r)` always partition the amount exactly:
    /// `m.less(r) + m.portion(r) == m`.
    pub fn less(&self, rate: Rate) -> Money {
        *self - self.portion(rate)
    }
}

// =============================================================================
// Rate Type
// =============================================================================

/// A percentage rate in basis points (1 bps = 0.01%).
///
/// Used for whole-cart voucher discounts and payment-method surcharges.
/// Basis points keep sub-percent rates (like a 2% crypto fee vs a possible
/// future 2.5%) exact without floats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Rate(u32);

/// Vouchers are expressed in whole percent and capped at 100%.
pub const MAX_RATE_BPS: u32 = 10_000;

impl Rate {
    /// Creates a rate from basis points, saturating at 100%.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        if bps > MAX_RATE_BPS {
            Rate(MAX_RATE_BPS)
        } else {
            Rate(bps)
        }
    }

    /// Creates a rate from a whole percentage (10 → 10%).
    #[inline]
    pub const fn from_percent(percent: u32) -> Self {
        Rate::from_bps(percent * 100)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage, for display only.
    #[inline]
    pub fn percent(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    #[inline]
    pub const fn zero() -> Self {
        Rate(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for Rate {
    fn default() -> Self {
        Rate::zero()
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Debug-oriented display; the storefront formats amounts with its own
/// locale-aware `formatCurrency`, never with this.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor_part())
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

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_minor() {
        let money = Money::from_minor(1099);
        assert_eq!(money.minor(), 1099);
        assert_eq!(money.major(), 10);
        assert_eq!(money.minor_part(), 99);
    }

    #[test]
    fn test_from_major_minor() {
        assert_eq!(Money::from_major_minor(10, 99).minor(), 1099);
        assert_eq!(Money::from_major_minor(-5, 50).minor(), -550);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_minor(1099)), "10.99");
        assert_eq!(format!("{}", Money::from_minor(500)), "5.00");
        assert_eq!(format!("{}", Money::from_minor(-550)), "-5.50");
        assert_eq!(format!("{}", Money::from_minor(0)), "0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_minor(1000);
        let b = Money::from_minor(500);

        assert_eq!((a + b).minor(), 1500);
        assert_eq!((a - b).minor(), 500);
        assert_eq!((a * 3).minor(), 3000);
        assert_eq!(a.times(4).minor(), 4000);
    }

    #[test]
    fn test_rate_constructors() {
        assert_eq!(Rate::from_percent(10).bps(), 1000);
        assert_eq!(Rate::from_bps(300).percent(), 3.0);
        // saturates at 100%
        assert_eq!(Rate::from_percent(250).bps(), MAX_RATE_BPS);
        assert!(Rate::zero().is_zero());
    }

    #[test]
    fn test_portion_basic() {
        // 500.00 at 3% = 15.00
        let amount = Money::from_minor(50_000);
        assert_eq!(amount.portion(Rate::from_percent(3)).minor(), 1500);
    }

    #[test]
    fn test_portion_rounds_half_away_from_zero() {
        // 10.01 at 2% = 0.2002 → 0.20; 12.49 at 2% = 0.2498 → 0.25
        assert_eq!(Money::from_minor(1001).portion(Rate::from_bps(200)).minor(), 20);
        assert_eq!(Money::from_minor(1249).portion(Rate::from_bps(200)).minor(), 25);
        // negative amounts round symmetrically
        assert_eq!(Money::from_minor(-1249).portion(Rate::from_bps(200)).minor(), -25);
    }

    #[test]
    fn test_less_and_portion_partition_exactly() {
        let amount = Money::from_minor(33_333);
        let rate = Rate::from_bps(275);
        assert_eq!(amount.less(rate) + amount.portion(rate), amount);
    }

    #[test]
    fn test_discount_example_from_checkout() {
        // subtotal 500.00, 10% voucher → 450.00
        let subtotal = Money::from_minor(50_000);
        assert_eq!(subtotal.less(Rate::from_percent(10)).minor(), 45_000);
    }
}
