//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Integer Cents, Rounded Up
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  WHERE FLOATS STOP                                                      │
//! │                                                                         │
//! │  Catering math multiplies dollar rates by fractions (grams of ice per   │
//! │  cup, litres of fuel) and runs in f64. The moment a value is shown to  │
//! │  a customer it becomes integer cents:                                   │
//! │                                                                         │
//! │    19.500000000000004 ──► ceil(1950.0000000000005) ──► 1951 cents      │
//! │                                                                         │
//! │  Conversion ALWAYS rounds up (never to nearest) so the seller never    │
//! │  under-charges. After that, everything is integer arithmetic.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use mehfil_core::money::Money;
//!
//! let price = Money::from_cents(1299); // $12.99
//! let line = price.multiply_quantity(2);
//! assert_eq!(line.cents(), 2598);
//!
//! let ice = Money::round_up_from_dollars(0.2925);
//! assert_eq!(ice.cents(), 30);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: arithmetic on differences stays well-defined
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Serialized as cents**: the frontend formats for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use mehfil_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // Represents $10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Converts a computed dollar amount to cents, rounding UP.
    ///
    /// This is `ceil(value × 100)`: the result is never less than the
    /// unrounded value. Non-finite input (NaN, ±∞) yields zero.
    ///
    /// ## Example
    /// ```rust
    /// use mehfil_core::money::Money;
    ///
    /// assert_eq!(Money::round_up_from_dollars(4.0).cents(), 400);
    /// assert_eq!(Money::round_up_from_dollars(0.6300000000000001).cents(), 64);
    /// assert_eq!(Money::round_up_from_dollars(f64::NAN).cents(), 0);
    /// ```
    pub fn round_up_from_dollars(dollars: f64) -> Self {
        if !dollars.is_finite() {
            return Money::zero();
        }
        Money((dollars * 100.0).ceil() as i64)
    }

    /// Converts a stored dollar amount to cents, rounding to the nearest cent.
    ///
    /// Only used when adapting records that were written with float dollar
    /// amounts (e.g. `amount: 25`). Pricing never goes through here.
    pub fn from_stored_dollars(dollars: f64) -> Self {
        if !dollars.is_finite() {
            return Money::zero();
        }
        Money((dollars * 100.0).round() as i64)
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (dollars) portion.
    ///
    /// ## Example
    /// ```rust
    /// use mehfil_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(1099).dollars(), 10);
    /// ```
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (cents) portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use mehfil_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(1499); // $14.99 bag of beans
    /// assert_eq!(unit_price.multiply_quantity(3).cents(), 4497);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}${}.{:02}",
            sign,
            self.dollars().abs(),
            self.cents_part()
        )
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

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.dollars(), 10);
        assert_eq!(money.cents_part(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "$10.99");
        assert_eq!(format!("{}", Money::from_cents(500)), "$5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-$5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "$0.00");
    }

    #[test]
    fn test_round_up_never_rounds_down() {
        assert_eq!(Money::round_up_from_dollars(0.2925).cents(), 30);
        assert_eq!(Money::round_up_from_dollars(27.300000000000004).cents(), 2731);
        assert_eq!(Money::round_up_from_dollars(0.01).cents(), 1);
        assert_eq!(Money::round_up_from_dollars(200.0).cents(), 20000);
        assert_eq!(Money::round_up_from_dollars(0.0).cents(), 0);
    }

    #[test]
    fn test_round_up_non_finite_is_zero() {
        assert!(Money::round_up_from_dollars(f64::NAN).is_zero());
        assert!(Money::round_up_from_dollars(f64::INFINITY).is_zero());
    }

    #[test]
    fn test_stored_dollars_round_to_nearest() {
        assert_eq!(Money::from_stored_dollars(25.0).cents(), 2500);
        assert_eq!(Money::from_stored_dollars(12.99).cents(), 1299);
    }

    #[test]
    fn test_arithmetic_and_sum() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((a * 3).cents(), 3000);

        let total: Money = vec![a, b, b].into_iter().sum();
        assert_eq!(total.cents(), 2000);
    }
}
