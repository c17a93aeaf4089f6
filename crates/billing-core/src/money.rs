//! # Money Module
//!
//! Provides the `Money` type for balances, rates and document totals.
//!
//! ## Why Decimal Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  A party balance is a running sum of thousands of documents.            │
//! │  Float drift accumulates and "create then delete" stops restoring       │
//! │  the original balance exactly.                                          │
//! │                                                                         │
//! │  OUR SOLUTION: rust_decimal::Decimal                                    │
//! │    Exact base-10 arithmetic, 28 significant digits, signed.             │
//! │    quantity (kg, fractional) × rate stays exact.                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use billing_core::money::Money;
//! use billing_core::units::Kilograms;
//! use rust_decimal::Decimal;
//!
//! let rate = Money::new(Decimal::new(2550, 2)); // 25.50 per kg
//! let total = Money::line_total(Kilograms::new(Decimal::from(90)), rate);
//! assert_eq!(total, Some(Money::new(Decimal::new(229500, 2))));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

use crate::units::Kilograms;

// =============================================================================
// Money Type
// =============================================================================

/// A signed monetary value (rupees, with paise as the fractional part).
///
/// ## Design Decisions
/// - **Signed**: party balances go negative when we owe the party
/// - **No implicit rounding**: `quantity × rate` is kept exact; rounding is a
///   display concern only
/// - **Transparent serde**: serialized exactly like the inner `Decimal`
///
/// ## Where Money Flows
/// ```text
/// LineItem.rate × LineItem.quantity ──► LineItem.total
///                                            │
///                                   Σ ───────┘
///                                   ▼
///                            Sale.totalAmount ──► Party.balance (+)
///                        Purchase.totalAmount ──► Party.balance (−)
///                              Payment.amount ──► Party.balance (±)
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Wraps a decimal amount.
    #[inline]
    pub const fn new(amount: Decimal) -> Self {
        Money(amount)
    }

    /// Zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    /// Returns the inner decimal amount.
    #[inline]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Checks if the value is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Checks if the value is strictly greater than zero.
    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Checks if the value is strictly less than zero.
    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// Returns the absolute value.
    #[inline]
    pub fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// `self + other`, or `None` if the sum leaves `Decimal` range.
    #[inline]
    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    /// `self - other`, or `None` if the difference leaves `Decimal` range.
    #[inline]
    pub fn checked_sub(self, other: Money) -> Option<Money> {
        self.0.checked_sub(other.0).map(Money)
    }

    /// Line total: quantity (kg) × rate (per kg).
    ///
    /// `None` when the product does not fit in a `Decimal`.
    ///
    /// ## Example
    /// ```rust
    /// use billing_core::money::Money;
    /// use billing_core::units::Kilograms;
    /// use rust_decimal::Decimal;
    ///
    /// let total = Money::line_total(
    ///     Kilograms::new(Decimal::new(125, 1)), // 12.5 kg
    ///     Money::new(Decimal::from(40)),
    /// );
    /// assert_eq!(total.map(|t| t.amount()), Some(Decimal::from(500)));
    ///
    /// let huge = Kilograms::new(Decimal::MAX);
    /// assert_eq!(Money::line_total(huge, Money::new(Decimal::TWO)), None);
    /// ```
    #[inline]
    pub fn line_total(quantity: Kilograms, rate: Money) -> Option<Money> {
        quantity.value().checked_mul(rate.0).map(Money)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows the amount with two decimal places, e.g. `₹1250.50`.
///
/// ## Note
/// Display only. Stored and serialized values keep full precision.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.is_negative() { "-" } else { "" };
        write!(f, "{}₹{:.2}", sign, self.0.abs().round_dp(2))
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Money(amount)
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

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
