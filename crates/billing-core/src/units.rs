//! # Quantity Units
//!
//! Transaction lines are weighed in kilograms; stock is counted in bags.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  LineItem.quantity (kg) ──► ÷ 30 ──► Bags ──► Item.openingStock ± Δ    │
//! │                                                                         │
//! │  Σ LineItem.quantity (kg) ──► ÷ 30 ──► Bags ──► Bardana.openingStock ± Δ│
//! │                                                                         │
//! │  Stock never goes below zero: a decrease past zero clamps to 0 and the  │
//! │  shortfall is dropped.                                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Sub};

/// Fixed conversion: one bag holds 30 kg.
pub const KG_PER_BAG: u32 = 30;

/// Decimal places kept on a converted bag figure.
///
/// Stock plus or minus a delta at this scale stays exact, so a movement and
/// its reversal restore the stored value digit for digit.
pub const BAG_SCALE: u32 = 12;

// =============================================================================
// Kilograms
// =============================================================================

/// A weight in kilograms, as entered on a sale or purchase line.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Kilograms(Decimal);

impl Kilograms {
    #[inline]
    pub const fn new(kg: Decimal) -> Self {
        Kilograms(kg)
    }

    #[inline]
    pub const fn zero() -> Self {
        Kilograms(Decimal::ZERO)
    }

    #[inline]
    pub const fn value(&self) -> Decimal {
        self.0
    }

    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Converts to bags at [`KG_PER_BAG`], rounded to [`BAG_SCALE`] places.
    ///
    /// ## Example
    /// ```rust
    /// use billing_core::units::Kilograms;
    /// use rust_decimal::Decimal;
    ///
    /// let bags = Kilograms::new(Decimal::from(90)).to_bags();
    /// assert_eq!(bags.value(), Decimal::from(3));
    ///
    /// let bags = Kilograms::new(Decimal::from(10)).to_bags();
    /// assert_eq!(bags.value().to_string(), "0.333333333333");
    /// ```
    pub fn to_bags(self) -> Bags {
        Bags((self.0 / Decimal::from(KG_PER_BAG)).round_dp(BAG_SCALE).normalize())
    }
}

impl Add for Kilograms {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Kilograms(self.0 + other.0)
    }
}

impl Sub for Kilograms {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Kilograms(self.0 - other.0)
    }
}

impl Sum for Kilograms {
    fn sum<I: Iterator<Item = Kilograms>>(iter: I) -> Self {
        iter.fold(Kilograms::zero(), Add::add)
    }
}

impl fmt::Display for Kilograms {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}kg", self.0.normalize())
    }
}

// =============================================================================
// Bags
// =============================================================================

/// A stock level or stock delta, in bags.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Bags(Decimal);

impl Bags {
    #[inline]
    pub const fn new(bags: Decimal) -> Self {
        Bags(bags)
    }

    #[inline]
    pub const fn zero() -> Self {
        Bags(Decimal::ZERO)
    }

    #[inline]
    pub const fn value(&self) -> Decimal {
        self.0
    }

    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// Same value without trailing zeros (`10.50` becomes `10.5`).
    #[inline]
    pub fn normalized(self) -> Bags {
        Bags(self.0.normalize())
    }

    /// Applies a stock movement and clamps the result at zero.
    ///
    /// ## Clamping
    /// ```text
    /// stock = 2 bags, decrease 3 bags
    ///      │
    ///      ▼
    /// 2 - 3 = -1 ──► clamp ──► 0   (the missing bag is NOT carried over)
    /// ```
    ///
    /// The result is normalized so repeated moves do not pile up trailing
    /// zeros in the stored text.
    pub fn moved(self, delta: Bags, direction: StockDirection) -> Bags {
        let raw = match direction {
            StockDirection::Increase => self.0.saturating_add(delta.0),
            StockDirection::Decrease => self.0.saturating_sub(delta.0),
        };
        Bags(raw.max(Decimal::ZERO).normalize())
    }
}

impl fmt::Display for Bags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} bags", self.0.normalize())
    }
}

// =============================================================================
// Stock Direction
// =============================================================================

/// Which way a stock movement goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockDirection {
    /// Goods come in (purchase, or reversing a sale).
    Increase,
    /// Goods go out (sale, or reversing a purchase).
    Decrease,
}

impl StockDirection {
    /// The direction that undoes this one.
    pub fn reversed(self) -> Self {
        match self {
            StockDirection::Increase => StockDirection::Decrease,
            StockDirection::Decrease => StockDirection::Increase,
        }
    }
}

impl fmt::Display for StockDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StockDirection::Increase => write!(f, "increase"),
            StockDirection::Decrease => write!(f, "decrease"),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
