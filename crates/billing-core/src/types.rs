//! # Domain Types
//!
//! Records the ledger keeps, and the small enums that drive balance direction.
//!
//! ## Entity Relationships
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Entity Relationships                            │
//! │                                                                         │
//! │  ┌──────────────┐   weak partyId    ┌──────────────┐                   │
//! │  │    Party     │◄──────────────────│ Sale         │──┐                │
//! │  │──────────────│                   │ Purchase     │  │ items[]        │
//! │  │ name+phone   │◄──────────────────│ Payment      │  │ (by name)      │
//! │  │ balance      │   weak partyId    └──────────────┘  │                │
//! │  └──────────────┘                                     ▼                │
//! │                                               ┌──────────────┐         │
//! │                                               │    Item      │         │
//! │                                               │──────────────│         │
//! │                                               │ productName  │         │
//! │                                               │ openingStock │◄─ bags  │
//! │                                               │ isUniversal  │ Bardana │
//! │                                               └──────────────┘         │
//! │                                                                         │
//! │  Parties hold no back-references. Documents never own a Party.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identifiers
//! Every record has an immutable UUID `id`. Documents also carry a human
//! number (`invoiceNo`, `billNo`, `paymentNo`); parties are keyed by
//! `name + phoneNumber`; items by `productName`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;
use crate::money::Money;
use crate::units::{Bags, Kilograms, StockDirection};

/// Product name of the universal packaging item.
pub const BARDANA_PRODUCT_NAME: &str = "Bardana";

/// Generates a fresh record id.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

// =============================================================================
// Party
// =============================================================================

/// A customer or supplier with a running balance.
///
/// ## Balance Sign
/// Positive means the party owes us (sales, payments we made to them).
/// Negative means we owe the party (purchases, payments they made to us).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Party {
    pub id: String,
    pub name: String,
    pub phone_number: String,
    pub balance: Money,
    pub address: Option<String>,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Party {
    /// New party with a zero balance.
    pub fn new(name: impl Into<String>, phone_number: impl Into<String>) -> Self {
        let now = Utc::now();
        Party {
            id: new_id(),
            name: name.into(),
            phone_number: phone_number.into(),
            balance: Money::zero(),
            address: None,
            email: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// True when this party is the one identified by `name + phone`.
    pub fn has_key(&self, name: &str, phone_number: &str) -> bool {
        self.name == name && self.phone_number == phone_number
    }
}

/// How a balance step changes a party balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BalanceOperation {
    Add,
    Subtract,
    /// Overwrite the balance (manual correction, reconciliation repair).
    Set,
}

impl BalanceOperation {
    /// Result of applying `amount` to `current`. No clamping.
    ///
    /// `None` if the result would leave `Decimal` range.
    pub fn apply(self, current: Money, amount: Money) -> Option<Money> {
        match self {
            BalanceOperation::Add => current.checked_add(amount),
            BalanceOperation::Subtract => current.checked_sub(amount),
            BalanceOperation::Set => Some(amount),
        }
    }

    /// The operation that undoes an `Add` or `Subtract`. `Set` has no inverse.
    pub fn reversed(self) -> Option<Self> {
        match self {
            BalanceOperation::Add => Some(BalanceOperation::Subtract),
            BalanceOperation::Subtract => Some(BalanceOperation::Add),
            BalanceOperation::Set => None,
        }
    }
}

impl fmt::Display for BalanceOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BalanceOperation::Add => write!(f, "add"),
            BalanceOperation::Subtract => write!(f, "subtract"),
            BalanceOperation::Set => write!(f, "set"),
        }
    }
}

// =============================================================================
// Item
// =============================================================================

/// Item category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
pub enum ItemCategory {
    #[default]
    Primary,
    Kirana,
}

impl fmt::Display for ItemCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemCategory::Primary => write!(f, "Primary"),
            ItemCategory::Kirana => write!(f, "Kirana"),
        }
    }
}

impl FromStr for ItemCategory {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Primary" => Ok(ItemCategory::Primary),
            "Kirana" => Ok(ItemCategory::Kirana),
            other => Err(CoreError::UnknownVariant {
                kind: "item category".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// An inventory item. Stock is counted in bags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,
    pub product_name: String,
    pub category: ItemCategory,
    pub purchase_price: Money,
    pub sale_price: Money,
    /// Current stock in bags. Never below zero.
    pub opening_stock: Bags,
    pub low_stock_alert: Bags,
    pub is_universal: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Item {
    /// The universal Bardana item with empty stock.
    pub fn bardana() -> Self {
        let now = Utc::now();
        Item {
            id: new_id(),
            product_name: BARDANA_PRODUCT_NAME.to_string(),
            category: ItemCategory::Primary,
            purchase_price: Money::zero(),
            sale_price: Money::zero(),
            opening_stock: Bags::zero(),
            low_stock_alert: Bags::zero(),
            is_universal: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_bardana(&self) -> bool {
        self.is_universal && self.product_name == BARDANA_PRODUCT_NAME
    }

    pub fn is_low_on_stock(&self) -> bool {
        self.opening_stock <= self.low_stock_alert
    }

    /// Moves stock by `delta`, clamping at zero, and touches `updated_at`.
    pub fn move_stock(&mut self, delta: Bags, direction: StockDirection) {
        self.opening_stock = self.opening_stock.moved(delta, direction);
        self.updated_at = Utc::now();
    }
}

// =============================================================================
// Line Items
// =============================================================================

/// One line of a sale or purchase.
///
/// `total` is always `quantity × rate`; it is recomputed on every save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub id: String,
    pub item_name: String,
    pub quantity: Kilograms,
    pub rate: Money,
    pub total: Money,
}

impl LineItem {
    /// `None` when `quantity × rate` overflows.
    pub fn new(
        id: impl Into<String>,
        item_name: impl Into<String>,
        quantity: Kilograms,
        rate: Money,
    ) -> Option<Self> {
        Some(LineItem {
            id: id.into(),
            item_name: item_name.into(),
            quantity,
            rate,
            total: Money::line_total(quantity, rate)?,
        })
    }
}

/// Σ `quantity × rate` over all lines, or `None` on overflow.
pub fn items_total(items: &[LineItem]) -> Option<Money> {
    items.iter().try_fold(Money::zero(), |total, line| {
        total.checked_add(Money::line_total(line.quantity, line.rate)?)
    })
}


/// Σ `quantity` over all lines, in kilograms.
pub fn items_weight(items: &[LineItem]) -> Kilograms {
    items.iter().map(|line| line.quantity).sum()
}

// =============================================================================
// Sale / Purchase
// =============================================================================

/// A sale to a party. Adds to the party balance and takes goods out of stock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: String,
    pub invoice_no: String,
    pub party_name: String,
    pub phone_number: String,
    pub party_id: Option<String>,
    /// Business date, `MM/DD/YYYY`, stored verbatim.
    pub date: String,
    pub items: Vec<LineItem>,
    pub total_amount: Money,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A purchase from a party. Subtracts from the party balance and adds stock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    pub id: String,
    pub bill_no: String,
    pub party_name: String,
    pub phone_number: String,
    pub party_id: Option<String>,
    /// Business date, `MM/DD/YYYY`, stored verbatim.
    pub date: String,
    pub items: Vec<LineItem>,
    pub total_amount: Money,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Payment
// =============================================================================

/// Direction of a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "kebab-case"))]
pub enum PaymentType {
    /// Money received from the party.
    PaymentIn,
    /// Money paid to the party.
    PaymentOut,
}

impl PaymentType {
    /// How a new payment of this type moves the party balance.
    ///
    /// ```text
    /// payment-in  ──► subtract  (they paid us, they owe less)
    /// payment-out ──► add       (we paid them, we owe less)
    /// ```
    pub fn balance_operation(self) -> BalanceOperation {
        match self {
            PaymentType::PaymentIn => BalanceOperation::Subtract,
            PaymentType::PaymentOut => BalanceOperation::Add,
        }
    }

    /// Prefix of generated payment numbers.
    pub fn number_prefix(self) -> &'static str {
        match self {
            PaymentType::PaymentIn => "PAY-IN",
            PaymentType::PaymentOut => "PAY-OUT",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PaymentType::PaymentIn => "payment-in",
            PaymentType::PaymentOut => "payment-out",
        }
    }
}

impl fmt::Display for PaymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "payment-in" => Ok(PaymentType::PaymentIn),
            "payment-out" => Ok(PaymentType::PaymentOut),
            other => Err(CoreError::UnknownVariant {
                kind: "payment type".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// How a payment was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
pub enum PaymentMethod {
    #[default]
    Cash,
    Bank,
    Upi,
    Cheque,
    Other,
}

impl PaymentMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Bank => "bank",
            PaymentMethod::Upi => "upi",
            PaymentMethod::Cheque => "cheque",
            PaymentMethod::Other => "other",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cash" => Ok(PaymentMethod::Cash),
            "bank" => Ok(PaymentMethod::Bank),
            "upi" => Ok(PaymentMethod::Upi),
            "cheque" => Ok(PaymentMethod::Cheque),
            "other" => Ok(PaymentMethod::Other),
            other => Err(CoreError::UnknownVariant {
                kind: "payment method".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// A payment in or out. No line items and no stock effect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: String,
    pub payment_no: String,
    #[serde(rename = "type")]
    pub payment_type: PaymentType,
    pub party_name: Option<String>,
    pub phone_number: Option<String>,
    pub party_id: Option<String>,
    pub amount: Money,
    pub total_amount: Money,
    pub payment_method: PaymentMethod,
    pub reference: Option<String>,
    pub description: Option<String>,
    /// Business date, `MM/DD/YYYY`, stored verbatim.
    pub date: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn line(kg: rust_decimal::Decimal, rate: rust_decimal::Decimal) -> LineItem {
        LineItem::new("l", "Rice", Kilograms::new(kg), Money::new(rate)).unwrap()
    }

    #[test]
    fn test_balance_operation_apply() {
        let current = Money::new(dec!(100));
        let amount = Money::new(dec!(30));
        assert_eq!(BalanceOperation::Add.apply(current, amount), Some(Money::new(dec!(130))));
        assert_eq!(BalanceOperation::Subtract.apply(current, amount), Some(Money::new(dec!(70))));
        assert_eq!(BalanceOperation::Set.apply(current, amount), Some(Money::new(dec!(30))));
    }

    #[test]
    fn test_subtract_goes_negative() {
        let result = BalanceOperation::Subtract.apply(Money::zero(), Money::new(dec!(5)));
        assert_eq!(result, Some(Money::new(dec!(-5))));
    }

    #[test]
    fn test_balance_operation_overflow_is_none() {
        let huge = Money::new(rust_decimal::Decimal::MAX);
        assert_eq!(BalanceOperation::Add.apply(huge, Money::new(dec!(1))), None);
        assert_eq!(BalanceOperation::Subtract.apply(-huge, Money::new(dec!(1))), None);
        assert_eq!(BalanceOperation::Set.apply(huge, Money::new(dec!(1))), Some(Money::new(dec!(1))));
    }

    #[test]
    fn test_payment_type_direction() {
        assert_eq!(PaymentType::PaymentIn.balance_operation(), BalanceOperation::Subtract);
        assert_eq!(PaymentType::PaymentOut.balance_operation(), BalanceOperation::Add);
    }

    #[test]
    fn test_payment_type_serde() {
        let json = serde_json::to_string(&PaymentType::PaymentOut).unwrap();
        assert_eq!(json, "\"payment-out\"");
        assert_eq!("payment-in".parse::<PaymentType>().unwrap(), PaymentType::PaymentIn);
        assert!("refund".parse::<PaymentType>().is_err());
    }

    #[test]
    fn test_items_total_and_weight() {
        let items = vec![line(dec!(30), dec!(10)), line(dec!(12.5), dec!(4))];
        assert_eq!(items_total(&items), Some(Money::new(dec!(350))));
        assert_eq!(items_weight(&items), Kilograms::new(dec!(42.5)));
        assert_eq!(items_total(&[]), Some(Money::zero()));
    }

    #[test]
    fn test_oversized_lines_do_not_panic() {
        let kg = Kilograms::new(dec!(1e15));
        let rate = Money::new(dec!(1e15));
        assert_eq!(LineItem::new("l", "Rice", kg, rate), None);

        let near_max = rust_decimal::Decimal::MAX / dec!(2);
        let items = vec![line(dec!(1), near_max), line(dec!(1), near_max), line(dec!(1), near_max)];
        assert_eq!(items_total(&items), None);
    }

    #[test]
    fn test_line_item_equality_is_structural() {
        assert_eq!(line(dec!(30), dec!(10)), line(dec!(30), dec!(10)));
        assert_ne!(line(dec!(30), dec!(10)), line(dec!(60), dec!(10)));
    }

    #[test]
    fn test_bardana_identity() {
        let bardana = Item::bardana();
        assert!(bardana.is_bardana());

        let mut plain = Item::bardana();
        plain.is_universal = false;
        assert!(!plain.is_bardana());
    }

    #[test]
    fn test_item_stock_clamps() {
        let mut item = Item::bardana();
        item.opening_stock = Bags::new(dec!(2));
        item.move_stock(Bags::new(dec!(3)), StockDirection::Decrease);
        assert_eq!(item.opening_stock, Bags::zero());
    }

    #[test]
    fn test_payment_json_uses_type_key() {
        let now = Utc::now();
        let payment = Payment {
            id: "p1".into(),
            payment_no: "PAY-IN-00000001-123".into(),
            payment_type: PaymentType::PaymentIn,
            party_name: None,
            phone_number: None,
            party_id: None,
            amount: Money::new(dec!(10)),
            total_amount: Money::new(dec!(10)),
            payment_method: PaymentMethod::default(),
            reference: None,
            description: None,
            date: "01/31/2024".into(),
            created_at: now,
            updated_at: now,
        };
        let value = serde_json::to_value(&payment).unwrap();
        assert_eq!(value["type"], "payment-in");
        assert_eq!(value["paymentNo"], "PAY-IN-00000001-123");
        assert_eq!(value["paymentMethod"], "cash");
    }
}
