//! # Request Schemas
//!
//! Typed request bodies for every write operation, each with a `validate()`
//! that collects ALL field failures before any lifecycle logic runs.
//!
//! ## Server-Derived Fields
//! ```text
//! Caller sends                      Server decides
//! ─────────────────────────────     ─────────────────────────────────────
//! items[].{id, itemName,            items[].total = quantity × rate
//!          quantity, rate}          totalAmount   = Σ items[].total
//! totalAmount (ignored)             invoiceNo     = next number (sales)
//! date (optional)                   date          = today when omitted
//!                                   paymentNo     = PAY-IN/OUT-…
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{ValidationError, ValidationErrors};
use crate::money::Money;
use crate::types::{new_id, ItemCategory, LineItem, PaymentMethod, PaymentType};
use crate::units::{Bags, Kilograms};
use crate::validation::{
    validate_date, validate_document_no, validate_email, validate_party_name, validate_phone,
    validate_positive_amount, validate_price, validate_product_name, validate_quantity,
    validate_required, validate_stock,
};

// =============================================================================
// Line Items
// =============================================================================

/// One line as sent by the caller. Any `total` in the body is ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemInput {
    #[serde(default)]
    pub id: Option<String>,
    pub item_name: String,
    pub quantity: Kilograms,
    pub rate: Money,
}

impl LineItemInput {
    pub fn new(item_name: impl Into<String>, quantity: Kilograms, rate: Money) -> Self {
        LineItemInput {
            id: None,
            item_name: item_name.into(),
            quantity,
            rate,
        }
    }

    /// Builds the stored line, deriving `total` and assigning an id if absent.
    ///
    /// `None` when `quantity × rate` overflows.
    pub fn into_line_item(self) -> Option<LineItem> {
        let id = self.id.filter(|id| !id.is_empty()).unwrap_or_else(new_id);
        LineItem::new(id, self.item_name, self.quantity, self.rate)
    }

    /// True when this input describes `stored` as it is. An absent id
    /// matches any stored id; the item is then known by name alone.
    pub fn describes(&self, stored: &LineItem) -> bool {
        let same_ref = match self.id.as_deref() {
            Some(id) if !id.is_empty() => id == stored.id,
            _ => true,
        };
        same_ref
            && self.item_name == stored.item_name
            && self.quantity == stored.quantity
            && self.rate == stored.rate
    }

    fn validate_into(&self, index: usize, errors: &mut ValidationErrors) {
        errors.check(validate_required(&format!("items[{index}].itemName"), &self.item_name));
        errors.check(validate_quantity(&format!("items[{index}].quantity"), self.quantity));
        errors.check(validate_positive_amount(&format!("items[{index}].rate"), self.rate));
    }
}

/// True when resending `inputs` would not change `stored`.
pub fn lines_unchanged(inputs: &[LineItemInput], stored: &[LineItem]) -> bool {
    inputs.len() == stored.len() && inputs.iter().zip(stored).all(|(i, s)| i.describes(s))
}

/// Converts caller lines into stored lines, preserving order.
///
/// Lines without an id get a fresh one, so compare a resent list with
/// [`lines_unchanged`] rather than by equality of the built lines.
pub fn build_line_items(inputs: Vec<LineItemInput>) -> Result<Vec<LineItem>, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let mut lines = Vec::with_capacity(inputs.len());

    for (index, input) in inputs.into_iter().enumerate() {
        match input.into_line_item() {
            Some(line) => lines.push(line),
            None => errors.push(ValidationError::out_of_range(format!("items[{index}].total"))),
        }
    }

    errors.into_result().map(|()| lines)
}

fn validate_items(items: &[LineItemInput], errors: &mut ValidationErrors) {
    if items.is_empty() {
        errors.push(ValidationError::required("items"));
    }
    for (index, item) in items.iter().enumerate() {
        item.validate_into(index, errors);
    }
}

fn validate_optional_date(date: Option<&str>, errors: &mut ValidationErrors) {
    if let Some(date) = date {
        errors.check(validate_date("date", date));
    }
}

// =============================================================================
// Sales
// =============================================================================

/// Body of `POST /api/sales`. The invoice number is generated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSaleRequest {
    pub party_name: String,
    pub phone_number: String,
    #[serde(default)]
    pub date: Option<String>,
    pub items: Vec<LineItemInput>,
    /// Accepted for compatibility and ignored; the total is always derived.
    #[serde(default)]
    pub total_amount: Option<Money>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl CreateSaleRequest {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check(validate_party_name("partyName", &self.party_name));
        errors.check(validate_phone("phoneNumber", &self.phone_number));
        validate_optional_date(self.date.as_deref(), &mut errors);
        validate_items(&self.items, &mut errors);
        errors.into_result()
    }
}

/// Body of `PUT /api/sales/:id`. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSaleRequest {
    #[serde(default)]
    pub invoice_no: Option<String>,
    #[serde(default)]
    pub party_name: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub items: Option<Vec<LineItemInput>>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl UpdateSaleRequest {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(no) = &self.invoice_no {
            errors.check(validate_document_no("invoiceNo", no));
        }
        if let Some(name) = &self.party_name {
            errors.check(validate_party_name("partyName", name));
        }
        if let Some(phone) = &self.phone_number {
            errors.check(validate_phone("phoneNumber", phone));
        }
        validate_optional_date(self.date.as_deref(), &mut errors);
        if let Some(items) = &self.items {
            validate_items(items, &mut errors);
        }
        errors.into_result()
    }
}

// =============================================================================
// Purchases
// =============================================================================

/// Body of `POST /api/purchases`. The caller supplies the bill number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePurchaseRequest {
    pub bill_no: String,
    pub party_name: String,
    pub phone_number: String,
    #[serde(default)]
    pub date: Option<String>,
    pub items: Vec<LineItemInput>,
    /// Accepted for compatibility and ignored; the total is always derived.
    #[serde(default)]
    pub total_amount: Option<Money>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl CreatePurchaseRequest {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check(validate_document_no("billNo", &self.bill_no));
        errors.check(validate_party_name("partyName", &self.party_name));
        errors.check(validate_phone("phoneNumber", &self.phone_number));
        validate_optional_date(self.date.as_deref(), &mut errors);
        validate_items(&self.items, &mut errors);
        errors.into_result()
    }
}

/// Body of `PUT /api/purchases/:id`. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePurchaseRequest {
    #[serde(default)]
    pub bill_no: Option<String>,
    #[serde(default)]
    pub party_name: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub items: Option<Vec<LineItemInput>>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl UpdatePurchaseRequest {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(no) = &self.bill_no {
            errors.check(validate_document_no("billNo", no));
        }
        if let Some(name) = &self.party_name {
            errors.check(validate_party_name("partyName", name));
        }
        if let Some(phone) = &self.phone_number {
            errors.check(validate_phone("phoneNumber", phone));
        }
        validate_optional_date(self.date.as_deref(), &mut errors);
        if let Some(items) = &self.items {
            validate_items(items, &mut errors);
        }
        errors.into_result()
    }
}

// =============================================================================
// Payments
// =============================================================================

/// Body of `POST /api/payments`. The payment number is generated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentRequest {
    #[serde(rename = "type")]
    pub payment_type: PaymentType,
    #[serde(default)]
    pub party_name: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    pub amount: Money,
    /// Defaults to `amount`.
    #[serde(default)]
    pub total_amount: Option<Money>,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

impl CreatePaymentRequest {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check(validate_positive_amount("amount", self.amount));
        if let Some(total) = self.total_amount {
            errors.check(validate_positive_amount("totalAmount", total));
        }
        if let Some(name) = &self.party_name {
            errors.check(validate_party_name("partyName", name));
        }
        if let Some(phone) = &self.phone_number {
            errors.check(validate_phone("phoneNumber", phone));
        }
        validate_optional_date(self.date.as_deref(), &mut errors);
        errors.into_result()
    }

    /// Name and phone when both are present, the key a party is resolved by.
    pub fn party_key(&self) -> Option<(&str, &str)> {
        match (self.party_name.as_deref(), self.phone_number.as_deref()) {
            (Some(name), Some(phone)) => Some((name, phone)),
            _ => None,
        }
    }
}

/// Body of `PUT /api/payments/:id`. The party link never changes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePaymentRequest {
    #[serde(default, rename = "type")]
    pub payment_type: Option<PaymentType>,
    #[serde(default)]
    pub amount: Option<Money>,
    #[serde(default)]
    pub total_amount: Option<Money>,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

impl UpdatePaymentRequest {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(amount) = self.amount {
            errors.check(validate_positive_amount("amount", amount));
        }
        if let Some(total) = self.total_amount {
            errors.check(validate_positive_amount("totalAmount", total));
        }
        validate_optional_date(self.date.as_deref(), &mut errors);
        errors.into_result()
    }
}

// =============================================================================
// Parties
// =============================================================================

/// Body of `POST /api/parties`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePartyRequest {
    pub name: String,
    pub phone_number: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl CreatePartyRequest {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check(validate_party_name("name", &self.name));
        errors.check(validate_phone("phoneNumber", &self.phone_number));
        if let Some(email) = &self.email {
            errors.check(validate_email("email", email));
        }
        errors.into_result()
    }
}

/// Body of `PUT /api/parties/:id`. Balance is changed only through
/// `PUT /api/parties/:id/balance`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePartyRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl UpdatePartyRequest {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(name) = &self.name {
            errors.check(validate_party_name("name", name));
        }
        if let Some(phone) = &self.phone_number {
            errors.check(validate_phone("phoneNumber", phone));
        }
        if let Some(email) = &self.email {
            errors.check(validate_email("email", email));
        }
        errors.into_result()
    }
}

/// Body of `PUT /api/parties/:id/balance`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetBalanceRequest {
    pub balance: Money,
}

// =============================================================================
// Items
// =============================================================================

/// Body of `POST /api/items`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemRequest {
    pub product_name: String,
    #[serde(default)]
    pub category: ItemCategory,
    #[serde(default)]
    pub purchase_price: Money,
    #[serde(default)]
    pub sale_price: Money,
    #[serde(default)]
    pub opening_stock: Bags,
    #[serde(default)]
    pub low_stock_alert: Bags,
}

impl CreateItemRequest {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check(validate_product_name("productName", &self.product_name));
        errors.check(validate_price("purchasePrice", self.purchase_price));
        errors.check(validate_price("salePrice", self.sale_price));
        errors.check(validate_stock("openingStock", self.opening_stock));
        errors.check(validate_stock("lowStockAlert", self.low_stock_alert));
        errors.into_result()
    }
}

/// Body of `PUT /api/items/:id`. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemRequest {
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub category: Option<ItemCategory>,
    #[serde(default)]
    pub purchase_price: Option<Money>,
    #[serde(default)]
    pub sale_price: Option<Money>,
    #[serde(default)]
    pub opening_stock: Option<Bags>,
    #[serde(default)]
    pub low_stock_alert: Option<Bags>,
}

impl UpdateItemRequest {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(name) = &self.product_name {
            errors.check(validate_product_name("productName", name));
        }
        if let Some(price) = self.purchase_price {
            errors.check(validate_price("purchasePrice", price));
        }
        if let Some(price) = self.sale_price {
            errors.check(validate_price("salePrice", price));
        }
        if let Some(stock) = self.opening_stock {
            errors.check(validate_stock("openingStock", stock));
        }
        if let Some(alert) = self.low_stock_alert {
            errors.check(validate_stock("lowStockAlert", alert));
        }
        errors.into_result()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
