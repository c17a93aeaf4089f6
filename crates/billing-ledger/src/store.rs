//! # Ledger Store Ports
//!
//! The async traits every storage backend implements. Lifecycles only ever
//! talk to storage through these.
//!
//! ## Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  get_*       Ok(None) when the id does not resolve                     │
//! │  find_*      Ok(None) when the natural key does not resolve            │
//! │  insert_*    Err(Duplicate) on a unique key clash                      │
//! │              (party name+phone, productName, invoiceNo, billNo)         │
//! │  update_*    Err(NotFound) if gone, Err(Duplicate) on a key clash      │
//! │  delete_*    Err(NotFound) if gone                                     │
//! │                                                                         │
//! │  paymentNo is NOT unique at the store: two payments may share one.     │
//! │  Each call is atomic on its own. Nothing spans two calls.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use thiserror::Error;

use billing_core::{Item, ListFilter, Party, Payment, Purchase, Sale};

// =============================================================================
// Store Error
// =============================================================================

/// Failure reported by a storage backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A unique key is already taken.
    #[error("Duplicate {field}: {value}")]
    Duplicate { field: String, value: String },

    /// Anything else the backend could not do (connection, decoding, ...).
    #[error("Storage backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Ports
// =============================================================================

#[async_trait]
pub trait PartyStore: Send + Sync {
    async fn get_party(&self, id: &str) -> StoreResult<Option<Party>>;
    async fn find_party_by_key(&self, name: &str, phone_number: &str) -> StoreResult<Option<Party>>;
    async fn insert_party(&self, party: &Party) -> StoreResult<()>;
    async fn update_party(&self, party: &Party) -> StoreResult<()>;
    async fn list_parties(&self) -> StoreResult<Vec<Party>>;
}

#[async_trait]
pub trait ItemStore: Send + Sync {
    async fn get_item(&self, id: &str) -> StoreResult<Option<Item>>;
    async fn find_item_by_name(&self, product_name: &str) -> StoreResult<Option<Item>>;
    /// The item with `isUniversal` set and the Bardana product name.
    async fn find_universal_item(&self) -> StoreResult<Option<Item>>;
    async fn insert_item(&self, item: &Item) -> StoreResult<()>;
    async fn update_item(&self, item: &Item) -> StoreResult<()>;
    async fn delete_item(&self, id: &str) -> StoreResult<()>;
    async fn list_items(&self) -> StoreResult<Vec<Item>>;
}

#[async_trait]
pub trait SaleStore: Send + Sync {
    async fn get_sale(&self, id: &str) -> StoreResult<Option<Sale>>;
    async fn find_sale_by_invoice_no(&self, invoice_no: &str) -> StoreResult<Option<Sale>>;
    /// Lexicographically greatest invoice number, if any sale exists.
    async fn last_invoice_no(&self) -> StoreResult<Option<String>>;
    async fn insert_sale(&self, sale: &Sale) -> StoreResult<()>;
    async fn update_sale(&self, sale: &Sale) -> StoreResult<()>;
    async fn delete_sale(&self, id: &str) -> StoreResult<()>;
    /// Newest first.
    async fn list_sales(&self, filter: &ListFilter) -> StoreResult<Vec<Sale>>;
}

#[async_trait]
pub trait PurchaseStore: Send + Sync {
    async fn get_purchase(&self, id: &str) -> StoreResult<Option<Purchase>>;
    async fn find_purchase_by_bill_no(&self, bill_no: &str) -> StoreResult<Option<Purchase>>;
    async fn insert_purchase(&self, purchase: &Purchase) -> StoreResult<()>;
    async fn update_purchase(&self, purchase: &Purchase) -> StoreResult<()>;
    async fn delete_purchase(&self, id: &str) -> StoreResult<()>;
    /// Newest first.
    async fn list_purchases(&self, filter: &ListFilter) -> StoreResult<Vec<Purchase>>;
}

#[async_trait]
pub trait PaymentStore: Send + Sync {
    async fn get_payment(&self, id: &str) -> StoreResult<Option<Payment>>;
    async fn payment_no_exists(&self, payment_no: &str) -> StoreResult<bool>;
    async fn insert_payment(&self, payment: &Payment) -> StoreResult<()>;
    async fn update_payment(&self, payment: &Payment) -> StoreResult<()>;
    async fn delete_payment(&self, id: &str) -> StoreResult<()>;
    /// Newest first.
    async fn list_payments(&self, filter: &ListFilter) -> StoreResult<Vec<Payment>>;
    /// Every payment, first-created first.
    async fn payments_in_creation_order(&self) -> StoreResult<Vec<Payment>>;
}

/// Everything the ledger needs from storage.
pub trait LedgerStore:
    PartyStore + ItemStore + SaleStore + PurchaseStore + PaymentStore + 'static
{
}

impl<T> LedgerStore for T where
    T: PartyStore + ItemStore + SaleStore + PurchaseStore + PaymentStore + 'static
{
}
