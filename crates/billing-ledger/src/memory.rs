//! In-memory ledger store.
//!
//! Backs the unit and property tests, and runs the API without a database
//! file. Rows live in insertion order so "first created" is unambiguous even
//! when timestamps tie.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use billing_core::{Item, ListFilter, Party, Payment, Purchase, Sale};

use crate::store::{
    ItemStore, PartyStore, PaymentStore, PurchaseStore, SaleStore, StoreError, StoreResult,
};

#[derive(Debug, Default)]
struct Tables {
    parties: Vec<Party>,
    items: Vec<Item>,
    sales: Vec<Sale>,
    purchases: Vec<Purchase>,
    payments: Vec<Payment>,
}

/// Ledger store kept in process memory.
///
/// The lock is held for a single call only, so lifecycles interleave
/// exactly like they do against a real database.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn duplicate(field: &str, value: &str) -> StoreError {
    StoreError::Duplicate {
        field: field.to_string(),
        value: value.to_string(),
    }
}

fn not_found(entity: &'static str, id: &str) -> StoreError {
    StoreError::NotFound {
        entity,
        id: id.to_string(),
    }
}

/// Filtered copy, newest first; later inserts win timestamp ties.
fn newest_first<T: Clone>(
    rows: &[T],
    filter: &ListFilter,
    keep: impl Fn(&T) -> bool,
    created_at: impl Fn(&T) -> DateTime<Utc>,
) -> Vec<T> {
    let mut out: Vec<T> = rows
        .iter()
        .rev()
        .filter(|row| keep(row) && filter.matches_created(created_at(row)))
        .cloned()
        .collect();
    out.sort_by(|a, b| created_at(b).cmp(&created_at(a)));
    if let Some(limit) = filter.limit {
        out.truncate(limit);
    }
    out
}

// =============================================================================
// Parties
// =============================================================================

#[async_trait]
impl PartyStore for MemoryStore {
    async fn get_party(&self, id: &str) -> StoreResult<Option<Party>> {
        let tables = self.tables.read().await;
        Ok(tables.parties.iter().find(|p| p.id == id).cloned())
    }

    async fn find_party_by_key(&self, name: &str, phone_number: &str) -> StoreResult<Option<Party>> {
        let tables = self.tables.read().await;
        Ok(tables
            .parties
            .iter()
            .find(|p| p.has_key(name, phone_number))
            .cloned())
    }

    async fn insert_party(&self, party: &Party) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables
            .parties
            .iter()
            .any(|p| p.has_key(&party.name, &party.phone_number))
        {
            return Err(duplicate(
                "name+phoneNumber",
                &format!("{} / {}", party.name, party.phone_number),
            ));
        }
        tables.parties.push(party.clone());
        Ok(())
    }

    async fn update_party(&self, party: &Party) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables
            .parties
            .iter()
            .any(|p| p.id != party.id && p.has_key(&party.name, &party.phone_number))
        {
            return Err(duplicate(
                "name+phoneNumber",
                &format!("{} / {}", party.name, party.phone_number),
            ));
        }
        let slot = tables
            .parties
            .iter_mut()
            .find(|p| p.id == party.id)
            .ok_or_else(|| not_found("Party", &party.id))?;
        *slot = party.clone();
        Ok(())
    }

    async fn list_parties(&self) -> StoreResult<Vec<Party>> {
        Ok(self.tables.read().await.parties.clone())
    }
}

// =============================================================================
// Items
// =============================================================================

#[async_trait]
impl ItemStore for MemoryStore {
    async fn get_item(&self, id: &str) -> StoreResult<Option<Item>> {
        let tables = self.tables.read().await;
        Ok(tables.items.iter().find(|i| i.id == id).cloned())
    }

    async fn find_item_by_name(&self, product_name: &str) -> StoreResult<Option<Item>> {
        let tables = self.tables.read().await;
        Ok(tables
            .items
            .iter()
            .find(|i| i.product_name == product_name)
            .cloned())
    }

    async fn find_universal_item(&self) -> StoreResult<Option<Item>> {
        let tables = self.tables.read().await;
        Ok(tables.items.iter().find(|i| i.is_bardana()).cloned())
    }

    async fn insert_item(&self, item: &Item) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables
            .items
            .iter()
            .any(|i| i.product_name == item.product_name)
        {
            return Err(duplicate("productName", &item.product_name));
        }
        tables.items.push(item.clone());
        Ok(())
    }

    async fn update_item(&self, item: &Item) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables
            .items
            .iter()
            .any(|i| i.id != item.id && i.product_name == item.product_name)
        {
            return Err(duplicate("productName", &item.product_name));
        }
        let slot = tables
            .items
            .iter_mut()
            .find(|i| i.id == item.id)
            .ok_or_else(|| not_found("Item", &item.id))?;
        *slot = item.clone();
        Ok(())
    }

    async fn delete_item(&self, id: &str) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        let before = tables.items.len();
        tables.items.retain(|i| i.id != id);
        if tables.items.len() == before {
            return Err(not_found("Item", id));
        }
        Ok(())
    }

    async fn list_items(&self) -> StoreResult<Vec<Item>> {
        Ok(self.tables.read().await.items.clone())
    }
}

// =============================================================================
// Sales
// =============================================================================

#[async_trait]
impl SaleStore for MemoryStore {
    async fn get_sale(&self, id: &str) -> StoreResult<Option<Sale>> {
        let tables = self.tables.read().await;
        Ok(tables.sales.iter().find(|s| s.id == id).cloned())
    }

    async fn find_sale_by_invoice_no(&self, invoice_no: &str) -> StoreResult<Option<Sale>> {
        let tables = self.tables.read().await;
        Ok(tables
            .sales
            .iter()
            .find(|s| s.invoice_no == invoice_no)
            .cloned())
    }

    async fn last_invoice_no(&self) -> StoreResult<Option<String>> {
        let tables = self.tables.read().await;
        Ok(tables.sales.iter().map(|s| s.invoice_no.clone()).max())
    }

    async fn insert_sale(&self, sale: &Sale) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables.sales.iter().any(|s| s.invoice_no == sale.invoice_no) {
            return Err(duplicate("invoiceNo", &sale.invoice_no));
        }
        tables.sales.push(sale.clone());
        Ok(())
    }

    async fn update_sale(&self, sale: &Sale) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables
            .sales
            .iter()
            .any(|s| s.id != sale.id && s.invoice_no == sale.invoice_no)
        {
            return Err(duplicate("invoiceNo", &sale.invoice_no));
        }
        let slot = tables
            .sales
            .iter_mut()
            .find(|s| s.id == sale.id)
            .ok_or_else(|| not_found("Sale", &sale.id))?;
        *slot = sale.clone();
        Ok(())
    }

    async fn delete_sale(&self, id: &str) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        let before = tables.sales.len();
        tables.sales.retain(|s| s.id != id);
        if tables.sales.len() == before {
            return Err(not_found("Sale", id));
        }
        Ok(())
    }

    async fn list_sales(&self, filter: &ListFilter) -> StoreResult<Vec<Sale>> {
        let tables = self.tables.read().await;
        Ok(newest_first(
            &tables.sales,
            filter,
            |s| {
                filter.matches_party(s.party_id.as_deref())
                    && filter.matches_search([s.party_name.as_str(), s.invoice_no.as_str()])
            },
            |s| s.created_at,
        ))
    }
}

// =============================================================================
// Purchases
// =============================================================================

#[async_trait]
impl PurchaseStore for MemoryStore {
    async fn get_purchase(&self, id: &str) -> StoreResult<Option<Purchase>> {
        let tables = self.tables.read().await;
        Ok(tables.purchases.iter().find(|p| p.id == id).cloned())
    }

    async fn find_purchase_by_bill_no(&self, bill_no: &str) -> StoreResult<Option<Purchase>> {
        let tables = self.tables.read().await;
        Ok(tables
            .purchases
            .iter()
            .find(|p| p.bill_no == bill_no)
            .cloned())
    }

    async fn insert_purchase(&self, purchase: &Purchase) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables.purchases.iter().any(|p| p.bill_no == purchase.bill_no) {
            return Err(duplicate("billNo", &purchase.bill_no));
        }
        tables.purchases.push(purchase.clone());
        Ok(())
    }

    async fn update_purchase(&self, purchase: &Purchase) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables
            .purchases
            .iter()
            .any(|p| p.id != purchase.id && p.bill_no == purchase.bill_no)
        {
            return Err(duplicate("billNo", &purchase.bill_no));
        }
        let slot = tables
            .purchases
            .iter_mut()
            .find(|p| p.id == purchase.id)
            .ok_or_else(|| not_found("Purchase", &purchase.id))?;
        *slot = purchase.clone();
        Ok(())
    }

    async fn delete_purchase(&self, id: &str) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        let before = tables.purchases.len();
        tables.purchases.retain(|p| p.id != id);
        if tables.purchases.len() == before {
            return Err(not_found("Purchase", id));
        }
        Ok(())
    }

    async fn list_purchases(&self, filter: &ListFilter) -> StoreResult<Vec<Purchase>> {
        let tables = self.tables.read().await;
        Ok(newest_first(
            &tables.purchases,
            filter,
            |p| {
                filter.matches_party(p.party_id.as_deref())
                    && filter.matches_search([p.party_name.as_str(), p.bill_no.as_str()])
            },
            |p| p.created_at,
        ))
    }
}

// =============================================================================
// Payments
// =============================================================================

#[async_trait]
impl PaymentStore for MemoryStore {
    async fn get_payment(&self, id: &str) -> StoreResult<Option<Payment>> {
        let tables = self.tables.read().await;
        Ok(tables.payments.iter().find(|p| p.id == id).cloned())
    }

    async fn payment_no_exists(&self, payment_no: &str) -> StoreResult<bool> {
        let tables = self.tables.read().await;
        Ok(tables.payments.iter().any(|p| p.payment_no == payment_no))
    }

    async fn insert_payment(&self, payment: &Payment) -> StoreResult<()> {
        self.tables.write().await.payments.push(payment.clone());
        Ok(())
    }

    async fn update_payment(&self, payment: &Payment) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        let slot = tables
            .payments
            .iter_mut()
            .find(|p| p.id == payment.id)
            .ok_or_else(|| not_found("Payment", &payment.id))?;
        *slot = payment.clone();
        Ok(())
    }

    async fn delete_payment(&self, id: &str) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        let before = tables.payments.len();
        tables.payments.retain(|p| p.id != id);
        if tables.payments.len() == before {
            return Err(not_found("Payment", id));
        }
        Ok(())
    }

    async fn list_payments(&self, filter: &ListFilter) -> StoreResult<Vec<Payment>> {
        let tables = self.tables.read().await;
        Ok(newest_first(
            &tables.payments,
            filter,
            |p| {
                filter.matches_party(p.party_id.as_deref())
                    && filter.matches_search([
                        p.party_name.as_deref().unwrap_or(""),
                        p.payment_no.as_str(),
                    ])
            },
            |p| p.created_at,
        ))
    }

    async fn payments_in_creation_order(&self) -> StoreResult<Vec<Payment>> {
        let mut payments = self.tables.read().await.payments.clone();
        // stable: insertion order breaks timestamp ties
        payments.sort_by_key(|p| p.created_at);
        Ok(payments)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
