//! # Purchase Repository
//!
//! Same layout as sales, keyed by the supplier's `bill_no` (UNIQUE).

use billing_core::{ListFilter, Purchase};
use sqlx::SqlitePool;
use tracing::debug;

use super::document::{DocumentFields, StoredDocument, PURCHASES};
use crate::error::DbResult;

#[derive(Debug, Clone)]
pub struct PurchaseRepository {
    pool: SqlitePool,
}

impl PurchaseRepository {
    pub fn new(pool: SqlitePool) -> Self {
        PurchaseRepository { pool }
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Purchase>> {
        Ok(PURCHASES.get(&self.pool, id).await?.map(into_purchase))
    }

    pub async fn find_by_bill_no(&self, bill_no: &str) -> DbResult<Option<Purchase>> {
        Ok(PURCHASES
            .find_by_number(&self.pool, bill_no)
            .await?
            .map(into_purchase))
    }

    pub async fn insert(&self, purchase: &Purchase) -> DbResult<()> {
        debug!(bill_no = %purchase.bill_no, lines = purchase.items.len(), "Inserting purchase");
        PURCHASES.insert(&self.pool, fields(purchase)).await
    }

    pub async fn update(&self, purchase: &Purchase) -> DbResult<()> {
        PURCHASES.update(&self.pool, fields(purchase)).await
    }

    pub async fn delete(&self, id: &str) -> DbResult<()> {
        PURCHASES.delete(&self.pool, id).await
    }

    pub async fn list(&self, filter: &ListFilter) -> DbResult<Vec<Purchase>> {
        Ok(PURCHASES
            .list(&self.pool, filter)
            .await?
            .into_iter()
            .map(into_purchase)
            .collect())
    }
}

fn fields(purchase: &Purchase) -> DocumentFields<'_> {
    DocumentFields {
        id: &purchase.id,
        number: &purchase.bill_no,
        party_name: &purchase.party_name,
        phone_number: &purchase.phone_number,
        party_id: purchase.party_id.as_deref(),
        date: &purchase.date,
        items: &purchase.items,
        total_amount: purchase.total_amount,
        notes: purchase.notes.as_deref(),
        created_at: purchase.created_at,
        updated_at: purchase.updated_at,
    }
}

fn into_purchase(doc: StoredDocument) -> Purchase {
    Purchase {
        id: doc.id,
        bill_no: doc.number,
        party_name: doc.party_name,
        phone_number: doc.phone_number,
        party_id: doc.party_id,
        date: doc.date,
        items: doc.items,
        total_amount: doc.total_amount,
        notes: doc.notes,
        created_at: doc.created_at,
        updated_at: doc.updated_at,
    }
}
