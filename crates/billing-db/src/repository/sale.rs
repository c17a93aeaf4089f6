//! # Sale Repository
//!
//! `invoice_no` is UNIQUE. Line items travel as a JSON column.

use billing_core::{ListFilter, Sale};
use sqlx::SqlitePool;
use tracing::debug;

use super::document::{DocumentFields, StoredDocument, SALES};
use crate::error::DbResult;

#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        Ok(SALES.get(&self.pool, id).await?.map(into_sale))
    }

    pub async fn find_by_invoice_no(&self, invoice_no: &str) -> DbResult<Option<Sale>> {
        Ok(SALES
            .find_by_number(&self.pool, invoice_no)
            .await?
            .map(into_sale))
    }

    /// Lexicographically greatest invoice number.
    pub async fn last_invoice_no(&self) -> DbResult<Option<String>> {
        SALES.last_number(&self.pool).await
    }

    pub async fn insert(&self, sale: &Sale) -> DbResult<()> {
        debug!(invoice_no = %sale.invoice_no, lines = sale.items.len(), "Inserting sale");
        SALES.insert(&self.pool, fields(sale)).await
    }

    pub async fn update(&self, sale: &Sale) -> DbResult<()> {
        SALES.update(&self.pool, fields(sale)).await
    }

    pub async fn delete(&self, id: &str) -> DbResult<()> {
        SALES.delete(&self.pool, id).await
    }

    pub async fn list(&self, filter: &ListFilter) -> DbResult<Vec<Sale>> {
        Ok(SALES
            .list(&self.pool, filter)
            .await?
            .into_iter()
            .map(into_sale)
            .collect())
    }
}

fn fields(sale: &Sale) -> DocumentFields<'_> {
    DocumentFields {
        id: &sale.id,
        number: &sale.invoice_no,
        party_name: &sale.party_name,
        phone_number: &sale.phone_number,
        party_id: sale.party_id.as_deref(),
        date: &sale.date,
        items: &sale.items,
        total_amount: sale.total_amount,
        notes: sale.notes.as_deref(),
        created_at: sale.created_at,
        updated_at: sale.updated_at,
    }
}

fn into_sale(doc: StoredDocument) -> Sale {
    Sale {
        id: doc.id,
        invoice_no: doc.number,
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
