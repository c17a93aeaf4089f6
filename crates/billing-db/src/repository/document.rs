//! Shared table access for sales and purchases.
//!
//! Both tables have the same shape apart from the name of the document
//! number column (`invoice_no` / `bill_no`).

use billing_core::{LineItem, ListFilter, Money};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use super::{decimal, from_micros, to_micros, with_value, FilterParams};
use crate::error::{DbError, DbResult};

/// Which table a document lives in.
#[derive(Debug, Clone, Copy)]
pub(crate) struct DocumentTable {
    pub table: &'static str,
    pub number_column: &'static str,
    pub entity: &'static str,
}

pub(crate) const SALES: DocumentTable = DocumentTable {
    table: "sales",
    number_column: "invoice_no",
    entity: "Sale",
};

pub(crate) const PURCHASES: DocumentTable = DocumentTable {
    table: "purchases",
    number_column: "bill_no",
    entity: "Purchase",
};

/// Borrowed view of a sale or purchase for writing.
pub(crate) struct DocumentFields<'a> {
    pub id: &'a str,
    pub number: &'a str,
    pub party_name: &'a str,
    pub phone_number: &'a str,
    pub party_id: Option<&'a str>,
    pub date: &'a str,
    pub items: &'a [LineItem],
    pub total_amount: Money,
    pub notes: Option<&'a str>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A decoded sale or purchase row.
pub(crate) struct StoredDocument {
    pub id: String,
    pub number: String,
    pub party_name: String,
    pub phone_number: String,
    pub party_id: Option<String>,
    pub date: String,
    pub items: Vec<LineItem>,
    pub total_amount: Money,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct DocumentRow {
    id: String,
    number: String,
    party_name: String,
    phone_number: String,
    party_id: Option<String>,
    date: String,
    items: String,
    total_amount: String,
    notes: Option<String>,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<DocumentRow> for StoredDocument {
    type Error = DbError;

    fn try_from(row: DocumentRow) -> DbResult<Self> {
        Ok(StoredDocument {
            items: serde_json::from_str(&row.items).map_err(|e| DbError::decode("items", e))?,
            total_amount: Money::new(decimal("total_amount", &row.total_amount)?),
            created_at: from_micros(row.created_at)?,
            updated_at: from_micros(row.updated_at)?,
            id: row.id,
            number: row.number,
            party_name: row.party_name,
            phone_number: row.phone_number,
            party_id: row.party_id,
            date: row.date,
            notes: row.notes,
        })
    }
}

fn encode_items(items: &[LineItem]) -> DbResult<String> {
    serde_json::to_string(items).map_err(|e| DbError::Internal(e.to_string()))
}

impl DocumentTable {
    fn select(&self) -> String {
        format!(
            "SELECT id, {number} AS number, party_name, phone_number, party_id, date, items, \
             total_amount, notes, created_at, updated_at FROM {table}",
            number = self.number_column,
            table = self.table,
        )
    }

    pub async fn get(&self, pool: &SqlitePool, id: &str) -> DbResult<Option<StoredDocument>> {
        sqlx::query_as::<_, DocumentRow>(&format!("{} WHERE id = ?1", self.select()))
            .bind(id)
            .fetch_optional(pool)
            .await?
            .map(StoredDocument::try_from)
            .transpose()
    }

    pub async fn find_by_number(
        &self,
        pool: &SqlitePool,
        number: &str,
    ) -> DbResult<Option<StoredDocument>> {
        sqlx::query_as::<_, DocumentRow>(&format!(
            "{} WHERE {} = ?1",
            self.select(),
            self.number_column
        ))
        .bind(number)
        .fetch_optional(pool)
        .await?
        .map(StoredDocument::try_from)
        .transpose()
    }

    /// Greatest document number by text ordering.
    pub async fn last_number(&self, pool: &SqlitePool) -> DbResult<Option<String>> {
        let last: Option<String> = sqlx::query_scalar(&format!(
            "SELECT MAX({}) FROM {}",
            self.number_column, self.table
        ))
        .fetch_one(pool)
        .await?;
        Ok(last)
    }

    pub async fn insert(&self, pool: &SqlitePool, doc: DocumentFields<'_>) -> DbResult<()> {
        sqlx::query(&format!(
            "INSERT INTO {} (id, {}, party_name, phone_number, party_id, date, items, \
             total_amount, notes, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            self.table, self.number_column
        ))
        .bind(doc.id)
        .bind(doc.number)
        .bind(doc.party_name)
        .bind(doc.phone_number)
        .bind(doc.party_id)
        .bind(doc.date)
        .bind(encode_items(doc.items)?)
        .bind(doc.total_amount.amount().to_string())
        .bind(doc.notes)
        .bind(to_micros(doc.created_at))
        .bind(to_micros(doc.updated_at))
        .execute(pool)
        .await
        .map_err(|e| with_value(e, doc.number))?;
        Ok(())
    }

    pub async fn update(&self, pool: &SqlitePool, doc: DocumentFields<'_>) -> DbResult<()> {
        let result = sqlx::query(&format!(
            "UPDATE {} SET {} = ?2, party_name = ?3, phone_number = ?4, party_id = ?5, \
             date = ?6, items = ?7, total_amount = ?8, notes = ?9, updated_at = ?10 \
             WHERE id = ?1",
            self.table, self.number_column
        ))
        .bind(doc.id)
        .bind(doc.number)
        .bind(doc.party_name)
        .bind(doc.phone_number)
        .bind(doc.party_id)
        .bind(doc.date)
        .bind(encode_items(doc.items)?)
        .bind(doc.total_amount.amount().to_string())
        .bind(doc.notes)
        .bind(to_micros(doc.updated_at))
        .execute(pool)
        .await
        .map_err(|e| with_value(e, doc.number))?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found(self.entity, doc.id));
        }
        Ok(())
    }

    pub async fn delete(&self, pool: &SqlitePool, id: &str) -> DbResult<()> {
        let result = sqlx::query(&format!("DELETE FROM {} WHERE id = ?1", self.table))
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found(self.entity, id));
        }
        Ok(())
    }

    /// Newest first. Search matches the party name or document number.
    pub async fn list(
        &self,
        pool: &SqlitePool,
        filter: &ListFilter,
    ) -> DbResult<Vec<StoredDocument>> {
        let params = FilterParams::from(filter);
        sqlx::query_as::<_, DocumentRow>(&format!(
            "{select} \
             WHERE (?1 IS NULL OR instr(lower(party_name), ?1) > 0 \
                    OR instr(lower({number}), ?1) > 0) \
               AND (?2 IS NULL OR party_id = ?2) \
               AND (?3 IS NULL OR created_at >= ?3) \
               AND (?4 IS NULL OR created_at <= ?4) \
             ORDER BY created_at DESC, rowid DESC \
             LIMIT ?5",
            select = self.select(),
            number = self.number_column,
        ))
        .bind(params.search)
        .bind(params.party_id)
        .bind(params.from)
        .bind(params.to)
        .bind(params.limit)
        .fetch_all(pool)
        .await?
        .into_iter()
        .map(StoredDocument::try_from)
        .collect()
    }
}
