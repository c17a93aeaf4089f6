//! # Payment Repository
//!
//! `payment_no` is indexed but not unique; the ledger's duplicate cleanup
//! relies on [`PaymentRepository::list_in_creation_order`] to decide which
//! copy survives.

use billing_core::{ListFilter, Money, Payment, PaymentMethod, PaymentType};
use sqlx::SqlitePool;
use tracing::debug;

use super::{decimal, from_micros, to_micros, FilterParams};
use crate::error::{DbError, DbResult};

#[derive(sqlx::FromRow)]
struct PaymentRow {
    id: String,
    payment_no: String,
    payment_type: PaymentType,
    party_name: Option<String>,
    phone_number: Option<String>,
    party_id: Option<String>,
    amount: String,
    total_amount: String,
    payment_method: PaymentMethod,
    reference: Option<String>,
    description: Option<String>,
    date: String,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<PaymentRow> for Payment {
    type Error = DbError;

    fn try_from(row: PaymentRow) -> DbResult<Self> {
        Ok(Payment {
            amount: Money::new(decimal("amount", &row.amount)?),
            total_amount: Money::new(decimal("total_amount", &row.total_amount)?),
            created_at: from_micros(row.created_at)?,
            updated_at: from_micros(row.updated_at)?,
            id: row.id,
            payment_no: row.payment_no,
            payment_type: row.payment_type,
            party_name: row.party_name,
            phone_number: row.phone_number,
            party_id: row.party_id,
            payment_method: row.payment_method,
            reference: row.reference,
            description: row.description,
            date: row.date,
        })
    }
}

const SELECT_PAYMENT: &str = r#"
    SELECT id, payment_no, payment_type, party_name, phone_number, party_id, amount,
           total_amount, payment_method, reference, description, date, created_at, updated_at
    FROM payments
"#;

#[derive(Debug, Clone)]
pub struct PaymentRepository {
    pool: SqlitePool,
}

impl PaymentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        PaymentRepository { pool }
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Payment>> {
        sqlx::query_as::<_, PaymentRow>(&format!("{SELECT_PAYMENT} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Payment::try_from)
            .transpose()
    }

    pub async fn payment_no_exists(&self, payment_no: &str) -> DbResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM payments WHERE payment_no = ?1)")
                .bind(payment_no)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    pub async fn insert(&self, payment: &Payment) -> DbResult<()> {
        debug!(payment_no = %payment.payment_no, "Inserting payment");

        sqlx::query(
            r#"
            INSERT INTO payments (
                id, payment_no, payment_type, party_name, phone_number, party_id, amount,
                total_amount, payment_method, reference, description, date, created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            "#,
        )
        .bind(&payment.id)
        .bind(&payment.payment_no)
        .bind(payment.payment_type)
        .bind(&payment.party_name)
        .bind(&payment.phone_number)
        .bind(&payment.party_id)
        .bind(payment.amount.amount().to_string())
        .bind(payment.total_amount.amount().to_string())
        .bind(payment.payment_method)
        .bind(&payment.reference)
        .bind(&payment.description)
        .bind(&payment.date)
        .bind(to_micros(payment.created_at))
        .bind(to_micros(payment.updated_at))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn update(&self, payment: &Payment) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE payments
            SET payment_type = ?2, amount = ?3, total_amount = ?4, payment_method = ?5,
                reference = ?6, description = ?7, date = ?8, updated_at = ?9
            WHERE id = ?1
            "#,
        )
        .bind(&payment.id)
        .bind(payment.payment_type)
        .bind(payment.amount.amount().to_string())
        .bind(payment.total_amount.amount().to_string())
        .bind(payment.payment_method)
        .bind(&payment.reference)
        .bind(&payment.description)
        .bind(&payment.date)
        .bind(to_micros(payment.updated_at))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Payment", &payment.id));
        }
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM payments WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Payment", id));
        }
        Ok(())
    }

    /// Newest first. Search matches the party name or payment number.
    pub async fn list(&self, filter: &ListFilter) -> DbResult<Vec<Payment>> {
        let params = FilterParams::from(filter);
        sqlx::query_as::<_, PaymentRow>(&format!(
            "{SELECT_PAYMENT} \
             WHERE (?1 IS NULL OR instr(lower(coalesce(party_name, '')), ?1) > 0 \
                    OR instr(lower(payment_no), ?1) > 0) \
               AND (?2 IS NULL OR party_id = ?2) \
               AND (?3 IS NULL OR created_at >= ?3) \
               AND (?4 IS NULL OR created_at <= ?4) \
             ORDER BY created_at DESC, rowid DESC \
             LIMIT ?5"
        ))
        .bind(params.search)
        .bind(params.party_id)
        .bind(params.from)
        .bind(params.to)
        .bind(params.limit)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(Payment::try_from)
        .collect()
    }

    /// Oldest first; insertion order breaks timestamp ties.
    pub async fn list_in_creation_order(&self) -> DbResult<Vec<Payment>> {
        sqlx::query_as::<_, PaymentRow>(&format!("{SELECT_PAYMENT} ORDER BY created_at, rowid"))
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Payment::try_from)
            .collect()
    }
}
