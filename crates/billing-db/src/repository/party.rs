//! # Party Repository
//!
//! `(name, phone_number)` is UNIQUE in the schema; a clash comes back as
//! [`DbError::UniqueViolation`] on field `name+phoneNumber`.

use billing_core::{Money, Party};
use sqlx::SqlitePool;
use tracing::debug;

use super::{decimal, from_micros, to_micros, with_value};
use crate::error::{DbError, DbResult};

#[derive(sqlx::FromRow)]
struct PartyRow {
    id: String,
    name: String,
    phone_number: String,
    balance: String,
    address: Option<String>,
    email: Option<String>,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<PartyRow> for Party {
    type Error = DbError;

    fn try_from(row: PartyRow) -> DbResult<Self> {
        Ok(Party {
            balance: Money::new(decimal("balance", &row.balance)?),
            created_at: from_micros(row.created_at)?,
            updated_at: from_micros(row.updated_at)?,
            id: row.id,
            name: row.name,
            phone_number: row.phone_number,
            address: row.address,
            email: row.email,
        })
    }
}

const SELECT_PARTY: &str = r#"
    SELECT id, name, phone_number, balance, address, email, created_at, updated_at
    FROM parties
"#;

#[derive(Debug, Clone)]
pub struct PartyRepository {
    pool: SqlitePool,
}

impl PartyRepository {
    pub fn new(pool: SqlitePool) -> Self {
        PartyRepository { pool }
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Party>> {
        sqlx::query_as::<_, PartyRow>(&format!("{SELECT_PARTY} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Party::try_from)
            .transpose()
    }

    /// Exact match on the `(name, phone_number)` key.
    pub async fn find_by_key(&self, name: &str, phone_number: &str) -> DbResult<Option<Party>> {
        sqlx::query_as::<_, PartyRow>(&format!(
            "{SELECT_PARTY} WHERE name = ?1 AND phone_number = ?2"
        ))
        .bind(name)
        .bind(phone_number)
        .fetch_optional(&self.pool)
        .await?
        .map(Party::try_from)
        .transpose()
    }

    pub async fn insert(&self, party: &Party) -> DbResult<()> {
        debug!(id = %party.id, name = %party.name, "Inserting party");

        sqlx::query(
            r#"
            INSERT INTO parties (
                id, name, phone_number, balance, address, email, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&party.id)
        .bind(&party.name)
        .bind(&party.phone_number)
        .bind(party.balance.amount().to_string())
        .bind(&party.address)
        .bind(&party.email)
        .bind(to_micros(party.created_at))
        .bind(to_micros(party.updated_at))
        .execute(&self.pool)
        .await
        .map_err(|e| with_value(e, &party_key(party)))?;

        Ok(())
    }

    pub async fn update(&self, party: &Party) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE parties
            SET name = ?2, phone_number = ?3, balance = ?4, address = ?5, email = ?6,
                updated_at = ?7
            WHERE id = ?1
            "#,
        )
        .bind(&party.id)
        .bind(&party.name)
        .bind(&party.phone_number)
        .bind(party.balance.amount().to_string())
        .bind(&party.address)
        .bind(&party.email)
        .bind(to_micros(party.updated_at))
        .execute(&self.pool)
        .await
        .map_err(|e| with_value(e, &party_key(party)))?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Party", &party.id));
        }
        debug!(id = %party.id, balance = %party.balance, "Party updated");
        Ok(())
    }

    /// All parties in creation order.
    pub async fn list(&self) -> DbResult<Vec<Party>> {
        sqlx::query_as::<_, PartyRow>(&format!("{SELECT_PARTY} ORDER BY created_at, rowid"))
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Party::try_from)
            .collect()
    }
}

fn party_key(party: &Party) -> String {
    format!("{} / {}", party.name, party.phone_number)
}
