//! # Database Error Types
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  sqlx::Error                                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module)   ← categorized, constraint names decoded       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StoreError (billing-ledger port)                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  LedgerError → ApiError (HTTP status)                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use billing_ledger::StoreError;
use thiserror::Error;

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Row to update or delete does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Second party with the same name and phone number
    /// - Duplicate product name, invoice number or bill number
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - Database file can't be created (permissions, missing directory)
    /// - Disk full
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// A stored value could not be turned back into a domain value.
    ///
    /// ## When This Occurs
    /// - Decimal column holding something that is not a number
    /// - Line-item JSON that does not parse
    #[error("Corrupt {column} value: {reason}")]
    Decode { column: &'static str, reason: String },

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn decode(column: &'static str, reason: impl ToString) -> Self {
        DbError::Decode {
            column,
            reason: reason.to_string(),
        }
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::Database       → UNIQUE constraint → UniqueViolation
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// sqlx::Error::ColumnDecode   → DbError::Decode
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();
                // "UNIQUE constraint failed: parties.name, parties.phone_number"
                match msg.strip_prefix("UNIQUE constraint failed: ") {
                    Some(columns) => DbError::UniqueViolation {
                        field: unique_field(columns).to_string(),
                        value: columns.to_string(),
                    },
                    None => DbError::QueryFailed(msg.to_string()),
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            sqlx::Error::ColumnDecode { index, source } => DbError::Decode {
                column: "column",
                reason: format!("{index}: {source}"),
            },

            _ => DbError::Internal(err.to_string()),
        }
    }
}

/// Maps SQLite's constraint column list to the API field name.
fn unique_field(columns: &str) -> &'static str {
    match columns {
        "parties.name, parties.phone_number" => "name+phoneNumber",
        "items.product_name" => "productName",
        "sales.invoice_no" => "invoiceNo",
        "purchases.bill_no" => "billNo",
        _ => "unique key",
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

impl From<DbError> for StoreError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => StoreError::NotFound { entity, id },
            DbError::UniqueViolation { field, value } => StoreError::Duplicate { field, value },
            other => StoreError::Backend(other.to_string()),
        }
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_field_names() {
        assert_eq!(
            unique_field("parties.name, parties.phone_number"),
            "name+phoneNumber"
        );
        assert_eq!(unique_field("sales.invoice_no"), "invoiceNo");
        assert_eq!(unique_field("something.else"), "unique key");
    }

    #[test]
    fn test_store_error_mapping() {
        let err: StoreError = DbError::duplicate("billNo", "B-1").into();
        assert!(matches!(err, StoreError::Duplicate { ref field, .. } if field == "billNo"));

        let err: StoreError = DbError::not_found("Sale", "s1").into();
        assert!(matches!(err, StoreError::NotFound { entity: "Sale", .. }));

        let err: StoreError = DbError::PoolExhausted.into();
        assert!(matches!(err, StoreError::Backend(_)));
    }
}
