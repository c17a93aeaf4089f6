//! # Ledger Errors
//!
//! What a lifecycle operation can fail with. Compensation failures are not
//! here: they are reported inside a successful outcome.
//!
//! ```text
//! ┌───────────────────┬────────────────────────────────┬─────────────┐
//! │ Variant           │ When                           │ HTTP        │
//! ├───────────────────┼────────────────────────────────┼─────────────┤
//! │ Validation        │ request failed its rules       │ 400         │
//! │ NotFound          │ id does not resolve            │ 404         │
//! │ Conflict          │ unique key already taken       │ 409         │
//! │ Store             │ backend failure                │ 500         │
//! └───────────────────┴────────────────────────────────┴─────────────┘
//! ```

use thiserror::Error;

use billing_core::{ValidationError, ValidationErrors};

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("{field} already exists: {value}")]
    Conflict { field: String, value: String },

    #[error("Store error: {0}")]
    Store(StoreError),
}

impl LedgerError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        LedgerError::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn conflict(field: impl Into<String>, value: impl Into<String>) -> Self {
        LedgerError::Conflict {
            field: field.into(),
            value: value.into(),
        }
    }
}

impl From<ValidationError> for LedgerError {
    fn from(err: ValidationError) -> Self {
        LedgerError::Validation(err.into())
    }
}

/// Store-level NotFound and Duplicate keep their meaning.
impl From<StoreError> for LedgerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, id } => LedgerError::NotFound { entity, id },
            StoreError::Duplicate { field, value } => LedgerError::Conflict { field, value },
            other => LedgerError::Store(other),
        }
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_duplicate_becomes_conflict() {
        let err: LedgerError = StoreError::Duplicate {
            field: "billNo".into(),
            value: "PB-1".into(),
        }
        .into();
        assert!(matches!(err, LedgerError::Conflict { ref field, .. } if field == "billNo"));
        assert_eq!(err.to_string(), "billNo already exists: PB-1");
    }

    #[test]
    fn test_backend_error_stays_store() {
        let err: LedgerError = StoreError::Backend("disk full".into()).into();
        assert!(matches!(err, LedgerError::Store(_)));
    }
}
