//! # Repository Module
//!
//! One repository per table. Repositories speak domain types; the row
//! structs and column conversions stay in here.
//!
//! ## Column Encoding
//! ```text
//! ┌───────────────────────────────┬─────────────────────────────────────────┐
//! │ Money / Kilograms / Bags      │ TEXT, Decimal::to_string (exact)        │
//! │ created_at / updated_at       │ INTEGER, unix microseconds UTC          │
//! │ line items                    │ TEXT, JSON array of LineItem            │
//! │ enums                         │ TEXT via sqlx::Type (billing-core)      │
//! └───────────────────────────────┴─────────────────────────────────────────┘
//! ```
//!
//! Listings order by `created_at DESC, rowid DESC`, so among equal
//! timestamps the later insert comes first.

pub mod document;
pub mod item;
pub mod party;
pub mod payment;
pub mod purchase;
pub mod sale;

use std::str::FromStr;

use billing_core::ListFilter;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::error::{DbError, DbResult};

/// Timestamp to its stored form.
pub(crate) fn to_micros(at: DateTime<Utc>) -> i64 {
    at.timestamp_micros()
}

pub(crate) fn from_micros(micros: i64) -> DbResult<DateTime<Utc>> {
    DateTime::from_timestamp_micros(micros)
        .ok_or_else(|| DbError::decode("timestamp", format!("{micros} out of range")))
}

pub(crate) fn decimal(column: &'static str, text: &str) -> DbResult<Decimal> {
    Decimal::from_str(text).map_err(|e| DbError::decode(column, e))
}

/// Fills in the offending value on a unique violation; SQLite only names
/// the columns.
pub(crate) fn with_value(err: sqlx::Error, value: &str) -> DbError {
    match DbError::from(err) {
        DbError::UniqueViolation { field, .. } => DbError::duplicate(field, value),
        other => other,
    }
}

/// [`ListFilter`] flattened into bind parameters.
///
/// Every condition is written `(?n IS NULL OR ...)` so one statement serves
/// any combination. A limit of `-1` means none to SQLite.
pub(crate) struct FilterParams {
    pub search: Option<String>,
    pub party_id: Option<String>,
    pub from: Option<i64>,
    pub to: Option<i64>,
    pub limit: i64,
}

impl From<&ListFilter> for FilterParams {
    fn from(filter: &ListFilter) -> Self {
        FilterParams {
            search: filter
                .search
                .as_deref()
                .map(str::trim)
                .filter(|term| !term.is_empty())
                .map(str::to_lowercase),
            party_id: filter.party_id.clone(),
            from: filter.from.map(to_micros),
            to: filter.to.map(to_micros),
            limit: filter
                .limit
                .map_or(-1, |limit| i64::try_from(limit).unwrap_or(i64::MAX)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_micros_round_trip() {
        let now = Utc::now();
        let back = from_micros(to_micros(now)).unwrap();
        assert_eq!(back.timestamp_micros(), now.timestamp_micros());
    }

    #[test]
    fn test_decimal_column() {
        assert_eq!(decimal("balance", "-12.50").unwrap(), Decimal::new(-1250, 2));
        assert!(matches!(
            decimal("balance", "twelve"),
            Err(DbError::Decode { column: "balance", .. })
        ));
    }

    #[test]
    fn test_filter_params() {
        let params = FilterParams::from(&ListFilter::default().search("  RaMesh ").limit(5));
        assert_eq!(params.search.as_deref(), Some("ramesh"));
        assert_eq!(params.limit, 5);

        let params = FilterParams::from(&ListFilter::default().search("   "));
        assert!(params.search.is_none());
        assert_eq!(params.limit, -1);
    }
}
