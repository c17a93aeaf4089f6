//! # Validation Module
//!
//! Field-level rules shared by every request schema.
//!
//! ## Where Validation Runs
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP extractor (billing-api)                                 │
//! │  └── JSON shape, types (serde)                                         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Request schema (requests.rs)                                 │
//! │  └── THIS MODULE: per-field rules, all failures collected              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Ledger store                                                 │
//! │  └── UNIQUE invoiceNo / billNo / productName / (name, phone)           │
//! │                                                                         │
//! │  Nothing is written until layers 1 and 2 pass.                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::error::ValidationError;
use crate::money::Money;
use crate::units::{Bags, Kilograms};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest invoice or bill number.
pub const MAX_DOCUMENT_NO_LEN: usize = 50;
/// Longest party name.
pub const MAX_PARTY_NAME_LEN: usize = 100;
/// Longest product name.
pub const MAX_PRODUCT_NAME_LEN: usize = 200;
/// Largest quantity on one line, in kilograms.
pub const MAX_QUANTITY_KG: i64 = 10_000_000;
/// Largest rate, price or payment amount.
pub const MAX_AMOUNT: i64 = 1_000_000_000_000;
/// Largest stock level or alert, in bags.
pub const MAX_STOCK_BAGS: i64 = 1_000_000_000;
/// Largest manual balance, either sign.
pub const MAX_BALANCE: i64 = 1_000_000_000_000_000_000;
/// Business date format (`MM/DD/YYYY`).
pub const DATE_FORMAT: &str = "%m/%d/%Y";

// =============================================================================
// Identifiers
// =============================================================================

/// Validates an invoice or bill number.
///
/// ## Rules
/// - 1 to 50 characters
/// - ASCII letters, digits, `-` and `_` only
///
/// ## Example
/// ```rust
/// use billing_core::validation::validate_document_no;
///
/// assert!(validate_document_no("billNo", "PB-2024_001").is_ok());
/// assert!(validate_document_no("billNo", "").is_err());
/// assert!(validate_document_no("billNo", "PB 001").is_err());
/// ```
pub fn validate_document_no(field: &str, value: &str) -> ValidationResult<()> {
    if value.is_empty() {
        return Err(ValidationError::required(field));
    }

    if value.chars().count() > MAX_DOCUMENT_NO_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_DOCUMENT_NO_LEN,
        });
    }

    if !value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::invalid_format(
            field,
            "must contain only letters, numbers, hyphens, and underscores",
        ));
    }

    Ok(())
}

// =============================================================================
// Names
// =============================================================================

/// Validates a party name (required, at most 100 characters).
pub fn validate_party_name(field: &str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::required(field));
    }

    if name.chars().count() > MAX_PARTY_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_PARTY_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates a product name (required, at most 200 characters).
pub fn validate_product_name(field: &str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::required(field));
    }

    if name.chars().count() > MAX_PRODUCT_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_PRODUCT_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates any other required free-text field.
pub fn validate_required(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::required(field));
    }
    Ok(())
}

// =============================================================================
// Contact Details
// =============================================================================

/// Validates a phone number: an optional leading `+`, then 10 to 15 digits.
///
/// ## Example
/// ```rust
/// use billing_core::validation::validate_phone;
///
/// assert!(validate_phone("phoneNumber", "9876543210").is_ok());
/// assert!(validate_phone("phoneNumber", "+919876543210").is_ok());
/// assert!(validate_phone("phoneNumber", "98765").is_err());
/// ```
pub fn validate_phone(field: &str, phone: &str) -> ValidationResult<()> {
    let phone = phone.trim();

    if phone.is_empty() {
        return Err(ValidationError::required(field));
    }

    let digits = phone.strip_prefix('+').unwrap_or(phone);
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::invalid_format(field, "must contain only digits"));
    }

    if !(10..=15).contains(&digits.len()) {
        return Err(ValidationError::invalid_format(field, "must be 10 to 15 digits"));
    }

    Ok(())
}

/// Validates an email address loosely: `local@domain.tld`, no spaces.
pub fn validate_email(field: &str, email: &str) -> ValidationResult<()> {
    let email = email.trim();

    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && domain.contains('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };

    if !valid {
        return Err(ValidationError::invalid_format(field, "not a valid email address"));
    }

    Ok(())
}

// =============================================================================
// Dates
// =============================================================================

/// Validates a business date in `MM/DD/YYYY` form.
///
/// ## Example
/// ```rust
/// use billing_core::validation::validate_date;
///
/// assert!(validate_date("date", "02/29/2024").is_ok());
/// assert!(validate_date("date", "2024-02-29").is_err());
/// assert!(validate_date("date", "2/9/2024").is_err());
/// ```
pub fn validate_date(field: &str, date: &str) -> ValidationResult<()> {
    let bytes = date.as_bytes();
    let shape_ok = bytes.len() == 10 && bytes[2] == b'/' && bytes[5] == b'/';

    if !shape_ok || NaiveDate::parse_from_str(date, DATE_FORMAT).is_err() {
        return Err(ValidationError::invalid_format(field, "must be MM/DD/YYYY"));
    }

    Ok(())
}

/// Today's UTC date in `MM/DD/YYYY` form.
pub fn today() -> String {
    chrono::Utc::now().format(DATE_FORMAT).to_string()
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Quantity must be strictly positive and at most [`MAX_QUANTITY_KG`].
pub fn validate_quantity(field: &str, quantity: Kilograms) -> ValidationResult<()> {
    if !quantity.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    check_upper_bound(field, quantity.value(), MAX_QUANTITY_KG)
}

/// Rates and payment amounts must be strictly positive.
pub fn validate_positive_amount(field: &str, amount: Money) -> ValidationResult<()> {
    if !amount.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    check_upper_bound(field, amount.amount(), MAX_AMOUNT)
}

/// Prices may be zero but not negative.
pub fn validate_price(field: &str, price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }
    check_upper_bound(field, price.amount(), MAX_AMOUNT)
}

/// Stock levels and alerts may be zero but not negative.
pub fn validate_stock(field: &str, bags: Bags) -> ValidationResult<()> {
    if bags.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }
    check_upper_bound(field, bags.value(), MAX_STOCK_BAGS)
}

/// A manually set balance may be negative, within [`MAX_BALANCE`] either way.
pub fn validate_balance(field: &str, balance: Money) -> ValidationResult<()> {
    check_upper_bound(field, balance.amount().abs(), MAX_BALANCE)
}

/// A line total (quantity x rate) and the sum over a bill stay far inside
/// `Decimal` range while every input is below these bounds.
fn check_upper_bound(field: &str, value: Decimal, max: i64) -> ValidationResult<()> {
    if value > Decimal::from(max) {
        return Err(ValidationError::too_large(field, max));
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
