//! # Error Types
//!
//! Domain-specific error types for billing-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  billing-core errors (this file)                                       │
//! │  ├── ValidationError   - One field failed one rule                     │
//! │  ├── ValidationErrors  - Every failure found in a request              │
//! │  └── CoreError         - Domain value could not be built               │
//! │                                                                         │
//! │  billing-ledger errors                                                 │
//! │  └── LedgerError       - Validation / NotFound / Conflict / Store      │
//! │                                                                         │
//! │  billing-api errors                                                    │
//! │  └── ApiError          - What HTTP clients see (serialized)            │
//! │                                                                         │
//! │  Flow: ValidationErrors → LedgerError → ApiError → 400 response        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include the field name in every validation message
//! 3. Requests report ALL failures at once, not just the first one

use std::fmt;

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Errors raised while building domain values.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A stored decimal could not be parsed back.
    #[error("Invalid decimal for {field}: '{value}'")]
    InvalidDecimal { field: String, value: String },

    /// A stored enum value is not one we know.
    #[error("Unknown {kind}: '{value}'")]
    UnknownVariant { kind: String, value: String },

    /// Validation error (wraps ValidationErrors).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationErrors),
}

// =============================================================================
// Validation Error
// =============================================================================

/// A single input validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be strictly positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Value is above the largest accepted amount.
    #[error("{field} must be at most {max}")]
    TooLarge { field: String, max: String },

    /// Arithmetic on the value left the representable decimal range.
    #[error("{field} is out of range")]
    OutOfRange { field: String },

    /// Invalid format (identifier, phone, date, email).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// The field cannot be changed on this record.
    #[error("{field} cannot be changed: {reason}")]
    Immutable { field: String, reason: String },
}

impl ValidationError {
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }

    pub fn too_large(field: impl Into<String>, max: impl ToString) -> Self {
        ValidationError::TooLarge {
            field: field.into(),
            max: max.to_string(),
        }
    }

    pub fn out_of_range(field: impl Into<String>) -> Self {
        ValidationError::OutOfRange {
            field: field.into(),
        }
    }

    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Validation Errors (aggregate)
// =============================================================================

/// Every validation failure found in one request.
///
/// ## Why a List?
/// A form with a bad phone number AND a zero quantity should show both
/// messages at once. Request validators push into this collector and only
/// fail at the end.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    pub fn new() -> Self {
        ValidationErrors(Vec::new())
    }

    /// Records the error of a validator result, if any.
    pub fn check(&mut self, result: Result<(), ValidationError>) {
        if let Err(e) = result {
            self.0.push(e);
        }
    }

    pub fn push(&mut self, error: ValidationError) {
        self.0.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.0
    }

    /// Human-readable messages, one per failure.
    pub fn messages(&self) -> Vec<String> {
        self.0.iter().map(ToString::to_string).collect()
    }

    /// `Ok(())` when nothing was collected, otherwise `Err(self)`.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.messages().join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

impl From<ValidationError> for ValidationErrors {
    fn from(err: ValidationError) -> Self {
        ValidationErrors(vec![err])
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
