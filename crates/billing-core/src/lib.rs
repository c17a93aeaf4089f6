//! # billing-core: Pure Domain Logic for the Bardana Ledger
//!
//! Domain records, exact money and weight arithmetic, request schemas and
//! validation. Zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Bardana Ledger Architecture                        │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 billing-api (axum, JSON over HTTP)              │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │        billing-ledger (lifecycles, adjusters, store ports)      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ billing-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │ requests  │  │ validation│  │   │
//! │  │   │  Party    │  │   Money   │  │  Create*  │  │   rules   │  │   │
//! │  │   │  Sale     │  │   units   │  │  Update*  │  │ numbering │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Party, Item, Sale, Purchase, Payment
//! - [`money`] - Exact decimal money
//! - [`units`] - Kilograms, bags and the 30 kg bag
//! - [`requests`] - Typed request bodies with collected validation
//! - [`validation`] - Field rules
//! - [`numbering`] - Invoice and payment number formats
//! - [`query`] - Listing filters
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use billing_core::{items_total, LineItem, Money};
//! use billing_core::units::Kilograms;
//! use rust_decimal::Decimal;
//!
//! let items = vec![
//!     LineItem::new("1", "Rice", Kilograms::new(Decimal::from(30)), Money::new(Decimal::from(40))),
//!     LineItem::new("2", "Dal", Kilograms::new(Decimal::from(60)), Money::new(Decimal::from(90))),
//! ]
//! .into_iter()
//! .flatten()
//! .collect::<Vec<_>>();
//!
//! // 30 × 40 + 60 × 90
//! assert_eq!(items_total(&items), Some(Money::new(Decimal::from(6600))));
//! // 90 kg is 3 bags of Bardana
//! assert_eq!(billing_core::items_weight(&items).to_bags().value(), Decimal::from(3));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod numbering;
pub mod query;
pub mod requests;
pub mod types;
pub mod units;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, ValidationError, ValidationErrors};
pub use money::Money;
pub use query::ListFilter;
pub use types::*;
pub use units::{Bags, Kilograms, StockDirection, BAG_SCALE, KG_PER_BAG};
