//! HTTP handlers, one module per resource.
//!
//! Handlers stay thin: extract, call the ledger, wrap the result. Every
//! write on sales, purchases and payments returns the record together with
//! its compensation report.

pub mod documents;
pub mod health;
pub mod items;
pub mod parties;
pub mod payments;
pub mod purchases;
pub mod reconciliation;
pub mod sales;

use axum::Router;

use crate::SharedState;

/// Every route mounted under `/api`.
pub fn api_routes() -> Router<SharedState> {
    Router::new()
        .merge(parties::routes())
        .merge(items::routes())
        .merge(sales::routes())
        .merge(purchases::routes())
        .merge(payments::routes())
        .merge(reconciliation::routes())
        .merge(documents::routes())
        .merge(health::routes())
}
