//! # Billing API
//!
//! JSON over HTTP in front of the Bardana ledger.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Billing API Routes                             │
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────────┐│
//! │  │  /api/parties  │  │  /api/items    │  │  /api/sales                ││
//! │  │                │  │                │  │  /api/purchases            ││
//! │  │ • list/create  │  │ • list/create  │  │  /api/payments             ││
//! │  │ • get/update   │  │ • get/update   │  │                            ││
//! │  │ • set balance  │  │ • delete       │  │ • list (filter) / create   ││
//! │  │                │  │ • low-stock    │  │ • get / update / delete    ││
//! │  └────────────────┘  └────────────────┘  └────────────────────────────┘│
//! │                                                                         │
//! │  ┌────────────────────┐  ┌──────────────────┐  ┌─────────────────────┐ │
//! │  │ /api/reconciliation│  │ /api/documents   │  │ /api/health         │ │
//! │  │ • balance drift    │  │ • share          │  │ /uploads (static)   │ │
//! │  │ • repair           │  │                  │  │                     │ │
//! │  └────────────────────┘  └──────────────────┘  └─────────────────────┘ │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Infrastructure: Ledger<Database> (SQLite) + DocumentDispatcher  │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! See [`config::ApiConfig`]; every key can be set through `BILLING_*`
//! environment variables.

pub mod config;
pub mod error;
pub mod extract;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use billing_db::Database;
use billing_dispatch::{
    DocumentDispatcher, DocumentSource, LocalDiskStorage, WebhookSender, UPLOADS_ROUTE,
};
use billing_ledger::Ledger;

// Re-exports
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult, ErrorCode};

/// Shared application state.
pub struct AppState {
    pub ledger: Ledger<Database>,
    pub db: Database,
    pub dispatcher: DocumentDispatcher,
    pub config: ApiConfig,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    /// Opens the ledger over `db` and wires the document dispatcher.
    pub async fn open(config: ApiConfig, db: Database) -> anyhow::Result<Self> {
        let ledger = Ledger::open(db.clone()).await?;

        let storage = LocalDiskStorage::new(
            config.upload_dir.clone(),
            config.public_base_url.as_str(),
        );
        let source = DocumentSource::new(config.documents_dir.clone());
        let mut dispatcher = DocumentDispatcher::new(source, Arc::new(storage))
            .timeout(config.notify_timeout())
            .default_country_code(config.default_country_code.as_str());

        match config.notify_webhook_url.as_deref() {
            Some(url) if !url.trim().is_empty() => {
                dispatcher = dispatcher.with_sender(Arc::new(WebhookSender::new(url)?));
                info!(webhook = %url, "Notification webhook configured");
            }
            _ => info!("No notification webhook; shared documents are only uploaded"),
        }

        Ok(AppState {
            ledger,
            db,
            dispatcher,
            config,
        })
    }
}

/// Builds the full router: `/api/*`, static uploads and request tracing.
pub fn router(state: SharedState) -> Router {
    let uploads = ServeDir::new(&state.config.upload_dir);

    Router::new()
        .nest("/api", routes::api_routes())
        .nest_service(UPLOADS_ROUTE, uploads)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
