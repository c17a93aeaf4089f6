//! `/api/health`
//!
//! 200 while the database answers, 503 otherwise. The body is the same in
//! both cases so monitors can show why.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

use billing_db::migrations::migration_status;

use crate::SharedState;

pub fn routes() -> Router<SharedState> {
    Router::new().route("/health", get(health))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub status: &'static str,
    pub database: bool,
    pub migrations_total: usize,
    pub migrations_applied: usize,
    pub bardana_id: String,
    pub notifications: bool,
    pub checked_at: DateTime<Utc>,
}

async fn health(State(state): State<SharedState>) -> (StatusCode, Json<HealthReport>) {
    let database = state.db.health_check().await;
    let (migrations_total, migrations_applied) = match migration_status(state.db.pool()).await {
        Ok(counts) => counts,
        Err(e) => {
            warn!(error = %e, "Could not read migration status");
            (0, 0)
        }
    };

    let status = if database {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let report = HealthReport {
        status: if database { "ok" } else { "unavailable" },
        database,
        migrations_total,
        migrations_applied,
        bardana_id: state.ledger.bardana_id().to_string(),
        notifications: state.dispatcher.has_sender(),
        checked_at: Utc::now(),
    };

    (status, Json(report))
}
