//! `/api/payments`

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};

use billing_core::requests::{CreatePaymentRequest, UpdatePaymentRequest};
use billing_core::{ListFilter, Payment};
use billing_ledger::payment::DuplicateCleanupReport;
use billing_ledger::LifecycleOutcome;

use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiQuery};
use crate::SharedState;

pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/payments", get(list_payments).post(create_payment))
        .route("/payments/cleanup-duplicates", post(cleanup_duplicates))
        .route(
            "/payments/:id",
            get(get_payment).put(update_payment).delete(delete_payment),
        )
}

async fn list_payments(
    State(state): State<SharedState>,
    ApiQuery(filter): ApiQuery<ListFilter>,
) -> ApiResult<Json<Vec<Payment>>> {
    Ok(Json(state.ledger.payments().list(&filter).await?))
}

async fn create_payment(
    State(state): State<SharedState>,
    ApiJson(request): ApiJson<CreatePaymentRequest>,
) -> ApiResult<(StatusCode, Json<LifecycleOutcome<Payment>>)> {
    let outcome = state.ledger.payments().create(request).await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

async fn get_payment(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Payment>> {
    Ok(Json(state.ledger.payments().get(&id).await?))
}

async fn update_payment(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<UpdatePaymentRequest>,
) -> ApiResult<Json<LifecycleOutcome<Payment>>> {
    Ok(Json(state.ledger.payments().update(&id, request).await?))
}

async fn delete_payment(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<Json<LifecycleOutcome<Payment>>> {
    Ok(Json(state.ledger.payments().delete(&id).await?))
}

/// Keeps the first-created payment of every repeated `paymentNo`.
async fn cleanup_duplicates(
    State(state): State<SharedState>,
) -> ApiResult<Json<DuplicateCleanupReport>> {
    Ok(Json(state.ledger.payments().cleanup_duplicates().await?))
}
