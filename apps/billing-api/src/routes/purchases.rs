//! `/api/purchases`

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use billing_core::requests::{CreatePurchaseRequest, UpdatePurchaseRequest};
use billing_core::{ListFilter, Purchase};
use billing_ledger::LifecycleOutcome;

use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiQuery};
use crate::SharedState;

pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/purchases", get(list_purchases).post(create_purchase))
        .route(
            "/purchases/:id",
            get(get_purchase).put(update_purchase).delete(delete_purchase),
        )
}

async fn list_purchases(
    State(state): State<SharedState>,
    ApiQuery(filter): ApiQuery<ListFilter>,
) -> ApiResult<Json<Vec<Purchase>>> {
    Ok(Json(state.ledger.purchases().list(&filter).await?))
}

/// A taken `billNo` is a 409 and nothing else is touched.
async fn create_purchase(
    State(state): State<SharedState>,
    ApiJson(request): ApiJson<CreatePurchaseRequest>,
) -> ApiResult<(StatusCode, Json<LifecycleOutcome<Purchase>>)> {
    let outcome = state.ledger.purchases().create(request).await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

async fn get_purchase(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Purchase>> {
    Ok(Json(state.ledger.purchases().get(&id).await?))
}

async fn update_purchase(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<UpdatePurchaseRequest>,
) -> ApiResult<Json<LifecycleOutcome<Purchase>>> {
    Ok(Json(state.ledger.purchases().update(&id, request).await?))
}

async fn delete_purchase(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<Json<LifecycleOutcome<Purchase>>> {
    Ok(Json(state.ledger.purchases().delete(&id).await?))
}
