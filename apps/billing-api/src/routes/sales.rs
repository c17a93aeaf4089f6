//! `/api/sales`
//!
//! Writes answer with `{ record, compensation }`: the sale as stored plus
//! the stock and balance steps that ran after it.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use billing_core::requests::{CreateSaleRequest, UpdateSaleRequest};
use billing_core::{ListFilter, Sale};
use billing_ledger::LifecycleOutcome;

use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiQuery};
use crate::SharedState;

pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/sales", get(list_sales).post(create_sale))
        .route(
            "/sales/:id",
            get(get_sale).put(update_sale).delete(delete_sale),
        )
}

async fn list_sales(
    State(state): State<SharedState>,
    ApiQuery(filter): ApiQuery<ListFilter>,
) -> ApiResult<Json<Vec<Sale>>> {
    Ok(Json(state.ledger.sales().list(&filter).await?))
}

async fn create_sale(
    State(state): State<SharedState>,
    ApiJson(request): ApiJson<CreateSaleRequest>,
) -> ApiResult<(StatusCode, Json<LifecycleOutcome<Sale>>)> {
    let outcome = state.ledger.sales().create(request).await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

async fn get_sale(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Sale>> {
    Ok(Json(state.ledger.sales().get(&id).await?))
}

async fn update_sale(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<UpdateSaleRequest>,
) -> ApiResult<Json<LifecycleOutcome<Sale>>> {
    Ok(Json(state.ledger.sales().update(&id, request).await?))
}

async fn delete_sale(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<Json<LifecycleOutcome<Sale>>> {
    Ok(Json(state.ledger.sales().delete(&id).await?))
}
