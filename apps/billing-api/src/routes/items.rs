//! `/api/items`

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use billing_core::requests::{CreateItemRequest, UpdateItemRequest};
use billing_core::{Item, ItemCategory};

use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiQuery};
use crate::SharedState;

pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/items", get(list_items).post(create_item))
        .route("/items/low-stock", get(low_stock))
        .route(
            "/items/:id",
            get(get_item).put(update_item).delete(delete_item),
        )
}

#[derive(Debug, Default, Deserialize)]
pub struct ItemQuery {
    pub query: Option<String>,
    pub category: Option<ItemCategory>,
}

async fn list_items(
    State(state): State<SharedState>,
    ApiQuery(params): ApiQuery<ItemQuery>,
) -> ApiResult<Json<Vec<Item>>> {
    let items = state
        .ledger
        .items()
        .list(params.query.as_deref(), params.category)
        .await?;
    Ok(Json(items))
}

async fn low_stock(State(state): State<SharedState>) -> ApiResult<Json<Vec<Item>>> {
    Ok(Json(state.ledger.items().low_stock().await?))
}

async fn create_item(
    State(state): State<SharedState>,
    ApiJson(request): ApiJson<CreateItemRequest>,
) -> ApiResult<(StatusCode, Json<Item>)> {
    let item = state.ledger.items().create(request).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

async fn get_item(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Item>> {
    Ok(Json(state.ledger.items().get(&id).await?))
}

async fn update_item(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<UpdateItemRequest>,
) -> ApiResult<Json<Item>> {
    Ok(Json(state.ledger.items().update(&id, request).await?))
}

/// Refuses the universal Bardana item.
async fn delete_item(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Item>> {
    Ok(Json(state.ledger.items().delete(&id).await?))
}
