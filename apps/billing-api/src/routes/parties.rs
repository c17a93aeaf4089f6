//! `/api/parties`

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use serde::Deserialize;

use billing_core::requests::{CreatePartyRequest, SetBalanceRequest, UpdatePartyRequest};
use billing_core::Party;

use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiQuery};
use crate::SharedState;

pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/parties", get(list_parties).post(create_party))
        .route("/parties/:id", get(get_party).put(update_party))
        .route("/parties/:id/balance", put(set_balance))
}

#[derive(Debug, Default, Deserialize)]
pub struct PartyQuery {
    /// Substring of the name or phone number.
    pub query: Option<String>,
}

async fn list_parties(
    State(state): State<SharedState>,
    ApiQuery(params): ApiQuery<PartyQuery>,
) -> ApiResult<Json<Vec<Party>>> {
    let parties = state.ledger.parties().list(params.query.as_deref()).await?;
    Ok(Json(parties))
}

async fn create_party(
    State(state): State<SharedState>,
    ApiJson(request): ApiJson<CreatePartyRequest>,
) -> ApiResult<(StatusCode, Json<Party>)> {
    let party = state.ledger.parties().create(request).await?;
    Ok((StatusCode::CREATED, Json(party)))
}

async fn get_party(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Party>> {
    Ok(Json(state.ledger.parties().get(&id).await?))
}

async fn update_party(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<UpdatePartyRequest>,
) -> ApiResult<Json<Party>> {
    Ok(Json(state.ledger.parties().update(&id, request).await?))
}

/// Manual correction; shows up as drift until the documents agree.
async fn set_balance(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<SetBalanceRequest>,
) -> ApiResult<Json<Party>> {
    Ok(Json(
        state.ledger.parties().set_balance(&id, request.balance).await?,
    ))
}
