//! `/api/reconciliation`

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};

use billing_core::Party;
use billing_ledger::reconcile::BalanceDrift;

use crate::error::ApiResult;
use crate::SharedState;

pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/reconciliation/balances", get(balance_drift))
        .route(
            "/reconciliation/balances/:party_id/repair",
            post(repair_balance),
        )
}

/// Parties whose stored balance differs from what their documents imply.
async fn balance_drift(State(state): State<SharedState>) -> ApiResult<Json<Vec<BalanceDrift>>> {
    Ok(Json(state.ledger.reconciler().balance_drift().await?))
}

async fn repair_balance(
    State(state): State<SharedState>,
    Path(party_id): Path<String>,
) -> ApiResult<Json<Party>> {
    Ok(Json(
        state.ledger.reconciler().repair_balance(&party_id).await?,
    ))
}
