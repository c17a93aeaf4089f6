//! `/api/documents`

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};

use billing_dispatch::{ShareOutcome, ShareRequest};

use crate::error::ApiResult;
use crate::extract::ApiJson;
use crate::SharedState;

pub fn routes() -> Router<SharedState> {
    Router::new().route("/documents/share", post(share_document))
}

/// Uploads a generated document and notifies the party.
///
/// Upload failures are errors. A notification that fails or times out
/// still answers 200 with `notification.success == false`.
async fn share_document(
    State(state): State<SharedState>,
    ApiJson(request): ApiJson<ShareRequest>,
) -> ApiResult<Json<ShareOutcome>> {
    Ok(Json(state.dispatcher.share(request).await?))
}
