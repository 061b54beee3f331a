use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use jobroom_core::pagination::PageParams;

use crate::error::AppResult;
use crate::extract::AppQuery;
use crate::middleware::rbac::RequireAuth;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/wallet/transactions
///
/// The caller's own ledger, newest first.
pub async fn list_transactions(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    AppQuery(params): AppQuery<PageParams>,
) -> AppResult<impl IntoResponse> {
    let page = state.store.wallet.list_for_owner(user.user_id, params).await;
    Ok(Json(DataResponse { data: page }))
}
