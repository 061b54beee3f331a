//! Handlers for bids on a job.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use jobroom_core::types::Id;
use jobroom_store::models::bid::CreateBid;
use validator::Validate;

use crate::error::AppResult;
use crate::extract::{AppJson, AppPath};
use crate::middleware::rbac::{RequireAuth, RequireFreelancer};
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/jobs/{id}/bids
///
/// Place a bid on an open job. Placing a bid is what grants a freelancer
/// access to the job's chat room.
pub async fn create_bid(
    RequireFreelancer(user): RequireFreelancer,
    State(state): State<AppState>,
    AppPath(job_id): AppPath<Id>,
    AppJson(input): AppJson<CreateBid>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let bid = state
        .store
        .place_bid(job_id, &user.identity(), input)
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: bid })))
}

/// GET /api/v1/jobs/{id}/bids
///
/// The job's owner and admins see every bid; a bidder sees only their own.
pub async fn list_bids(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    AppPath(job_id): AppPath<Id>,
) -> AppResult<impl IntoResponse> {
    let identity = user.identity();
    let job = state.store.resolve_access(&identity, job_id).await?;

    let mut bids = state.store.bids.list_for_job(job_id).await;
    if !identity.is_admin() && job.owner_id != identity.user_id {
        bids.retain(|bid| bid.bidder_id == identity.user_id);
    }
    Ok(Json(DataResponse { data: bids }))
}
