//! Handlers for the `/jobs` resource.
//!
//! Any authenticated user can browse jobs; creating jobs and driving their
//! status requires the client role (or admin), and status changes also
//! require access to the job.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use jobroom_core::error::CoreError;
use jobroom_core::types::Id;
use jobroom_store::models::job::{CreateJob, JobListQuery, UpdateJobStatus};
use validator::Validate;

use crate::error::AppResult;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::middleware::rbac::{RequireAuth, RequireClient};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

/// POST /api/v1/jobs
///
/// Post a new job. Returns 201 with the job in `OPEN` / `PENDING_ESCROW`.
pub async fn create_job(
    RequireClient(user): RequireClient,
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateJob>,
) -> AppResult<impl IntoResponse> {
    let input = input.normalized();
    input.validate()?;

    let job = state.store.jobs.create(user.user_id, input).await;

    tracing::info!(
        job_id = %job.id,
        user_id = %user.user_id,
        category = %job.category,
        "Job created",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: job })))
}

// ---------------------------------------------------------------------------
// List
// ---------------------------------------------------------------------------

/// GET /api/v1/jobs
///
/// List jobs newest first. Supports optional `status`, `category` and
/// `search` filters plus `page` / `pageSize`.
pub async fn list_jobs(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    AppQuery(params): AppQuery<JobListQuery>,
) -> AppResult<impl IntoResponse> {
    let page = state.store.jobs.list(&params).await;
    Ok(Json(DataResponse { data: page }))
}

// ---------------------------------------------------------------------------
// Get
// ---------------------------------------------------------------------------

/// GET /api/v1/jobs/{id}
pub async fn get_job(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    AppPath(job_id): AppPath<Id>,
) -> AppResult<impl IntoResponse> {
    let job = state
        .store
        .jobs
        .find_by_id(job_id)
        .await
        .ok_or_else(|| CoreError::not_found("Job", job_id))?;
    Ok(Json(DataResponse { data: job }))
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// POST /api/v1/jobs/{id}/status
///
/// Move the job along the transition table. Rejected transitions return 409
/// with `INVALID_TRANSITION` and the `{from, to}` pair in `details`.
pub async fn update_status(
    RequireClient(user): RequireClient,
    State(state): State<AppState>,
    AppPath(job_id): AppPath<Id>,
    AppJson(input): AppJson<UpdateJobStatus>,
) -> AppResult<impl IntoResponse> {
    let identity = user.identity();
    state.store.resolve_access(&identity, job_id).await?;

    let job = state
        .store
        .transition_status(job_id, input.status, &identity)
        .await?;
    Ok(Json(DataResponse { data: job }))
}
