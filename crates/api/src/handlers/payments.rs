//! Handlers for escrow payments.
//!
//! Escrow and release require the client role (or admin) plus access to the
//! job. Release is idempotent: it needs an `Idempotency-Key` header and the
//! first response produced under a key is replayed byte for byte on every
//! later request with that key.

use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use jobroom_core::error::CoreError;
use jobroom_core::types::Id;
use jobroom_core::validation::validate_idempotency_key;
use jobroom_store::models::idempotency::IdempotencyRecord;
use jobroom_store::models::payment::{CreateEscrow, ReleaseReceipt};

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireAuth, RequireClient};
use crate::response::DataResponse;
use crate::state::AppState;

/// Header carrying the caller-supplied idempotency key.
pub const IDEMPOTENCY_KEY_HEADER: &str = "idempotency-key";

// ---------------------------------------------------------------------------
// Escrow
// ---------------------------------------------------------------------------

/// POST /api/v1/jobs/{id}/escrow
///
/// Escrow `amount` for the job. Returns 201 with the updated job, the new
/// payment and the ledger debit. Not idempotent: every call escrows again.
pub async fn create_escrow(
    RequireClient(user): RequireClient,
    State(state): State<AppState>,
    AppPath(job_id): AppPath<Id>,
    AppJson(input): AppJson<CreateEscrow>,
) -> AppResult<impl IntoResponse> {
    state.store.resolve_access(&user.identity(), job_id).await?;
    let receipt = state.store.escrow(job_id, input.amount, user.user_id).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: receipt })))
}

// ---------------------------------------------------------------------------
// Release
// ---------------------------------------------------------------------------

/// POST /api/v1/jobs/{id}/release
///
/// Keys are scoped to the caller and the job. The key's slot stays locked
/// while the release runs, so concurrent requests with the same key wait and
/// then replay the stored outcome. Any outcome below 500 is stored; server
/// errors are returned without being recorded so the key can be retried.
pub async fn release_payment(
    RequireClient(user): RequireClient,
    State(state): State<AppState>,
    AppPath(job_id): AppPath<Id>,
    headers: HeaderMap,
) -> AppResult<Response> {
    let key = headers
        .get(IDEMPOTENCY_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .ok_or_else(|| CoreError::validation("Idempotency-Key header is required"))?;
    validate_idempotency_key(key)?;

    let slot_key = format!("release:{job_id}:{}:{key}", user.user_id);
    let (state, user) = (&state, &user);
    let outcome = state
        .store
        .idempotency
        .execute_once(&slot_key, move || async move {
            match execute_release(state, user, job_id).await {
                Ok(receipt) => Ok((200, to_body(&DataResponse { data: receipt })?)),
                Err(err) => {
                    let (status, body) = err.status_and_body();
                    if status.is_server_error() {
                        return Err(err);
                    }
                    Ok((status.as_u16(), to_body(&body)?))
                }
            }
        })
        .await?;

    if outcome.replayed {
        tracing::info!(
            job_id = %job_id,
            user_id = %user.user_id,
            status = outcome.record.status,
            "Replaying stored release response",
        );
    }
    replay(&outcome.record)
}

async fn execute_release(
    state: &AppState,
    user: &AuthUser,
    job_id: Id,
) -> Result<ReleaseReceipt, AppError> {
    state.store.resolve_access(&user.identity(), job_id).await?;
    let receipt = state.store.release(job_id).await?;
    tracing::info!(job_id = %job_id, user_id = %user.user_id, "Payment released");
    Ok(receipt)
}

fn to_body<T: serde::Serialize>(value: &T) -> AppResult<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| AppError::InternalError(e.to_string()))
}

/// Render a stored outcome. First responses go through here too, so a replay
/// is byte-identical to the original.
fn replay(record: &IdempotencyRecord) -> AppResult<Response> {
    let status = StatusCode::from_u16(record.status)
        .map_err(|e| AppError::InternalError(format!("Stored status is invalid: {e}")))?;
    Ok((
        status,
        [(CONTENT_TYPE, HeaderValue::from_static("application/json"))],
        record.body.clone(),
    )
        .into_response())
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

/// GET /api/v1/jobs/{id}/payments
///
/// Every payment recorded for the job, oldest first. The last one is active.
pub async fn list_payments(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    AppPath(job_id): AppPath<Id>,
) -> AppResult<impl IntoResponse> {
    state.store.resolve_access(&user.identity(), job_id).await?;
    let payments = state.store.payments.list_for_job(job_id).await;
    Ok(Json(DataResponse { data: payments }))
}
