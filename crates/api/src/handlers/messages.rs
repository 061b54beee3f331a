//! Non-realtime access to a job's chat room.
//!
//! Posting here goes through the same path as a realtime `chat_message`, so
//! live members receive the broadcast either way.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use jobroom_core::pagination::{Page, PageParams};
use jobroom_core::types::Id;
use serde::Deserialize;

use crate::error::AppResult;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::middleware::rbac::RequireAuth;
use crate::response::DataResponse;
use crate::state::AppState;

/// DTO for `POST /api/v1/jobs/{id}/messages`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostMessage {
    pub text: String,
    #[serde(default)]
    pub attachment: bool,
}

/// GET /api/v1/jobs/{id}/messages
///
/// Chat history, oldest first. Still readable after the job is cancelled.
pub async fn list_messages(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    AppPath(job_id): AppPath<Id>,
    AppQuery(params): AppQuery<PageParams>,
) -> AppResult<impl IntoResponse> {
    state.store.resolve_access(&user.identity(), job_id).await?;
    let history = state.rooms.history(job_id).await;
    Ok(Json(DataResponse {
        data: Page::from_vec(history, params),
    }))
}

/// POST /api/v1/jobs/{id}/messages
pub async fn post_message(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    AppPath(job_id): AppPath<Id>,
    AppJson(input): AppJson<PostMessage>,
) -> AppResult<impl IntoResponse> {
    let message = state
        .rooms
        .post(
            &state.store,
            &user.identity(),
            job_id,
            &input.text,
            input.attachment,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: message })))
}
