use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, Request, State};
use axum::http::header::{
    CONNECTION, SEC_WEBSOCKET_ACCEPT, SEC_WEBSOCKET_KEY, SEC_WEBSOCKET_VERSION, UPGRADE,
};
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use hyper::upgrade::OnUpgrade;
use hyper_util::rt::TokioIo;
use jobroom_core::error::CoreError;
use jobroom_core::handshake::{
    accept_token, header_lists_token, is_valid_client_key, SUPPORTED_VERSION,
};
use jobroom_core::types::Id;
use serde::Deserialize;

use super::connection;
use crate::error::AppError;
use crate::middleware::auth::{authenticate, bearer_token};
use crate::state::AppState;

/// Query parameters accepted on the upgrade request.
#[derive(Debug, Default, Deserialize)]
pub struct UpgradeParams {
    /// Access token, for clients that cannot set an `Authorization` header.
    pub token: Option<String>,
}

/// GET /chat/{jobId}
///
/// Upgrade the request into a chat connection for the job's room.
///
/// Checks run in order and the first failure rejects the handshake with
/// `Connection: close`, before any frame is exchanged:
///
/// 1. Upgrade headers (400).
/// 2. Bearer token from the header or `?token=` (401).
/// 3. The job exists (404) and the caller may access it (403).
///
/// On success responds `101 Switching Protocols` and hands the upgraded
/// stream to a connection task.
pub async fn chat_upgrade(
    State(state): State<AppState>,
    Path(raw_job_id): Path<String>,
    params: Result<Query<UpgradeParams>, QueryRejection>,
    mut request: Request,
) -> Response {
    let params = match params {
        Ok(Query(params)) => params,
        Err(rejection) => {
            return reject(AppError::BadRequest(rejection.body_text()), &raw_job_id);
        }
    };
    match accept(&state, &raw_job_id, params, &mut request).await {
        Ok(response) => response,
        Err(err) => reject(err, &raw_job_id),
    }
}

async fn accept(
    state: &AppState,
    raw_job_id: &str,
    params: UpgradeParams,
    request: &mut Request,
) -> Result<Response, AppError> {
    let headers = request.headers();
    let accept = accept_token(client_key(headers)?);

    let token = bearer_token(headers)
        .map(str::to_string)
        .or(params.token)
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized("Missing bearer token".into()))
        })?;
    let identity = authenticate(&token, &state.config.jwt)?.identity();

    let job_id: Id = raw_job_id
        .parse()
        .map_err(|_| CoreError::not_found("Job", raw_job_id))?;
    state.store.resolve_access(&identity, job_id).await?;

    let on_upgrade = request
        .extensions_mut()
        .remove::<OnUpgrade>()
        .ok_or_else(|| AppError::BadRequest("Connection cannot be upgraded".into()))?;
    let accept = HeaderValue::from_str(&accept)
        .map_err(|e| AppError::InternalError(format!("Invalid accept token: {e}")))?;

    state.rooms.ensure_room(job_id).await;

    let conn_state = state.clone();
    tokio::spawn(async move {
        match on_upgrade.await {
            Ok(upgraded) => {
                connection::serve(TokioIo::new(upgraded), conn_state, identity, job_id).await;
            }
            Err(err) => {
                tracing::warn!(job_id = %job_id, error = %err, "Connection upgrade failed");
            }
        }
    });

    tracing::info!(job_id = %job_id, user_id = %identity.user_id, "Chat handshake accepted");

    Ok((
        StatusCode::SWITCHING_PROTOCOLS,
        [
            (UPGRADE, HeaderValue::from_static("websocket")),
            (CONNECTION, HeaderValue::from_static("Upgrade")),
            (SEC_WEBSOCKET_ACCEPT, accept),
        ],
    )
        .into_response())
}

/// Validate the upgrade headers and return the client's handshake key.
fn client_key(headers: &HeaderMap) -> Result<&str, AppError> {
    if !header_has(headers, &UPGRADE, "websocket") {
        return Err(AppError::BadRequest(
            "Expected 'Upgrade: websocket' header".into(),
        ));
    }
    if !header_has(headers, &CONNECTION, "upgrade") {
        return Err(AppError::BadRequest(
            "Expected 'Connection: Upgrade' header".into(),
        ));
    }

    let version = headers
        .get(SEC_WEBSOCKET_VERSION)
        .and_then(|v| v.to_str().ok())
        .map(str::trim);
    if version != Some(SUPPORTED_VERSION) {
        return Err(AppError::BadRequest(format!(
            "Unsupported Sec-WebSocket-Version, expected {SUPPORTED_VERSION}"
        )));
    }

    headers
        .get(SEC_WEBSOCKET_KEY)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|key| is_valid_client_key(key))
        .ok_or_else(|| AppError::BadRequest("Missing or invalid Sec-WebSocket-Key".into()))
}

fn header_has(headers: &HeaderMap, name: &HeaderName, token: &str) -> bool {
    headers
        .get_all(name)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|v| header_lists_token(v, token))
}

/// Render a handshake rejection and mark the connection for closing.
fn reject(err: AppError, raw_job_id: &str) -> Response {
    let mut response = err.into_response();
    tracing::warn!(
        job_id = %raw_job_id,
        status = %response.status(),
        "Rejected chat handshake",
    );
    let headers = response.headers_mut();
    headers.insert(CONNECTION, HeaderValue::from_static("close"));
    headers.insert(
        SEC_WEBSOCKET_VERSION,
        HeaderValue::from_static(SUPPORTED_VERSION),
    );
    response
}
