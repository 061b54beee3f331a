//! Fixed-window rate limiting.
//!
//! Requests are counted per caller key: the peer IP address, extended with
//! the user id when the request carries a valid bearer token. Once a key has
//! used its budget for the window, requests are rejected with 429 and a
//! `Retry-After` header until the window resets.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::Response;
use jobroom_store::models::rate_limit::RateDecision;
use jobroom_store::Store;

use super::auth::bearer_token;
use crate::auth::jwt::verify;
use crate::error::AppError;
use crate::state::AppState;

/// Interval between sweeps of expired counters.
const PURGE_INTERVAL_SECS: u64 = 60;

/// Middleware entry point, installed with `axum::middleware::from_fn_with_state`.
pub async fn enforce(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let key = caller_key(&request, &state);
    let decision = state
        .store
        .rate_limits
        .hit(
            &key,
            Instant::now(),
            state.config.rate_limit_window(),
            state.config.rate_limit_max_requests,
        )
        .await;

    match decision {
        RateDecision::Allowed { .. } => Ok(next.run(request).await),
        RateDecision::Limited { retry_after } => {
            let retry_after_secs = retry_after_secs(retry_after);
            tracing::warn!(key = %key, retry_after_secs, "Rate limit exceeded");
            Err(AppError::RateLimited { retry_after_secs })
        }
    }
}

fn caller_key(request: &Request, state: &AppState) -> String {
    let ip = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    match bearer_token(request.headers()).and_then(|t| verify(t, &state.config.jwt).ok()) {
        Some(claims) => format!("{ip}:{}", claims.sub),
        None => ip,
    }
}

/// Whole seconds until the window resets, rounded up and never zero.
fn retry_after_secs(retry_after: Duration) -> u64 {
    let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
    secs.max(1)
}

/// Spawn a background task that periodically drops expired counters.
///
/// The returned `JoinHandle` is aborted during shutdown.
pub fn start_purge(store: Arc<Store>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(PURGE_INTERVAL_SECS));

        loop {
            interval.tick().await;
            let purged = store.rate_limits.purge_expired(Instant::now()).await;
            if purged > 0 {
                tracing::debug!(purged, "Purged expired rate limit counters");
            }
        }
    })
}
