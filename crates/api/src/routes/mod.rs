pub mod chat;
pub mod health;
pub mod jobs;
pub mod wallet;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /jobs                                  create, list
/// /jobs/{id}                             get
/// /jobs/{id}/status                      transition status (POST)
/// /jobs/{id}/bids                        create, list
/// /jobs/{id}/messages                    chat history, post (non-realtime)
/// /jobs/{id}/escrow                      escrow funds (POST)
/// /jobs/{id}/release                     release escrow (POST, Idempotency-Key)
/// /jobs/{id}/payments                    payment history
///
/// /wallet/transactions                   caller's ledger
/// ```
///
/// `/health` and the realtime upgrade at `/chat/{jobId}` are mounted at the
/// root, outside this tree.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/jobs", jobs::router())
        .nest("/wallet", wallet::router())
}
