//! Route definitions for the `/jobs` resource.
//!
//! All endpoints require authentication.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{bids, jobs, messages, payments};
use crate::state::AppState;

/// Routes mounted at `/jobs`.
///
/// ```text
/// GET    /                    -> list_jobs
/// POST   /                    -> create_job
/// GET    /{id}                -> get_job
/// POST   /{id}/status         -> update_status
/// GET    /{id}/bids           -> list_bids
/// POST   /{id}/bids           -> create_bid
/// GET    /{id}/messages       -> list_messages
/// POST   /{id}/messages       -> post_message
/// POST   /{id}/escrow         -> create_escrow
/// POST   /{id}/release        -> release_payment
/// GET    /{id}/payments       -> list_payments
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(jobs::list_jobs).post(jobs::create_job))
        .route("/{id}", get(jobs::get_job))
        .route("/{id}/status", post(jobs::update_status))
        .route("/{id}/bids", get(bids::list_bids).post(bids::create_bid))
        .route(
            "/{id}/messages",
            get(messages::list_messages).post(messages::post_message),
        )
        .route("/{id}/escrow", post(payments::create_escrow))
        .route("/{id}/release", post(payments::release_payment))
        .route("/{id}/payments", get(payments::list_payments))
}
