//! Route definitions for the `/wallet` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::wallet;
use crate::state::AppState;

/// Routes mounted at `/wallet`.
///
/// ```text
/// GET    /transactions        -> list_transactions
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/transactions", get(wallet::list_transactions))
}
