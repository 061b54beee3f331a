//! Realtime chat upgrade route, mounted at the root.

use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::ws;

/// ```text
/// GET    /chat/{job_id}     -> chat_upgrade
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/chat/{job_id}", get(ws::chat_upgrade))
}
