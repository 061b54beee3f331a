use std::sync::Arc;

use jobroom_store::Store;

use crate::config::ServerConfig;
use crate::ws::RoomRegistry;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: every field is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Authoritative job, bid, payment and ledger store.
    pub store: Arc<Store>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Live chat rooms (membership and history).
    pub rooms: Arc<RoomRegistry>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            store: Arc::new(Store::new()),
            config: Arc::new(config),
            rooms: Arc::new(RoomRegistry::new()),
        }
    }
}
