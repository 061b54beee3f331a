//! Realtime chat over upgraded HTTP connections.
//!
//! Provides the upgrade handler mounted at `/chat/{jobId}`, the
//! per-connection receive loop built on the frame codec in `jobroom_core`,
//! and the room registry that broadcasts to live members.

mod connection;
mod handler;
pub mod rooms;

pub use handler::chat_upgrade;
pub use rooms::RoomRegistry;
