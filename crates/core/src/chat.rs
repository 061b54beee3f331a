//! Chat records and the realtime message protocol.
//!
//! Messages are JSON with an internally-tagged `"type"` discriminator so
//! clients can route them by type string. Inbound messages arrive in text
//! frames; outbound messages are always sent as text frames.

use serde::{Deserialize, Serialize};

use crate::types::{Id, Timestamp};

/// One persisted chat message in a job's room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: Id,
    pub job_id: Id,
    pub author_id: Id,
    pub text: String,
    pub attachment: bool,
    pub created_at: Timestamp,
}

impl ChatMessage {
    pub fn new(job_id: Id, author_id: Id, text: String, attachment: bool) -> Self {
        Self {
            id: crate::types::new_id(),
            job_id,
            author_id,
            text,
            attachment,
            created_at: chrono::Utc::now(),
        }
    }
}

/// Messages a client may send over the realtime channel.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    /// Typing indicator, relayed to the other members only.
    Typing {
        #[serde(default = "default_true")]
        is_typing: bool,
    },
    /// A chat post, persisted and then broadcast to every member.
    ChatMessage {
        text: String,
        #[serde(default)]
        attachment: bool,
    },
}

fn default_true() -> bool {
    true
}

/// Messages the server sends over the realtime channel.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    ChatMessage { message: ChatMessage },
    Typing { user_id: Id, is_typing: bool },
    /// Sent to a single connection whose request was rejected.
    Error { message: String },
}

impl ServerMessage {
    pub fn to_json(&self) -> String {
        // Serializing these variants cannot fail: all keys are strings and
        // no field holds a non-finite float.
        serde_json::to_string(self).unwrap_or_else(|_| String::from("{}"))
    }
}
