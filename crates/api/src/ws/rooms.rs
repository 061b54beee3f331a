use std::sync::Arc;

use jobroom_core::chat::{ChatMessage, ServerMessage};
use jobroom_core::error::CoreError;
use jobroom_core::frame::{self, Frame};
use jobroom_core::job_status::JobStatus;
use jobroom_core::roles::Identity;
use jobroom_core::types::Id;
use jobroom_core::validation::validate_chat_text;
use jobroom_store::table::Table;
use jobroom_store::Store;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

/// One encoded frame, shared by every recipient of a broadcast.
pub type OutboundFrame = Arc<[u8]>;

/// Channel sender half for pushing encoded frames to a connection.
pub type FrameSender = mpsc::Sender<OutboundFrame>;

/// A live connection attached to a room.
struct Member {
    conn_id: Id,
    user_id: Id,
    sender: FrameSender,
}

/// Membership and ordered history of one job's chat.
#[derive(Default)]
struct Room {
    members: Vec<Member>,
    history: Vec<ChatMessage>,
}

impl Room {
    /// Queue `frame` on every member except `except`.
    ///
    /// Sends never wait: a member whose queue is full or closed misses the
    /// frame and is cleaned up by its own connection task.
    fn deliver(&self, frame: &OutboundFrame, except: Option<Id>) -> usize {
        let mut delivered = 0;
        for member in self.members.iter().filter(|m| Some(m.conn_id) != except) {
            match member.sender.try_send(Arc::clone(frame)) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    tracing::debug!(
                        conn_id = %member.conn_id,
                        user_id = %member.user_id,
                        "Outbound queue full, dropping frame",
                    );
                }
                Err(TrySendError::Closed(_)) => {
                    tracing::debug!(
                        conn_id = %member.conn_id,
                        user_id = %member.user_id,
                        "Connection closed, skipping",
                    );
                }
            }
        }
        delivered
    }
}

fn encode(message: &ServerMessage) -> OutboundFrame {
    Arc::from(frame::encode_text(&message.to_json()))
}

/// Chat rooms keyed by job id.
///
/// Each room sits behind its own lock, so attach, detach, append and
/// broadcast on one room are serialized while other rooms proceed
/// independently. A broadcast is delivered to the members present when it
/// takes the room lock; since every broadcast for a room goes through that
/// lock, each connection receives frames in broadcast order.
#[derive(Default)]
pub struct RoomRegistry {
    rooms: Table<Id, Room>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty room for `job_id` unless one exists.
    pub async fn ensure_room(&self, job_id: Id) {
        self.rooms.get_or_insert_with(job_id, Room::default).await;
    }

    /// Add a connection to a room. Returns the new member count.
    pub async fn attach(&self, job_id: Id, conn_id: Id, user_id: Id, sender: FrameSender) -> usize {
        let row = self.rooms.get_or_insert_with(job_id, Room::default).await;
        let mut room = row.lock().await;
        room.members.push(Member {
            conn_id,
            user_id,
            sender,
        });
        room.members.len()
    }

    /// Remove a connection from a room. Returns whether it was a member.
    pub async fn detach(&self, job_id: Id, conn_id: Id) -> bool {
        self.rooms
            .update(&job_id, |room| {
                let before = room.members.len();
                room.members.retain(|m| m.conn_id != conn_id);
                room.members.len() != before
            })
            .await
            .unwrap_or(false)
    }

    /// Append a message to its room's history without broadcasting it.
    /// Returns the history length.
    pub async fn append_message(&self, message: ChatMessage) -> usize {
        let row = self
            .rooms
            .get_or_insert_with(message.job_id, Room::default)
            .await;
        let mut room = row.lock().await;
        room.history.push(message);
        room.history.len()
    }

    /// Send `message` to every member of the room. Returns the number of
    /// members it was queued for.
    pub async fn broadcast(&self, job_id: Id, message: &ServerMessage) -> usize {
        let frame = encode(message);
        self.rooms
            .update(&job_id, |room| room.deliver(&frame, None))
            .await
            .unwrap_or(0)
    }

    /// Send `message` to every member except the connection `except`.
    pub async fn broadcast_except(&self, job_id: Id, except: Id, message: &ServerMessage) -> usize {
        let frame = encode(message);
        self.rooms
            .update(&job_id, |room| room.deliver(&frame, Some(except)))
            .await
            .unwrap_or(0)
    }

    /// Post a chat message on behalf of `author`.
    ///
    /// Access is resolved fresh against the store. Cancelled jobs keep their
    /// history readable but accept no new messages. The message is appended
    /// and broadcast to every member, the author's own connections included,
    /// under one room lock so history order and delivery order agree.
    pub async fn post(
        &self,
        store: &Store,
        author: &Identity,
        job_id: Id,
        text: &str,
        attachment: bool,
    ) -> Result<ChatMessage, CoreError> {
        let job = store.resolve_access(author, job_id).await?;
        if job.status == JobStatus::Cancelled {
            return Err(CoreError::Conflict(
                "Job is cancelled; its chat is read-only".into(),
            ));
        }
        let text = validate_chat_text(text)?;

        let row = self.rooms.get_or_insert_with(job_id, Room::default).await;
        let mut room = row.lock().await;
        // Stamped under the room lock so `createdAt` follows history order.
        let message = ChatMessage::new(job_id, author.user_id, text, attachment);
        let frame = encode(&ServerMessage::ChatMessage {
            message: message.clone(),
        });
        room.history.push(message.clone());
        let delivered = room.deliver(&frame, None);
        drop(room);

        tracing::info!(
            job_id = %job_id,
            message_id = %message.id,
            user_id = %author.user_id,
            delivered,
            "Chat message posted",
        );
        Ok(message)
    }

    /// The room's history, oldest first.
    pub async fn history(&self, job_id: Id) -> Vec<ChatMessage> {
        let Some(row) = self.rooms.get(&job_id).await else {
            return Vec::new();
        };
        let history = row.lock().await.history.clone();
        history
    }

    pub async fn member_count(&self, job_id: Id) -> usize {
        self.rooms
            .update(&job_id, |room| room.members.len())
            .await
            .unwrap_or(0)
    }

    /// Total live connections across all rooms.
    pub async fn connection_count(&self) -> usize {
        let mut count = 0;
        for job_id in self.rooms.keys().await {
            count += self.member_count(job_id).await;
        }
        count
    }

    /// Send a Close frame to every connection and clear all memberships.
    ///
    /// Used during graceful shutdown. History is kept.
    pub async fn shutdown_all(&self) -> usize {
        let close: OutboundFrame = Arc::from(Frame::close().encode());
        let mut count = 0;
        for job_id in self.rooms.keys().await {
            count += self
                .rooms
                .update(&job_id, |room| {
                    let closed = room.deliver(&close, None);
                    room.members.clear();
                    closed
                })
                .await
                .unwrap_or(0);
        }
        tracing::info!(count, "Closed all chat connections");
        count
    }
}
