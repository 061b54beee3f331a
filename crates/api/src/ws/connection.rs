use std::sync::Arc;
use std::time::Duration;

use jobroom_core::chat::{ClientMessage, ServerMessage};
use jobroom_core::frame::{self, Frame, OpCode};
use jobroom_core::roles::Identity;
use jobroom_core::types::{new_id, Id};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;

use super::rooms::{FrameSender, OutboundFrame};
use crate::state::AppState;

/// Bytes requested from the socket per read.
const READ_CHUNK: usize = 8 * 1024;

/// How long the writer gets to flush queued frames after the receive loop ends.
const CLOSE_GRACE: Duration = Duration::from_secs(2);

enum Flow {
    Continue,
    Close,
}

/// A data message split across several frames, being reassembled.
struct Fragment {
    opcode: OpCode,
    data: Vec<u8>,
}

/// Receive-side state of one upgraded connection.
struct Session {
    state: AppState,
    identity: Identity,
    job_id: Id,
    conn_id: Id,
    outbound: FrameSender,
    fragment: Option<Fragment>,
}

/// Drive one upgraded connection until it closes.
///
/// The stream is split: a writer task drains the connection's bounded
/// outbound queue (fed by room broadcasts and direct replies) while this task
/// runs the receive loop. When the loop ends for any reason the connection is
/// detached from its room before anything else happens.
pub(crate) async fn serve<S>(stream: S, state: AppState, identity: Identity, job_id: Id)
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    let conn_id = new_id();
    let (mut reader, mut writer) = tokio::io::split(stream);
    let (tx, mut rx) = mpsc::channel::<OutboundFrame>(state.config.ws_outbound_buffer);

    let members = state
        .rooms
        .attach(job_id, conn_id, identity.user_id, tx.clone())
        .await;
    tracing::info!(
        conn_id = %conn_id,
        job_id = %job_id,
        user_id = %identity.user_id,
        members,
        "Chat connection attached",
    );

    // Writer task: forward queued frames to the socket.
    let mut send_task = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if let Err(err) = writer.write_all(&frame).await {
                tracing::debug!(conn_id = %conn_id, error = %err, "Chat socket write failed");
                break;
            }
        }
        let _ = writer.shutdown().await;
    });

    let mut session = Session {
        state: state.clone(),
        identity,
        job_id,
        conn_id,
        outbound: tx,
        fragment: None,
    };
    session.receive_loop(&mut reader).await;

    // Clean up: leave the room, answer with a Close frame, then let the
    // writer drain now that this is the last sender.
    state.rooms.detach(job_id, conn_id).await;
    session.send(Arc::from(Frame::close().encode()));
    drop(session);

    if tokio::time::timeout(CLOSE_GRACE, &mut send_task).await.is_err() {
        send_task.abort();
    }
    tracing::info!(conn_id = %conn_id, job_id = %job_id, "Chat connection detached");
}

impl Session {
    async fn receive_loop<R>(&mut self, reader: &mut R)
    where
        R: AsyncRead + Unpin,
    {
        let max_payload = self.state.config.ws_max_frame_bytes;
        let mut buf: Vec<u8> = Vec::with_capacity(READ_CHUNK);
        let mut chunk = vec![0u8; READ_CHUNK];

        loop {
            // Decode every complete frame already buffered.
            loop {
                match frame::decode(&buf, max_payload) {
                    Ok((frame, used)) => {
                        buf.drain(..used);
                        if let Flow::Close = self.on_frame(frame).await {
                            return;
                        }
                    }
                    Err(err) if err.is_incomplete() => break,
                    Err(err) => {
                        tracing::debug!(conn_id = %self.conn_id, error = %err, "Closing on undecodable frame");
                        return;
                    }
                }
            }

            match reader.read(&mut chunk).await {
                Ok(0) => {
                    tracing::debug!(conn_id = %self.conn_id, "Peer closed the stream");
                    return;
                }
                Ok(n) => buf.extend_from_slice(&chunk[..n]),
                Err(err) => {
                    tracing::debug!(conn_id = %self.conn_id, error = %err, "Chat socket read failed");
                    return;
                }
            }
        }
    }

    async fn on_frame(&mut self, frame: Frame) -> Flow {
        // Clients must mask every frame they send.
        if !frame.masked {
            tracing::debug!(conn_id = %self.conn_id, "Closing on unmasked client frame");
            return Flow::Close;
        }

        match frame.opcode {
            OpCode::Close => Flow::Close,
            OpCode::Ping | OpCode::Pong => {
                tracing::trace!(conn_id = %self.conn_id, opcode = ?frame.opcode, "Ignoring control frame");
                Flow::Continue
            }
            OpCode::Text | OpCode::Binary => {
                if self.fragment.is_some() {
                    tracing::debug!(conn_id = %self.conn_id, "Data frame interrupted a fragmented message");
                    return Flow::Close;
                }
                if frame.fin {
                    self.on_message(frame.opcode, frame.payload).await;
                } else {
                    self.fragment = Some(Fragment {
                        opcode: frame.opcode,
                        data: frame.payload,
                    });
                }
                Flow::Continue
            }
            OpCode::Continuation => {
                let Some(mut fragment) = self.fragment.take() else {
                    tracing::debug!(conn_id = %self.conn_id, "Continuation frame without a message");
                    return Flow::Close;
                };
                if fragment.data.len() + frame.payload.len() > self.state.config.ws_max_frame_bytes {
                    tracing::debug!(conn_id = %self.conn_id, "Reassembled message too large");
                    return Flow::Close;
                }
                fragment.data.extend_from_slice(&frame.payload);
                if frame.fin {
                    self.on_message(fragment.opcode, fragment.data).await;
                } else {
                    self.fragment = Some(fragment);
                }
                Flow::Continue
            }
        }
    }

    /// Handle one complete data message. Binary messages are ignored;
    /// text that is not a known JSON message is dropped.
    async fn on_message(&self, opcode: OpCode, payload: Vec<u8>) {
        if opcode != OpCode::Text {
            tracing::trace!(conn_id = %self.conn_id, "Ignoring binary message");
            return;
        }
        let message: ClientMessage = match serde_json::from_slice(&payload) {
            Ok(message) => message,
            Err(err) => {
                tracing::debug!(conn_id = %self.conn_id, error = %err, "Dropping unparseable message");
                return;
            }
        };

        match message {
            ClientMessage::Typing { is_typing } => {
                let typing = ServerMessage::Typing {
                    user_id: self.identity.user_id,
                    is_typing,
                };
                self.state
                    .rooms
                    .broadcast_except(self.job_id, self.conn_id, &typing)
                    .await;
            }
            ClientMessage::ChatMessage { text, attachment } => {
                let posted = self
                    .state
                    .rooms
                    .post(&self.state.store, &self.identity, self.job_id, &text, attachment)
                    .await;
                if let Err(err) = posted {
                    tracing::debug!(conn_id = %self.conn_id, error = %err, "Rejected chat message");
                    let reply = ServerMessage::Error {
                        message: err.to_string(),
                    };
                    self.send(Arc::from(frame::encode_text(&reply.to_json())));
                }
            }
        }
    }

    /// Queue a frame for this connection only.
    fn send(&self, frame: OutboundFrame) {
        if self.outbound.try_send(frame).is_err() {
            tracing::debug!(conn_id = %self.conn_id, "Outbound queue unavailable, dropping frame");
        }
    }
}
