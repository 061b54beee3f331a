//! Stored responses for idempotent operations.

use jobroom_core::types::Timestamp;

/// The exact response produced the first time a key was used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdempotencyRecord {
    pub key: String,
    pub status: u16,
    pub body: Vec<u8>,
    pub created_at: Timestamp,
}
