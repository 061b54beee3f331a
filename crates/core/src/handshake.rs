//! Connection upgrade handshake helpers.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use sha1::{Digest, Sha1};

/// Fixed GUID appended to the client key before hashing.
pub const HANDSHAKE_GUID: &str = "258EAFA5-E914-47DA-95CA-C5AB0DC85B11";

/// Only protocol version accepted on upgrade requests.
pub const SUPPORTED_VERSION: &str = "13";

/// Compute the accept token for a client-supplied handshake key:
/// `base64(sha1(key ++ GUID))`.
pub fn accept_token(client_key: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(client_key.trim().as_bytes());
    hasher.update(HANDSHAKE_GUID.as_bytes());
    STANDARD.encode(hasher.finalize())
}

/// A client key must be the base64 encoding of exactly 16 bytes.
pub fn is_valid_client_key(client_key: &str) -> bool {
    STANDARD
        .decode(client_key.trim())
        .map(|raw| raw.len() == 16)
        .unwrap_or(false)
}

/// True when a comma-separated header value lists `token` (case-insensitive).
pub fn header_lists_token(value: &str, token: &str) -> bool {
    value
        .split(',')
        .any(|part| part.trim().eq_ignore_ascii_case(token))
}
