//! Input limits and validation helpers shared by the HTTP and realtime paths.
//!
//! DTO-level checks use `validator` derives in the store crate; the limits
//! below are the single source for the numbers used there.

use crate::error::CoreError;

pub const MAX_TITLE_LEN: usize = 200;
pub const MAX_DESCRIPTION_LEN: usize = 5000;
pub const MAX_CATEGORY_LEN: usize = 100;
pub const MAX_BID_MESSAGE_LEN: usize = 2000;
pub const MAX_CHAT_TEXT_LEN: usize = 2000;
pub const MAX_IDEMPOTENCY_KEY_LEN: usize = 255;

/// Trim and bound a chat message body. Returns the trimmed text.
pub fn validate_chat_text(text: &str) -> Result<String, CoreError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(CoreError::validation("Message text must not be empty"));
    }
    let len = trimmed.chars().count();
    if len > MAX_CHAT_TEXT_LEN {
        return Err(CoreError::validation(format!(
            "Message text must be at most {MAX_CHAT_TEXT_LEN} characters, got {len}"
        )));
    }
    Ok(trimmed.to_string())
}

/// Escrowed amounts must be finite and strictly positive.
pub fn validate_escrow_amount(amount: f64) -> Result<(), CoreError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(CoreError::validation(format!(
            "Escrow amount must be a positive number, got {amount}"
        )));
    }
    Ok(())
}

/// Idempotency keys are 1..=255 visible ASCII characters.
pub fn validate_idempotency_key(key: &str) -> Result<(), CoreError> {
    if key.is_empty() {
        return Err(CoreError::validation("Idempotency-Key must not be empty"));
    }
    if key.len() > MAX_IDEMPOTENCY_KEY_LEN {
        return Err(CoreError::validation(format!(
            "Idempotency-Key must be at most {MAX_IDEMPOTENCY_KEY_LEN} characters"
        )));
    }
    if !key.bytes().all(|b| b.is_ascii_graphic()) {
        return Err(CoreError::validation(
            "Idempotency-Key must contain only visible ASCII characters",
        ));
    }
    Ok(())
}
