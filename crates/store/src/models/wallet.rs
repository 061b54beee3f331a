//! Append-only wallet ledger entries.

use jobroom_core::types::{Id, Timestamp};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    /// Funds moved out of the payer's wallet into escrow.
    Escrow,
}

/// One ledger line. `amount` is signed: debits are negative.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletTransaction {
    pub id: Id,
    pub owner_id: Id,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub job_id: Id,
    pub amount: f64,
    pub created_at: Timestamp,
}
