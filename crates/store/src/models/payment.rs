//! Payment records and DTOs.

use jobroom_core::job_status::PaymentState;
use jobroom_core::types::{Id, Timestamp};
use serde::{Deserialize, Serialize};

use super::job::Job;
use super::wallet::WalletTransaction;

/// An escrow payment against a job.
///
/// The most recent payment for a job is the active one; its `state` mirrors
/// the job's `payment_state`. Repeated escrows leave older payments as
/// history, and a release settles all of them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: Id,
    pub job_id: Id,
    pub payer_id: Id,
    pub amount: f64,
    pub state: PaymentState,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for `POST /api/v1/jobs/{id}/escrow`.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct CreateEscrow {
    pub amount: f64,
}

/// Result of a successful escrow.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EscrowReceipt {
    pub job: Job,
    pub payment: Payment,
    pub transaction: WalletTransaction,
}

/// Result of a successful release.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseReceipt {
    pub job: Job,
    pub payment: Option<Payment>,
}
