//! Repository for escrow payments, grouped per job.

use jobroom_core::job_status::PaymentState;
use jobroom_core::types::Id;

use crate::models::payment::Payment;
use crate::table::Table;

/// Payments keyed by job id, oldest first. The last entry is active.
#[derive(Default)]
pub struct PaymentRepo {
    table: Table<Id, Vec<Payment>>,
}

impl PaymentRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) async fn append(&self, payment: Payment) {
        let row = self.table.get_or_insert_with(payment.job_id, Vec::new).await;
        row.lock().await.push(payment);
    }

    /// Release every payment still escrowed for the job.
    ///
    /// Returns the active payment after the update.
    pub(crate) async fn release_escrowed(&self, job_id: Id) -> Option<Payment> {
        let now = chrono::Utc::now();
        self.table
            .update(&job_id, |payments| {
                for payment in payments.iter_mut() {
                    if payment.state == PaymentState::Escrowed {
                        payment.state = PaymentState::Released;
                        payment.updated_at = now;
                    }
                }
                payments.last().cloned()
            })
            .await
            .flatten()
    }

    pub async fn list_for_job(&self, job_id: Id) -> Vec<Payment> {
        self.table.snapshot(&job_id).await.unwrap_or_default()
    }
}
