//! Job and payment state machine.
//!
//! Every operation here locks the job row for its whole duration, so two
//! operations on the same job never interleave while operations on different
//! jobs run independently.

use jobroom_core::error::CoreError;
use jobroom_core::job_status::{check_transition, JobStatus, PaymentState};
use jobroom_core::roles::Identity;
use jobroom_core::types::{new_id, Id};
use jobroom_core::validation::validate_escrow_amount;

use crate::models::bid::{Bid, CreateBid};
use crate::models::job::Job;
use crate::models::payment::{EscrowReceipt, Payment, ReleaseReceipt};
use crate::models::wallet::{TransactionType, WalletTransaction};
use crate::Store;

impl Store {
    /// Move a job to `target` through the role-gated transition table.
    ///
    /// On rejection the job is left untouched.
    pub async fn transition_status(
        &self,
        job_id: Id,
        target: JobStatus,
        caller: &Identity,
    ) -> Result<Job, CoreError> {
        let row = self
            .jobs
            .row(job_id)
            .await
            .ok_or_else(|| CoreError::not_found("Job", job_id))?;
        let mut job = row.lock().await;

        check_transition(job.status, target, caller.role)?;

        let from = job.status;
        job.status = target;
        job.updated_at = chrono::Utc::now();

        tracing::info!(
            job_id = %job_id,
            user_id = %caller.user_id,
            from = %from,
            to = %target,
            "Job status changed",
        );
        Ok(job.clone())
    }

    /// Place a bid on an open job.
    ///
    /// The job's owner may not bid on it. Bids on any non-open job are a
    /// conflict.
    pub async fn place_bid(
        &self,
        job_id: Id,
        bidder: &Identity,
        input: CreateBid,
    ) -> Result<Bid, CoreError> {
        let row = self
            .jobs
            .row(job_id)
            .await
            .ok_or_else(|| CoreError::not_found("Job", job_id))?;
        let job = row.lock().await;

        if job.owner_id == bidder.user_id {
            return Err(CoreError::Forbidden(
                "Job owners cannot bid on their own job".into(),
            ));
        }
        if job.status != JobStatus::Open {
            return Err(CoreError::Conflict(format!(
                "Bids are only accepted while a job is OPEN (job is {})",
                job.status
            )));
        }

        let bid = Bid {
            id: new_id(),
            job_id,
            bidder_id: bidder.user_id,
            amount: input.amount,
            message: input.message.trim().to_string(),
            created_at: chrono::Utc::now(),
        };
        self.bids.append(bid.clone()).await;
        drop(job);

        tracing::info!(job_id = %job_id, bid_id = %bid.id, user_id = %bidder.user_id, "Bid placed");
        Ok(bid)
    }

    /// Move funds for a job into escrow.
    ///
    /// Sets the payment state to `ESCROWED` and, when the job is still
    /// `OPEN`, advances it to `IN_PROGRESS` without consulting the transition
    /// table. Records a payment and a debit on the payer's ledger. Repeated
    /// calls create additional payments and debits.
    pub async fn escrow(
        &self,
        job_id: Id,
        amount: f64,
        payer_id: Id,
    ) -> Result<EscrowReceipt, CoreError> {
        validate_escrow_amount(amount)?;

        let row = self
            .jobs
            .row(job_id)
            .await
            .ok_or_else(|| CoreError::not_found("Job", job_id))?;
        let mut job = row.lock().await;

        if job.status.is_terminal() {
            return Err(CoreError::Conflict(format!(
                "Cannot escrow funds for a {} job",
                job.status
            )));
        }

        let now = chrono::Utc::now();
        job.payment_state = PaymentState::Escrowed;
        if job.status == JobStatus::Open {
            job.status = JobStatus::InProgress;
        }
        job.updated_at = now;

        let payment = Payment {
            id: new_id(),
            job_id,
            payer_id,
            amount,
            state: PaymentState::Escrowed,
            created_at: now,
            updated_at: now,
        };
        let transaction = WalletTransaction {
            id: new_id(),
            owner_id: payer_id,
            kind: TransactionType::Escrow,
            job_id,
            amount: -amount,
            created_at: now,
        };
        self.payments.append(payment.clone()).await;
        self.wallet.append(transaction.clone()).await;

        tracing::info!(
            job_id = %job_id,
            payment_id = %payment.id,
            user_id = %payer_id,
            amount,
            status = %job.status,
            "Funds escrowed",
        );

        Ok(EscrowReceipt {
            job: job.clone(),
            payment,
            transaction,
        })
    }

    /// Release escrowed funds, completing the job.
    ///
    /// Requires `ESCROWED`. Callers wanting idempotency run this inside
    /// [`IdempotencyRepo::execute_once`](crate::repositories::IdempotencyRepo::execute_once).
    pub async fn release(&self, job_id: Id) -> Result<ReleaseReceipt, CoreError> {
        let row = self
            .jobs
            .row(job_id)
            .await
            .ok_or_else(|| CoreError::not_found("Job", job_id))?;
        let mut job = row.lock().await;

        if job.payment_state != PaymentState::Escrowed {
            return Err(CoreError::Conflict(format!(
                "Payment can only be released from ESCROWED (current state is {})",
                job.payment_state
            )));
        }
        if job.status.is_terminal() && job.status != JobStatus::Completed {
            return Err(CoreError::InvalidTransition {
                from: job.status,
                to: JobStatus::Completed,
            });
        }

        job.payment_state = PaymentState::Released;
        job.status = JobStatus::Completed;
        job.updated_at = chrono::Utc::now();

        let payment = self
            .payments
            .release_escrowed(job_id)
            .await;

        tracing::info!(job_id = %job_id, "Escrow released");

        Ok(ReleaseReceipt {
            job: job.clone(),
            payment,
        })
    }
}
