//! In-memory authoritative store for jobs, bids, payments, the wallet ledger,
//! idempotency records and rate limit counters.
//!
//! Every table locks per key (see [`table`]). Operations that span tables
//! are methods on [`Store`]; they always lock the job row first and the
//! dependent rows after it.

pub mod access;
pub mod machine;
pub mod models;
pub mod repositories;
pub mod table;

use repositories::{BidRepo, IdempotencyRepo, JobRepo, PaymentRepo, RateLimitRepo, WalletRepo};

/// The full set of repositories, shared behind an `Arc` by the API layer.
#[derive(Default)]
pub struct Store {
    pub jobs: JobRepo,
    pub bids: BidRepo,
    pub payments: PaymentRepo,
    pub wallet: WalletRepo,
    pub idempotency: IdempotencyRepo,
    pub rate_limits: RateLimitRepo,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }
}
