//! Repositories over the in-memory tables.
//!
//! Each repository owns one [`Table`](crate::table::Table). Operations that
//! touch several repositories at once live on [`Store`](crate::Store) so the
//! lock order (job row first, then the dependent rows) is kept in one place.

pub mod bid_repo;
pub mod idempotency_repo;
pub mod job_repo;
pub mod payment_repo;
pub mod rate_limit_repo;
pub mod wallet_repo;

pub use bid_repo::BidRepo;
pub use idempotency_repo::IdempotencyRepo;
pub use job_repo::JobRepo;
pub use payment_repo::PaymentRepo;
pub use rate_limit_repo::RateLimitRepo;
pub use wallet_repo::WalletRepo;
