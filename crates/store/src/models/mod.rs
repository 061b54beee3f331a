//! Record types and request DTOs for the in-memory store.

pub mod bid;
pub mod idempotency;
pub mod job;
pub mod payment;
pub mod rate_limit;
pub mod wallet;
