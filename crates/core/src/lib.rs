//! Domain core for the job collaboration gateway.
//!
//! Everything in this crate is pure: no I/O, no locking, no clocks other than
//! `chrono::Utc::now()` for record timestamps. The store and API crates build
//! on these types and functions.

pub mod chat;
pub mod error;
pub mod frame;
pub mod handshake;
pub mod job_status;
pub mod pagination;
pub mod roles;
pub mod types;
pub mod validation;
