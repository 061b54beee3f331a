//! Access token verification.
//!
//! Tokens are issued elsewhere; this service only verifies them. Issuance is
//! kept as a helper for tests and local tooling.

pub mod jwt;
