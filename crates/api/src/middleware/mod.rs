//! Authentication, authorization and rate limiting middleware.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated user from a JWT Bearer token.
//! - [`rbac::RequireClient`] -- Requires `client` or `admin` role.
//! - [`rbac::RequireFreelancer`] -- Requires `freelancer` or `admin` role.
//! - [`rbac::RequireAuth`] -- Requires any authenticated user.
//! - [`rate_limit::enforce`] -- Fixed-window request budget per caller.

pub mod auth;
pub mod rate_limit;
pub mod rbac;
