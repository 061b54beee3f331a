//! Bid records and DTOs.

use jobroom_core::types::{Id, Timestamp};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A freelancer's bid on an open job. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bid {
    pub id: Id,
    pub job_id: Id,
    pub bidder_id: Id,
    pub amount: f64,
    pub message: String,
    pub created_at: Timestamp,
}

/// DTO for `POST /api/v1/jobs/{id}/bids`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBid {
    #[validate(range(min = 0.0, message = "must be a non-negative number"))]
    pub amount: f64,
    #[serde(default)]
    #[validate(length(max = 2000, message = "must be at most 2000 characters"))]
    pub message: String,
}
