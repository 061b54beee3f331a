//! Job records and DTOs.

use jobroom_core::job_status::{JobStatus, PaymentState};
use jobroom_core::types::{Id, Timestamp};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A job posted by a client.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: Id,
    pub owner_id: Id,
    pub title: String,
    pub description: String,
    pub category: String,
    pub budget: f64,
    pub status: JobStatus,
    pub payment_state: PaymentState,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for `POST /api/v1/jobs`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateJob {
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 5000, message = "must be at most 5000 characters"))]
    pub description: String,
    #[validate(length(min = 1, max = 100, message = "must be 1-100 characters"))]
    pub category: String,
    #[validate(range(min = 0.0, message = "must be a non-negative number"))]
    pub budget: f64,
}

impl CreateJob {
    /// Trim surrounding whitespace so blank strings fail the length checks.
    pub fn normalized(self) -> Self {
        Self {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            category: self.category.trim().to_string(),
            budget: self.budget,
        }
    }
}

/// DTO for `POST /api/v1/jobs/{id}/status`.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct UpdateJobStatus {
    pub status: JobStatus,
}

/// Query parameters for `GET /api/v1/jobs`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobListQuery {
    pub status: Option<JobStatus>,
    /// Exact category match, case-insensitive.
    pub category: Option<String>,
    /// Case-insensitive substring over title and description.
    pub search: Option<String>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

impl JobListQuery {
    pub fn matches(&self, job: &Job) -> bool {
        if let Some(status) = self.status {
            if job.status != status {
                return false;
            }
        }
        if let Some(category) = self.category.as_deref().map(str::trim) {
            if !category.is_empty() && !job.category.eq_ignore_ascii_case(category) {
                return false;
            }
        }
        if let Some(search) = self.search.as_deref().map(str::trim) {
            if !search.is_empty() {
                let needle = search.to_lowercase();
                if !job.title.to_lowercase().contains(&needle)
                    && !job.description.to_lowercase().contains(&needle)
                {
                    return false;
                }
            }
        }
        true
    }
}
