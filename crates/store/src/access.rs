//! Access resolution for job-scoped operations and chat rooms.
//!
//! A caller may enter a job's context when they are an admin, the job's
//! owner, or have placed at least one bid on it. The predicate is evaluated
//! against a fresh snapshot on every call; nothing is cached, so a new bid
//! grants access on the very next check.

use jobroom_core::error::CoreError;
use jobroom_core::roles::Identity;
use jobroom_core::types::Id;

use crate::models::bid::Bid;
use crate::models::job::Job;
use crate::Store;

/// Pure access predicate over a job and its bids.
pub fn can_access(identity: &Identity, job: &Job, bids: &[Bid]) -> bool {
    identity.is_admin()
        || job.owner_id == identity.user_id
        || bids
            .iter()
            .any(|bid| bid.job_id == job.id && bid.bidder_id == identity.user_id)
}

impl Store {
    /// Consistent view of a job and its bids.
    ///
    /// The job row lock is held while the bids are copied, and bid creation
    /// takes the same lock, so the pair always belongs together.
    pub async fn access_snapshot(&self, job_id: Id) -> Option<(Job, Vec<Bid>)> {
        let row = self.jobs.row(job_id).await?;
        let job = row.lock().await;
        let bids = self.bids.list_for_job(job_id).await;
        Some((job.clone(), bids))
    }

    /// Resolve access for `identity` on `job_id`.
    ///
    /// Returns the job snapshot on success, `NotFound` for an unknown job and
    /// `Forbidden` when the predicate denies access.
    pub async fn resolve_access(&self, identity: &Identity, job_id: Id) -> Result<Job, CoreError> {
        let (job, bids) = self
            .access_snapshot(job_id)
            .await
            .ok_or_else(|| CoreError::not_found("Job", job_id))?;

        if !can_access(identity, &job, &bids) {
            return Err(CoreError::Forbidden(
                "You do not have access to this job".into(),
            ));
        }
        Ok(job)
    }
}
