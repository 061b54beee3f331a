//! Repository for jobs.

use jobroom_core::job_status::{JobStatus, PaymentState};
use jobroom_core::pagination::{Page, PageParams};
use jobroom_core::types::{new_id, Id};

use crate::models::job::{CreateJob, Job, JobListQuery};
use crate::table::{Row, Table};

/// Jobs keyed by id. Jobs are never deleted.
#[derive(Default)]
pub struct JobRepo {
    table: Table<Id, Job>,
}

impl JobRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a job in `OPEN` / `PENDING_ESCROW`.
    pub async fn create(&self, owner_id: Id, input: CreateJob) -> Job {
        let now = chrono::Utc::now();
        let job = Job {
            id: new_id(),
            owner_id,
            title: input.title,
            description: input.description,
            category: input.category,
            budget: input.budget,
            status: JobStatus::Open,
            payment_state: PaymentState::PendingEscrow,
            created_at: now,
            updated_at: now,
        };
        self.table.put(job.id, job.clone()).await;
        job
    }

    pub async fn find_by_id(&self, id: Id) -> Option<Job> {
        self.table.snapshot(&id).await
    }

    /// Locked handle to a job row, for multi-step mutations.
    pub(crate) async fn row(&self, id: Id) -> Option<Row<Job>> {
        self.table.get(&id).await
    }

    /// Filter, order newest first, and paginate.
    pub async fn list(&self, query: &JobListQuery) -> Page<Job> {
        let mut jobs: Vec<Job> = self
            .table
            .values()
            .await
            .into_iter()
            .filter(|job| query.matches(job))
            .collect();
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Page::from_vec(
            jobs,
            PageParams {
                page: query.page,
                page_size: query.page_size,
            },
        )
    }
}
