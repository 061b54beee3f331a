//! Repository for bids, grouped per job.

use jobroom_core::types::Id;

use crate::models::bid::Bid;
use crate::table::Table;

/// Bids keyed by job id, in creation order.
#[derive(Default)]
pub struct BidRepo {
    table: Table<Id, Vec<Bid>>,
}

impl BidRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a bid. Callers hold the job row lock so the job's status
    /// cannot change underneath.
    pub(crate) async fn append(&self, bid: Bid) {
        let row = self.table.get_or_insert_with(bid.job_id, Vec::new).await;
        row.lock().await.push(bid);
    }

    pub async fn list_for_job(&self, job_id: Id) -> Vec<Bid> {
        self.table.snapshot(&job_id).await.unwrap_or_default()
    }

}
