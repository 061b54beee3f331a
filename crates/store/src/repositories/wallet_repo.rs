//! Repository for the append-only wallet ledger.

use jobroom_core::pagination::{Page, PageParams};
use jobroom_core::types::Id;

use crate::models::wallet::WalletTransaction;
use crate::table::Table;

/// Ledger lines keyed by owner id, oldest first.
#[derive(Default)]
pub struct WalletRepo {
    table: Table<Id, Vec<WalletTransaction>>,
}

impl WalletRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) async fn append(&self, tx: WalletTransaction) {
        let row = self.table.get_or_insert_with(tx.owner_id, Vec::new).await;
        row.lock().await.push(tx);
    }

    /// A user's ledger, newest first.
    pub async fn list_for_owner(&self, owner_id: Id, params: PageParams) -> Page<WalletTransaction> {
        let mut entries = self.table.snapshot(&owner_id).await.unwrap_or_default();
        entries.reverse();
        Page::from_vec(entries, params)
    }
}
