//! Repository for idempotency records.

use std::future::Future;

use crate::models::idempotency::IdempotencyRecord;
use crate::table::{Row, Table};

/// Records keyed by the caller-supplied key.
///
/// A slot exists from the first time a key is seen; it holds `None` until the
/// first execution finishes and is never overwritten afterwards.
#[derive(Default)]
pub struct IdempotencyRepo {
    table: Table<String, Option<IdempotencyRecord>>,
}

/// Result of [`IdempotencyRepo::execute_once`].
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub record: IdempotencyRecord,
    /// `true` when the record was stored by an earlier call.
    pub replayed: bool,
}

impl IdempotencyRepo {
    pub fn new() -> Self {
        Self::default()
    }

    async fn slot(&self, key: &str) -> Row<Option<IdempotencyRecord>> {
        self.table.get_or_insert_with(key.to_string(), || None).await
    }

    /// Run `execute` at most once for `key` and store its `(status, body)`.
    ///
    /// The slot lock is held while `execute` runs, so concurrent callers with
    /// the same key wait and then receive the stored record. An `Err` from
    /// `execute` is passed through and nothing is stored, leaving the key
    /// free for a retry.
    pub async fn execute_once<F, Fut, E>(&self, key: &str, execute: F) -> Result<Outcome, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<(u16, Vec<u8>), E>>,
    {
        let slot = self.slot(key).await;
        let mut stored = slot.lock().await;

        if let Some(record) = stored.as_ref() {
            return Ok(Outcome {
                record: record.clone(),
                replayed: true,
            });
        }

        let (status, body) = execute().await?;
        let record = Self::record(
            &mut stored,
            IdempotencyRecord {
                key: key.to_string(),
                status,
                body,
                created_at: chrono::Utc::now(),
            },
        );
        Ok(Outcome {
            record,
            replayed: false,
        })
    }

    /// Store `record` in its slot unless one is already there.
    ///
    /// Returns the record that is stored after the call.
    pub fn record(
        slot: &mut Option<IdempotencyRecord>,
        record: IdempotencyRecord,
    ) -> IdempotencyRecord {
        slot.get_or_insert(record).clone()
    }
}
