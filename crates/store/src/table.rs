//! Generic keyed table with one lock per row.
//!
//! The outer `RwLock` only guards the key set and is held for the duration
//! of a lookup or insert. Each row sits behind its own `Mutex`, so mutations
//! of different keys never contend and mutations of the same key are
//! serialized.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

/// Shared handle to one row.
pub type Row<V> = Arc<Mutex<V>>;

pub struct Table<K, V> {
    rows: RwLock<HashMap<K, Row<V>>>,
}

impl<K, V> Table<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(HashMap::new()),
        }
    }

    /// Handle to the row for `key`, if present.
    pub async fn get(&self, key: &K) -> Option<Row<V>> {
        self.rows.read().await.get(key).cloned()
    }

    /// Insert a row, replacing any previous row under the same key.
    pub async fn put(&self, key: K, value: V) -> Row<V> {
        let row = Arc::new(Mutex::new(value));
        self.rows.write().await.insert(key, Arc::clone(&row));
        row
    }

    /// Handle to the row for `key`, creating it with `init` if absent.
    ///
    /// Two concurrent callers for the same absent key receive the same row.
    pub async fn get_or_insert_with(&self, key: K, init: impl FnOnce() -> V) -> Row<V> {
        if let Some(row) = self.get(&key).await {
            return row;
        }
        let mut rows = self.rows.write().await;
        Arc::clone(
            rows.entry(key)
                .or_insert_with(|| Arc::new(Mutex::new(init()))),
        )
    }

    /// Apply `f` to the row under its lock.
    ///
    /// This is the compare-and-set primitive: `f` sees the current value and
    /// decides whether to change it, with no other writer interleaving.
    /// Returns `None` when the key is absent.
    pub async fn update<R>(&self, key: &K, f: impl FnOnce(&mut V) -> R) -> Option<R> {
        let row = self.get(key).await?;
        let mut guard = row.lock().await;
        Some(f(&mut guard))
    }

    /// Remove the row for `key` when `pred` holds.
    ///
    /// The key-set write lock is held while `pred` runs under the row lock,
    /// so no lookup can hand out the row between the check and the removal.
    pub async fn remove_if(&self, key: &K, pred: impl FnOnce(&mut V) -> bool) -> bool {
        let mut rows = self.rows.write().await;
        let Some(row) = rows.get(key).cloned() else {
            return false;
        };
        let remove = pred(&mut *row.lock().await);
        if remove {
            rows.remove(key);
        }
        remove
    }

    pub async fn keys(&self) -> Vec<K> {
        self.rows.read().await.keys().cloned().collect()
    }

}

impl<K, V> Table<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Consistent copy of one row.
    pub async fn snapshot(&self, key: &K) -> Option<V> {
        let row = self.get(key).await?;
        let value = row.lock().await.clone();
        Some(value)
    }

    /// Copy of every row. Each row is read under its own lock.
    pub async fn values(&self) -> Vec<V> {
        let rows: Vec<Row<V>> = self.rows.read().await.values().cloned().collect();
        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(row.lock().await.clone());
        }
        out
    }
}

impl<K, V> Default for Table<K, V>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}
