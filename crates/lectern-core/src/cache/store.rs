//! Shared snapshot storage.

use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use lectern_upstream::{Category, Record};

use super::model::Snapshot;

/// Process-wide snapshot holder.
///
/// Clones share the same snapshot. [`read`](Self::read) never blocks on
/// network I/O: the write lock is only held while lists are swapped in.
#[derive(Debug, Clone, Default)]
pub struct SnapshotStore {
    inner: Arc<RwLock<Snapshot>>,
}

impl SnapshotStore {
    /// Creates a store holding an empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current snapshot.
    ///
    /// Category lists are reference-counted, so this does not copy records.
    #[must_use]
    pub fn read(&self) -> Snapshot {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the time of the last completed refresh.
    #[must_use]
    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .last_updated()
    }

    /// Commits the result of one refresh cycle.
    ///
    /// Only the given categories are replaced; all others keep their data.
    /// Returns the recorded refresh time.
    pub(crate) fn commit(
        &self,
        updates: Vec<(Category, Vec<Record>)>,
        now: DateTime<Utc>,
    ) -> DateTime<Utc> {
        let mut snapshot = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        for (category, records) in updates {
            snapshot.replace(category, records);
        }
        snapshot.touch(now)
    }
}
