//! Index storage boundary.
//!
//! Scans read through [`IndexStore`]; the store hands out immutable
//! snapshots so an open scan never observes concurrent writes.

mod memory;

#[cfg(test)]
mod tests;

use crate::{
    error::InternalError,
    model::index::{Index, IndexName},
    value::{Value, canonical_cmp},
};
use std::{cmp::Ordering, sync::Arc};

// re-exports
pub use memory::MemoryIndexStore;

///
/// IndexStore
///

pub trait IndexStore: Send + Sync {
    /// Consistent read image of one index, entries in index order.
    fn snapshot(&self, index: &IndexName) -> Result<IndexSnapshot, InternalError>;
}

///
/// IndexEntry
/// One physical index row.
///

pub type IndexEntry = Arc<[Value]>;

///
/// IndexSnapshot
///
/// Point-in-time image of an index. Cheap to clone; entries are shared with
/// the store until the store's next write copies them.
///

#[derive(Clone, Debug)]
pub struct IndexSnapshot {
    index: Arc<Index>,
    entries: Arc<Vec<IndexEntry>>,
}

impl IndexSnapshot {
    #[must_use]
    pub const fn new(index: Arc<Index>, entries: Arc<Vec<IndexEntry>>) -> Self {
        Self { index, entries }
    }

    #[must_use]
    pub const fn index(&self) -> &Arc<Index> {
        &self.index
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn get(&self, position: usize) -> Option<&IndexEntry> {
        self.entries.get(position)
    }

    pub fn iter(&self) -> impl Iterator<Item = &IndexEntry> {
        self.entries.iter()
    }

    /// First position whose entry is not ordered before `probe`.
    pub fn lower_bound(&self, probe: impl Fn(&[Value]) -> Ordering) -> usize {
        self.entries
            .partition_point(|entry| probe(entry.as_ref()) == Ordering::Less)
    }

    /// First position whose entry is ordered after `probe`.
    pub fn upper_bound(&self, probe: impl Fn(&[Value]) -> Ordering) -> usize {
        self.entries
            .partition_point(|entry| probe(entry.as_ref()) != Ordering::Greater)
    }
}

/// Order two index rows by the index's per-column directions.
#[must_use]
pub fn compare_index_rows(index: &Index, left: &[Value], right: &[Value]) -> Ordering {
    index
        .all_columns()
        .iter()
        .zip(left.iter().zip(right))
        .map(|(column, (a, b))| {
            let ordering = canonical_cmp(a, b);
            if column.is_ascending() {
                ordering
            } else {
                ordering.reverse()
            }
        })
        .find(|ordering| ordering.is_ne())
        .unwrap_or(Ordering::Equal)
}
