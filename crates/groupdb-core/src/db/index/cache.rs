//! Field-association cache keyed by (index, ordinal-map generation).

use crate::{
    db::index::{FieldAssociations, compute_field_associations, ordinal::OrdinalMap},
    error::{ErrorClass, ErrorOrigin, InternalError},
    model::index::{Index, IndexName},
};
use std::{
    collections::BTreeMap,
    sync::{
        Arc, Mutex, MutexGuard,
        atomic::{AtomicUsize, Ordering},
    },
};

type Entries = BTreeMap<(IndexName, u64), Arc<FieldAssociations>>;

///
/// CacheStats
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    pub size: usize,
}

///
/// FieldAssociationCache
///
/// Shared across concurrent query compilations. An entry computed for one
/// generation is never served for another; entries of retired generations
/// are dropped by `retain_generation`.
///

#[derive(Debug, Default)]
pub struct FieldAssociationCache {
    entries: Mutex<Entries>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl FieldAssociationCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the associations for `index` under `ordinals`, computing and
    /// caching them on first use.
    pub fn get_or_compute(
        &self,
        index: &Index,
        ordinals: &OrdinalMap,
    ) -> Result<Arc<FieldAssociations>, InternalError> {
        let key = (index.name().clone(), ordinals.generation());

        if let Some(found) = self.lock()?.get(&key).cloned() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(found);
        }

        // computed outside the lock; a racing insert for the same key is equal
        let computed = Arc::new(compute_field_associations(index, ordinals)?);
        self.misses.fetch_add(1, Ordering::Relaxed);

        let mut entries = self.lock()?;
        let entry = entries.entry(key).or_insert(computed);

        Ok(Arc::clone(entry))
    }

    /// Drop every entry computed for a generation other than `generation`.
    pub fn retain_generation(&self, generation: u64) -> Result<(), InternalError> {
        self.lock()?.retain(|(_, entry_generation), _| *entry_generation == generation);

        Ok(())
    }

    // Cache statistics are best-effort only.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        let size = self.entries.lock().map_or(0, |entries| entries.len());

        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            size,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Entries>, InternalError> {
        self.entries.lock().map_err(|_| {
            InternalError::new(
                ErrorClass::Internal,
                ErrorOrigin::Index,
                "field association cache lock poisoned",
            )
        })
    }
}
