//! Module: db::schema
//! Responsibility: versioned schema snapshots and atomic schema changes.
//! Does not own: persistence of definitions.

#[cfg(test)]
mod tests;

use crate::{
    db::index::{FieldAssociationCache, FieldAssociations, OrdinalMap},
    error::{ErrorClass, ErrorOrigin, InternalError},
    model::{
        SchemaError,
        column::TableName,
        group::Group,
        index::{Index, IndexName},
        table::Table,
    },
};
use std::{
    collections::BTreeMap,
    sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
};
use tracing::debug;

///
/// Schema
///
/// One immutable generation of schema metadata: table groups, their tables,
/// and every index defined over them.
///

#[derive(Clone, Debug, Default)]
pub struct Schema {
    generation: u64,
    groups: BTreeMap<String, Arc<Group>>,
    tables: BTreeMap<TableName, Arc<Table>>,
    indexes: BTreeMap<IndexName, Arc<Index>>,
}

impl Schema {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn group(&self, name: &str) -> Option<&Arc<Group>> {
        self.groups.get(name)
    }

    #[must_use]
    pub fn table(&self, name: &TableName) -> Option<&Arc<Table>> {
        self.tables.get(name)
    }

    #[must_use]
    pub fn index(&self, name: &IndexName) -> Option<&Arc<Index>> {
        self.indexes.get(name)
    }

    pub fn indexes(&self) -> impl Iterator<Item = &Arc<Index>> {
        self.indexes.values()
    }

    /// Register a group and every table in it.
    pub fn add_group(&mut self, group: Group) -> Result<(), SchemaError> {
        if self.groups.contains_key(group.name()) {
            return Err(SchemaError::DuplicateGroup {
                group: group.name().to_string(),
            });
        }
        let tables = group.tables_depth_first();
        if let Some(taken) = tables.iter().find(|t| self.tables.contains_key(t.name())) {
            return Err(SchemaError::DuplicateTable {
                table: taken.name().clone(),
            });
        }

        let tables: Vec<_> = tables.into_iter().cloned().collect();
        for table in tables {
            self.tables.insert(table.name().clone(), table);
        }
        self.groups.insert(group.name().to_string(), Arc::new(group));

        Ok(())
    }

    /// Register an index; every table of its branch must be known.
    pub fn add_index(&mut self, index: Arc<Index>) -> Result<(), SchemaError> {
        if self.indexes.contains_key(index.name()) {
            return Err(SchemaError::DuplicateIndex {
                index: index.name().clone(),
            });
        }
        if let Some(missing) = index
            .branch()
            .iter()
            .find(|table| !self.tables.contains_key(table.name()))
        {
            return Err(SchemaError::UnknownTable {
                table: missing.name().clone(),
            });
        }

        self.indexes.insert(index.name().clone(), index);

        Ok(())
    }

    pub fn drop_index(&mut self, name: &IndexName) -> Result<Arc<Index>, SchemaError> {
        self.indexes
            .remove(name)
            .ok_or_else(|| SchemaError::UnknownIndex {
                index: name.clone(),
            })
    }

    /// Table ordinals of this generation.
    #[must_use]
    pub fn ordinals(&self) -> OrdinalMap {
        OrdinalMap::for_groups(self.groups.values().map(Arc::as_ref), self.generation)
    }

    /// Cached field associations of `index` for this generation.
    pub fn field_associations(
        &self,
        cache: &FieldAssociationCache,
        index: &IndexName,
    ) -> Result<Arc<FieldAssociations>, InternalError> {
        let index = self.index(index).ok_or_else(|| SchemaError::UnknownIndex {
            index: index.clone(),
        })?;

        cache.get_or_compute(index, &self.ordinals())
    }
}

///
/// SchemaCatalog
///
/// Owner of the current schema. Readers clone the current snapshot under a
/// short read lock; changes are applied to a draft and published whole.
/// Field associations of retired generations are pruned on publish.
///

#[derive(Debug, Default)]
pub struct SchemaCatalog {
    current: RwLock<Arc<Schema>>,
    associations: FieldAssociationCache,
}

impl SchemaCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current schema. The read lock is released before returning.
    pub fn snapshot(&self) -> Result<Arc<Schema>, InternalError> {
        Ok(Arc::clone(&*self.read()?))
    }

    /// Field associations of `index` in the current schema.
    pub fn field_associations(
        &self,
        index: &IndexName,
    ) -> Result<Arc<FieldAssociations>, InternalError> {
        self.snapshot()?.field_associations(&self.associations, index)
    }

    #[must_use]
    pub const fn association_cache(&self) -> &FieldAssociationCache {
        &self.associations
    }

    /// Apply `change` to a copy of the current schema. On success the copy
    /// becomes current under the next generation; on failure nothing changes.
    pub fn update<F>(&self, change: F) -> Result<Arc<Schema>, InternalError>
    where
        F: FnOnce(&mut Schema) -> Result<(), SchemaError>,
    {
        let mut current = self.write()?;

        let mut draft = Schema::clone(&current);
        change(&mut draft)?;
        draft.generation = current.generation + 1;

        let published = Arc::new(draft);
        *current = Arc::clone(&published);
        drop(current);

        self.associations.retain_generation(published.generation)?;

        debug!(
            generation = published.generation,
            indexes = published.indexes.len(),
            "schema change published"
        );

        Ok(published)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Arc<Schema>>, InternalError> {
        self.current.read().map_err(|_| poisoned())
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Arc<Schema>>, InternalError> {
        self.current.write().map_err(|_| poisoned())
    }
}

fn poisoned() -> InternalError {
    InternalError::new(
        ErrorClass::Internal,
        ErrorOrigin::Schema,
        "schema catalog lock poisoned",
    )
}
