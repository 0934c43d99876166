use crate::{
    db::{
        index::IndexRowComposition,
        store::{IndexEntry, IndexSnapshot, IndexStore, compare_index_rows},
    },
    error::{ErrorClass, ErrorOrigin, InternalError},
    model::{
        index::{Index, IndexName},
        table::Table,
    },
    value::Value,
};
use std::{
    cmp::Ordering,
    collections::BTreeMap,
    sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
};
use tracing::debug;

///
/// IndexSlot
///

#[derive(Debug)]
struct IndexSlot {
    index: Arc<Index>,
    composition: IndexRowComposition,
    entries: Arc<Vec<IndexEntry>>,
}

impl IndexSlot {
    fn insert(&mut self, row: IndexEntry) {
        // after existing equal entries
        let position = self.entries.partition_point(|entry| {
            compare_index_rows(&self.index, entry, &row) != Ordering::Greater
        });
        Arc::make_mut(&mut self.entries).insert(position, row);
    }
}

///
/// MemoryIndexStore
///
/// In-memory index storage. Writers copy an index's entry list only when a
/// snapshot of it is still held by a reader.
///

#[derive(Debug, Default)]
pub struct MemoryIndexStore {
    indexes: RwLock<BTreeMap<IndexName, IndexSlot>>,
}

impl MemoryIndexStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_index(&self, index: Arc<Index>) -> Result<(), InternalError> {
        let mut indexes = self.write()?;
        if indexes.contains_key(index.name()) {
            return Err(InternalError::new(
                ErrorClass::InvalidArgument,
                ErrorOrigin::Store,
                format!("index '{}' is already registered", index.name()),
            ));
        }

        debug!(index = %index.name(), "registered index");
        indexes.insert(
            index.name().clone(),
            IndexSlot {
                composition: IndexRowComposition::for_index(&index),
                index,
                entries: Arc::new(Vec::new()),
            },
        );

        Ok(())
    }

    pub fn drop_index(&self, name: &IndexName) -> Result<Arc<Index>, InternalError> {
        self.write()?
            .remove(name)
            .map(|slot| slot.index)
            .ok_or_else(|| InternalError::store_not_found(format!("index '{name}'")))
    }

    /// Insert one physical row into `index`.
    pub fn insert_index_row(
        &self,
        index: &IndexName,
        values: Vec<Value>,
    ) -> Result<(), InternalError> {
        let mut indexes = self.write()?;
        let slot = indexes
            .get_mut(index)
            .ok_or_else(|| InternalError::store_not_found(format!("index '{index}'")))?;

        check_index_row(&slot.index, &values)?;
        slot.insert(values.into());

        Ok(())
    }

    /// Insert a table row into every registered table index of `table`.
    /// Returns the number of index entries written.
    pub fn insert_table_row(&self, table: &Table, values: &[Value]) -> Result<usize, InternalError> {
        check_table_row(table, values)?;

        let mut indexes = self.write()?;
        let mut written = 0;
        for slot in indexes.values_mut().filter(|slot| {
            slot.index.is_table_index() && slot.index.leaf_most_table().name() == table.name()
        }) {
            let row = slot.composition.project_table_row(values).ok_or_else(|| {
                InternalError::store_invariant(format!(
                    "index '{}' cannot be maintained from rows of '{}'",
                    slot.index.name(),
                    table.name()
                ))
            })?;
            slot.insert(row.into());
            written += 1;
        }

        Ok(written)
    }

    /// Number of entries currently stored in `index`.
    pub fn len(&self, index: &IndexName) -> Result<usize, InternalError> {
        self.read()?
            .get(index)
            .map(|slot| slot.entries.len())
            .ok_or_else(|| InternalError::store_not_found(format!("index '{index}'")))
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, BTreeMap<IndexName, IndexSlot>>, InternalError> {
        self.indexes
            .read()
            .map_err(|_| InternalError::store_invariant("index store lock poisoned"))
    }

    fn write(
        &self,
    ) -> Result<RwLockWriteGuard<'_, BTreeMap<IndexName, IndexSlot>>, InternalError> {
        self.indexes
            .write()
            .map_err(|_| InternalError::store_invariant("index store lock poisoned"))
    }
}

impl IndexStore for MemoryIndexStore {
    fn snapshot(&self, index: &IndexName) -> Result<IndexSnapshot, InternalError> {
        self.read()?
            .get(index)
            .map(|slot| IndexSnapshot::new(Arc::clone(&slot.index), Arc::clone(&slot.entries)))
            .ok_or_else(|| InternalError::store_not_found(format!("index '{index}'")))
    }
}

fn check_index_row(index: &Index, values: &[Value]) -> Result<(), InternalError> {
    let columns = index.all_columns();
    if values.len() != columns.len() {
        return Err(InternalError::new(
            ErrorClass::InvalidArgument,
            ErrorOrigin::Store,
            format!(
                "index '{}' rows have {} fields, got {}",
                index.name(),
                columns.len(),
                values.len()
            ),
        ));
    }

    for (column, value) in columns.iter().zip(values) {
        if !value.fits(column.column.kind) {
            return Err(InternalError::new(
                ErrorClass::InvalidArgument,
                ErrorOrigin::Store,
                format!(
                    "index '{}' column {column} expects {}, got {value:?}",
                    index.name(),
                    column.column.kind
                ),
            ));
        }
    }

    Ok(())
}

fn check_table_row(table: &Table, values: &[Value]) -> Result<(), InternalError> {
    if values.len() != table.columns().len() {
        return Err(InternalError::new(
            ErrorClass::InvalidArgument,
            ErrorOrigin::Store,
            format!(
                "table '{}' rows have {} fields, got {}",
                table.name(),
                table.columns().len(),
                values.len()
            ),
        ));
    }

    for (column, value) in table.columns().iter().zip(values) {
        if !value.fits(column.kind) || (value.is_null() && !column.nullable) {
            return Err(InternalError::new(
                ErrorClass::InvalidArgument,
                ErrorOrigin::Store,
                format!(
                    "column '{}' of '{}' rejects {value:?}",
                    column.name,
                    table.name()
                ),
            ));
        }
    }

    Ok(())
}
