use crate::model::{column::TableName, group::Group};
use std::collections::BTreeMap;

///
/// OrdinalMap
///
/// Table ordinals for one schema generation. Within a group, ordinals are
/// assigned in depth-first pre-order starting at 1 for the root, so hkeys of
/// a parent's children sort directly after the parent segment.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct OrdinalMap {
    generation: u64,
    ordinals: BTreeMap<TableName, u32>,
}

impl OrdinalMap {
    #[must_use]
    pub fn new(generation: u64) -> Self {
        Self {
            generation,
            ordinals: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn for_group(group: &Group, generation: u64) -> Self {
        Self::for_groups([group], generation)
    }

    /// Ordinals for several groups; numbering restarts at 1 in each group.
    #[must_use]
    pub fn for_groups<'a>(groups: impl IntoIterator<Item = &'a Group>, generation: u64) -> Self {
        let mut map = Self::new(generation);
        for group in groups {
            for (ordinal, table) in (1..).zip(group.tables_depth_first()) {
                map.ordinals.insert(table.name().clone(), ordinal);
            }
        }

        map
    }

    /// Assign an explicit ordinal, replacing any previous one.
    pub fn assign(&mut self, table: TableName, ordinal: u32) {
        self.ordinals.insert(table, ordinal);
    }

    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn ordinal(&self, table: &TableName) -> Option<u32> {
        self.ordinals.get(table).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ordinals.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ordinals.is_empty()
    }
}
