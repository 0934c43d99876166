use crate::{
    model::{column::ColumnRef, index::Index},
    value::Value,
};

///
/// IndexRowComposition
///
/// Per index-row position: where the value lives in the leaf table's row
/// (`field_positions`) and which flat hkey position it carries
/// (`hkey_positions`). A position may have either, both, or (for ancestor
/// columns with no leaf equivalent) only an hkey slot.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IndexRowComposition {
    field_positions: Vec<Option<usize>>,
    hkey_positions: Vec<Option<usize>>,
}

impl IndexRowComposition {
    #[must_use]
    pub fn for_index(index: &Index) -> Self {
        let leaf = index.leaf_most_table();
        let hkey_columns: Vec<&ColumnRef> = index.hkey_layout().columns().collect();

        let mut field_positions = Vec::with_capacity(index.all_columns().len());
        let mut hkey_positions = Vec::with_capacity(index.all_columns().len());
        for column in index.all_columns() {
            let column_ref = ColumnRef::new(column.table.clone(), column.column.position);
            field_positions.push(leaf.local_equivalent(&column_ref));

            let carrier = index.branch_table(&column.table);
            hkey_positions.push(hkey_columns.iter().position(|hkey_column| {
                carrier.and_then(|table| table.local_equivalent(hkey_column))
                    == Some(column.column.position)
            }));
        }

        Self {
            field_positions,
            hkey_positions,
        }
    }

    /// Width of the physical index row.
    #[must_use]
    pub fn len(&self) -> usize {
        self.field_positions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.field_positions.is_empty()
    }

    #[must_use]
    pub fn field_positions(&self) -> &[Option<usize>] {
        &self.field_positions
    }

    #[must_use]
    pub fn hkey_positions(&self) -> &[Option<usize>] {
        &self.hkey_positions
    }

    #[must_use]
    pub fn field_position(&self, index_position: usize) -> Option<usize> {
        self.field_positions.get(index_position).copied().flatten()
    }

    #[must_use]
    pub fn hkey_position(&self, index_position: usize) -> Option<usize> {
        self.hkey_positions.get(index_position).copied().flatten()
    }

    /// Whether every index-row position is sourced from the leaf table row.
    #[must_use]
    pub fn covers_table_row(&self) -> bool {
        self.field_positions.iter().all(Option::is_some)
    }

    /// Project a leaf table row into index-row layout. `None` when some
    /// position has no leaf source or the table row is too short.
    #[must_use]
    pub fn project_table_row(&self, table_row: &[Value]) -> Option<Vec<Value>> {
        self.field_positions
            .iter()
            .map(|position| position.and_then(|p| table_row.get(p).cloned()))
            .collect()
    }

    /// Rebuild the leaf table row covered by `index_row`. Table fields the
    /// index does not carry come back as NULL.
    #[must_use]
    pub fn table_row(&self, index_row: &[Value], table_width: usize) -> Vec<Value> {
        let mut row = vec![Value::Null; table_width];
        for (value, position) in index_row.iter().zip(&self.field_positions) {
            if let Some(slot) = position.and_then(|p| row.get_mut(p)) {
                *slot = value.clone();
            }
        }

        row
    }
}
