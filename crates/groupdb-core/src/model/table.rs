use crate::model::{
    SchemaError,
    column::{Column, ColumnRef, FieldKind, TableName},
};
use std::sync::Arc;

///
/// Table
///
/// Immutable table definition. A table with a parent belongs to the
/// parent's group; the grouping join maps child columns onto the parent's
/// primary key, which is what lets a child row carry its ancestors' identity.
///

#[derive(Debug, Eq, PartialEq)]
pub struct Table {
    name: TableName,
    columns: Vec<Column>,
    primary_key: Vec<usize>,
    parent: Option<ParentJoin>,
}

///
/// ParentJoin
/// Grouping join: `(child column, parent primary-key column)` pairs.
///

#[derive(Debug, Eq, PartialEq)]
pub struct ParentJoin {
    parent: Arc<Table>,
    pairs: Vec<(usize, usize)>,
}

impl ParentJoin {
    #[must_use]
    pub const fn parent(&self) -> &Arc<Table> {
        &self.parent
    }

    #[must_use]
    pub fn pairs(&self) -> &[(usize, usize)] {
        &self.pairs
    }
}

impl Table {
    #[must_use]
    pub fn builder(name: TableName) -> TableBuilder {
        TableBuilder {
            name,
            columns: Vec::new(),
            primary_key: Vec::new(),
            parent: None,
        }
    }

    #[must_use]
    pub const fn name(&self) -> &TableName {
        &self.name
    }

    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    #[must_use]
    pub fn column(&self, position: usize) -> Option<&Column> {
        self.columns.get(position)
    }

    #[must_use]
    pub fn column_named(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name == name)
    }

    #[must_use]
    pub fn primary_key(&self) -> &[usize] {
        &self.primary_key
    }

    #[must_use]
    pub const fn parent_join(&self) -> Option<&ParentJoin> {
        self.parent.as_ref()
    }

    #[must_use]
    pub fn parent(&self) -> Option<&Arc<Table>> {
        self.parent.as_ref().map(ParentJoin::parent)
    }

    /// Number of ancestors above this table (root is 0).
    #[must_use]
    pub fn depth(&self) -> usize {
        self.parent().map_or(0, |parent| parent.depth() + 1)
    }

    /// Tables from the group root down to (and including) this table.
    #[must_use]
    pub fn lineage(&self) -> Vec<&Self> {
        let mut out = match self.parent() {
            Some(parent) => parent.lineage(),
            None => Vec::new(),
        };
        out.push(self);

        out
    }

    #[must_use]
    pub fn is_ancestor_or_self_of(&self, other: &Self) -> bool {
        other
            .lineage()
            .iter()
            .any(|table| table.name == self.name)
    }

    /// Hkey layout: one segment per lineage table, each holding that
    /// table's primary-key columns.
    #[must_use]
    pub fn hkey_layout(&self) -> HKeyLayout {
        let segments = self
            .lineage()
            .into_iter()
            .map(|table| HKeySegmentLayout {
                table: table.name.clone(),
                columns: table
                    .primary_key
                    .iter()
                    .map(|position| ColumnRef::new(table.name.clone(), *position))
                    .collect(),
            })
            .collect();

        HKeyLayout { segments }
    }

    /// Position of the column of this table that carries the same value as
    /// `target`, following grouping joins upwards.
    #[must_use]
    pub fn local_equivalent(&self, target: &ColumnRef) -> Option<usize> {
        if target.table == self.name {
            return self.column(target.position).map(|column| column.position);
        }

        let join = self.parent.as_ref()?;
        let parent_position = join.parent.local_equivalent(target)?;

        join.pairs
            .iter()
            .find(|(_, parent_column)| *parent_column == parent_position)
            .map(|(child_column, _)| *child_column)
    }
}

///
/// TableBuilder
///

#[derive(Debug)]
pub struct TableBuilder {
    name: TableName,
    columns: Vec<Column>,
    primary_key: Vec<String>,
    parent: Option<(Arc<Table>, Vec<(String, String)>)>,
}

impl TableBuilder {
    #[must_use]
    pub fn column(mut self, name: impl Into<String>, kind: FieldKind, nullable: bool) -> Self {
        let position = self.columns.len();
        self.columns.push(Column::new(name, position, kind, nullable));

        self
    }

    #[must_use]
    pub fn primary_key(mut self, columns: &[&str]) -> Self {
        self.primary_key = columns.iter().map(ToString::to_string).collect();

        self
    }

    /// Declare the grouping join to `parent`: `(child column, parent column)`
    /// pairs covering the parent's whole primary key.
    #[must_use]
    pub fn grouping_parent(mut self, parent: Arc<Table>, join: &[(&str, &str)]) -> Self {
        let pairs = join
            .iter()
            .map(|(child, parent)| ((*child).to_string(), (*parent).to_string()))
            .collect();
        self.parent = Some((parent, pairs));

        self
    }

    pub fn build(self) -> Result<Table, SchemaError> {
        let Self {
            name,
            columns,
            primary_key,
            parent,
        } = self;

        for (index, column) in columns.iter().enumerate() {
            if columns[..index].iter().any(|other| other.name == column.name) {
                return Err(SchemaError::DuplicateColumn {
                    table: name,
                    column: column.name.clone(),
                });
            }
        }

        let resolve = |table: &TableName, cols: &[Column], column: &str| {
            cols.iter()
                .find(|c| c.name == column)
                .map(|c| c.position)
                .ok_or_else(|| SchemaError::UnknownColumn {
                    table: table.clone(),
                    column: column.to_string(),
                })
        };

        if primary_key.is_empty() {
            return Err(SchemaError::EmptyPrimaryKey { table: name });
        }
        let primary_key = primary_key
            .iter()
            .map(|column| resolve(&name, &columns, column))
            .collect::<Result<Vec<_>, _>>()?;

        let parent = match parent {
            None => None,
            Some((parent, join)) => {
                let mut pairs = Vec::with_capacity(join.len());
                for (child_column, parent_column) in &join {
                    let child_position = resolve(&name, &columns, child_column)?;
                    let parent_position =
                        resolve(parent.name(), parent.columns(), parent_column)?;
                    pairs.push((child_position, parent_position));
                }

                // The join must cover the parent's primary key exactly once.
                let mut joined: Vec<usize> = pairs.iter().map(|(_, p)| *p).collect();
                joined.sort_unstable();
                let mut parent_pk = parent.primary_key().to_vec();
                parent_pk.sort_unstable();
                if joined != parent_pk {
                    return Err(SchemaError::GroupingJoinMismatch {
                        child: name,
                        parent: parent.name().clone(),
                    });
                }

                Some(ParentJoin { parent, pairs })
            }
        };

        Ok(Table {
            name,
            columns,
            primary_key,
            parent,
        })
    }
}

///
/// HKeyLayout
///
/// Shape of a table's hierarchical key: the ancestor chain of primary keys.
/// Flat hkey positions number the columns across segments in order.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HKeyLayout {
    segments: Vec<HKeySegmentLayout>,
}

///
/// HKeySegmentLayout
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HKeySegmentLayout {
    pub table: TableName,
    pub columns: Vec<ColumnRef>,
}

impl HKeyLayout {
    #[must_use]
    pub fn segments(&self) -> &[HKeySegmentLayout] {
        &self.segments
    }

    /// All hkey columns in flat position order.
    pub fn columns(&self) -> impl Iterator<Item = &ColumnRef> {
        self.segments
            .iter()
            .flat_map(|segment| segment.columns.iter())
    }

    #[must_use]
    pub fn column_count(&self) -> usize {
        self.segments.iter().map(|s| s.columns.len()).sum()
    }
}
