use crate::{
    GROUPING_FK_PREFIX,
    db::Direction,
    error::{ErrorClass, ErrorOrigin, InternalError},
    model::{
        column::{Column, ColumnRef, TableName},
        table::{HKeyLayout, Table},
    },
};
use serde::{Deserialize, Serialize};
use std::{
    fmt::{self, Display},
    sync::Arc,
};
use thiserror::Error as ThisError;

const INDEX_ID_BITS: u32 = 0x0000_FFFF;
const IS_VALID_FLAG: u32 = INDEX_ID_BITS + 1;
const IS_RIGHT_JOIN_FLAG: u32 = IS_VALID_FLAG << 1;

///
/// IndexError
///
/// Index definition and key-composition failures.
///

#[derive(Debug, Eq, PartialEq, ThisError)]
pub enum IndexError {
    #[error("index id out of range: {id} > {max}", max = INDEX_ID_BITS)]
    IdOutOfRange { id: u32 },

    #[error("can't add column to index '{index}' because its column list is frozen")]
    ColumnsFrozen { index: IndexName },

    #[error("index '{index}' declares no key columns")]
    NoColumns { index: IndexName },

    #[error("index '{index}' references unknown column '{column}' of '{table}'")]
    UnknownColumn {
        index: IndexName,
        table: TableName,
        column: String,
    },

    #[error("index '{index}' column from '{table}' lies outside the indexed branch")]
    ColumnOutsideBranch { index: IndexName, table: TableName },

    #[error("index '{index}' declares position {position} more than once")]
    DuplicatePosition { index: IndexName, position: usize },

    #[error("index '{index}' cannot source hkey column {column} from its branch")]
    HKeyColumnUnavailable { index: IndexName, column: ColumnRef },

    #[error("group index '{index}' requires a join type")]
    MissingJoinType { index: IndexName },

    #[error("no ordinal assigned to table '{table}' (required by index '{index}')")]
    MissingOrdinal { index: IndexName, table: TableName },

    #[error("index row has {found} fields, index '{index}' expects {expected}")]
    RowArity {
        index: IndexName,
        expected: usize,
        found: usize,
    },
}

impl From<IndexError> for InternalError {
    fn from(err: IndexError) -> Self {
        Self::new(ErrorClass::InvalidArgument, ErrorOrigin::Index, err.to_string())
    }
}

///
/// IndexId
/// 16-bit index identifier.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct IndexId(u16);

impl IndexId {
    #[expect(clippy::cast_possible_truncation)]
    pub const fn new(raw: u32) -> Result<Self, IndexError> {
        if raw | INDEX_ID_BITS != INDEX_ID_BITS {
            return Err(IndexError::IdOutOfRange { id: raw });
        }

        Ok(Self(raw as u16))
    }

    #[must_use]
    pub const fn get(self) -> u16 {
        self.0
    }
}

///
/// IndexConstraint
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum IndexConstraint {
    PrimaryKey,
    Unique,
    Key,
    ForeignKey,
}

impl IndexConstraint {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PrimaryKey => "PRIMARY",
            Self::Unique => "UNIQUE",
            Self::Key => "KEY",
            Self::ForeignKey => "FOREIGN KEY",
        }
    }
}

///
/// GroupJoinType
/// Join semantics of a group index (meaningless for table indexes).
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum GroupJoinType {
    Left,
    Right,
}

///
/// IndexKind
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum IndexKind {
    Table,
    Group,
}

impl Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Table => write!(f, "TABLE"),
            Self::Group => write!(f, "GROUP"),
        }
    }
}

///
/// IndexName
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct IndexName {
    pub table: TableName,
    pub name: String,
}

impl IndexName {
    #[must_use]
    pub fn new(table: TableName, name: impl Into<String>) -> Self {
        Self {
            table,
            name: name.into(),
        }
    }
}

impl Display for IndexName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.table, self.name)
    }
}

///
/// IndexColumn
///
/// One column of an index. `position` is the declared key position and
/// determines both storage order and the default traversal direction.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IndexColumn {
    pub table: TableName,
    pub column: Column,
    pub position: usize,
    pub direction: Direction,
}

impl IndexColumn {
    #[must_use]
    pub const fn new(table: TableName, column: Column, position: usize, direction: Direction) -> Self {
        Self {
            table,
            column,
            position,
            direction,
        }
    }

    #[must_use]
    pub const fn is_ascending(&self) -> bool {
        matches!(self.direction, Direction::Asc)
    }
}

impl Display for IndexColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let direction = match self.direction {
            Direction::Asc => "",
            Direction::Desc => " DESC",
        };
        write!(f, "{}.{}{direction}", self.table.table, self.column.name)
    }
}

///
/// IndexBuilder
///
/// Mutable index definition. Columns may be added in any order until the
/// list is frozen; freezing sorts them by declared position exactly once.
/// `build` consumes the builder and yields an immutable [`Index`].
///

#[derive(Debug)]
pub struct IndexBuilder {
    name: IndexName,
    id: Option<IndexId>,
    unique: bool,
    constraint: IndexConstraint,
    kind: IndexKind,
    join_type: Option<GroupJoinType>,
    valid: bool,
    tree_name: Option<String>,
    leaf: Arc<Table>,
    key_columns: Vec<IndexColumn>,
    columns_stale: bool,
    columns_frozen: bool,
}

impl IndexBuilder {
    /// Start a table index over `table`.
    #[must_use]
    pub fn table_index(
        table: Arc<Table>,
        name: impl Into<String>,
        unique: bool,
        constraint: IndexConstraint,
    ) -> Self {
        Self {
            name: IndexName::new(table.name().clone(), name),
            id: None,
            unique,
            constraint,
            kind: IndexKind::Table,
            join_type: None,
            valid: true,
            tree_name: None,
            leaf: table,
            key_columns: Vec::new(),
            columns_stale: false,
            columns_frozen: false,
        }
    }

    /// Start a group index whose leaf-most table is `leaf`.
    #[must_use]
    pub fn group_index(leaf: Arc<Table>, name: impl Into<String>, join_type: GroupJoinType) -> Self {
        Self {
            name: IndexName::new(leaf.name().clone(), name),
            id: None,
            unique: false,
            constraint: IndexConstraint::Key,
            kind: IndexKind::Group,
            join_type: Some(join_type),
            valid: false,
            tree_name: None,
            leaf,
            key_columns: Vec::new(),
            columns_stale: false,
            columns_frozen: false,
        }
    }

    pub fn id(&mut self, id: u32) -> Result<&mut Self, IndexError> {
        self.id = Some(IndexId::new(id)?);

        Ok(self)
    }

    /// Apply a packed id-and-flags word (id, VALID flag, RIGHT-join flag).
    pub fn id_and_flags(&mut self, id_and_flags: u32) -> Result<&mut Self, IndexError> {
        self.id = Some(IndexId::new(id_and_flags & INDEX_ID_BITS)?);
        self.valid = id_and_flags & IS_VALID_FLAG == IS_VALID_FLAG;
        if self.kind == IndexKind::Group {
            self.join_type = Some(if id_and_flags & IS_RIGHT_JOIN_FLAG == IS_RIGHT_JOIN_FLAG {
                GroupJoinType::Right
            } else {
                GroupJoinType::Left
            });
        }

        Ok(self)
    }

    pub fn valid(&mut self, valid: bool) -> &mut Self {
        self.valid = valid;

        self
    }

    pub fn tree_name(&mut self, tree_name: impl Into<String>) -> &mut Self {
        self.tree_name = Some(tree_name.into());

        self
    }

    #[must_use]
    pub const fn name(&self) -> &IndexName {
        &self.name
    }

    /// Key columns as currently held (sorted once frozen).
    #[must_use]
    pub fn key_columns(&self) -> &[IndexColumn] {
        &self.key_columns
    }

    #[must_use]
    pub const fn is_frozen(&self) -> bool {
        self.columns_frozen
    }

    pub fn add_column(&mut self, column: IndexColumn) -> Result<(), IndexError> {
        if self.columns_frozen {
            return Err(IndexError::ColumnsFrozen {
                index: self.name.clone(),
            });
        }
        self.key_columns.push(column);
        self.columns_stale = true;

        Ok(())
    }

    /// Add the column named `column` of `table` at declared `position`.
    pub fn add_column_named(
        &mut self,
        table: &Table,
        column: &str,
        position: usize,
        direction: Direction,
    ) -> Result<(), IndexError> {
        let resolved = table
            .column_named(column)
            .ok_or_else(|| IndexError::UnknownColumn {
                index: self.name.clone(),
                table: table.name().clone(),
                column: column.to_string(),
            })?;

        self.add_column(IndexColumn::new(
            table.name().clone(),
            resolved.clone(),
            position,
            direction,
        ))
    }

    pub fn freeze_columns(&mut self) {
        if !self.columns_frozen {
            if self.columns_stale {
                // stable: equal positions keep insertion order
                self.key_columns.sort_by_key(|column| column.position);
                self.columns_stale = false;
            }
            self.columns_frozen = true;
        }
    }

    pub fn build(mut self) -> Result<Index, IndexError> {
        self.freeze_columns();

        if self.kind == IndexKind::Group && self.join_type.is_none() {
            return Err(IndexError::MissingJoinType { index: self.name });
        }
        if self.key_columns.is_empty() {
            return Err(IndexError::NoColumns { index: self.name });
        }

        // Phase 1: validate declared columns against the leaf lineage.
        let lineage: Vec<Arc<Table>> = lineage_arcs(&self.leaf);
        let mut root_depth = lineage.len() - 1;
        for (i, column) in self.key_columns.iter().enumerate() {
            if self.key_columns[..i].iter().any(|c| c.position == column.position) {
                return Err(IndexError::DuplicatePosition {
                    index: self.name,
                    position: column.position,
                });
            }

            let depth = match self.kind {
                IndexKind::Table => (column.table == *self.leaf.name()).then_some(root_depth),
                IndexKind::Group => lineage.iter().position(|t| *t.name() == column.table),
            };
            let Some(depth) = depth else {
                return Err(IndexError::ColumnOutsideBranch {
                    table: column.table.clone(),
                    index: self.name,
                });
            };
            let table = &lineage[depth];
            if table.column(column.column.position) != Some(&column.column) {
                return Err(IndexError::UnknownColumn {
                    table: column.table.clone(),
                    column: column.column.name.clone(),
                    index: self.name,
                });
            }
            root_depth = root_depth.min(depth);
        }
        let branch = lineage[root_depth..].to_vec();

        // Phase 2: append hkey columns not already covered by a key column.
        let hkey = self.leaf.hkey_layout();
        let mut all_columns = self.key_columns.clone();
        for hkey_column in hkey.columns() {
            if source_position(&branch, &all_columns, hkey_column).is_some() {
                continue;
            }

            let supplier = branch.iter().find_map(|table| {
                table
                    .local_equivalent(hkey_column)
                    .and_then(|position| table.column(position))
                    .map(|column| (table.name().clone(), column.clone()))
            });
            let Some((table, column)) = supplier else {
                return Err(IndexError::HKeyColumnUnavailable {
                    index: self.name,
                    column: hkey_column.clone(),
                });
            };
            let position = all_columns.len();
            all_columns.push(IndexColumn::new(table, column, position, Direction::Asc));
        }

        let tree_name = self.tree_name.unwrap_or_else(|| self.name.to_string());

        Ok(Index {
            name: self.name,
            id: self.id,
            unique: self.unique,
            constraint: self.constraint,
            kind: self.kind,
            join_type: self.join_type,
            valid: self.valid,
            tree_name,
            branch,
            hkey,
            key_columns: self.key_columns,
            all_columns,
        })
    }
}

fn lineage_arcs(leaf: &Arc<Table>) -> Vec<Arc<Table>> {
    let mut out = match leaf.parent() {
        Some(parent) => lineage_arcs(parent),
        None => Vec::new(),
    };
    out.push(Arc::clone(leaf));

    out
}

// Index-row position of the first column that carries `hkey_column`.
pub(crate) fn source_position(
    branch: &[Arc<Table>],
    columns: &[IndexColumn],
    hkey_column: &ColumnRef,
) -> Option<usize> {
    columns.iter().position(|column| {
        branch
            .iter()
            .find(|table| *table.name() == column.table)
            .and_then(|table| table.local_equivalent(hkey_column))
            == Some(column.column.position)
    })
}

///
/// Index
///
/// Frozen index definition. Key columns are sorted by declared position and
/// immutable; `all_columns` appends the hkey columns needed to rebuild the
/// owning row's hierarchical identity from an index row alone.
///

#[derive(Debug)]
pub struct Index {
    name: IndexName,
    id: Option<IndexId>,
    unique: bool,
    constraint: IndexConstraint,
    kind: IndexKind,
    join_type: Option<GroupJoinType>,
    valid: bool,
    tree_name: String,
    branch: Vec<Arc<Table>>,
    hkey: HKeyLayout,
    key_columns: Vec<IndexColumn>,
    all_columns: Vec<IndexColumn>,
}

impl Index {
    #[must_use]
    pub const fn name(&self) -> &IndexName {
        &self.name
    }

    #[must_use]
    pub const fn id(&self) -> Option<IndexId> {
        self.id
    }

    #[must_use]
    pub const fn is_unique(&self) -> bool {
        self.unique
    }

    #[must_use]
    pub const fn constraint(&self) -> IndexConstraint {
        self.constraint
    }

    #[must_use]
    pub const fn is_primary_key(&self) -> bool {
        matches!(self.constraint, IndexConstraint::PrimaryKey)
    }

    #[must_use]
    pub fn is_grouping_foreign_key(&self) -> bool {
        matches!(self.constraint, IndexConstraint::ForeignKey)
            && self.name.name.starts_with(GROUPING_FK_PREFIX)
    }

    #[must_use]
    pub const fn kind(&self) -> IndexKind {
        self.kind
    }

    #[must_use]
    pub const fn is_table_index(&self) -> bool {
        matches!(self.kind, IndexKind::Table)
    }

    #[must_use]
    pub const fn is_group_index(&self) -> bool {
        matches!(self.kind, IndexKind::Group)
    }

    #[must_use]
    pub const fn join_type(&self) -> Option<GroupJoinType> {
        self.join_type
    }

    /// Table indexes are always valid.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.is_table_index() || self.valid
    }

    #[must_use]
    pub fn tree_name(&self) -> &str {
        &self.tree_name
    }

    /// Packed id-and-flags word, or `None` when no id has been assigned.
    #[must_use]
    pub fn id_and_flags(&self) -> Option<u32> {
        let mut word = u32::from(self.id?.get());
        if self.valid {
            word |= IS_VALID_FLAG;
        }
        if self.join_type == Some(GroupJoinType::Right) {
            word |= IS_RIGHT_JOIN_FLAG;
        }

        Some(word)
    }

    #[must_use]
    pub fn key_columns(&self) -> &[IndexColumn] {
        &self.key_columns
    }

    #[must_use]
    pub fn all_columns(&self) -> &[IndexColumn] {
        &self.all_columns
    }

    /// Tables spanned by this index, root-most first.
    #[must_use]
    pub fn branch(&self) -> &[Arc<Table>] {
        &self.branch
    }

    #[must_use]
    pub fn root_most_table(&self) -> &Arc<Table> {
        &self.branch[0]
    }

    #[must_use]
    pub fn leaf_most_table(&self) -> &Arc<Table> {
        &self.branch[self.branch.len() - 1]
    }

    /// Hkey layout of the leaf-most table.
    #[must_use]
    pub const fn hkey_layout(&self) -> &HKeyLayout {
        &self.hkey
    }

    pub(crate) fn branch_table(&self, name: &TableName) -> Option<&Arc<Table>> {
        self.branch.iter().find(|table| table.name() == name)
    }
}

impl Display for Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let columns = self
            .key_columns
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");

        if self.unique {
            write!(f, "UNIQUE {} {}({columns})", self.kind, self.name)
        } else {
            write!(f, "{} {}({columns})", self.kind, self.name)
        }
    }
}
