use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

///
/// FieldKind
///
/// Semantic type of one row field. `Any` is reserved for derived row types
/// whose fields are not constrained (projections over mixed inputs).
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum FieldKind {
    Bool,
    Int,
    Uint,
    Float64,
    Text,
    Blob,
    Any,
}

impl Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Uint => "uint",
            Self::Float64 => "float64",
            Self::Text => "text",
            Self::Blob => "blob",
            Self::Any => "any",
        };
        write!(f, "{label}")
    }
}

///
/// TableName
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct TableName {
    pub schema: String,
    pub table: String,
}

impl TableName {
    #[must_use]
    pub fn new(schema: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            table: table.into(),
        }
    }
}

impl Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.table)
    }
}

///
/// Column
/// One declared column; `position` is its field position in the table row.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Column {
    pub name: String,
    pub position: usize,
    pub kind: FieldKind,
    pub nullable: bool,
}

impl Column {
    #[must_use]
    pub fn new(name: impl Into<String>, position: usize, kind: FieldKind, nullable: bool) -> Self {
        Self {
            name: name.into(),
            position,
            kind,
            nullable,
        }
    }
}

///
/// ColumnRef
///
/// Table-qualified column position. Used by hkey descriptions, where a
/// segment's columns belong to an ancestor table.
///

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ColumnRef {
    pub table: TableName,
    pub position: usize,
}

impl ColumnRef {
    #[must_use]
    pub const fn new(table: TableName, position: usize) -> Self {
        Self { table, position }
    }
}

impl Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.table, self.position)
    }
}
