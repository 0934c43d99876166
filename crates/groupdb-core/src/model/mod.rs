//! Schema metadata: tables, table groups, and index definitions.
//!
//! Everything here is immutable once built and safe to share across
//! concurrent query executions.

pub mod column;
pub mod group;
pub mod index;
pub mod table;


use crate::{
    error::{ErrorClass, ErrorOrigin, InternalError},
    model::{column::TableName, index::IndexName},
};
use thiserror::Error as ThisError;

///
/// SchemaError
///
/// Table, group, and schema-level definition failures.
///

#[derive(Debug, Eq, PartialEq, ThisError)]
pub enum SchemaError {
    #[error("table '{table}' declares column '{column}' more than once")]
    DuplicateColumn { table: TableName, column: String },

    #[error("table '{table}' has no column '{column}'")]
    UnknownColumn { table: TableName, column: String },

    #[error("table '{table}' has no primary key")]
    EmptyPrimaryKey { table: TableName },

    #[error("grouping join of '{child}' must cover the primary key of '{parent}'")]
    GroupingJoinMismatch { child: TableName, parent: TableName },

    #[error("group root '{table}' must not have a parent")]
    RootHasParent { table: TableName },

    #[error("table '{table}' already exists")]
    DuplicateTable { table: TableName },

    #[error("parent of table '{table}' is not part of the group")]
    OrphanTable { table: TableName },

    #[error("group '{group}' already exists")]
    DuplicateGroup { group: String },

    #[error("unknown table '{table}'")]
    UnknownTable { table: TableName },

    #[error("index '{index}' already exists")]
    DuplicateIndex { index: IndexName },

    #[error("unknown index '{index}'")]
    UnknownIndex { index: IndexName },

    #[error(transparent)]
    Index(#[from] index::IndexError),
}

impl From<SchemaError> for InternalError {
    fn from(err: SchemaError) -> Self {
        let class = match &err {
            SchemaError::UnknownTable { .. } | SchemaError::UnknownIndex { .. } => {
                ErrorClass::NotFound
            }
            _ => ErrorClass::InvalidArgument,
        };

        Self::new(class, ErrorOrigin::Schema, err.to_string())
    }
}
