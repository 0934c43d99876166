//! Core runtime for groupdb: table-group schema metadata, index key
//! composition, and the pull-based cursor kernel (index scans and ordered
//! index intersection).
#![warn(unreachable_pub)]

// public exports are one module level down
pub mod config;
pub mod db;
pub mod error;
pub mod model;
pub mod obs;
pub mod value;

// test
#[cfg(test)]
pub(crate) mod test_support;

///
/// CONSTANTS
///

/// Name prefix marking a FOREIGN KEY constraint as a grouping join.
pub const GROUPING_FK_PREFIX: &str = "__grouping";

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No errors, stores, or helpers are re-exported here.
///

pub mod prelude {
    pub use crate::{
        db::{
            Direction,
            executor::{
                Cursor, IntersectOrdered, IntersectOutput, JoinType, QueryContext, RowOrdering,
            },
            row::{Row, RowType},
        },
        model::{
            column::{Column, FieldKind, TableName},
            index::{Index, IndexBuilder, IndexColumn},
            table::Table,
        },
        value::Value,
    };
}
