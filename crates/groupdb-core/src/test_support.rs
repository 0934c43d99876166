//! Shared parent/child group fixture for unit tests.
//!
//! parent(pid PK, x, y) with indexes on pid, x, y; child(cid PK, pid, z)
//! grouped under parent through pid, with an index on z.

use crate::{
    db::{Direction, index::OrdinalMap, store::MemoryIndexStore},
    model::{
        column::{FieldKind, TableName},
        group::Group,
        index::{Index, IndexBuilder, IndexConstraint},
        table::Table,
    },
    value::Value,
};
use std::sync::Arc;

pub(crate) const SCHEMA: &str = "test";

///
/// Fixture
///

pub(crate) struct Fixture {
    pub(crate) parent: Arc<Table>,
    pub(crate) child: Arc<Table>,
    pub(crate) group: Group,
    pub(crate) parent_pid: Arc<Index>,
    pub(crate) parent_x: Arc<Index>,
    pub(crate) parent_y: Arc<Index>,
    pub(crate) child_z: Arc<Index>,
    pub(crate) store: Arc<MemoryIndexStore>,
}

impl Fixture {
    pub(crate) fn ordinals(&self) -> OrdinalMap {
        OrdinalMap::for_group(&self.group, 1)
    }
}

pub(crate) fn parent_table() -> Arc<Table> {
    Arc::new(
        Table::builder(TableName::new(SCHEMA, "parent"))
            .column("pid", FieldKind::Int, false)
            .column("x", FieldKind::Int, true)
            .column("y", FieldKind::Int, true)
            .primary_key(&["pid"])
            .build()
            .expect("parent table should build"),
    )
}

pub(crate) fn child_table(parent: &Arc<Table>) -> Arc<Table> {
    Arc::new(
        Table::builder(TableName::new(SCHEMA, "child"))
            .column("cid", FieldKind::Int, false)
            .column("pid", FieldKind::Int, true)
            .column("z", FieldKind::Int, true)
            .primary_key(&["cid"])
            .grouping_parent(Arc::clone(parent), &[("pid", "pid")])
            .build()
            .expect("child table should build"),
    )
}

pub(crate) fn single_column_index(
    table: &Arc<Table>,
    name: &str,
    column: &str,
    constraint: IndexConstraint,
) -> Arc<Index> {
    let unique = matches!(constraint, IndexConstraint::PrimaryKey);
    let mut builder = IndexBuilder::table_index(Arc::clone(table), name, unique, constraint);
    builder
        .add_column_named(table, column, 0, Direction::Asc)
        .expect("index column should resolve");

    Arc::new(builder.build().expect("index should build"))
}

// (pid, x, y)
const PARENTS: &[(i64, Option<i64>, Option<i64>)] = &[
    (1000, Some(-1), Some(12)),
    (1001, Some(-1), Some(12)),
    (1002, Some(-1), Some(12)),
    (2000, Some(22), Some(-1)),
    (2001, Some(22), Some(-1)),
    (2002, Some(22), Some(-1)),
    (3000, Some(31), Some(-1)),
    (3001, Some(31), Some(-1)),
    (3002, Some(31), Some(-1)),
    (3003, Some(9999), Some(32)),
    (3004, Some(9999), Some(32)),
    (3005, Some(9999), Some(32)),
    (4000, Some(44), Some(-1)),
    (4001, Some(44), Some(44)),
    (4002, Some(44), Some(44)),
    (4003, Some(44), Some(9999)),
    (5000, Some(-1), Some(55)),
    (5001, Some(55), Some(55)),
    (5002, Some(55), Some(55)),
    (5003, Some(9999), Some(55)),
    (6000, Some(-1), Some(66)),
    (6001, Some(-1), Some(66)),
    (6002, Some(66), Some(66)),
    (6003, Some(66), Some(66)),
    (6004, Some(66), Some(9999)),
    (6005, Some(66), Some(9999)),
    (7000, Some(70), Some(70)),
    (8000, Some(88), Some(88)),
    (8001, Some(88), Some(88)),
    (8002, Some(88), Some(88)),
];

// (cid, pid, z)
const CHILDREN: &[(i64, Option<i64>, Option<i64>)] = &[
    (800_000, Some(8000), Some(88)),
    (800_100, Some(8001), Some(88)),
    (800_101, Some(8001), Some(88)),
    (800_200, Some(8002), Some(88)),
    (800_201, Some(8002), Some(88)),
    (800_202, Some(8002), Some(88)),
    (900_000, Some(9000), Some(99)),
    (1_200_000, None, Some(12)),
];

pub(crate) fn fixture() -> Fixture {
    let parent = parent_table();
    let child = child_table(&parent);

    let mut group = Group::new("parent_group", Arc::clone(&parent)).expect("group root");
    group
        .add_table(Arc::clone(&child))
        .expect("child joins the group");

    let parent_pid = single_column_index(&parent, "pk", "pid", IndexConstraint::PrimaryKey);
    let parent_x = single_column_index(&parent, "idx_x", "x", IndexConstraint::Key);
    let parent_y = single_column_index(&parent, "idx_y", "y", IndexConstraint::Key);
    let child_z = single_column_index(&child, "idx_z", "z", IndexConstraint::Key);

    let store = Arc::new(MemoryIndexStore::new());
    for index in [&parent_pid, &parent_x, &parent_y, &child_z] {
        store
            .register_index(Arc::clone(index))
            .expect("index registers");
    }

    for (pid, x, y) in PARENTS {
        let row = [Value::Int(*pid), Value::from(*x), Value::from(*y)];
        store
            .insert_table_row(&parent, &row)
            .expect("parent row inserts");
    }
    for (cid, pid, z) in CHILDREN {
        let row = [Value::Int(*cid), Value::from(*pid), Value::from(*z)];
        store
            .insert_table_row(&child, &row)
            .expect("child row inserts");
    }

    Fixture {
        parent,
        child,
        group,
        parent_pid,
        parent_x,
        parent_y,
        child_z,
        store,
    }
}

pub(crate) const PARENT_COUNT: usize = PARENTS.len();

/// Integer values of an index entry, NULL as `None`.
pub(crate) fn ints(values: &[Value]) -> Vec<Option<i64>> {
    values
        .iter()
        .map(|value| match value {
            Value::Int(v) => Some(*v),
            _ => None,
        })
        .collect()
}
