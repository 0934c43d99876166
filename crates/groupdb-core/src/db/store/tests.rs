use crate::{
    db::store::{IndexStore, MemoryIndexStore, compare_index_rows},
    error::ErrorClass,
    model::index::IndexName,
    test_support::{PARENT_COUNT, fixture, ints},
    value::{Value, canonical_cmp},
};
use std::{cmp::Ordering, sync::Arc};

#[test]
fn table_rows_maintain_every_table_index() {
    let fixture = fixture();

    assert_eq!(
        fixture.store.len(fixture.parent_x.name()).expect("len"),
        PARENT_COUNT
    );
    assert_eq!(fixture.store.len(fixture.child_z.name()).expect("len"), 8);
}

#[test]
fn entries_are_kept_in_index_order() {
    let fixture = fixture();
    let snapshot = fixture
        .store
        .snapshot(fixture.parent_x.name())
        .expect("snapshot");

    let entries: Vec<_> = snapshot.iter().collect();
    assert!(entries.windows(2).all(|pair| {
        compare_index_rows(&fixture.parent_x, &pair[0], &pair[1]) != Ordering::Greater
    }));

    // x = -1 sorts first, pid breaks ties
    assert_eq!(ints(&entries[0][..]), vec![Some(-1), Some(1000)]);
    assert_eq!(ints(&entries[1][..]), vec![Some(-1), Some(1001)]);
}

#[test]
fn snapshots_are_isolated_from_later_writes() {
    let fixture = fixture();
    let before = fixture
        .store
        .snapshot(fixture.parent_pid.name())
        .expect("snapshot");

    fixture
        .store
        .insert_table_row(
            &fixture.parent,
            &[Value::Int(9000), Value::Int(90), Value::Null],
        )
        .expect("insert");
    let after = fixture
        .store
        .snapshot(fixture.parent_pid.name())
        .expect("snapshot");

    assert_eq!(before.len(), PARENT_COUNT);
    assert_eq!(after.len(), PARENT_COUNT + 1);
}

#[test]
fn bounds_locate_key_ranges() {
    let fixture = fixture();
    let snapshot = fixture
        .store
        .snapshot(fixture.child_z.name())
        .expect("snapshot");
    let probe = |entry: &[Value]| canonical_cmp(&entry[0], &Value::Int(88));

    let start = snapshot.lower_bound(probe);
    let end = snapshot.upper_bound(probe);

    assert_eq!(end - start, 6);
    let first = snapshot.get(start).expect("first entry in range");
    assert_eq!(ints(first), vec![Some(88), Some(8000), Some(800_000)]);
}

#[test]
fn row_validation_rejects_bad_rows() {
    let fixture = fixture();

    let err = fixture
        .store
        .insert_table_row(&fixture.parent, &[Value::Null, Value::Null, Value::Null])
        .expect_err("pid is not nullable");
    assert_eq!(err.class, ErrorClass::InvalidArgument);

    let err = fixture
        .store
        .insert_index_row(fixture.child_z.name(), vec![Value::Int(1)])
        .expect_err("arity");
    assert_eq!(err.class, ErrorClass::InvalidArgument);

    let err = fixture
        .store
        .insert_index_row(
            fixture.child_z.name(),
            vec![Value::from("z"), Value::Int(1), Value::Int(2)],
        )
        .expect_err("kind");
    assert_eq!(err.class, ErrorClass::InvalidArgument);
}

#[test]
fn unknown_and_duplicate_indexes() {
    let fixture = fixture();
    let store = MemoryIndexStore::new();
    let missing = IndexName::new(fixture.parent.name().clone(), "nope");

    let err = store.snapshot(&missing).expect_err("unknown index");
    assert_eq!(err.class, ErrorClass::NotFound);

    store
        .register_index(Arc::clone(&fixture.parent_x))
        .expect("first registration");
    let err = store
        .register_index(Arc::clone(&fixture.parent_x))
        .expect_err("second registration");
    assert_eq!(err.class, ErrorClass::InvalidArgument);

    let dropped = store.drop_index(fixture.parent_x.name()).expect("drop");
    assert!(Arc::ptr_eq(&dropped, &fixture.parent_x));
}
