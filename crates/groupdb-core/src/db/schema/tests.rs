use crate::{
    db::{
        index::FieldAssociationCache,
        schema::{Schema, SchemaCatalog},
    },
    error::ErrorClass,
    model::{SchemaError, group::Group, index::IndexName},
    test_support::{Fixture, fixture},
};
use std::sync::Arc;

fn seeded_catalog() -> (SchemaCatalog, Fixture) {
    let fixture = fixture();
    let catalog = SchemaCatalog::new();
    let group = fixture.group.clone();
    let indexes = [
        Arc::clone(&fixture.parent_pid),
        Arc::clone(&fixture.parent_x),
        Arc::clone(&fixture.child_z),
    ];

    catalog
        .update(|schema| {
            schema.add_group(group)?;
            for index in indexes {
                schema.add_index(index)?;
            }
            Ok(())
        })
        .expect("seed schema");

    (catalog, fixture)
}

#[test]
fn successful_changes_bump_the_generation() {
    let (catalog, fixture) = seeded_catalog();
    let before = catalog.snapshot().expect("snapshot");
    assert_eq!(before.generation(), 1);

    let after = catalog
        .update(|schema| schema.add_index(Arc::clone(&fixture.parent_y)))
        .expect("add idx_y");

    assert_eq!(after.generation(), 2);
    assert!(after.index(fixture.parent_y.name()).is_some());

    // earlier snapshots are unaffected
    assert!(before.index(fixture.parent_y.name()).is_none());
}

#[test]
fn failed_changes_leave_the_schema_untouched() {
    let (catalog, fixture) = seeded_catalog();

    let err = catalog
        .update(|schema| {
            schema.drop_index(fixture.parent_x.name())?;
            schema.add_index(Arc::clone(&fixture.child_z))
        })
        .expect_err("duplicate index");
    assert_eq!(err.class, ErrorClass::InvalidArgument);

    let current = catalog.snapshot().expect("snapshot");
    assert_eq!(current.generation(), 1);
    assert!(current.index(fixture.parent_x.name()).is_some());
}

#[test]
fn group_tables_are_registered_once() {
    let fixture = fixture();
    let mut schema = Schema::new();
    schema.add_group(fixture.group.clone()).expect("group");

    assert!(schema.table(fixture.child.name()).is_some());
    assert!(matches!(
        schema.add_group(fixture.group.clone()),
        Err(SchemaError::DuplicateGroup { .. })
    ));

    let renamed = Group::new("other", Arc::clone(&fixture.parent)).expect("group");
    assert!(matches!(
        schema.add_group(renamed),
        Err(SchemaError::DuplicateTable { .. })
    ));
}

#[test]
fn indexes_require_known_tables() {
    let fixture = fixture();
    let mut schema = Schema::new();

    assert!(matches!(
        schema.add_index(Arc::clone(&fixture.child_z)),
        Err(SchemaError::UnknownTable { .. })
    ));
}

#[test]
fn field_associations_follow_the_generation() {
    let (catalog, fixture) = seeded_catalog();
    let cache = FieldAssociationCache::new();

    let first = catalog.snapshot().expect("snapshot");
    let a = first
        .field_associations(&cache, fixture.child_z.name())
        .expect("associations");
    assert_eq!(a.generation(), 1);
    assert_eq!(first.ordinals().ordinal(fixture.child.name()), Some(2));

    let second = catalog
        .update(|schema| schema.add_index(Arc::clone(&fixture.parent_y)))
        .expect("change");
    let b = second
        .field_associations(&cache, fixture.child_z.name())
        .expect("associations");
    assert_eq!(b.generation(), 2);
    assert!(!Arc::ptr_eq(&a, &b));

    let missing = IndexName::new(fixture.child.name().clone(), "nope");
    let err = second
        .field_associations(&cache, &missing)
        .expect_err("unknown index");
    assert_eq!(err.class, ErrorClass::NotFound);
}

#[test]
fn publishing_prunes_retired_associations() {
    let (catalog, fixture) = seeded_catalog();

    let first = catalog
        .field_associations(fixture.child_z.name())
        .expect("associations");
    assert_eq!(first.generation(), 1);
    assert_eq!(catalog.association_cache().stats().size, 1);

    catalog
        .update(|schema| schema.add_index(Arc::clone(&fixture.parent_y)))
        .expect("change");
    assert_eq!(catalog.association_cache().stats().size, 0);

    let second = catalog
        .field_associations(fixture.child_z.name())
        .expect("associations");
    assert_eq!(second.generation(), 2);
    assert_eq!(catalog.association_cache().stats().size, 1);
}
