use crate::{
    db::{
        Direction,
        index::{
            FieldAssociationCache, HKey, HKeySegment, HKeySource, IndexRowComposition,
            OrdinalMap, compute_field_associations,
        },
    },
    model::index::{GroupJoinType, IndexBuilder, IndexError},
    test_support::{child_table, fixture, parent_table},
    value::Value,
};
use proptest::prelude::*;
use std::{cmp::Ordering, sync::Arc};

#[test]
fn ordinals_follow_depth_first_order_from_one() {
    let fixture = fixture();
    let ordinals = OrdinalMap::for_group(&fixture.group, 7);

    assert_eq!(ordinals.generation(), 7);
    assert_eq!(ordinals.ordinal(fixture.parent.name()), Some(1));
    assert_eq!(ordinals.ordinal(fixture.child.name()), Some(2));
    assert_eq!(ordinals.len(), 2);
}

#[test]
fn child_index_composition_maps_every_position() {
    let fixture = fixture();
    let associations =
        compute_field_associations(&fixture.child_z, &fixture.ordinals()).expect("associations");

    // (z, pid, cid) over child(cid, pid, z); hkey = [parent.pid, child.cid]
    let composition = associations.row_composition();
    assert_eq!(composition.field_positions(), &[Some(2), Some(1), Some(0)]);
    assert_eq!(composition.hkey_positions(), &[None, Some(0), Some(1)]);

    assert_eq!(
        associations.index_to_hkey().sources(),
        &[
            HKeySource::Ordinal(1),
            HKeySource::IndexRow(1),
            HKeySource::Ordinal(2),
            HKeySource::IndexRow(2),
        ]
    );
}

#[test]
fn every_hkey_segment_has_a_source() {
    let fixture = fixture();
    let ordinals = fixture.ordinals();

    for index in [
        &fixture.parent_pid,
        &fixture.parent_x,
        &fixture.parent_y,
        &fixture.child_z,
    ] {
        let associations = compute_field_associations(index, &ordinals).expect("associations");
        let to_hkey = associations.index_to_hkey();
        let hkey_layout = index.hkey_layout();

        assert_eq!(
            to_hkey.len(),
            hkey_layout.segments().len() + hkey_layout.column_count()
        );
        let ordinal_steps = (0..to_hkey.len())
            .filter(|step| to_hkey.is_ordinal(*step))
            .count();
        assert_eq!(ordinal_steps, hkey_layout.segments().len());
        assert!((0..to_hkey.len()).all(|step| {
            to_hkey.ordinal(step).is_some() || to_hkey.index_row_position(step).is_some()
        }));
    }
}

#[test]
fn associations_are_deterministic() {
    let fixture = fixture();
    let ordinals = fixture.ordinals();

    let first = compute_field_associations(&fixture.child_z, &ordinals).expect("first");
    let second = compute_field_associations(&fixture.child_z, &ordinals).expect("second");

    assert_eq!(first, second);
    assert_eq!(first.all_columns(), fixture.child_z.all_columns());
}

#[test]
fn missing_ordinal_is_reported() {
    let fixture = fixture();
    let mut ordinals = OrdinalMap::new(1);
    ordinals.assign(fixture.child.name().clone(), 2);

    let err = compute_field_associations(&fixture.child_z, &ordinals)
        .expect_err("parent ordinal is missing");

    assert!(matches!(err, IndexError::MissingOrdinal { table, .. } if table == *fixture.parent.name()));
}

#[test]
fn hkey_is_synthesized_from_index_row_alone() {
    let fixture = fixture();
    let associations =
        compute_field_associations(&fixture.child_z, &fixture.ordinals()).expect("associations");
    let row = [Value::Int(88), Value::Int(8001), Value::Int(800_101)];

    let hkey = associations
        .index_to_hkey()
        .hkey_for(&row)
        .expect("hkey synthesizes");

    assert_eq!(hkey.to_string(), "{1,8001},{2,800101}");
    assert_eq!(
        associations.index_to_hkey().hkey_for(&row[..2]),
        Err(IndexError::RowArity {
            index: fixture.child_z.name().clone(),
            expected: 3,
            found: 2,
        })
    );
}

#[test]
fn covering_row_reconstruction_restores_table_fields() {
    let fixture = fixture();
    let composition = IndexRowComposition::for_index(&fixture.parent_x);
    let index_row = [Value::Int(44), Value::Int(4001)];

    assert!(composition.covers_table_row());
    assert_eq!(
        composition.table_row(&index_row, 3),
        vec![Value::Int(4001), Value::Int(44), Value::Null]
    );
    assert_eq!(
        composition.project_table_row(&[Value::Int(4001), Value::Int(44), Value::Int(44)]),
        Some(index_row.to_vec())
    );
}

#[test]
fn group_index_ancestor_columns_have_no_leaf_field() {
    let parent = parent_table();
    let child = child_table(&parent);
    let mut builder = IndexBuilder::group_index(Arc::clone(&child), "gi", GroupJoinType::Left);
    builder
        .add_column_named(&parent, "x", 0, Direction::Asc)
        .expect("x resolves");
    let index = builder.build().expect("group index builds");

    // (parent.x, parent.pid, child.cid)
    let composition = IndexRowComposition::for_index(&index);
    assert_eq!(composition.field_positions(), &[None, Some(1), Some(0)]);
    assert_eq!(composition.hkey_positions(), &[None, Some(0), Some(1)]);
    assert!(!composition.covers_table_row());
}

#[test]
fn cache_serves_one_entry_per_generation() {
    let fixture = fixture();
    let cache = FieldAssociationCache::new();
    let gen1 = OrdinalMap::for_group(&fixture.group, 1);
    let gen2 = OrdinalMap::for_group(&fixture.group, 2);

    let a = cache.get_or_compute(&fixture.child_z, &gen1).expect("a");
    let b = cache.get_or_compute(&fixture.child_z, &gen1).expect("b");
    let c = cache.get_or_compute(&fixture.child_z, &gen2).expect("c");

    assert!(Arc::ptr_eq(&a, &b));
    assert!(!Arc::ptr_eq(&a, &c));
    assert_eq!(c.generation(), 2);

    let stats = cache.stats();
    assert_eq!((stats.hits, stats.misses, stats.size), (1, 2, 2));

    cache.retain_generation(2).expect("retain");
    assert_eq!(cache.stats().size, 1);
}

#[test]
fn parent_hkey_sorts_before_its_children() {
    let parent = HKey::new(vec![HKeySegment {
        ordinal: 1,
        values: vec![Value::Int(8001)],
    }]);
    let child = HKey::new(vec![
        HKeySegment {
            ordinal: 1,
            values: vec![Value::Int(8001)],
        },
        HKeySegment {
            ordinal: 2,
            values: vec![Value::Int(800_100)],
        },
    ]);
    let next_parent = HKey::new(vec![HKeySegment {
        ordinal: 1,
        values: vec![Value::Int(8002)],
    }]);

    assert!(parent.is_ancestor_of(&child));
    assert_eq!(parent.compare(&child), Ordering::Less);
    assert_eq!(child.compare(&next_parent), Ordering::Less);
    assert_eq!(next_parent.compare(&parent), Ordering::Greater);
}

proptest! {
    #[test]
    fn hkey_order_matches_parent_then_child_key_order(
        a in (any::<Option<i32>>(), any::<i32>()),
        b in (any::<Option<i32>>(), any::<i32>()),
    ) {
        let hkey = |(pid, cid): (Option<i32>, i32)| HKey::new(vec![
            HKeySegment { ordinal: 1, values: vec![Value::from(pid.map(i64::from))] },
            HKeySegment { ordinal: 2, values: vec![Value::Int(i64::from(cid))] },
        ]);

        let expected = match (a.0, b.0) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(x), Some(y)) => x.cmp(&y),
        }
        .then(a.1.cmp(&b.1));

        prop_assert_eq!(hkey(a).compare(&hkey(b)), expected);
    }
}
