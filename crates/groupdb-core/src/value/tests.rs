use crate::{
    model::column::FieldKind,
    value::{Value, canonical_cmp, strict_order_cmp},
};
use std::cmp::Ordering;

#[test]
fn null_orders_below_every_value() {
    for value in [
        Value::Bool(false),
        Value::Int(i64::MIN),
        Value::Uint(0),
        Value::Float64(f64::NEG_INFINITY),
        Value::Text(String::new()),
        Value::Blob(Vec::new()),
    ] {
        assert_eq!(strict_order_cmp(&Value::Null, &value), Some(Ordering::Less));
        assert_eq!(
            strict_order_cmp(&value, &Value::Null),
            Some(Ordering::Greater)
        );
    }

    assert_eq!(
        strict_order_cmp(&Value::Null, &Value::Null),
        Some(Ordering::Equal)
    );
}

#[test]
fn strict_order_rejects_mixed_variants() {
    assert_eq!(strict_order_cmp(&Value::Int(1), &Value::Uint(1)), None);
    assert_eq!(strict_order_cmp(&Value::Text("1".into()), &Value::Int(1)), None);
}

#[test]
fn canonical_order_is_total_across_variants() {
    assert_eq!(
        canonical_cmp(&Value::Int(99), &Value::Text("a".into())),
        Ordering::Less
    );
    assert_eq!(canonical_cmp(&Value::Int(2), &Value::Int(10)), Ordering::Less);
    assert_eq!(
        canonical_cmp(&Value::Float64(f64::NAN), &Value::Float64(f64::NAN)),
        Ordering::Equal
    );
}

#[test]
fn null_fits_every_kind_and_any_accepts_everything() {
    assert!(Value::Null.fits(FieldKind::Int));
    assert!(Value::Text("x".into()).fits(FieldKind::Any));
    assert!(!Value::Text("x".into()).fits(FieldKind::Int));
}

#[test]
fn option_conversion_maps_none_to_null() {
    assert_eq!(Value::from(None::<i64>), Value::Null);
    assert_eq!(Value::from(Some(7i64)), Value::Int(7));
}
