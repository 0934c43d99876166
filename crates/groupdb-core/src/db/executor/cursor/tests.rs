use crate::{
    db::{
        executor::{
            CancellationToken, QueryContext, TransactionId,
            cursor::{Cursor, CursorState, RowsCursor, collect_rows},
        },
        row::RowType,
    },
    error::ErrorClass,
    model::column::FieldKind,
    value::Value,
};
use std::time::Instant;

fn ints_cursor(values: &[i64]) -> RowsCursor {
    let row_type = RowType::derived("ints", vec![FieldKind::Int]);

    RowsCursor::from_values(row_type, values.iter().map(|v| vec![Value::Int(*v)]))
        .expect("rows build")
}

#[test]
fn lifecycle_runs_closed_open_drained_closed() {
    let ctx = QueryContext::default();
    let mut cursor = ints_cursor(&[1, 2]);
    assert_eq!(cursor.state(), CursorState::Closed);

    cursor.open(&ctx).expect("open");
    assert!(cursor.state().is_active());

    assert!(cursor.advance(&ctx).expect("row 1").is_some());
    assert!(cursor.advance(&ctx).expect("row 2").is_some());
    assert!(cursor.advance(&ctx).expect("end").is_none());
    assert_eq!(cursor.state(), CursorState::Drained);

    // exhaustion is sticky
    assert!(cursor.advance(&ctx).expect("still end").is_none());

    cursor.close();
    assert!(cursor.state().is_closed());
}

#[test]
fn double_open_and_closed_advance_are_misuse() {
    let ctx = QueryContext::default();
    let mut cursor = ints_cursor(&[1]);

    let err = cursor.advance(&ctx).expect_err("never opened");
    assert_eq!(err.class, ErrorClass::StateMisuse);

    cursor.open(&ctx).expect("open");
    let err = cursor.open(&ctx).expect_err("already open");
    assert_eq!(err.class, ErrorClass::StateMisuse);

    cursor.close();
    let err = cursor.advance(&ctx).expect_err("closed");
    assert_eq!(err.class, ErrorClass::StateMisuse);
}

#[test]
fn close_is_idempotent_and_safe_before_open() {
    let mut cursor = ints_cursor(&[1]);

    cursor.close();
    cursor.close();

    assert!(cursor.state().is_closed());
}

#[test]
fn reopening_restarts_the_stream() {
    let ctx = QueryContext::default();
    let mut cursor = ints_cursor(&[5, 6]);

    let first = collect_rows(&mut cursor, &ctx).expect("first pass");
    let second = collect_rows(&mut cursor, &ctx).expect("second pass");

    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
}

#[test]
fn cancellation_fails_the_next_advance_and_close_still_succeeds() {
    let token = CancellationToken::new();
    let ctx = QueryContext::default().with_cancellation(token.clone());
    let mut cursor = ints_cursor(&[1, 2, 3]);

    cursor.open(&ctx).expect("open");
    assert!(cursor.advance(&ctx).expect("row").is_some());

    token.cancel();
    let err = cursor.advance(&ctx).expect_err("cancelled");
    assert_eq!(err.class, ErrorClass::Cancelled);
    assert!(err.is_cancellation());

    cursor.close();
    assert!(cursor.state().is_closed());
}

#[test]
fn drained_cursors_still_observe_cancellation() {
    let token = CancellationToken::new();
    let ctx = QueryContext::default().with_cancellation(token.clone());
    let mut cursor = ints_cursor(&[1]);

    cursor.open(&ctx).expect("open");
    assert!(cursor.advance(&ctx).expect("row").is_some());
    assert!(cursor.advance(&ctx).expect("end").is_none());
    assert_eq!(cursor.state(), CursorState::Drained);

    token.cancel();
    let err = cursor.advance(&ctx).expect_err("cancelled after drain");
    assert_eq!(err.class, ErrorClass::Cancelled);
}

#[test]
fn transaction_binding_is_carried_by_the_context() {
    let ctx = QueryContext::default().with_transaction(TransactionId(7));
    let mut cursor = ints_cursor(&[1, 2]);

    assert_eq!(collect_rows(&mut cursor, &ctx).expect("rows").len(), 2);
    assert_eq!(ctx.transaction(), Some(TransactionId(7)));
    assert_eq!(QueryContext::default().transaction(), None);
}

#[test]
fn elapsed_deadline_times_out() {
    let ctx = QueryContext::default().with_deadline(Instant::now());
    let mut cursor = ints_cursor(&[1]);

    let err = collect_rows(&mut cursor, &ctx).expect_err("deadline passed");

    assert_eq!(err.class, ErrorClass::TimedOut);
    assert!(cursor.state().is_closed());
}

#[test]
fn boxed_cursors_forward_the_protocol() {
    let ctx = QueryContext::default();
    let mut boxed: Box<dyn Cursor> = Box::new(ints_cursor(&[3]));

    let rows = collect_rows(&mut boxed, &ctx).expect("rows");

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].values(), &[Value::Int(3)]);
}
