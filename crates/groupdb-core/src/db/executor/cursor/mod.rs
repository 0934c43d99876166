//! Module: executor::cursor
//! Responsibility: the uniform open/advance/close protocol and its state
//! machine, plus a materialized-rows cursor.

mod contracts;
mod lifecycle;
mod rows;

#[cfg(test)]
mod tests;

use crate::{
    db::{executor::QueryContext, row::Row},
    error::InternalError,
};

pub(crate) use lifecycle::Lifecycle;

// re-exports
pub use contracts::{Cursor, CursorBox};
pub use lifecycle::CursorState;
pub use rows::RowsCursor;

/// Open `cursor`, pull every row, and close it on every exit path.
pub fn collect_rows<C>(cursor: &mut C, ctx: &QueryContext) -> Result<Vec<Row>, InternalError>
where
    C: Cursor + ?Sized,
{
    cursor.open(ctx)?;

    let mut rows = Vec::new();
    let result = loop {
        match cursor.advance(ctx) {
            Ok(Some(row)) => rows.push(row),
            Ok(None) => break Ok(rows),
            Err(err) => break Err(err),
        }
    };
    cursor.close();

    result
}
