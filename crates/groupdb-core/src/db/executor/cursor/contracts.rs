use crate::{
    db::{
        executor::{QueryContext, cursor::CursorState},
        row::{Row, RowType},
    },
    error::InternalError,
};
use std::sync::Arc;

///
/// Cursor
///
/// Pull-based execution contract shared by every operator.
/// `open` fails on an open cursor; `advance` yields rows in the cursor's
/// declared order and keeps returning `None` once drained; `close` is
/// idempotent and never fails, cancelled context included.
///

pub trait Cursor {
    fn row_type(&self) -> &Arc<RowType>;

    fn state(&self) -> CursorState;

    fn open(&mut self, ctx: &QueryContext) -> Result<(), InternalError>;

    fn advance(&mut self, ctx: &QueryContext) -> Result<Option<Row>, InternalError>;

    fn close(&mut self);
}

pub type CursorBox = Box<dyn Cursor>;

impl<T> Cursor for Box<T>
where
    T: Cursor + ?Sized,
{
    fn row_type(&self) -> &Arc<RowType> {
        self.as_ref().row_type()
    }

    fn state(&self) -> CursorState {
        self.as_ref().state()
    }

    fn open(&mut self, ctx: &QueryContext) -> Result<(), InternalError> {
        self.as_mut().open(ctx)
    }

    fn advance(&mut self, ctx: &QueryContext) -> Result<Option<Row>, InternalError> {
        self.as_mut().advance(ctx)
    }

    fn close(&mut self) {
        self.as_mut().close();
    }
}

impl<T> Cursor for &mut T
where
    T: Cursor + ?Sized,
{
    fn row_type(&self) -> &Arc<RowType> {
        (**self).row_type()
    }

    fn state(&self) -> CursorState {
        (**self).state()
    }

    fn open(&mut self, ctx: &QueryContext) -> Result<(), InternalError> {
        (**self).open(ctx)
    }

    fn advance(&mut self, ctx: &QueryContext) -> Result<Option<Row>, InternalError> {
        (**self).advance(ctx)
    }

    fn close(&mut self) {
        (**self).close();
    }
}
