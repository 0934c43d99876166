use crate::{
    db::{
        executor::{QueryContext, cursor::Cursor, order::KeyComparator},
        row::{Row, RowType},
    },
    error::InternalError,
};
use std::sync::Arc;

///
/// SideState
///
/// One intersection input plus its lookahead row. Tracks exhaustion and
/// the last consumed row as the monotonicity witness.
///

pub(super) struct SideState<C> {
    pub(super) cursor: C,
    name: &'static str,
    row_type: Arc<RowType>,
    offset: usize,
    current: Option<Row>,
    done: bool,
    last: Option<Row>,
}

impl<C> SideState<C>
where
    C: Cursor,
{
    /// `offset` is the field position where the comparison prefix starts.
    pub(super) const fn new(
        name: &'static str,
        cursor: C,
        row_type: Arc<RowType>,
        offset: usize,
    ) -> Self {
        Self {
            cursor,
            name,
            row_type,
            offset,
            current: None,
            done: false,
            last: None,
        }
    }

    pub(super) const fn row_type(&self) -> &Arc<RowType> {
        &self.row_type
    }

    pub(super) const fn offset(&self) -> usize {
        self.offset
    }

    pub(super) const fn current(&self) -> Option<&Row> {
        self.current.as_ref()
    }

    pub(super) fn reset(&mut self) {
        self.current = None;
        self.done = false;
        self.last = None;
    }

    /// Ensure one lookahead row is available unless the input is drained.
    /// Returns the number of foreign-typed rows skipped on the way.
    pub(super) fn fill(
        &mut self,
        ctx: &QueryContext,
        comparator: &KeyComparator,
        check_order: bool,
    ) -> Result<u64, InternalError> {
        let mut skipped = 0;
        while !self.done && self.current.is_none() {
            match self.cursor.advance(ctx)? {
                None => self.done = true,
                Some(row) if !row.is_of_type(&self.row_type) => skipped += 1,
                Some(row) => {
                    if check_order {
                        self.validate_monotonicity(&row, comparator)?;
                    }
                    self.current = Some(row);
                }
            }
        }

        Ok(skipped)
    }

    pub(super) fn take(&mut self) -> Option<Row> {
        let row = self.current.take()?;
        self.last = Some(row.clone());

        Some(row)
    }

    // Validate that the comparison prefix never moves backwards.
    fn validate_monotonicity(
        &self,
        current: &Row,
        comparator: &KeyComparator,
    ) -> Result<(), InternalError> {
        let Some(previous) = self.last.as_ref() else {
            return Ok(());
        };

        if !comparator.violates_monotonicity(previous, current, self.offset)? {
            return Ok(());
        }

        Err(InternalError::executor_invariant(format!(
            "executor invariant violated: intersection {} input emitted out-of-order key for {} (previous row: {previous}, current row: {current})",
            self.name,
            comparator.order_label(),
        )))
    }
}
