//! Module: executor::intersect
//! Responsibility: sort-merge intersection of two ordered index streams.
//! Does not own: input ordering; inputs must already be sorted on the
//! compared fields in the declared directions.

mod contracts;
mod side;


use crate::{
    db::{
        Direction,
        executor::{
            QueryContext,
            cursor::{Cursor, CursorState, Lifecycle},
            order::KeyComparator,
        },
        row::{Row, RowType},
    },
    error::InternalError,
    obs::sink::{CursorKind, MetricsEvent},
};
use side::SideState;
use std::{cmp::Ordering, sync::Arc};
use tracing::{debug, warn};

// re-exports
pub use contracts::{IntersectOutput, JoinType};

///
/// IntersectStats
///

#[derive(Clone, Copy, Debug, Default)]
struct IntersectStats {
    emitted: u64,
    matched: u64,
    unmatched_emitted: u64,
    discarded: u64,
}

///
/// IntersectOrdered
///
/// Merges two inputs sorted on a shared key prefix. Each input row is a
/// run of leading fields followed by its ordering fields; the first
/// `comparison_fields` ordering fields of each side are compared. Output
/// rows are rows of the output side, so a match advances only that side.
///

pub struct IntersectOrdered<L, R> {
    left: SideState<L>,
    right: SideState<R>,
    comparator: KeyComparator,
    join_type: JoinType,
    output: IntersectOutput,
    check_order: bool,
    stats: IntersectStats,
    lifecycle: Lifecycle,
}

impl<L, R> IntersectOrdered<L, R>
where
    L: Cursor,
    R: Cursor,
{
    #[must_use]
    pub const fn builder() -> IntersectOrderedBuilder<L, R> {
        IntersectOrderedBuilder::new()
    }

    #[must_use]
    pub const fn join_type(&self) -> JoinType {
        self.join_type
    }

    #[must_use]
    pub const fn output(&self) -> IntersectOutput {
        self.output
    }

    #[must_use]
    pub fn comparison_fields(&self) -> usize {
        self.comparator.width()
    }

    /// Left input, for inspection after a merge.
    #[must_use]
    pub const fn left(&self) -> &L {
        &self.left.cursor
    }

    /// Right input, for inspection after a merge.
    #[must_use]
    pub const fn right(&self) -> &R {
        &self.right.cursor
    }

    fn close_inputs(&mut self) {
        self.left.cursor.close();
        self.right.cursor.close();
    }

    // Abort: release both inputs and leave the cursor closed.
    fn fail(&mut self, err: InternalError) -> InternalError {
        warn!(
            join = %self.join_type,
            output = %self.output,
            error = %err.display_with_class(),
            "ordered intersection aborted"
        );
        self.lifecycle.record(MetricsEvent::CursorError {
            kind: CursorKind::IntersectOrdered,
        });
        self.close();

        err
    }

    fn fill(&mut self, ctx: &QueryContext) -> Result<(), InternalError> {
        let skipped = self.left.fill(ctx, &self.comparator, self.check_order)?
            + self.right.fill(ctx, &self.comparator, self.check_order)?;
        self.stats.discarded += skipped;

        Ok(())
    }

    fn take_output(&mut self) -> Option<Row> {
        match self.output {
            IntersectOutput::Left => self.left.take(),
            IntersectOutput::Right => self.right.take(),
        }
    }

    fn emit_unmatched(&mut self, row: Option<Row>) -> Option<Row> {
        if row.is_some() {
            self.stats.unmatched_emitted += 1;
        }

        row
    }

    fn discard_left(&mut self) {
        if self.left.take().is_some() {
            self.stats.discarded += 1;
        }
    }

    fn discard_right(&mut self) {
        if self.right.take().is_some() {
            self.stats.discarded += 1;
        }
    }

    // Pull the next output row, or `None` once the join is exhausted.
    fn next_row(&mut self, ctx: &QueryContext) -> Result<Option<Row>, InternalError> {
        let keep_unmatched = contracts::keeps_unmatched(self.join_type);

        loop {
            self.fill(ctx)?;

            let ordering = match (self.left.current(), self.right.current()) {
                (None, None) => return Ok(None),
                (Some(_), None) | (None, Some(_)) => None,
                (Some(left), Some(right)) => Some(self.comparator.compare(
                    left,
                    self.left.offset(),
                    right,
                    self.right.offset(),
                )?),
            };

            match ordering {
                // one side exhausted: outer joins drain their output side
                None => {
                    if !keep_unmatched {
                        return Ok(None);
                    }
                    let row = self.take_output();
                    return Ok(self.emit_unmatched(row));
                }
                // with no compared fields every pair is equal, so the
                // output side is zipped against the other side's current row
                Some(Ordering::Equal) => {
                    self.stats.matched += 1;
                    return Ok(self.take_output());
                }
                Some(Ordering::Less) => {
                    if self.join_type == JoinType::Left {
                        let row = self.left.take();
                        return Ok(self.emit_unmatched(row));
                    }
                    self.discard_left();
                }
                Some(Ordering::Greater) => {
                    if self.join_type == JoinType::Right {
                        let row = self.right.take();
                        return Ok(self.emit_unmatched(row));
                    }
                    self.discard_right();
                }
            }
        }
    }
}

impl<L, R> Cursor for IntersectOrdered<L, R>
where
    L: Cursor,
    R: Cursor,
{
    fn row_type(&self) -> &Arc<RowType> {
        match self.output {
            IntersectOutput::Left => self.left.row_type(),
            IntersectOutput::Right => self.right.row_type(),
        }
    }

    fn state(&self) -> CursorState {
        self.lifecycle.state()
    }

    fn open(&mut self, ctx: &QueryContext) -> Result<(), InternalError> {
        self.lifecycle.open("ordered intersection", ctx)?;

        self.left.reset();
        self.right.reset();
        self.stats = IntersectStats::default();
        self.check_order = ctx.config().check_input_order;

        if let Err(err) = self.left.cursor.open(ctx) {
            self.lifecycle.close();
            return Err(err);
        }
        if let Err(err) = self.right.cursor.open(ctx) {
            self.left.cursor.close();
            self.lifecycle.close();
            return Err(err);
        }

        debug!(
            join = %self.join_type,
            output = %self.output,
            transaction = ?ctx.transaction(),
            comparison_fields = self.comparator.width(),
            order = %self.comparator.order_label(),
            "ordered intersection opened"
        );
        self.lifecycle.record(MetricsEvent::CursorOpen {
            kind: CursorKind::IntersectOrdered,
        });

        Ok(())
    }

    fn advance(&mut self, ctx: &QueryContext) -> Result<Option<Row>, InternalError> {
        let active = self.lifecycle.advance("ordered intersection")?;
        if let Err(err) = ctx.check() {
            return Err(self.fail(err));
        }
        if !active {
            return Ok(None);
        }

        match self.next_row(ctx) {
            Ok(Some(row)) => {
                self.stats.emitted += 1;
                Ok(Some(row))
            }
            Ok(None) => {
                self.lifecycle.drain();
                Ok(None)
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    fn close(&mut self) {
        self.close_inputs();
        if !self.lifecycle.close() {
            return;
        }

        let IntersectStats {
            emitted,
            matched,
            unmatched_emitted,
            discarded,
        } = self.stats;
        debug!(
            emitted,
            matched,
            unmatched_emitted,
            discarded,
            "ordered intersection closed"
        );
        self.lifecycle.record(MetricsEvent::IntersectFinish {
            matched,
            unmatched_emitted,
            discarded,
        });
        self.lifecycle.record(MetricsEvent::CursorClose {
            kind: CursorKind::IntersectOrdered,
            rows_emitted: emitted,
        });
    }
}

///
/// IntersectOrderedBuilder
///
/// Collects the construction arguments of an [`IntersectOrdered`].
/// `build` validates them all at once.
///

pub struct IntersectOrderedBuilder<L, R> {
    left: Option<L>,
    right: Option<R>,
    left_type: Option<Arc<RowType>>,
    right_type: Option<Arc<RowType>>,
    left_ordering_fields: usize,
    right_ordering_fields: usize,
    comparison_fields: usize,
    directions: Vec<Direction>,
    join_type: Option<JoinType>,
    output: Option<IntersectOutput>,
}

impl<L, R> Default for IntersectOrderedBuilder<L, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L, R> IntersectOrderedBuilder<L, R> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            left: None,
            right: None,
            left_type: None,
            right_type: None,
            left_ordering_fields: 0,
            right_ordering_fields: 0,
            comparison_fields: 0,
            directions: Vec::new(),
            join_type: None,
            output: None,
        }
    }

    /// Left input, its row type, and how many trailing fields it is ordered on.
    #[must_use]
    pub fn left(mut self, cursor: L, row_type: Arc<RowType>, ordering_fields: usize) -> Self {
        self.left = Some(cursor);
        self.left_type = Some(row_type);
        self.left_ordering_fields = ordering_fields;

        self
    }

    #[must_use]
    pub fn right(mut self, cursor: R, row_type: Arc<RowType>, ordering_fields: usize) -> Self {
        self.right = Some(cursor);
        self.right_type = Some(row_type);
        self.right_ordering_fields = ordering_fields;

        self
    }

    /// Compare the first `directions.len()` ordering fields of each side.
    #[must_use]
    pub fn compare(mut self, comparison_fields: usize, directions: Vec<Direction>) -> Self {
        self.comparison_fields = comparison_fields;
        self.directions = directions;

        self
    }

    #[must_use]
    pub const fn join(mut self, join_type: JoinType, output: IntersectOutput) -> Self {
        self.join_type = Some(join_type);
        self.output = Some(output);

        self
    }

    pub fn build(self) -> Result<IntersectOrdered<L, R>, InternalError>
    where
        L: Cursor,
        R: Cursor,
    {
        let missing = |what: &str| {
            InternalError::executor_invalid_argument(format!(
                "ordered intersection requires {what}"
            ))
        };
        let left = self.left.ok_or_else(|| missing("a left input"))?;
        let right = self.right.ok_or_else(|| missing("a right input"))?;
        let left_type = self.left_type.ok_or_else(|| missing("a left row type"))?;
        let right_type = self.right_type.ok_or_else(|| missing("a right row type"))?;
        let join_type = self.join_type.ok_or_else(|| missing("a join type"))?;
        let output = self.output.ok_or_else(|| missing("an output side"))?;

        let left_offset = ordering_offset("left", &left_type, self.left_ordering_fields)?;
        let right_offset = ordering_offset("right", &right_type, self.right_ordering_fields)?;

        if self.directions.len() != self.comparison_fields {
            return Err(InternalError::executor_invalid_argument(format!(
                "ordered intersection compares {} fields but lists {} directions",
                self.comparison_fields,
                self.directions.len()
            )));
        }
        let shortest = self.left_ordering_fields.min(self.right_ordering_fields);
        if self.comparison_fields > shortest {
            return Err(InternalError::executor_invalid_argument(format!(
                "ordered intersection compares {} fields, inputs are ordered on {shortest}",
                self.comparison_fields
            )));
        }
        contracts::validate_join(join_type, output)?;

        Ok(IntersectOrdered {
            left: SideState::new("left", left, left_type, left_offset),
            right: SideState::new("right", right, right_type, right_offset),
            comparator: KeyComparator::new(self.directions),
            join_type,
            output,
            check_order: true,
            stats: IntersectStats::default(),
            lifecycle: Lifecycle::new(),
        })
    }
}

// Position of the first ordering field in rows of `row_type`.
fn ordering_offset(
    side: &str,
    row_type: &RowType,
    ordering_fields: usize,
) -> Result<usize, InternalError> {
    row_type
        .field_count()
        .checked_sub(ordering_fields)
        .ok_or_else(|| {
            InternalError::executor_invalid_argument(format!(
                "{side} input {row_type} has {} fields, cannot be ordered on {ordering_fields}",
                row_type.field_count()
            ))
        })
}

/// Build an ordered intersection in one call; see [`IntersectOrderedBuilder`].
#[expect(clippy::too_many_arguments)]
pub fn intersect_ordered<L, R>(
    left: L,
    right: R,
    left_type: Arc<RowType>,
    right_type: Arc<RowType>,
    left_ordering_fields: usize,
    right_ordering_fields: usize,
    comparison_fields: usize,
    directions: Vec<Direction>,
    join_type: JoinType,
    output: IntersectOutput,
) -> Result<IntersectOrdered<L, R>, InternalError>
where
    L: Cursor,
    R: Cursor,
{
    IntersectOrdered::builder()
        .left(left, left_type, left_ordering_fields)
        .right(right, right_type, right_ordering_fields)
        .compare(comparison_fields, directions)
        .join(join_type, output)
        .build()
}
