//! Module: executor::scan
//! Responsibility: ordered traversal of one index within a key range.
//! Does not own: storage layout; entries come from an `IndexStore` snapshot.

mod range;


use crate::{
    db::{
        Direction,
        executor::{
            QueryContext,
            cursor::{Cursor, CursorState, Lifecycle},
            order::RowOrdering,
        },
        row::{Row, RowType},
        store::{IndexSnapshot, IndexStore, compare_index_rows},
    },
    error::InternalError,
    model::index::Index,
    obs::sink::{CursorKind, MetricsEvent},
    value::Value,
};
use std::{cmp::Ordering, sync::Arc};
use tracing::debug;

// re-exports
pub use range::{IndexBound, IndexKeyRange};

///
/// ScanPosition
/// Half-open window of the snapshot still to be yielded.
///

#[derive(Clone, Copy, Debug, Default)]
struct ScanPosition {
    start: usize,
    end: usize,
}

///
/// IndexScan
///
/// Walks one index within a key range, forward or backward, yielding rows
/// of the index row type in strict key order. A store snapshot is taken on
/// open and released on close.
///

pub struct IndexScan {
    index: Arc<Index>,
    row_type: Arc<RowType>,
    range: IndexKeyRange,
    backward: bool,
    store: Arc<dyn IndexStore>,
    snapshot: Option<IndexSnapshot>,
    position: ScanPosition,
    scanned: u64,
    lifecycle: Lifecycle,
}

impl IndexScan {
    /// Validate `range` and `ordering` against `index` and build the scan.
    pub fn new(
        store: Arc<dyn IndexStore>,
        index: Arc<Index>,
        range: IndexKeyRange,
        ordering: &RowOrdering,
    ) -> Result<Self, InternalError> {
        validate_range(&index, &range)?;
        let backward = scan_backward(&index, &range, ordering)?;

        Ok(Self {
            row_type: RowType::for_index(&index),
            index,
            range,
            backward,
            store,
            snapshot: None,
            position: ScanPosition::default(),
            scanned: 0,
            lifecycle: Lifecycle::new(),
        })
    }

    #[must_use]
    pub const fn index(&self) -> &Arc<Index> {
        &self.index
    }

    #[must_use]
    pub const fn is_backward(&self) -> bool {
        self.backward
    }

    // Window of `snapshot` covered by the key range.
    fn window(&self, snapshot: &IndexSnapshot) -> ScanPosition {
        let start = match self.range.low() {
            None => 0,
            Some(low) if low.is_inclusive() => snapshot.lower_bound(probe(&self.index, low)),
            Some(low) => snapshot.upper_bound(probe(&self.index, low)),
        };
        let end = match self.range.high() {
            None => snapshot.len(),
            Some(high) if high.is_inclusive() => snapshot.upper_bound(probe(&self.index, high)),
            Some(high) => snapshot.lower_bound(probe(&self.index, high)),
        };

        ScanPosition {
            start,
            end: end.max(start),
        }
    }
}

impl Cursor for IndexScan {
    fn row_type(&self) -> &Arc<RowType> {
        &self.row_type
    }

    fn state(&self) -> CursorState {
        self.lifecycle.state()
    }

    fn open(&mut self, ctx: &QueryContext) -> Result<(), InternalError> {
        self.lifecycle.open("index scan", ctx)?;

        let snapshot = match self.store.snapshot(self.index.name()) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                self.lifecycle.close();
                return Err(err);
            }
        };
        self.position = self.window(&snapshot);
        self.snapshot = Some(snapshot);
        self.scanned = 0;

        debug!(
            index = %self.index.name(),
            transaction = ?ctx.transaction(),
            backward = self.backward,
            start = self.position.start,
            end = self.position.end,
            "index scan opened"
        );
        self.lifecycle.record(MetricsEvent::CursorOpen {
            kind: CursorKind::IndexScan,
        });

        Ok(())
    }

    fn advance(&mut self, ctx: &QueryContext) -> Result<Option<Row>, InternalError> {
        let active = self.lifecycle.advance("index scan")?;
        ctx.check()?;
        if !active {
            return Ok(None);
        }

        let ScanPosition { start, end } = self.position;
        let next = if start >= end {
            None
        } else if self.backward {
            self.position.end -= 1;
            Some(end - 1)
        } else {
            self.position.start += 1;
            Some(start)
        };

        let entry = next.and_then(|position| {
            self.snapshot
                .as_ref()
                .and_then(|snapshot| snapshot.get(position).cloned())
        });
        let Some(entry) = entry else {
            self.lifecycle.drain();
            return Ok(None);
        };
        self.scanned += 1;

        Ok(Some(Row::from_shared(Arc::clone(&self.row_type), entry)))
    }

    fn close(&mut self) {
        if !self.lifecycle.close() {
            return;
        }
        self.snapshot = None;

        debug!(index = %self.index.name(), scanned = self.scanned, "index scan closed");
        self.lifecycle.record(MetricsEvent::RowsScanned {
            index: self.index.name().to_string(),
            rows_scanned: self.scanned,
        });
        self.lifecycle.record(MetricsEvent::CursorClose {
            kind: CursorKind::IndexScan,
            rows_emitted: self.scanned,
        });
    }
}

/// Build an index scan; see [`IndexScan::new`].
pub fn index_scan(
    store: Arc<dyn IndexStore>,
    index: Arc<Index>,
    range: IndexKeyRange,
    ordering: &RowOrdering,
) -> Result<IndexScan, InternalError> {
    IndexScan::new(store, index, range, ordering)
}

// Order an entry against a bound prefix in stored order.
fn probe<'a>(index: &'a Index, bound: &'a IndexBound) -> impl Fn(&[Value]) -> Ordering + 'a {
    move |entry: &[Value]| compare_index_rows(index, entry, bound.values())
}

fn validate_range(index: &Index, range: &IndexKeyRange) -> Result<(), InternalError> {
    let columns = index.all_columns();
    if range.width() > columns.len() {
        return Err(InternalError::executor_invalid_argument(format!(
            "key range of index '{}' bounds {} columns, the index has {}",
            index.name(),
            range.width(),
            columns.len()
        )));
    }

    for bound in [range.low(), range.high()].into_iter().flatten() {
        for (column, value) in columns.iter().zip(bound.values()) {
            if !value.fits(column.column.kind) {
                return Err(InternalError::executor_invalid_argument(format!(
                    "key range value {value:?} does not fit column {column} of index '{}'",
                    index.name()
                )));
            }
        }
    }

    Ok(())
}

// Resolve the traversal direction requested by `ordering`.
fn scan_backward(
    index: &Index,
    range: &IndexKeyRange,
    ordering: &RowOrdering,
) -> Result<bool, InternalError> {
    let columns = index.all_columns();
    let (n, m) = (columns.len(), ordering.len());
    if m == 0 {
        return Ok(false);
    }
    if m > n {
        return Err(InternalError::executor_invalid_argument(format!(
            "ordering names {m} fields, index '{}' rows have {n}",
            index.name()
        )));
    }

    let first = n - m;
    for (i, column) in ordering.columns().iter().enumerate() {
        if column.position != first + i {
            return Err(InternalError::executor_invalid_argument(format!(
                "ordering of index '{}' must name trailing fields {first}..{n} in order",
                index.name()
            )));
        }
    }
    if first > range.equality_prefix_len() {
        return Err(InternalError::executor_invalid_argument(format!(
            "ordering of index '{}' leaves field {} unordered and unbound",
            index.name(),
            first - 1
        )));
    }

    let mut matches_declared = true;
    let mut matches_reverse = true;
    for column in ordering.columns() {
        let declared = columns[column.position].direction;
        matches_declared &= column.direction == declared;
        matches_reverse &= column.direction == declared.reverse();
    }

    match (matches_declared, matches_reverse) {
        (true, _) => Ok(false),
        (false, true) => Ok(true),
        (false, false) => Err(InternalError::executor_unsupported(format!(
            "mixed-direction scan of index '{}' ({})",
            index.name(),
            ordering
                .directions()
                .into_iter()
                .map(Direction::label)
                .collect::<Vec<_>>()
                .join(",")
        ))),
    }
}
