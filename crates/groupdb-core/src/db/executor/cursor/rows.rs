use crate::{
    db::{
        executor::{
            QueryContext,
            cursor::{Cursor, CursorState, Lifecycle},
        },
        row::{Row, RowType},
    },
    error::InternalError,
    obs::sink::{CursorKind, MetricsEvent},
    value::Value,
};
use std::sync::Arc;

///
/// RowsCursor
///
/// Exposes a materialized row vector through the cursor protocol.
/// Rows must already be in the order the consumer expects.
///

#[derive(Debug)]
pub struct RowsCursor {
    row_type: Arc<RowType>,
    rows: Vec<Row>,
    position: usize,
    lifecycle: Lifecycle,
}

impl RowsCursor {
    #[must_use]
    pub const fn new(row_type: Arc<RowType>, rows: Vec<Row>) -> Self {
        Self {
            row_type,
            rows,
            position: 0,
            lifecycle: Lifecycle::new(),
        }
    }

    /// Build rows of `row_type` from raw value lists.
    pub fn from_values(
        row_type: Arc<RowType>,
        values: impl IntoIterator<Item = Vec<Value>>,
    ) -> Result<Self, InternalError> {
        let rows = values
            .into_iter()
            .map(|values| Row::new(Arc::clone(&row_type), values))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::new(row_type, rows))
    }
}

impl Cursor for RowsCursor {
    fn row_type(&self) -> &Arc<RowType> {
        &self.row_type
    }

    fn state(&self) -> CursorState {
        self.lifecycle.state()
    }

    fn open(&mut self, ctx: &QueryContext) -> Result<(), InternalError> {
        self.lifecycle.open("rows", ctx)?;
        self.position = 0;
        self.lifecycle.record(MetricsEvent::CursorOpen {
            kind: CursorKind::Rows,
        });

        Ok(())
    }

    fn advance(&mut self, ctx: &QueryContext) -> Result<Option<Row>, InternalError> {
        let active = self.lifecycle.advance("rows")?;
        ctx.check()?;
        if !active {
            return Ok(None);
        }

        let Some(row) = self.rows.get(self.position) else {
            self.lifecycle.drain();
            return Ok(None);
        };
        self.position += 1;

        Ok(Some(row.clone()))
    }

    fn close(&mut self) {
        if self.lifecycle.close() {
            self.lifecycle.record(MetricsEvent::CursorClose {
                kind: CursorKind::Rows,
                rows_emitted: self.position as u64,
            });
        }
    }
}
