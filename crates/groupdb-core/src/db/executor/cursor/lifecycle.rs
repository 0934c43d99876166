use crate::{
    db::executor::QueryContext,
    error::InternalError,
    obs::sink::{self, MetricsEvent},
};

///
/// CursorState
///
/// Closed → Open → (Drained) → Closed. A closed cursor may be reopened.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum CursorState {
    #[default]
    Closed,
    Open,
    Drained,
}

impl CursorState {
    #[must_use]
    pub const fn is_closed(self) -> bool {
        matches!(self, Self::Closed)
    }

    /// Open and not yet drained.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Open)
    }

    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Open | Self::Drained)
    }
}

///
/// Lifecycle
///
/// State-machine bookkeeping embedded in every cursor. Remembers whether
/// the opening context records metrics, since `close` has no context.
///

#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Lifecycle {
    state: CursorState,
    record_metrics: bool,
}

impl Lifecycle {
    pub(crate) const fn new() -> Self {
        Self {
            state: CursorState::Closed,
            record_metrics: false,
        }
    }

    pub(crate) const fn state(self) -> CursorState {
        self.state
    }

    pub(crate) fn open(&mut self, cursor: &str, ctx: &QueryContext) -> Result<(), InternalError> {
        if self.state.is_open() {
            return Err(InternalError::cursor_misuse(format!(
                "{cursor} cursor is already open"
            )));
        }
        self.state = CursorState::Open;
        self.record_metrics = ctx.config().record_metrics;

        Ok(())
    }

    /// Gate one `advance` call: misuse when closed, `Ok(false)` once
    /// drained. Callers still check the context on a drained cursor.
    pub(crate) fn advance(self, cursor: &str) -> Result<bool, InternalError> {
        match self.state {
            CursorState::Open => Ok(true),
            CursorState::Drained => Ok(false),
            CursorState::Closed => Err(InternalError::cursor_misuse(format!(
                "{cursor} cursor advanced while closed"
            ))),
        }
    }

    pub(crate) const fn drain(&mut self) {
        if matches!(self.state, CursorState::Open) {
            self.state = CursorState::Drained;
        }
    }

    /// Returns whether the cursor was open.
    pub(crate) const fn close(&mut self) -> bool {
        let was_open = self.state.is_open();
        self.state = CursorState::Closed;

        was_open
    }

    pub(crate) fn record(self, event: MetricsEvent) {
        if self.record_metrics {
            sink::record(event);
        }
    }
}
