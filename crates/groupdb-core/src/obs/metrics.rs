use serde::{Deserialize, Serialize};
use std::{cell::RefCell, collections::BTreeMap};

///
/// EventState
/// Ephemeral, in-memory counters for cursor activity on this thread.
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventState {
    pub ops: EventOps,
    pub indexes: BTreeMap<String, IndexCounters>,
}

///
/// EventOps
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventOps {
    // Cursor lifecycle
    pub cursors_opened: u64,
    pub cursors_closed: u64,
    pub cursor_errors: u64,
    pub cancellations: u64,

    // Scans
    pub index_scans: u64,
    pub rows_scanned: u64,

    // Intersections
    pub intersections: u64,
    pub intersect_rows_emitted: u64,
    pub intersect_matched: u64,
    pub intersect_unmatched_emitted: u64,
    pub intersect_rows_discarded: u64,
}

///
/// IndexCounters
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct IndexCounters {
    pub scans: u64,
    pub rows_scanned: u64,
}

thread_local! {
    static EVENT_STATE: RefCell<EventState> = RefCell::new(EventState::default());
}

/// Borrow metrics immutably.
pub(crate) fn with_state<R>(f: impl FnOnce(&EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&m.borrow()))
}

/// Borrow metrics mutably.
pub(crate) fn with_state_mut<R>(f: impl FnOnce(&mut EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&mut m.borrow_mut()))
}

/// Reset all counters (useful in tests).
pub(crate) fn reset() {
    with_state_mut(|m| *m = EventState::default());
}

///
/// EventReport
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventReport {
    pub counters: EventState,
    /// Per-index counters with averages, ordered by index name.
    pub index_counters: Vec<IndexSummary>,
}

///
/// IndexSummary
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct IndexSummary {
    pub index: String,
    pub scans: u64,
    pub rows_scanned: u64,
    pub avg_rows_per_scan: f64,
}

/// Build a metrics report from the in-memory counters.
#[must_use]
#[expect(clippy::cast_precision_loss)]
pub(crate) fn report() -> EventReport {
    let counters = with_state(Clone::clone);

    let index_counters = counters
        .indexes
        .iter()
        .map(|(index, ops)| IndexSummary {
            index: index.clone(),
            scans: ops.scans,
            rows_scanned: ops.rows_scanned,
            avg_rows_per_scan: if ops.scans > 0 {
                ops.rows_scanned as f64 / ops.scans as f64
            } else {
                0.0
            },
        })
        .collect();

    EventReport {
        counters,
        index_counters,
    }
}
