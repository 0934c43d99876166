//! Metrics sink boundary.
//!
//! Execution logic MUST NOT depend on obs::metrics directly.
//! All instrumentation flows through MetricsEvent and MetricsSink.
use crate::obs::metrics;
use std::{cell::RefCell, rc::Rc};

thread_local! {
    static SINK_OVERRIDE: RefCell<Option<Rc<dyn MetricsSink>>> = RefCell::new(None);
}

///
/// CursorKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CursorKind {
    IndexScan,
    IntersectOrdered,
    Rows,
}

///
/// MetricsEvent
///

#[derive(Clone, Debug, PartialEq)]
pub enum MetricsEvent {
    CursorOpen {
        kind: CursorKind,
    },
    CursorClose {
        kind: CursorKind,
        rows_emitted: u64,
    },
    RowsScanned {
        index: String,
        rows_scanned: u64,
    },
    IntersectFinish {
        matched: u64,
        unmatched_emitted: u64,
        discarded: u64,
    },
    CursorError {
        kind: CursorKind,
    },
    Cancelled,
}

///
/// MetricsSink
///

pub trait MetricsSink {
    fn record(&self, event: MetricsEvent);
}

/// GlobalMetricsSink
/// Default thread-local sink that writes into the metrics state.
/// Acts as the concrete sink when no scoped override is installed.

pub(crate) struct GlobalMetricsSink;

impl MetricsSink for GlobalMetricsSink {
    fn record(&self, event: MetricsEvent) {
        match event {
            MetricsEvent::CursorOpen { kind } => {
                metrics::with_state_mut(|m| {
                    m.ops.cursors_opened = m.ops.cursors_opened.saturating_add(1);
                    match kind {
                        CursorKind::IndexScan => {
                            m.ops.index_scans = m.ops.index_scans.saturating_add(1);
                        }
                        CursorKind::IntersectOrdered => {
                            m.ops.intersections = m.ops.intersections.saturating_add(1);
                        }
                        CursorKind::Rows => {}
                    }
                });
            }

            MetricsEvent::CursorClose { kind, rows_emitted } => {
                metrics::with_state_mut(|m| {
                    m.ops.cursors_closed = m.ops.cursors_closed.saturating_add(1);
                    if kind == CursorKind::IntersectOrdered {
                        m.ops.intersect_rows_emitted =
                            m.ops.intersect_rows_emitted.saturating_add(rows_emitted);
                    }
                });
            }

            MetricsEvent::RowsScanned {
                index,
                rows_scanned,
            } => {
                metrics::with_state_mut(|m| {
                    m.ops.rows_scanned = m.ops.rows_scanned.saturating_add(rows_scanned);
                    let entry = m.indexes.entry(index).or_default();
                    entry.scans = entry.scans.saturating_add(1);
                    entry.rows_scanned = entry.rows_scanned.saturating_add(rows_scanned);
                });
            }

            MetricsEvent::IntersectFinish {
                matched,
                unmatched_emitted,
                discarded,
            } => {
                metrics::with_state_mut(|m| {
                    m.ops.intersect_matched = m.ops.intersect_matched.saturating_add(matched);
                    m.ops.intersect_unmatched_emitted = m
                        .ops
                        .intersect_unmatched_emitted
                        .saturating_add(unmatched_emitted);
                    m.ops.intersect_rows_discarded =
                        m.ops.intersect_rows_discarded.saturating_add(discarded);
                });
            }

            MetricsEvent::CursorError { .. } => {
                metrics::with_state_mut(|m| {
                    m.ops.cursor_errors = m.ops.cursor_errors.saturating_add(1);
                });
            }

            MetricsEvent::Cancelled => {
                metrics::with_state_mut(|m| {
                    m.ops.cancellations = m.ops.cancellations.saturating_add(1);
                });
            }
        }
    }
}

pub(crate) const GLOBAL_METRICS_SINK: GlobalMetricsSink = GlobalMetricsSink;

pub(crate) fn record(event: MetricsEvent) {
    let sink = SINK_OVERRIDE.with(|cell| cell.borrow().clone());
    match sink {
        Some(sink) => sink.record(event),
        None => GLOBAL_METRICS_SINK.record(event),
    }
}

/// Snapshot the current thread's metrics state.
#[must_use]
pub fn metrics_report() -> metrics::EventReport {
    metrics::report()
}

/// Reset the current thread's metrics state.
pub fn metrics_reset_all() {
    metrics::reset();
}

/// Run a closure with a temporary metrics sink override.
/// The previous sink is restored on every exit path, unwinding included.
pub fn with_metrics_sink<T>(sink: Rc<dyn MetricsSink>, f: impl FnOnce() -> T) -> T {
    struct Guard(Option<Rc<dyn MetricsSink>>);

    impl Drop for Guard {
        fn drop(&mut self) {
            let prev = self.0.take();
            SINK_OVERRIDE.with(|cell| {
                *cell.borrow_mut() = prev;
            });
        }
    }

    let prev = SINK_OVERRIDE.with(|cell| cell.borrow_mut().replace(sink));
    let _guard = Guard(prev);

    f()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct CaptureSink {
        events: RefCell<Vec<MetricsEvent>>,
    }

    impl MetricsSink for CaptureSink {
        fn record(&self, event: MetricsEvent) {
            self.events.borrow_mut().push(event);
        }
    }

    #[test]
    fn override_captures_events_and_restores_global_sink() {
        metrics_reset_all();
        let capture = Rc::new(CaptureSink::default());

        with_metrics_sink(capture.clone(), || {
            record(MetricsEvent::Cancelled);
        });
        record(MetricsEvent::Cancelled);

        assert_eq!(*capture.events.borrow(), vec![MetricsEvent::Cancelled]);
        let report = metrics_report();
        assert_eq!(report.counters.ops.cancellations, 1);
    }

    #[test]
    fn nested_overrides_restore_outer_sink() {
        let outer = Rc::new(CaptureSink::default());
        let inner = Rc::new(CaptureSink::default());

        with_metrics_sink(outer.clone(), || {
            with_metrics_sink(inner.clone(), || {
                record(MetricsEvent::CursorOpen {
                    kind: CursorKind::Rows,
                });
            });
            record(MetricsEvent::Cancelled);
        });

        assert_eq!(inner.events.borrow().len(), 1);
        assert_eq!(*outer.events.borrow(), vec![MetricsEvent::Cancelled]);
    }

    #[test]
    fn global_sink_accumulates_per_index_counters() {
        metrics_reset_all();

        for rows in [3, 4] {
            record(MetricsEvent::RowsScanned {
                index: "test.parent.x".to_string(),
                rows_scanned: rows,
            });
        }

        let report = metrics_report();
        assert_eq!(report.counters.ops.rows_scanned, 7);
        assert_eq!(report.index_counters.len(), 1);

        let summary = &report.index_counters[0];
        assert_eq!(summary.index, "test.parent.x");
        assert_eq!(summary.scans, 2);
        assert_eq!(summary.rows_scanned, 7);
        assert!((summary.avg_rows_per_scan - 3.5).abs() < f64::EPSILON);
    }
}
