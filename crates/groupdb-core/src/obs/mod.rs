//! Observability: runtime counters and sink abstractions.
//!
//! Cursor code never touches `metrics` directly; it records `MetricsEvent`s
//! through the sink boundary.

pub(crate) mod metrics;
pub(crate) mod sink;

// re-exports
pub use metrics::{EventOps, EventReport, EventState, IndexCounters, IndexSummary};
pub use sink::{
    CursorKind, MetricsEvent, MetricsSink, metrics_report, metrics_reset_all, with_metrics_sink,
};
