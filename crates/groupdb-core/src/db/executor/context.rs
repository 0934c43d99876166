use crate::{
    config::ExecutionConfig,
    error::{ErrorClass, ErrorOrigin, InternalError},
    obs::sink::{self, MetricsEvent},
};
use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering as AtomicOrdering},
    },
    time::Instant,
};

///
/// CancellationToken
///
/// Shared cancellation flag. Clones observe the same flag, so a token handed
/// to another thread can cancel a query that is executing elsewhere.
///

#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, AtomicOrdering::Release);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(AtomicOrdering::Acquire)
    }
}

///
/// TransactionId
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct TransactionId(pub u64);

///
/// QueryContext
///
/// Per-execution context threaded through every cursor's `open` and
/// `advance`. Owned by the caller; cursors only poll it.
///

#[derive(Clone, Debug)]
pub struct QueryContext {
    config: ExecutionConfig,
    cancellation: CancellationToken,
    deadline: Option<Instant>,
    transaction: Option<TransactionId>,
}

impl Default for QueryContext {
    fn default() -> Self {
        Self::new(ExecutionConfig::default())
    }
}

impl QueryContext {
    /// Build a context; the deadline (if any) starts counting now.
    #[must_use]
    pub fn new(config: ExecutionConfig) -> Self {
        let deadline = config.timeout().map(|timeout| Instant::now() + timeout);

        Self {
            config,
            cancellation: CancellationToken::new(),
            deadline,
            transaction: None,
        }
    }

    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;

        self
    }

    #[must_use]
    pub const fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);

        self
    }

    #[must_use]
    pub const fn with_transaction(mut self, transaction: TransactionId) -> Self {
        self.transaction = Some(transaction);

        self
    }

    #[must_use]
    pub const fn config(&self) -> &ExecutionConfig {
        &self.config
    }

    #[must_use]
    pub const fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    #[must_use]
    pub const fn transaction(&self) -> Option<TransactionId> {
        self.transaction
    }

    /// Poll cancellation and the deadline. Called at every cursor advance.
    pub fn check(&self) -> Result<(), InternalError> {
        if self.cancellation.is_cancelled() {
            self.record(MetricsEvent::Cancelled);
            return Err(InternalError::new(
                ErrorClass::Cancelled,
                ErrorOrigin::Executor,
                "query cancelled",
            ));
        }

        if let Some(deadline) = self.deadline
            && Instant::now() >= deadline
        {
            self.record(MetricsEvent::Cancelled);
            return Err(InternalError::new(
                ErrorClass::TimedOut,
                ErrorOrigin::Executor,
                "query timed out",
            ));
        }

        Ok(())
    }

    /// Record a metrics event when metrics are enabled for this execution.
    pub(crate) fn record(&self, event: MetricsEvent) {
        if self.config.record_metrics {
            sink::record(event);
        }
    }
}
