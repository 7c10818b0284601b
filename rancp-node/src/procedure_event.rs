//! Typed outcome rendezvous for class-1 procedures.
//!
//! A procedure initiator awaits a [`ProcedureOutcome`] carrying either the
//! peer's success message, the peer's failure message, or a framework-level
//! verdict (timeout, cancellation, abnormal termination) when no peer
//! message will ever arrive.

use std::time::Duration;

use crate::event::{EventSource, SingleObserver};

/// Why a procedure ended without a peer response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameworkCause {
    /// No response before the deadline.
    Timeout,
    /// The source was stopped or torn down before completion.
    Cancelled,
    /// The producer aborted the exchange explicitly.
    Abnormal,
}

/// Result of an initiated procedure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcedureOutcome<S, F> {
    Success(S),
    Failure(F),
    FrameworkFailure(FrameworkCause),
}

impl<S, F> ProcedureOutcome<S, F> {
    pub fn is_success(&self) -> bool {
        matches!(self, ProcedureOutcome::Success(_))
    }
}

/// Producer side of a procedure outcome.
///
/// A stopped source refuses new subscriptions: observers attaching after
/// [`ProcedureEventSource::stop`] resolve immediately as `Cancelled`.
/// Dropping the source while an observer waits also resolves as `Cancelled`.
pub struct ProcedureEventSource<S, F> {
    source: EventSource<ProcedureOutcome<S, F>>,
    stopped: bool,
}

impl<S, F> ProcedureEventSource<S, F> {
    pub fn new() -> Self {
        ProcedureEventSource {
            source: EventSource::new(),
            stopped: false,
        }
    }

    pub fn has_subscriber(&self) -> bool {
        self.source.has_subscriber()
    }

    pub fn notify_success(&mut self, value: S) -> bool {
        self.source.set(ProcedureOutcome::Success(value))
    }

    pub fn notify_failure(&mut self, value: F) -> bool {
        self.source.set(ProcedureOutcome::Failure(value))
    }

    /// Terminates the exchange abnormally from the producer side.
    pub fn abort(&mut self) -> bool {
        self.source
            .set(ProcedureOutcome::FrameworkFailure(FrameworkCause::Abnormal))
    }

    /// Cancels any waiting observer and rejects future subscriptions.
    pub fn stop(&mut self) {
        self.stopped = true;
        self.source
            .set(ProcedureOutcome::FrameworkFailure(FrameworkCause::Cancelled));
    }

    /// Clears the stopped flag so the source accepts subscriptions again.
    pub fn reset(&mut self) {
        self.stopped = false;
    }

    pub fn stopped(&self) -> bool {
        self.stopped
    }
}

impl<S, F> Default for ProcedureEventSource<S, F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, F> Drop for ProcedureEventSource<S, F> {
    fn drop(&mut self) {
        self.source
            .set(ProcedureOutcome::FrameworkFailure(FrameworkCause::Cancelled));
    }
}

/// Consumer side of a procedure outcome.
pub struct ProcedureOutcomeObserver<S, F> {
    observer: SingleObserver<ProcedureOutcome<S, F>>,
}

impl<S, F> ProcedureOutcomeObserver<S, F> {
    pub fn new() -> Self {
        ProcedureOutcomeObserver {
            observer: SingleObserver::new(),
        }
    }

    /// Attaches to `source` with a response deadline.
    ///
    /// A stopped source completes the observer immediately as `Cancelled`.
    pub fn subscribe(&mut self, source: &mut ProcedureEventSource<S, F>, timeout: Duration) {
        if source.stopped {
            self.observer
                .complete_with(ProcedureOutcome::FrameworkFailure(FrameworkCause::Cancelled));
            return;
        }
        self.observer.subscribe_with_timeout(
            &mut source.source,
            timeout,
            ProcedureOutcome::FrameworkFailure(FrameworkCause::Timeout),
        );
    }

    pub async fn wait(&mut self) -> &ProcedureOutcome<S, F> {
        self.observer.wait().await
    }

    pub fn complete(&self) -> bool {
        self.observer.complete()
    }

    pub fn outcome(&self) -> &ProcedureOutcome<S, F> {
        self.observer.result()
    }
}

impl<S, F> Default for ProcedureOutcomeObserver<S, F> {
    fn default() -> Self {
        Self::new()
    }
}
