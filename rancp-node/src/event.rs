//! One-shot event rendezvous between a producer and a single observer.
//!
//! An [`EventSource`] is completed at most once per subscription cycle.
//! A [`SingleObserver`] attaches to a source, optionally with a timeout and
//! a substitute value to deliver if the source goes away, then awaits the
//! result. Ownership of the underlying channel makes a dropped source
//! observable to the observer instead of being undefined behaviour.

use std::mem;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::time;

/// Producer side of a one-shot event.
///
/// A fresh source has no subscriber. [`SingleObserver::subscribe`] installs
/// the channel; [`EventSource::set`] fires it. After firing (or after the
/// observer is dropped) the source is idle again and can be re-subscribed.
pub struct EventSource<T> {
    tx: Option<oneshot::Sender<T>>,
}

impl<T> EventSource<T> {
    pub fn new() -> Self {
        EventSource { tx: None }
    }

    /// True while an observer is attached and still waiting.
    pub fn has_subscriber(&self) -> bool {
        match &self.tx {
            Some(tx) => !tx.is_closed(),
            None => false,
        }
    }

    /// Completes the event, waking the subscribed observer.
    ///
    /// Returns `false` if no observer is attached (the value is discarded).
    pub fn set(&mut self, value: T) -> bool {
        match self.tx.take() {
            Some(tx) => tx.send(value).is_ok(),
            None => false,
        }
    }

    fn attach(&mut self) -> oneshot::Receiver<T> {
        assert!(
            !self.has_subscriber(),
            "EventSource already has a waiting observer"
        );
        let (tx, rx) = oneshot::channel();
        self.tx = Some(tx);
        rx
    }
}

impl<T> Default for EventSource<T> {
    fn default() -> Self {
        Self::new()
    }
}

enum ObserverState<T> {
    Idle,
    Waiting {
        rx: oneshot::Receiver<T>,
        timeout: Option<Duration>,
        /// Delivered instead of panicking when the source disappears or the
        /// timeout fires.
        cancelled: Option<T>,
    },
    Complete(T),
}

/// Consumer side of a one-shot event.
///
/// The observer is a small state machine: `Idle` until subscribed,
/// `Waiting` while attached to a source, `Complete` once a value arrived.
/// Subscribing again from `Complete` resets it for a new cycle.
pub struct SingleObserver<T> {
    state: ObserverState<T>,
}

impl<T> SingleObserver<T> {
    pub fn new() -> Self {
        SingleObserver {
            state: ObserverState::Idle,
        }
    }

    /// Attaches to `source`. Panics if the source already has an observer.
    pub fn subscribe(&mut self, source: &mut EventSource<T>) {
        let rx = source.attach();
        self.state = ObserverState::Waiting {
            rx,
            timeout: None,
            cancelled: None,
        };
    }

    /// Attaches with a deadline; if it passes (or the source is dropped)
    /// before completion, `cancelled` is delivered instead.
    pub fn subscribe_with_timeout(
        &mut self,
        source: &mut EventSource<T>,
        timeout: Duration,
        cancelled: T,
    ) {
        let rx = source.attach();
        self.state = ObserverState::Waiting {
            rx,
            timeout: Some(timeout),
            cancelled: Some(cancelled),
        };
    }

    /// Moves the observer straight to `Complete` without a subscription.
    pub fn complete_with(&mut self, value: T) {
        self.state = ObserverState::Complete(value);
    }

    /// True once a result is available without awaiting.
    pub fn complete(&self) -> bool {
        matches!(self.state, ObserverState::Complete(_))
    }

    /// Waits for the event and returns a reference to the result.
    ///
    /// Resolves immediately if already complete. Panics if called while
    /// idle, or if the source vanished and no cancelled value was given.
    pub async fn wait(&mut self) -> &T {
        let state = mem::replace(&mut self.state, ObserverState::Idle);
        let value = match state {
            ObserverState::Idle => panic!("SingleObserver::wait called without a subscription"),
            ObserverState::Complete(v) => v,
            ObserverState::Waiting {
                rx,
                timeout,
                cancelled,
            } => {
                // Timeout and source-drop both resolve to the substitute value.
                let recv = match timeout {
                    Some(dur) => match time::timeout(dur, rx).await {
                        Ok(recv) => recv,
                        Err(_elapsed) => return self.finish_cancelled(cancelled),
                    },
                    None => rx.await,
                };
                match recv {
                    Ok(v) => v,
                    Err(_) => return self.finish_cancelled(cancelled),
                }
            }
        };
        self.state = ObserverState::Complete(value);
        self.result()
    }

    fn finish_cancelled(&mut self, cancelled: Option<T>) -> &T {
        let value =
            cancelled.expect("EventSource destroyed while an observer without a fallback waited");
        self.state = ObserverState::Complete(value);
        self.result()
    }

    /// The completed value. Panics before completion.
    pub fn result(&self) -> &T {
        match &self.state {
            ObserverState::Complete(v) => v,
            _ => panic!("SingleObserver::result called before completion"),
        }
    }
}

impl<T> Default for SingleObserver<T> {
    fn default() -> Self {
        Self::new()
    }
}
