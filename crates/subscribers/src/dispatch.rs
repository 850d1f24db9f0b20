use std::sync::Arc;

use crate::SubscriberError;
use crate::future::{TransferException, TransferFuture};

/// Fired once when a unit is accepted, before any network I/O.
pub trait OnQueued: Send + Sync {
    fn on_queued(&self, future: &TransferFuture) -> Result<(), SubscriberError>;
}

/// Fired once when a unit settles, successfully or not.
pub trait OnDone: Send + Sync {
    fn on_done(&self, future: &TransferFuture) -> Result<(), SubscriberError>;
}

/// An [`OnDone`] hook split by outcome.
///
/// Exactly one of the two handlers runs per settled unit: `on_failure` when
/// the unit carries an exception, `on_success` otherwise.
pub trait OnDoneFiltered: Send + Sync {
    fn on_success(&self, _future: &TransferFuture) -> Result<(), SubscriberError> {
        Ok(())
    }

    fn on_failure(
        &self,
        _future: &TransferFuture,
        _exception: &TransferException,
    ) -> Result<(), SubscriberError> {
        Ok(())
    }
}

impl<T: OnDoneFiltered> OnDone for T {
    fn on_done(&self, future: &TransferFuture) -> Result<(), SubscriberError> {
        match future.exception() {
            Some(exception) => self.on_failure(future, &exception),
            None => self.on_success(future),
        }
    }
}

/// A subscriber described by the capabilities it implements.
#[derive(Clone, Default)]
pub struct Subscriber {
    on_queued: Option<Arc<dyn OnQueued>>,
    on_done: Option<Arc<dyn OnDone>>,
}

impl Subscriber {
    /// A subscriber with only the queued hook.
    pub fn queued(hook: impl OnQueued + 'static) -> Self {
        Self {
            on_queued: Some(Arc::new(hook)),
            on_done: None,
        }
    }

    /// A subscriber with only the done hook.
    pub fn done(hook: impl OnDone + 'static) -> Self {
        Self {
            on_queued: None,
            on_done: Some(Arc::new(hook)),
        }
    }

    /// A subscriber implementing both hooks on one shared value.
    pub fn both<S: OnQueued + OnDone + 'static>(hooks: S) -> Self {
        let hooks = Arc::new(hooks);
        Self {
            on_queued: Some(hooks.clone()),
            on_done: Some(hooks),
        }
    }

    pub fn handles_queued(&self) -> bool {
        self.on_queued.is_some()
    }

    pub fn handles_done(&self) -> bool {
        self.on_done.is_some()
    }
}

impl std::fmt::Debug for Subscriber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscriber")
            .field("on_queued", &self.handles_queued())
            .field("on_done", &self.handles_done())
            .finish()
    }
}

/// The subscribers attached to a transfer, invoked in insertion order.
#[derive(Debug, Clone, Default)]
pub struct SubscriberSet {
    subscribers: Vec<Subscriber>,
}

impl SubscriberSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, subscriber: Subscriber) {
        self.subscribers.push(subscriber);
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    /// Fires every queued hook for `future`.
    ///
    /// Does nothing if the unit is cancelled or its queued hooks already
    /// fired. Stops at the first failing hook; the unit should then be
    /// failed with the returned error.
    pub fn notify_queued(&self, future: &TransferFuture) -> Result<(), SubscriberError> {
        if future.is_cancelled() {
            tracing::debug!(key = %future.key(), "unit cancelled, skipping queued hooks");
            return Ok(());
        }
        if !future.claim_queued() {
            return Ok(());
        }

        for hook in self.subscribers.iter().filter_map(|s| s.on_queued.as_ref()) {
            if let Err(e) = hook.on_queued(future) {
                tracing::warn!(key = %future.key(), error = %e, "queued hook failed");
                return Err(e);
            }
        }
        Ok(())
    }

    /// Fires every done hook for `future`, even if an earlier one fails.
    ///
    /// Returns the first failure; later failures are logged. Does nothing if
    /// the done hooks already fired.
    pub fn notify_done(&self, future: &TransferFuture) -> Result<(), SubscriberError> {
        if !future.claim_done() {
            return Ok(());
        }

        let mut first_error = None;
        for hook in self.subscribers.iter().filter_map(|s| s.on_done.as_ref()) {
            if let Err(e) = hook.on_done(future) {
                tracing::warn!(key = %future.key(), error = %e, "done hook failed");
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

impl FromIterator<Subscriber> for SubscriberSet {
    fn from_iter<I: IntoIterator<Item = Subscriber>>(iter: I) -> Self {
        Self {
            subscribers: iter.into_iter().collect(),
        }
    }
}
