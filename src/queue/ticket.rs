//! Cancellation handle for a queued lookup.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Returned by [`super::RequestQueue::enqueue`].
///
/// Cancelling withdraws the item if the consumer has not popped it yet: its
/// callback is dropped without being called and no delay is spent on it.
/// Once the item has been popped, cancelling has no effect.
#[derive(Debug, Clone, Default)]
pub struct Ticket {
    cancelled: Arc<AtomicBool>,
}

impl Ticket {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
