//! Request Queue
//!
//! A FIFO of (key, callback) items drained by at most one consumer task.
//! The consumer runs the fetch pipeline for each item, hands the result to the
//! item's callback, then pauses for the inter-call delay unless the result came
//! from cache.

use std::collections::VecDeque;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::oneshot;
use tracing::{debug, error};

use crate::fetch::{FailureKind, FetchPipeline, Lookup, Resolution};
use crate::settings::SettingsHandle;

use super::ticket::Ticket;

/// Single-use delivery function for a queued lookup.
pub type Callback = Box<dyn FnOnce(Resolution) + Send + 'static>;

/// Whether a consumer task is currently running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueState {
    Idle,
    Draining,
}

struct QueueItem {
    key: String,
    callback: Callback,
    ticket: Ticket,
}

/// Pending items and consumer state, always changed together under one lock.
struct Pending {
    items: VecDeque<QueueItem>,
    state: QueueState,
}

struct Inner {
    pending: Mutex<Pending>,
    pipeline: FetchPipeline,
    settings: SettingsHandle,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, Pending> {
        self.pending.lock().unwrap_or_else(|e| e.into_inner())
    }
}

// == Request Queue ==
/// Cloneable handle to a rate-limited lookup queue.
///
/// Guarantees:
/// - callbacks fire in submission order
/// - at most one pipeline run is in flight
/// - after every run not served from cache, the consumer waits the configured
///   inter-call delay before starting the next one
#[derive(Clone)]
pub struct RequestQueue {
    inner: Arc<Inner>,
}

impl RequestQueue {
    pub fn new(pipeline: FetchPipeline, settings: SettingsHandle) -> Self {
        Self {
            inner: Arc::new(Inner {
                pending: Mutex::new(Pending {
                    items: VecDeque::new(),
                    state: QueueState::Idle,
                }),
                pipeline,
                settings,
            }),
        }
    }

    // == Enqueue ==
    /// Appends a lookup for `key` and starts the consumer if it is idle.
    ///
    /// Never blocks and never calls `callback` before returning. Must be called
    /// from within a Tokio runtime.
    pub fn enqueue<F>(&self, key: impl Into<String>, callback: F) -> Ticket
    where
        F: FnOnce(Resolution) + Send + 'static,
    {
        let ticket = Ticket::new();
        let item = QueueItem {
            key: key.into(),
            callback: Box::new(callback),
            ticket: ticket.clone(),
        };

        let start = {
            let mut pending = self.inner.lock();
            pending.items.push_back(item);
            if pending.state == QueueState::Idle {
                pending.state = QueueState::Draining;
                true
            } else {
                false
            }
        };

        if start {
            tokio::spawn(drain(self.inner.clone()));
        }

        ticket
    }

    /// Enqueues `key` and returns a receiver for its resolution.
    ///
    /// The receiver errors only if the item is cancelled through the ticket.
    pub fn submit(&self, key: impl Into<String>) -> (Ticket, oneshot::Receiver<Resolution>) {
        let (tx, rx) = oneshot::channel();
        let ticket = self.enqueue(key, move |resolution| {
            // Receiver may have been dropped by an impatient caller
            let _ = tx.send(resolution);
        });
        (ticket, rx)
    }

    pub fn state(&self) -> QueueState {
        self.inner.lock().state
    }

    /// Number of items waiting to be popped.
    pub fn pending(&self) -> usize {
        self.inner.lock().items.len()
    }

    pub fn pipeline(&self) -> &FetchPipeline {
        &self.inner.pipeline
    }
}

// == Consumer Loop ==
async fn drain(inner: Arc<Inner>) {
    debug!("Request queue draining");

    loop {
        let item = {
            let mut pending = inner.lock();
            match pending.items.pop_front() {
                Some(item) => item,
                None => {
                    pending.state = QueueState::Idle;
                    break;
                }
            }
        };

        if item.ticket.is_cancelled() {
            debug!("Skipping cancelled lookup for {}", item.key);
            continue;
        }

        let lookup = resolve_isolated(&inner.pipeline, &item.key).await;

        let callback = item.callback;
        let resolution = lookup.resolution;
        if catch_unwind(AssertUnwindSafe(move || callback(resolution))).is_err() {
            error!("Callback for {} panicked", item.key);
        }

        if !lookup.was_cached {
            tokio::time::sleep(inner.settings.inter_call_delay()).await;
        }
    }

    debug!("Request queue idle");
}

/// Runs one pipeline resolution on its own task; a panic there comes back as a
/// transport failure. Awaited inline, so runs never overlap.
async fn resolve_isolated(pipeline: &FetchPipeline, key: &str) -> Lookup {
    let pipeline = pipeline.clone();
    let owned = key.to_string();
    match tokio::spawn(async move { pipeline.resolve(&owned).await }).await {
        Ok(lookup) => lookup,
        Err(e) => {
            error!("Lookup for {} aborted: {}", key, e);
            Lookup::fetched(Resolution::Failed(FailureKind::Transport))
        }
    }
}
