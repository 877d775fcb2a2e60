//! # DeliveryQueue: per-bus serial execution context
//!
//! Queued observers run here instead of on the posting thread.
//!
//! ## What it guarantees
//! - `enqueue` returns immediately.
//! - Tasks run one at a time, never concurrently with each other.
//! - Tasks run in enqueue order.
//! - A panicking task is caught and logged; the next task still runs.
//! - Each bus owns its own queue; queues are never shared.
//!
//! ## Diagram
//! ```text
//!   post() ──enqueue──► [unbounded FIFO] ──► worker thread
//!   post() ──enqueue──►        │              (current-thread runtime)
//!                              └──────────► task.await; next task.await; ...
//! ```
//!
//! The worker thread is spawned on first use and exits once the queue is
//! dropped and every pending task has run.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::OnceLock;
use std::thread::ThreadId;

use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::sync::{mpsc, oneshot};

type Job = BoxFuture<'static, ()>;

struct Worker {
    sender: mpsc::UnboundedSender<Job>,
    thread: ThreadId,
}

/// Strictly serial task queue owned by one bus.
///
/// Equality is identity: a queue is only equal to itself.
pub struct DeliveryQueue {
    thread_name: String,
    worker: OnceLock<Option<Worker>>,
}

impl DeliveryQueue {
    pub(crate) fn new(thread_name: impl Into<String>) -> Self {
        Self {
            thread_name: thread_name.into(),
            worker: OnceLock::new(),
        }
    }

    /// Enqueue a task. Returns `false` if the task was dropped because the
    /// worker could not be started.
    pub fn enqueue<F>(&self, task: F) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let Some(worker) = self.worker() else {
            tracing::warn!(queue = %self.thread_name, "delivery worker unavailable; task dropped");
            return false;
        };
        if worker.sender.send(Box::pin(task)).is_err() {
            tracing::warn!(queue = %self.thread_name, "delivery worker closed; task dropped");
            return false;
        }
        true
    }

    /// True once the worker thread has been started.
    pub fn is_started(&self) -> bool {
        matches!(self.worker.get(), Some(Some(_)))
    }

    /// True when called from this queue's own worker thread.
    pub fn is_current(&self) -> bool {
        matches!(self.worker.get(), Some(Some(w)) if w.thread == std::thread::current().id())
    }

    /// Wait until every task enqueued before this call has run.
    ///
    /// Awaited from a queued task it returns immediately, since waiting on
    /// itself would never finish.
    pub async fn drain(&self) {
        if !self.is_started() {
            return;
        }
        if self.is_current() {
            tracing::warn!(
                queue = %self.thread_name,
                "drain called from the delivery worker; skipped"
            );
            return;
        }
        let (tx, rx) = oneshot::channel::<()>();
        if self.enqueue(async move {
            let _ = tx.send(());
        }) {
            let _ = rx.await;
        }
    }

    /// Blocking variant of [`drain`](Self::drain) for non-async callers.
    ///
    /// Called from a queued task it returns immediately, since waiting on
    /// itself would never finish.
    pub fn drain_blocking(&self) {
        if !self.is_started() {
            return;
        }
        if self.is_current() {
            tracing::warn!(
                queue = %self.thread_name,
                "drain_blocking called from the delivery worker; skipped"
            );
            return;
        }
        let (tx, rx) = std::sync::mpsc::sync_channel::<()>(1);
        if self.enqueue(async move {
            let _ = tx.send(());
        }) {
            let _ = rx.recv();
        }
    }

    fn worker(&self) -> Option<&Worker> {
        self.worker
            .get_or_init(|| spawn_worker(&self.thread_name))
            .as_ref()
    }
}

fn spawn_worker(thread_name: &str) -> Option<Worker> {
    let (sender, mut receiver) = mpsc::unbounded_channel::<Job>();
    let name = thread_name.to_string();

    let spawned = std::thread::Builder::new()
        .name(thread_name.to_string())
        .spawn(move || {
            let runtime = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(rt) => rt,
                Err(err) => {
                    tracing::error!(queue = %name, %err, "delivery worker runtime failed to start");
                    return;
                }
            };

            tracing::debug!(queue = %name, "delivery worker started");
            runtime.block_on(async {
                while let Some(job) = receiver.recv().await {
                    if let Err(panic) = AssertUnwindSafe(job).catch_unwind().await {
                        let err = notifykit_core::HandlerError::from_panic(panic);
                        tracing::error!(queue = %name, error = %err, "delivery task panicked");
                    }
                }
            });
            tracing::debug!(queue = %name, "delivery worker stopped");
        });

    match spawned {
        Ok(handle) => Some(Worker {
            sender,
            thread: handle.thread().id(),
        }),
        Err(err) => {
            tracing::error!(queue = %thread_name, %err, "failed to spawn delivery worker");
            None
        }
    }
}

impl PartialEq for DeliveryQueue {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}

impl Eq for DeliveryQueue {}

impl std::fmt::Debug for DeliveryQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeliveryQueue")
            .field("thread_name", &self.thread_name)
            .field("started", &self.is_started())
            .finish()
    }
}
