//! Notification bus implementation.
//!
//! Provides the [`Bus`] handle, the [`PostReport`] returned by every post and
//! the process-wide default instance.

use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Instant;

use futures::FutureExt;
use notifykit_core::{
    BusId, DeliveryFailure, Handler, HandlerError, Message, Observe, ObserveAsync, ObserverToken,
    Payload, Subject,
};

use crate::builder::BusBuilder;
use crate::config::BusConfig;
use crate::queue::DeliveryQueue;
use crate::registry::{ObserverRecord, Registry};

/// Outcome of one `post` call.
///
/// Inline handler failures are collected here; queued handler failures
/// happen after `post` returns and are only logged.
#[derive(Debug, Default)]
pub struct PostReport {
    /// Observers whose filters matched the post.
    pub matched: usize,
    /// Inline observers that were invoked, including ones that failed.
    pub invoked: usize,
    /// Queued observers handed to the delivery queue.
    pub enqueued: usize,
    /// Inline observers that returned an error or panicked.
    pub failures: Vec<DeliveryFailure>,
}

impl PostReport {
    /// True if no inline observer failed.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

pub(crate) struct Inner {
    pub(crate) id: BusId,
    pub(crate) config: BusConfig,
    pub(crate) registry: Registry,
    pub(crate) queue: DeliveryQueue,
    posts: AtomicU64,
}

/// In-process notification bus.
///
/// Cloning a `Bus` yields another handle to the same instance. Two handles
/// compare equal only if they refer to the same instance; two buses with
/// identical observers are still different buses.
#[derive(Clone)]
pub struct Bus {
    pub(crate) inner: Arc<Inner>,
}

impl Bus {
    /// Create a new bus with default configuration
    pub fn new() -> Self {
        Self::with_config(BusConfig::default())
    }

    /// Create a new bus with custom configuration
    ///
    /// An invalid configuration is logged and replaced by the default.
    pub fn with_config(config: BusConfig) -> Self {
        let config = match config.validate() {
            Ok(()) => config,
            Err(err) => {
                tracing::warn!(%err, "invalid bus configuration; using defaults");
                BusConfig::default()
            }
        };

        let id = BusId::new();
        tracing::debug!(bus = %id, "bus created");
        Self {
            inner: Arc::new(Inner {
                id,
                registry: Registry::new(id),
                queue: DeliveryQueue::new(config.worker_thread_name.clone()),
                config,
                posts: AtomicU64::new(0),
            }),
        }
    }

    /// Start building a bus with a fluent API
    pub fn builder() -> BusBuilder {
        BusBuilder::new()
    }

    /// Diagnostic id of this bus.
    pub fn id(&self) -> BusId {
        self.inner.id
    }

    /// Get the current configuration
    pub fn config(&self) -> &BusConfig {
        &self.inner.config
    }

    /// Register an observer.
    ///
    /// `None` for `name` or `subject` means "any". The observer is visible to
    /// every post issued after this call returns.
    pub fn add_observer(
        &self,
        name: Option<&str>,
        subject: Option<Subject>,
        handler: Handler,
    ) -> ObserverToken {
        let kind = if handler.is_queued() { "queued" } else { "inline" };
        let subject_kind = subject.as_ref().map(Subject::kind);
        let token = self.inner.registry.register(name, subject, handler);
        tracing::debug!(
            bus = %self.inner.id,
            %token,
            name = name.unwrap_or("*"),
            subject = subject_kind.unwrap_or("*"),
            kind,
            "observer added"
        );
        token
    }

    /// Register an inline observer from a closure.
    pub fn observe<F>(&self, name: Option<&str>, subject: Option<Subject>, f: F) -> ObserverToken
    where
        F: Fn(&Message) + Send + Sync + 'static,
    {
        self.add_observer(name, subject, Handler::inline(f))
    }

    /// Register a queued observer from an async closure.
    pub fn observe_queued<F, Fut>(
        &self,
        name: Option<&str>,
        subject: Option<Subject>,
        f: F,
    ) -> ObserverToken
    where
        F: Fn(Message) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        self.add_observer(name, subject, Handler::queued(f))
    }

    /// Remove an observer.
    ///
    /// Unknown or already removed tokens are ignored. A token issued by a
    /// different bus is ignored with a warning. Posts that already took their
    /// snapshot may still invoke the observer once.
    pub fn remove_observer(&self, token: &ObserverToken) {
        if token.bus_id() != self.inner.id {
            tracing::warn!(
                bus = %self.inner.id,
                %token,
                owner = %token.bus_id(),
                "token belongs to another bus; not removed"
            );
            return;
        }

        if self.inner.registry.remove(token) {
            tracing::debug!(bus = %self.inner.id, %token, "observer removed");
        } else {
            tracing::trace!(bus = %self.inner.id, %token, "observer already removed");
        }
    }

    /// Post a message to every matching observer.
    ///
    /// Inline observers run on this thread, in registration order, before
    /// this call returns. Queued observers are enqueued on the delivery
    /// queue in the same relative order and run later. A failing observer
    /// never prevents delivery to the others.
    pub fn post(&self, name: &str, subject: Option<Subject>, payload: Payload) -> PostReport {
        let matched = self.inner.registry.matching(name, subject.as_ref());
        tracing::trace!(bus = %self.inner.id, name, matched = matched.len(), "post");

        let mut report = PostReport {
            matched: matched.len(),
            ..Default::default()
        };
        if matched.is_empty() {
            return report;
        }

        let seq = self.inner.posts.fetch_add(1, Ordering::Relaxed) + 1;
        let message = Message::new(name, subject, payload, seq);

        for record in matched {
            match &record.handler {
                Handler::Inline(observer) => {
                    report.invoked += 1;
                    if let Err(error) = self.invoke_inline(&record, observer.as_ref(), &message) {
                        report.failures.push(DeliveryFailure {
                            token: record.token,
                            observer: observer.name().to_string(),
                            error,
                        });
                    }
                }
                Handler::Queued(observer) => {
                    if self.enqueue(&record, Arc::clone(observer), message.clone()) {
                        report.enqueued += 1;
                    }
                }
            }
        }

        report
    }

    /// Number of registered observers
    pub fn observer_count(&self) -> usize {
        self.inner.registry.len()
    }

    /// True if no observer is registered
    pub fn is_empty(&self) -> bool {
        self.inner.registry.is_empty()
    }

    /// This bus's delivery queue.
    pub fn delivery_queue(&self) -> &DeliveryQueue {
        &self.inner.queue
    }

    /// Wait for every queued delivery enqueued before this call.
    pub async fn drain(&self) {
        self.inner.queue.drain().await;
    }

    /// Blocking variant of [`drain`](Self::drain).
    pub fn drain_blocking(&self) {
        self.inner.queue.drain_blocking();
    }

    fn invoke_inline(
        &self,
        record: &ObserverRecord,
        observer: &dyn Observe,
        message: &Message,
    ) -> Result<(), HandlerError> {
        let started = Instant::now();
        let outcome = std::panic::catch_unwind(AssertUnwindSafe(|| observer.on_message(message)))
            .unwrap_or_else(|panic| Err(HandlerError::from_panic(panic)));

        if let Some(threshold) = self.inner.config.slow_handler_threshold() {
            let elapsed = started.elapsed();
            if elapsed > threshold {
                tracing::warn!(
                    bus = %self.inner.id,
                    token = %record.token,
                    observer = observer.name(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    "slow inline observer"
                );
            }
        }

        if let Err(err) = &outcome {
            if err.is_panic() {
                tracing::error!(
                    bus = %self.inner.id,
                    token = %record.token,
                    observer = observer.name(),
                    error = %err,
                    "inline observer panicked"
                );
            } else {
                tracing::warn!(
                    bus = %self.inner.id,
                    token = %record.token,
                    observer = observer.name(),
                    label = err.as_label(),
                    error = %err,
                    "inline observer failed"
                );
            }
        }

        outcome
    }

    fn enqueue(
        &self,
        record: &ObserverRecord,
        observer: Arc<dyn ObserveAsync>,
        message: Message,
    ) -> bool {
        let bus = self.inner.id;
        let token = record.token;

        self.inner.queue.enqueue(async move {
            match AssertUnwindSafe(observer.on_message(message))
                .catch_unwind()
                .await
            {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    tracing::warn!(
                        %bus,
                        %token,
                        observer = observer.name(),
                        label = err.as_label(),
                        error = %err,
                        "queued observer failed"
                    );
                }
                Err(panic) => {
                    let err = HandlerError::from_panic(panic);
                    tracing::error!(
                        %bus,
                        %token,
                        observer = observer.name(),
                        error = %err,
                        "queued observer panicked"
                    );
                }
            }
        })
    }
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Bus {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Bus {}

impl std::hash::Hash for Bus {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::ptr::hash(Arc::as_ptr(&self.inner), state);
    }
}

impl std::fmt::Debug for Bus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bus")
            .field("id", &self.inner.id)
            .field("observers", &self.observer_count())
            .field("queue", &self.inner.queue)
            .finish()
    }
}

impl std::fmt::Display for Bus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<Bus {}>", self.inner.id)
    }
}

/// Global bus instance
static DEFAULT_BUS: OnceLock<Bus> = OnceLock::new();

/// Get or initialize the process-wide default bus
///
/// Every call returns a handle to the same instance.
pub fn default_bus() -> Bus {
    DEFAULT_BUS.get_or_init(Bus::new).clone()
}

/// Initialize the default bus with custom configuration
///
/// Must be called before any call to [`default_bus`]. Returns the rejected
/// configuration unchanged if the default bus already exists; no bus is built
/// in that case.
pub fn init_default_bus(config: BusConfig) -> Result<(), BusConfig> {
    if DEFAULT_BUS.get().is_some() {
        return Err(config);
    }
    let rejected = config.clone();
    DEFAULT_BUS
        .set(Bus::with_config(config))
        .map_err(|_| rejected)
}
