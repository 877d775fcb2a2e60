//! Observer handler interface
//!
//! Two kinds of observers can be registered on a bus:
//! - [`Observe`]: called inline, on the posting thread, before `post` returns
//! - [`ObserveAsync`]: enqueued on the bus's serial delivery queue; `post`
//!   returns without waiting for it
//!
//! [`Handler`] wraps either kind so the registry can hold them uniformly.
//! Closures are adapted with [`Handler::inline`], [`Handler::try_inline`],
//! [`Handler::queued`] and [`Handler::try_queued`].

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::HandlerError;
use crate::message::Message;

/// Inline observer.
///
/// Runs on the posting thread. Returning an error (or panicking) does not
/// stop delivery to other observers; the failure is reported to the poster.
pub trait Observe: Send + Sync + 'static {
    /// Handle one message.
    fn on_message(&self, message: &Message) -> Result<(), HandlerError>;

    /// Human-readable name (for logs and failure reports).
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Queued observer.
///
/// Runs on the bus's delivery queue, strictly one at a time and in enqueue
/// order relative to other queued observers of the same bus. Failures are
/// logged by the queue worker.
#[async_trait]
pub trait ObserveAsync: Send + Sync + 'static {
    /// Handle one message.
    async fn on_message(&self, message: Message) -> Result<(), HandlerError>;

    /// Human-readable name (for logs).
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Closure-backed inline observer.
pub struct InlineFn<F> {
    name: String,
    f: F,
}

impl<F> Observe for InlineFn<F>
where
    F: Fn(&Message) -> Result<(), HandlerError> + Send + Sync + 'static,
{
    fn on_message(&self, message: &Message) -> Result<(), HandlerError> {
        (self.f)(message)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Closure-backed queued observer.
pub struct QueuedFn<F> {
    name: String,
    f: F,
}

#[async_trait]
impl<F, Fut> ObserveAsync for QueuedFn<F>
where
    F: Fn(Message) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
{
    async fn on_message(&self, message: Message) -> Result<(), HandlerError> {
        (self.f)(message).await
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// A registered observer's callback, inline or queued.
#[derive(Clone)]
pub enum Handler {
    /// Invoked synchronously during `post`.
    Inline(Arc<dyn Observe>),
    /// Enqueued on the bus delivery queue during `post`.
    Queued(Arc<dyn ObserveAsync>),
}

impl Handler {
    /// Inline handler from an infallible closure.
    pub fn inline<F>(f: F) -> Self
    where
        F: Fn(&Message) + Send + Sync + 'static,
    {
        Self::try_inline(move |m| {
            f(m);
            Ok(())
        })
    }

    /// Inline handler from a fallible closure.
    pub fn try_inline<F>(f: F) -> Self
    where
        F: Fn(&Message) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        Handler::Inline(Arc::new(InlineFn {
            name: "inline-fn".to_string(),
            f,
        }))
    }

    /// Queued handler from a closure producing an infallible future.
    pub fn queued<F, Fut>(f: F) -> Self
    where
        F: Fn(Message) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self::try_queued(move |m| {
            let fut = f(m);
            async move {
                fut.await;
                Ok(())
            }
        })
    }

    /// Queued handler from a closure producing a fallible future.
    pub fn try_queued<F, Fut>(f: F) -> Self
    where
        F: Fn(Message) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
    {
        Handler::Queued(Arc::new(QueuedFn {
            name: "queued-fn".to_string(),
            f,
        }))
    }

    /// Wrap an existing inline observer.
    pub fn from_observer(observer: Arc<dyn Observe>) -> Self {
        Handler::Inline(observer)
    }

    /// Wrap an existing queued observer.
    pub fn from_async_observer(observer: Arc<dyn ObserveAsync>) -> Self {
        Handler::Queued(observer)
    }

    /// Rename a closure-backed handler, for logs.
    ///
    /// Handlers built from trait objects keep the name their impl reports.
    pub fn named(self, name: impl Into<String>) -> Self {
        let name = name.into();
        match self {
            Handler::Inline(obs) => Handler::Inline(Arc::new(Renamed { name, inner: obs })),
            Handler::Queued(obs) => Handler::Queued(Arc::new(Renamed { name, inner: obs })),
        }
    }

    /// True for handlers routed through the delivery queue.
    pub fn is_queued(&self) -> bool {
        matches!(self, Handler::Queued(_))
    }

    /// Observer name as reported by the handler.
    pub fn name(&self) -> &str {
        match self {
            Handler::Inline(obs) => obs.name(),
            Handler::Queued(obs) => obs.name(),
        }
    }
}

impl std::fmt::Debug for Handler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = if self.is_queued() { "Queued" } else { "Inline" };
        f.debug_tuple(kind).field(&self.name()).finish()
    }
}

struct Renamed<T: ?Sized> {
    name: String,
    inner: Arc<T>,
}

impl Observe for Renamed<dyn Observe> {
    fn on_message(&self, message: &Message) -> Result<(), HandlerError> {
        self.inner.on_message(message)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[async_trait]
impl ObserveAsync for Renamed<dyn ObserveAsync> {
    async fn on_message(&self, message: Message) -> Result<(), HandlerError> {
        self.inner.on_message(message).await
    }

    fn name(&self) -> &str {
        &self.name
    }
}
