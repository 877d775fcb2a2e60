//! Messages and payloads.
//!
//! A [`Message`] is what an observer receives: the posted name, the posted
//! subject and an opaque [`Payload`]. The bus never inspects the payload.
//! Messages are cheap to clone (every field is shared), which is how queued
//! observers get their own copy.

use std::any::Any;
use std::sync::Arc;
use std::time::Instant;

use crate::subject::Subject;

/// Opaque, shared message payload.
#[derive(Clone)]
pub struct Payload(Option<Arc<dyn Any + Send + Sync>>);

impl Payload {
    /// Wrap a value as a payload.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Some(Arc::new(value)))
    }

    /// Wrap an already shared value without another allocation.
    pub fn from_arc<T: Any + Send + Sync>(value: Arc<T>) -> Self {
        Self(Some(value))
    }

    /// A payload carrying nothing.
    pub fn empty() -> Self {
        Self(None)
    }

    /// True if this payload carries no value.
    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    /// True if the payload holds a `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.0.as_deref().is_some_and(|v| v.is::<T>())
    }

    /// Borrow the payload as `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.as_deref().and_then(|v| v.downcast_ref::<T>())
    }

    /// Get a shared handle to the payload as `T`.
    pub fn downcast_arc<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.0.clone().and_then(|v| v.downcast::<T>().ok())
    }
}

impl Default for Payload {
    fn default() -> Self {
        Self::empty()
    }
}

impl std::fmt::Debug for Payload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.0 {
            Some(_) => f.write_str("Payload(..)"),
            None => f.write_str("Payload(empty)"),
        }
    }
}

/// A posted notification as seen by an observer.
#[derive(Debug, Clone)]
pub struct Message {
    name: Arc<str>,
    subject: Option<Subject>,
    payload: Payload,
    seq: u64,
    posted_at: Instant,
}

impl Message {
    /// Build a message. `seq` is the posting bus's post counter.
    pub fn new(
        name: impl Into<Arc<str>>,
        subject: Option<Subject>,
        payload: Payload,
        seq: u64,
    ) -> Self {
        Self {
            name: name.into(),
            subject,
            payload,
            seq,
            posted_at: Instant::now(),
        }
    }

    /// The name the message was posted under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The subject the message was posted with, if any.
    pub fn subject(&self) -> Option<&Subject> {
        self.subject.as_ref()
    }

    /// The opaque payload.
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Shorthand for `payload().downcast_ref::<T>()`.
    pub fn get<T: Any>(&self) -> Option<&T> {
        self.payload.downcast_ref::<T>()
    }

    /// Per-bus post sequence number. Increases with every post that had at
    /// least one match.
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Monotonic instant the message was created at.
    pub fn posted_at(&self) -> Instant {
        self.posted_at
    }
}

/// A strongly typed message posted under a fixed name.
///
/// The default name is the fully qualified type name, which is enough unless
/// the same type must be posted under an established string name.
///
/// ```
/// use notifykit_core::TypedMessage;
///
/// struct PortOpened { path: String }
/// impl TypedMessage for PortOpened {}
///
/// assert!(PortOpened::name().ends_with("PortOpened"));
/// # let _ = PortOpened { path: String::new() }.path;
/// ```
pub trait TypedMessage: Any + Send + Sync {
    /// Name every instance of this type is posted under.
    fn name() -> &'static str
    where
        Self: Sized,
    {
        std::any::type_name::<Self>()
    }
}
