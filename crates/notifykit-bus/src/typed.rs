//! Typed publish/observe helpers.
//!
//! A [`TypedMessage`] is posted under `M::name()` with the value as payload.
//! Typed observers filter on that name and downcast the payload; a message
//! posted under the same name with a different payload type is skipped.

use std::future::Future;
use std::sync::Arc;

use notifykit_core::{Handler, ObserverToken, Payload, Subject, TypedMessage};

use crate::bus::{Bus, PostReport};

impl Bus {
    /// Post `message` under its type's name.
    pub fn publish<M: TypedMessage>(&self, message: M, subject: Option<Subject>) -> PostReport {
        self.post(M::name(), subject, Payload::new(message))
    }

    /// Observe messages of type `M` inline.
    pub fn observe_message<M, F>(&self, subject: Option<Subject>, f: F) -> ObserverToken
    where
        M: TypedMessage,
        F: Fn(&M) + Send + Sync + 'static,
    {
        let handler = Handler::inline(move |message| match message.get::<M>() {
            Some(value) => f(value),
            None => tracing::trace!(name = message.name(), "payload type mismatch; skipped"),
        })
        .named(M::name());
        self.add_observer(Some(M::name()), subject, handler)
    }

    /// Observe messages of type `M` on the delivery queue.
    pub fn observe_message_queued<M, F, Fut>(&self, subject: Option<Subject>, f: F) -> ObserverToken
    where
        M: TypedMessage,
        F: Fn(Arc<M>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let f = Arc::new(f);
        let handler = Handler::queued(move |message| {
            let value = message.payload().downcast_arc::<M>();
            let f = Arc::clone(&f);
            async move {
                match value {
                    Some(value) => f(value).await,
                    None => {
                        tracing::trace!(name = message.name(), "payload type mismatch; skipped")
                    }
                }
            }
        })
        .named(M::name());
        self.add_observer(Some(M::name()), subject, handler)
    }
}
