//! Message streams.
//!
//! [`Bus::messages`] registers an inline observer that buffers matching
//! messages for an async consumer. The buffer is bounded: when it is full the
//! oldest message is dropped so a slow consumer never blocks a poster.
//! Dropping the stream removes its observer. Once the bus itself is gone the
//! stream yields the remaining buffered messages and then ends.

use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::{Arc, Weak};
use std::task::{Context, Poll, Waker};

use futures::Stream;
use notifykit_core::{Handler, Message, ObserverToken, Subject};
use parking_lot::Mutex;

use crate::bus::{Bus, Inner};

struct Shared {
    buffer: VecDeque<Message>,
    capacity: usize,
    waker: Option<Waker>,
    dropped: u64,
    closed: bool,
}

/// Feeding side, owned by the registered observer.
struct Feed {
    shared: Arc<Mutex<Shared>>,
}

impl Feed {
    fn push(&self, message: &Message) {
        let mut shared = self.shared.lock();
        if shared.buffer.len() >= shared.capacity {
            shared.buffer.pop_front();
            shared.dropped += 1;
            tracing::warn!(
                name = message.name(),
                capacity = shared.capacity,
                dropped = shared.dropped,
                "message stream full; oldest message dropped"
            );
        }
        shared.buffer.push_back(message.clone());
        if let Some(waker) = shared.waker.take() {
            waker.wake();
        }
    }
}

impl Drop for Feed {
    fn drop(&mut self) {
        let mut shared = self.shared.lock();
        shared.closed = true;
        if let Some(waker) = shared.waker.take() {
            waker.wake();
        }
    }
}

/// Async stream of messages matching one filter.
pub struct MessageStream {
    bus: Weak<Inner>,
    token: ObserverToken,
    shared: Arc<Mutex<Shared>>,
}

impl MessageStream {
    /// Token of the observer feeding this stream.
    pub fn token(&self) -> ObserverToken {
        self.token
    }

    /// Messages dropped so far because the buffer was full.
    pub fn dropped(&self) -> u64 {
        self.shared.lock().dropped
    }

    /// Messages currently buffered.
    pub fn buffered_len(&self) -> usize {
        self.shared.lock().buffer.len()
    }
}

impl Stream for MessageStream {
    type Item = Message;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Message>> {
        let mut shared = self.shared.lock();
        if let Some(message) = shared.buffer.pop_front() {
            return Poll::Ready(Some(message));
        }
        if shared.closed {
            return Poll::Ready(None);
        }
        shared.waker = Some(cx.waker().clone());
        Poll::Pending
    }
}

impl Drop for MessageStream {
    fn drop(&mut self) {
        if let Some(inner) = self.bus.upgrade() {
            Bus { inner }.remove_observer(&self.token);
        }
    }
}

impl std::fmt::Debug for MessageStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageStream")
            .field("token", &self.token)
            .field("buffered", &self.buffered_len())
            .finish()
    }
}

impl Bus {
    /// Stream messages matching `name` and `subject`, buffered per
    /// [`BusConfig::stream_buffer`](crate::BusConfig::stream_buffer).
    pub fn messages(&self, name: Option<&str>, subject: Option<Subject>) -> MessageStream {
        self.messages_with_buffer(name, subject, self.inner.config.stream_buffer_clamped())
    }

    /// Like [`messages`](Self::messages) with an explicit buffer size
    /// (minimum 1).
    pub fn messages_with_buffer(
        &self,
        name: Option<&str>,
        subject: Option<Subject>,
        buffer: usize,
    ) -> MessageStream {
        let capacity = buffer.max(1);
        let shared = Arc::new(Mutex::new(Shared {
            buffer: VecDeque::with_capacity(capacity),
            capacity,
            waker: None,
            dropped: 0,
            closed: false,
        }));

        let feed = Feed {
            shared: Arc::clone(&shared),
        };
        let handler = Handler::inline(move |message| feed.push(message)).named("message-stream");
        let token = self.add_observer(name, subject, handler);

        MessageStream {
            bus: Arc::downgrade(&self.inner),
            token,
            shared,
        }
    }
}
