//! Shared helpers for bus integration tests.

use std::sync::Arc;

use notifykit_bus::{Bus, Message, ObserverToken, Subject};
use parking_lot::Mutex;

/// Records which labelled observers fired, in invocation order.
#[derive(Clone, Default)]
pub struct Recorder {
    hits: Arc<Mutex<Vec<&'static str>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an inline observer that records `label` on every message.
    pub fn observe(
        &self,
        bus: &Bus,
        label: &'static str,
        name: Option<&str>,
        subject: Option<Subject>,
    ) -> ObserverToken {
        let hits = self.hits.clone();
        bus.observe(name, subject, move |_: &Message| hits.lock().push(label))
    }

    pub fn hits(&self) -> Vec<&'static str> {
        self.hits.lock().clone()
    }

    pub fn count(&self, label: &str) -> usize {
        self.hits.lock().iter().filter(|h| **h == label).count()
    }

    pub fn clear(&self) {
        self.hits.lock().clear();
    }
}
