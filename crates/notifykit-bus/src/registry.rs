//! Observer registry.
//!
//! Maps tokens to observer records. One mutex guards the whole map; `post`
//! takes its matching snapshot under that mutex and releases it before any
//! handler runs, so a concurrent removal lands either fully before or fully
//! after a given snapshot.
//!
//! Records are keyed by token sequence in a `BTreeMap`, which makes iteration
//! order equal to registration order.

use std::collections::BTreeMap;
use std::sync::Arc;

use notifykit_core::{BusId, Handler, ObserverToken, Subject};
use parking_lot::Mutex;

/// One registered subscription. Immutable once created.
#[derive(Debug)]
pub(crate) struct ObserverRecord {
    pub(crate) token: ObserverToken,
    pub(crate) name: Option<Arc<str>>,
    pub(crate) subject: Option<Subject>,
    pub(crate) handler: Handler,
}

impl ObserverRecord {
    /// Whether a post of `(name, subject)` reaches this record.
    ///
    /// An unset filter is a wildcard. A subject filter never matches a post
    /// without a subject.
    pub(crate) fn matches(&self, name: &str, subject: Option<&Subject>) -> bool {
        let name_ok = self.name.as_deref().map_or(true, |n| n == name);
        let subject_ok = match &self.subject {
            None => true,
            Some(wanted) => subject.is_some_and(|posted| wanted.same_as(posted)),
        };
        name_ok && subject_ok
    }
}

/// Token → record map owned by one bus.
pub(crate) struct Registry {
    bus: BusId,
    records: Mutex<BTreeMap<u64, Arc<ObserverRecord>>>,
}

impl Registry {
    pub(crate) fn new(bus: BusId) -> Self {
        Self {
            bus,
            records: Mutex::new(BTreeMap::new()),
        }
    }

    /// Store a new record and return its freshly issued token.
    ///
    /// The token is issued under the lock so registry order and token order
    /// agree even when several threads register at once.
    pub(crate) fn register(
        &self,
        name: Option<&str>,
        subject: Option<Subject>,
        handler: Handler,
    ) -> ObserverToken {
        let mut records = self.records.lock();
        let token = ObserverToken::issue(self.bus);
        let record = ObserverRecord {
            token,
            name: name.map(Arc::from),
            subject,
            handler,
        };
        records.insert(token.seq(), Arc::new(record));
        token
    }

    /// Remove the record for `token`. Returns whether anything was removed.
    pub(crate) fn remove(&self, token: &ObserverToken) -> bool {
        if token.bus_id() != self.bus {
            return false;
        }
        self.records.lock().remove(&token.seq()).is_some()
    }

    /// Records matching a post, in registration order.
    pub(crate) fn matching(
        &self,
        name: &str,
        subject: Option<&Subject>,
    ) -> Vec<Arc<ObserverRecord>> {
        self.records
            .lock()
            .values()
            .filter(|r| r.matches(name, subject))
            .cloned()
            .collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}
