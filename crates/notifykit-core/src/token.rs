//! Observer tokens and bus identifiers.

use std::sync::atomic::{AtomicU64, Ordering};

use uuid::Uuid;

/// Process-wide token counter. Starts at 1 so a zero sequence is never issued.
static NEXT_TOKEN: AtomicU64 = AtomicU64::new(1);

/// Diagnostic identifier of one bus instance.
///
/// Used to tag tokens with the bus that issued them and to render a bus in
/// logs. Bus equality does not go through this id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BusId(Uuid);

impl BusId {
    /// Create a new random bus id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// The underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for BusId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for BusId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", &self.0.simple().to_string()[..8])
    }
}

/// Handle returned by observer registration.
///
/// A token is the only way to remove an observer. Every token issued in a
/// process carries a distinct sequence number, so two tokens compare equal
/// only if one is a copy of the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverToken {
    seq: u64,
    bus: BusId,
}

impl ObserverToken {
    /// Issue a fresh, never-before-seen token for the given bus.
    pub fn issue(bus: BusId) -> Self {
        let seq = NEXT_TOKEN.fetch_add(1, Ordering::Relaxed);
        Self { seq, bus }
    }

    /// Process-wide issue order of this token.
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// The bus that issued this token.
    pub fn bus_id(&self) -> BusId {
        self.bus
    }
}

impl std::fmt::Display for ObserverToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Obs({}#{})", self.bus, self.seq)
    }
}
