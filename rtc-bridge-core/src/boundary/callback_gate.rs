use parking_lot::Mutex;

/// Outcome of a subscribe/unsubscribe on a `SubscriberGate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateTransition {
    /// Count went 0 → 1: register the native callback now.
    Activated,
    /// Count went 1 → 0: unregister the native callback now.
    Deactivated,
    Unchanged,
}

/// Reference-counted listener registration.
///
/// Tracks subscriber count so a native callback is registered only while at
/// least one listener exists: registered on the first subscriber,
/// unregistered when the last one leaves.
#[derive(Debug, Default)]
pub struct SubscriberGate {
    count: Mutex<usize>,
}

impl SubscriberGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> GateTransition {
        let mut count = self.count.lock();
        *count += 1;
        if *count == 1 {
            GateTransition::Activated
        } else {
            GateTransition::Unchanged
        }
    }

    pub fn unsubscribe(&self) -> GateTransition {
        let mut count = self.count.lock();
        if *count == 0 {
            log::warn!("unsubscribe without matching subscribe");
            return GateTransition::Unchanged;
        }
        *count -= 1;
        if *count == 0 {
            GateTransition::Deactivated
        } else {
            GateTransition::Unchanged
        }
    }

    pub fn count(&self) -> usize {
        *self.count.lock()
    }
}
