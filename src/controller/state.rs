//! Observable controller state and one-shot result slots.

use std::sync::Mutex;

use crate::error::StoreError;
use crate::metrics::DerivedMetrics;
use crate::profile::Profile;

/// Snapshot of everything the presentation layer observes.
///
/// Published through a `tokio::sync::watch` channel: subscribers see every
/// change, and [`ProfileController::state`](crate::controller::ProfileController::state)
/// is the authoritative getter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ControllerState {
    /// Current session identity, if signed in.
    pub identity: Option<String>,
    pub email: Option<String>,
    pub signed_in: bool,
    /// The profile as last loaded or committed. `None` until a load or
    /// registration succeeds.
    pub profile: Option<Profile>,
    /// True while a user-initiated action is in flight.
    pub loading: bool,
    /// Latest failure, for passive observers. Action-scoped outcomes go
    /// through the one-shot slots instead.
    pub last_error: Option<StoreError>,
    /// Derived health metrics; `None` whenever the profile is absent or
    /// has incomplete measurements.
    pub metrics: Option<DerivedMetrics>,
}

/// A result slot that can be consumed exactly once.
///
/// `set` stores (or replaces) a value; `take` hands it out and empties the
/// slot. Consumers therefore cannot re-act on a stale result — the
/// failure mode of observable slots that require an explicit clear.
#[derive(Debug, Default)]
pub struct Slot<T> {
    value: Mutex<Option<T>>,
}

impl<T> Slot<T> {
    pub fn new() -> Self {
        Self {
            value: Mutex::new(None),
        }
    }

    /// Store a value, replacing any unconsumed one.
    pub fn set(&self, value: T) {
        *self.value.lock().expect("slot lock poisoned") = Some(value);
    }

    /// Consume the value, leaving the slot empty.
    pub fn take(&self) -> Option<T> {
        self.value.lock().expect("slot lock poisoned").take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_is_consumed_exactly_once() {
        let slot: Slot<i32> = Slot::new();
        assert_eq!(slot.take(), None);

        slot.set(1);
        assert_eq!(slot.take(), Some(1));
        assert_eq!(slot.take(), None);
    }

    #[test]
    fn set_replaces_unconsumed_value() {
        let slot: Slot<i32> = Slot::new();
        slot.set(1);
        slot.set(2);
        assert_eq!(slot.take(), Some(2));
        assert_eq!(slot.take(), None);
    }

    #[test]
    fn default_state_is_signed_out() {
        let state = ControllerState::default();
        assert!(!state.signed_in);
        assert!(!state.loading);
        assert!(state.identity.is_none());
        assert!(state.profile.is_none());
        assert!(state.metrics.is_none());
        assert!(state.last_error.is_none());
    }
}
