use std::sync::{Mutex, PoisonError};

use imelink_binding::manager::INVALID_DISPLAY_ID;

/// Point-in-time view of the client's mirrored display state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplaySnapshot {
    pub display_id: i32,
    pub ime_showing: bool,
    /// How many times the service announced that a display the client was
    /// using went away.
    pub removals: u32,
}

/// The client's local mirror of what the service last announced.
///
/// Shared between the embedding IME code and the callback handler the
/// service pushes into, so it is internally locked.
pub struct ClientDisplayState {
    inner: Mutex<StateInner>,
}

struct StateInner {
    display_id: i32,
    ime_showing: bool,
    removals: u32,
}

impl ClientDisplayState {
    pub fn new() -> Self {
        ClientDisplayState {
            inner: Mutex::new(StateInner {
                display_id: INVALID_DISPLAY_ID,
                ime_showing: false,
                removals: 0,
            }),
        }
    }

    /// Applies a display announcement from the service.
    ///
    /// Returns true when this was a removal transition: a valid display was
    /// in use and the service announced [`INVALID_DISPLAY_ID`]. The embedder
    /// tears down display-bound resources on that edge, so it is recorded
    /// before the new id is stored.
    pub fn apply_display(&self, display_id: i32) -> bool {
        let mut inner = self.lock();
        let removed =
            inner.display_id != INVALID_DISPLAY_ID && display_id == INVALID_DISPLAY_ID;
        if removed {
            inner.removals += 1;
        }
        inner.display_id = display_id;
        removed
    }

    /// Applies a visibility announcement from the service.
    pub fn apply_visibility(&self, show: bool) {
        self.lock().ime_showing = show;
    }

    pub fn display_id(&self) -> i32 {
        self.lock().display_id
    }

    pub fn ime_showing(&self) -> bool {
        self.lock().ime_showing
    }

    pub fn snapshot(&self) -> DisplaySnapshot {
        let inner = self.lock();
        DisplaySnapshot {
            display_id: inner.display_id,
            ime_showing: inner.ime_showing,
            removals: inner.removals,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StateInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ClientDisplayState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_with_no_display() {
        let state = ClientDisplayState::new();
        assert_eq!(state.display_id(), INVALID_DISPLAY_ID);
        assert!(!state.ime_showing());
    }

    #[test]
    fn test_apply_display() {
        let state = ClientDisplayState::new();
        assert!(!state.apply_display(3));
        assert_eq!(state.display_id(), 3);
    }

    #[test]
    fn test_removal_transition() {
        let state = ClientDisplayState::new();

        // Invalid -> invalid is not a removal.
        assert!(!state.apply_display(INVALID_DISPLAY_ID));

        state.apply_display(2);
        assert!(state.apply_display(INVALID_DISPLAY_ID));
        assert_eq!(state.snapshot().removals, 1);

        // Valid -> valid is a retarget, not a removal.
        state.apply_display(2);
        assert!(!state.apply_display(5));
        assert_eq!(state.snapshot().removals, 1);
    }

    #[test]
    fn test_apply_visibility() {
        let state = ClientDisplayState::new();
        state.apply_visibility(true);
        assert!(state.ime_showing());
        state.apply_visibility(false);
        assert!(!state.ime_showing());
    }
}
