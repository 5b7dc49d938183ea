//! Process-wide default-implementation slot.
//!
//! When the remote end reports a transaction unhandled (typically a peer
//! running an older contract revision), the proxy falls back to a locally
//! registered implementation of the full contract, if one exists. There is
//! at most one registration per contract per process.

use std::sync::{Arc, Mutex, PoisonError};

use imelink_common::protocol::{IpcError, Result};

/// Single-slot registration of a fallback implementation.
///
/// One static slot exists per contract. Registration is first-writer-wins:
/// a second `set` while a registration is active fails with
/// [`IpcError::DefaultAlreadySet`], whoever the writer is. Passing `None`
/// clears nothing and reports `Ok(false)`: the generated code this
/// replicates behaves the same way, and peers may depend on it; the
/// documented way to empty the slot is [`clear`](DefaultSlot::clear).
pub struct DefaultSlot<T: ?Sized> {
    contract: &'static str,
    slot: Mutex<Option<Arc<T>>>,
}

impl<T: ?Sized> DefaultSlot<T> {
    /// Creates an empty slot for the named contract.
    pub const fn new(contract: &'static str) -> Self {
        DefaultSlot {
            contract,
            slot: Mutex::new(None),
        }
    }

    /// Registers a fallback implementation.
    ///
    /// Returns `Ok(true)` when `fallback` was stored and `Ok(false)` for the
    /// `None` no-op.
    ///
    /// # Errors
    ///
    /// Returns `DefaultAlreadySet` if a registration is already active,
    /// regardless of the value passed.
    pub fn set(&self, fallback: Option<Arc<T>>) -> Result<bool> {
        let mut slot = self.lock();
        if slot.is_some() {
            return Err(IpcError::DefaultAlreadySet(self.contract));
        }
        match fallback {
            Some(fallback) => {
                *slot = Some(fallback);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Returns the active registration, if any.
    pub fn get(&self) -> Option<Arc<T>> {
        self.lock().clone()
    }

    /// Empties the slot, returning what was registered.
    pub fn clear(&self) -> Option<Arc<T>> {
        self.lock().take()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Arc<T>>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
