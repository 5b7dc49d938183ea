//! Imelink Contract Bindings
//!
//! Hand-written equivalent of the generated stub/proxy code for the two IME
//! display-control contracts:
//!
//! - [`client_callback`] - `ImeClientCallback`, the service-to-client
//!   contract (set the IME's target display, set its visibility), with the
//!   full generated-code surface: trait, dispatcher stub, caller proxy, and
//!   a process-wide default-implementation slot
//! - [`manager`] - `ImeManager`, the client-to-service contract (register a
//!   callback endpoint, report window status, query the IME display)
//!
//! Each contract module follows the same shape: a descriptor constant, a
//! transaction-code table, a service trait, an `…Stub<T>` implementing
//! [`Transactable`] over any `T` of the trait, and an `…Proxy` implementing
//! the trait over any [`Transport`].
//!
//! [`Transactable`]: imelink_common::transport::Transactable
//! [`Transport`]: imelink_common::transport::Transport

pub mod client_callback;
pub mod default_slot;
pub mod manager;


pub use client_callback::{ImeClientCallback, ImeClientCallbackProxy, ImeClientCallbackStub};
pub use default_slot::DefaultSlot;
pub use manager::{ImeManager, ImeManagerProxy, ImeManagerStub};

use imelink_common::protocol::{IpcError, Parcel, Result};

/// Encodes the outcome of an implementation call into the reply parcel.
///
/// Success and domain exceptions are both part of the normal reply protocol
/// and leave the transaction handled; any other error propagates upward as a
/// dispatch failure.
pub(crate) fn write_outcome(reply: &mut Parcel, outcome: Result<()>) -> Result<()> {
    match outcome {
        Ok(()) => {
            reply.write_no_exception();
            Ok(())
        }
        Err(IpcError::Exception(exception)) => {
            reply.write_exception(&exception);
            Ok(())
        }
        Err(other) => Err(other),
    }
}
