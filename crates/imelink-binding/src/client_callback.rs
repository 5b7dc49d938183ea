//! The `ImeClientCallback` contract: service-to-client notifications about
//! which display the IME targets and whether it is visible.
//!
//! This module is the hand-written equivalent of one generated binding file:
//! descriptor, transaction-code table, service trait, dispatcher stub,
//! caller proxy, and the process-wide default-implementation slot.

use std::sync::Arc;

use imelink_common::protocol::{
    IpcError, Parcel, Result, TransactionCode, FIRST_CALL_TRANSACTION, INTERFACE_TRANSACTION,
};
use imelink_common::transport::{CallFlags, TransactStatus, Transactable, Transport};

use crate::default_slot::DefaultSlot;
use crate::write_outcome;

/// Contract identity, written at the head of every request and checked by
/// the dispatcher. Must be identical on both call ends.
pub const DESCRIPTOR: &str = "imelink.ImeClientCallback";

/// Transaction code table. Codes are assigned sequentially from the first
/// user-assignable code, in declaration order, and are wire-stable.
pub const TRANSACTION_SET_IME_DISPLAY: TransactionCode = FIRST_CALL_TRANSACTION;
pub const TRANSACTION_SET_IME_DISPLAY_STATUS: TransactionCode = FIRST_CALL_TRANSACTION + 1;

/// Client-side handler for IME display notifications.
///
/// Implemented by the real client handler, by [`ImeClientCallbackProxy`] for
/// the calling side, and by whatever fallback is registered in the default
/// slot. Implementations signal business-level failures with
/// [`IpcError::Exception`]; the stub encodes those into the reply rather
/// than failing the transaction.
pub trait ImeClientCallback: Send + Sync {
    /// Redirects the IME to the given display.
    fn set_ime_display(&self, display_id: i32) -> Result<()>;

    /// Shows or hides the IME on its current display.
    fn set_ime_display_status(&self, show: bool) -> Result<()>;
}

impl<T: ImeClientCallback + ?Sized> ImeClientCallback for Arc<T> {
    fn set_ime_display(&self, display_id: i32) -> Result<()> {
        (**self).set_ime_display(display_id)
    }

    fn set_ime_display_status(&self, show: bool) -> Result<()> {
        (**self).set_ime_display_status(show)
    }
}

static DEFAULT_IMPL: DefaultSlot<dyn ImeClientCallback> = DefaultSlot::new(DESCRIPTOR);

/// Registers the process-wide fallback used when the remote reports a call
/// unhandled. See [`DefaultSlot::set`] for the exact semantics.
pub fn set_default_impl(fallback: Option<Arc<dyn ImeClientCallback>>) -> Result<bool> {
    DEFAULT_IMPL.set(fallback)
}

/// Returns the registered fallback, if any.
pub fn default_impl() -> Option<Arc<dyn ImeClientCallback>> {
    DEFAULT_IMPL.get()
}

/// Empties the fallback slot, returning what was registered.
pub fn clear_default_impl() -> Option<Arc<dyn ImeClientCallback>> {
    DEFAULT_IMPL.clear()
}

/// Dispatcher for the `ImeClientCallback` contract.
///
/// Decodes inbound transactions in declared argument order and invokes the
/// wrapped implementation. The stub itself is effect-free beyond
/// marshalling; whatever the implementation does with the call is its own
/// business.
pub struct ImeClientCallbackStub<T> {
    service: T,
}

impl<T: ImeClientCallback> ImeClientCallbackStub<T> {
    pub fn new(service: T) -> Self {
        ImeClientCallbackStub { service }
    }
}

impl<T: ImeClientCallback> Transactable for ImeClientCallbackStub<T> {
    fn descriptor(&self) -> &'static str {
        DESCRIPTOR
    }

    fn on_transact(
        &self,
        code: TransactionCode,
        data: &mut Parcel,
        reply: &mut Parcel,
    ) -> Result<bool> {
        match code {
            INTERFACE_TRANSACTION => {
                reply.write_str(DESCRIPTOR);
                Ok(true)
            }
            TRANSACTION_SET_IME_DISPLAY => {
                data.enforce_interface(DESCRIPTOR)?;
                let display_id = data.read_i32()?;
                write_outcome(reply, self.service.set_ime_display(display_id))?;
                Ok(true)
            }
            TRANSACTION_SET_IME_DISPLAY_STATUS => {
                data.enforce_interface(DESCRIPTOR)?;
                let show = data.read_bool()?;
                write_outcome(reply, self.service.set_ime_display_status(show))?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

/// Caller-side proxy presenting the contract as ordinary local calls.
///
/// Each method writes the interface token and its arguments, performs a
/// blocking two-way transaction, and interprets the outcome: a handled reply
/// re-raises any encoded exception; an unhandled outcome falls back to the
/// default slot or fails with `UnsupportedOperation`.
pub struct ImeClientCallbackProxy {
    remote: Arc<dyn Transport>,
}

impl ImeClientCallbackProxy {
    pub fn new(remote: Arc<dyn Transport>) -> Self {
        ImeClientCallbackProxy { remote }
    }

    pub fn interface_descriptor(&self) -> &'static str {
        DESCRIPTOR
    }
}

impl ImeClientCallback for ImeClientCallbackProxy {
    fn set_ime_display(&self, display_id: i32) -> Result<()> {
        let mut data = Parcel::new();
        data.write_interface_token(DESCRIPTOR);
        data.write_i32(display_id);

        match self
            .remote
            .transact(TRANSACTION_SET_IME_DISPLAY, &data, CallFlags::TWO_WAY)?
        {
            TransactStatus::Handled(mut reply) => reply.read_exception(),
            TransactStatus::Unhandled => match default_impl() {
                Some(fallback) => fallback.set_ime_display(display_id),
                None => Err(IpcError::UnsupportedOperation(
                    "ImeClientCallback::set_ime_display".to_string(),
                )),
            },
        }
    }

    fn set_ime_display_status(&self, show: bool) -> Result<()> {
        let mut data = Parcel::new();
        data.write_interface_token(DESCRIPTOR);
        data.write_bool(show);

        match self.remote.transact(
            TRANSACTION_SET_IME_DISPLAY_STATUS,
            &data,
            CallFlags::TWO_WAY,
        )? {
            TransactStatus::Handled(mut reply) => reply.read_exception(),
            TransactStatus::Unhandled => match default_impl() {
                Some(fallback) => fallback.set_ime_display_status(show),
                None => Err(IpcError::UnsupportedOperation(
                    "ImeClientCallback::set_ime_display_status".to_string(),
                )),
            },
        }
    }
}
