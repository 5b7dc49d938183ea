//! The `ImeManager` contract: client-to-service calls for registering a
//! callback endpoint, reporting the client window status, and querying which
//! display hosts the IME.
//!
//! Manager codes live in a private reserved range well above the callback
//! contract's, so both contracts can share a channel without colliding.

use std::sync::Arc;

use imelink_common::protocol::{
    IpcError, Parcel, Result, TransactionCode, INTERFACE_TRANSACTION,
};
use imelink_common::transport::{CallFlags, TransactStatus, Transactable, Transport};

use crate::write_outcome;

/// Contract identity for the manager side.
pub const DESCRIPTOR: &str = "imelink.ImeManager";

/// Display id meaning "no display assigned". Returned by
/// [`ImeManager::get_ime_display`] before a target exists and pushed to
/// clients when the target display is removed.
pub const INVALID_DISPLAY_ID: i32 = -1;

/// Reserved private code range for manager transactions.
pub const MANAGER_TRANSACTION_FIRST: TransactionCode = 30_000;
pub const MANAGER_TRANSACTION_END: TransactionCode = 30_100;

pub const TRANSACTION_REGISTER_CLIENT_CALLBACK: TransactionCode = MANAGER_TRANSACTION_FIRST + 1;
pub const TRANSACTION_SEND_CLIENT_WINDOW_STATUS: TransactionCode = MANAGER_TRANSACTION_FIRST + 2;
pub const TRANSACTION_GET_IME_DISPLAY: TransactionCode = MANAGER_TRANSACTION_FIRST + 3;

/// The IME manager service surface.
///
/// Callback registration carries the string address of an endpoint the
/// client hosts; the service dials back through it to deliver
/// `ImeClientCallback` notifications.
pub trait ImeManager: Send + Sync {
    fn register_client_callback(&self, endpoint: &str) -> Result<()>;

    fn send_client_window_status(&self, show: bool) -> Result<()>;

    /// Returns the display currently hosting the IME, or
    /// [`INVALID_DISPLAY_ID`] when none is assigned.
    fn get_ime_display(&self) -> Result<i32>;
}

impl<T: ImeManager + ?Sized> ImeManager for Arc<T> {
    fn register_client_callback(&self, endpoint: &str) -> Result<()> {
        (**self).register_client_callback(endpoint)
    }

    fn send_client_window_status(&self, show: bool) -> Result<()> {
        (**self).send_client_window_status(show)
    }

    fn get_ime_display(&self) -> Result<i32> {
        (**self).get_ime_display()
    }
}

/// Dispatcher for the `ImeManager` contract.
pub struct ImeManagerStub<T> {
    service: T,
}

impl<T: ImeManager> ImeManagerStub<T> {
    pub fn new(service: T) -> Self {
        ImeManagerStub { service }
    }
}

impl<T: ImeManager> Transactable for ImeManagerStub<T> {
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
            TRANSACTION_REGISTER_CLIENT_CALLBACK => {
                data.enforce_interface(DESCRIPTOR)?;
                let endpoint = data.read_str()?;
                write_outcome(reply, self.service.register_client_callback(&endpoint))?;
                Ok(true)
            }
            TRANSACTION_SEND_CLIENT_WINDOW_STATUS => {
                data.enforce_interface(DESCRIPTOR)?;
                let show = data.read_bool()?;
                write_outcome(reply, self.service.send_client_window_status(show))?;
                Ok(true)
            }
            TRANSACTION_GET_IME_DISPLAY => {
                data.enforce_interface(DESCRIPTOR)?;
                match self.service.get_ime_display() {
                    Ok(display_id) => {
                        reply.write_no_exception();
                        reply.write_i32(display_id);
                    }
                    Err(IpcError::Exception(exception)) => reply.write_exception(&exception),
                    Err(other) => return Err(other),
                }
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

/// Caller-side proxy for the manager contract.
///
/// The manager has no default-implementation slot: an unhandled transaction
/// surfaces as `UnsupportedOperation` directly.
pub struct ImeManagerProxy {
    remote: Arc<dyn Transport>,
}

impl ImeManagerProxy {
    pub fn new(remote: Arc<dyn Transport>) -> Self {
        ImeManagerProxy { remote }
    }

    pub fn interface_descriptor(&self) -> &'static str {
        DESCRIPTOR
    }

    fn transact(&self, code: TransactionCode, data: &Parcel, method: &str) -> Result<Parcel> {
        match self.remote.transact(code, data, CallFlags::TWO_WAY)? {
            TransactStatus::Handled(mut reply) => {
                reply.read_exception()?;
                Ok(reply)
            }
            TransactStatus::Unhandled => Err(IpcError::UnsupportedOperation(format!(
                "ImeManager::{}",
                method
            ))),
        }
    }
}

impl ImeManager for ImeManagerProxy {
    fn register_client_callback(&self, endpoint: &str) -> Result<()> {
        let mut data = Parcel::new();
        data.write_interface_token(DESCRIPTOR);
        data.write_str(endpoint);
        self.transact(
            TRANSACTION_REGISTER_CLIENT_CALLBACK,
            &data,
            "register_client_callback",
        )?;
        Ok(())
    }

    fn send_client_window_status(&self, show: bool) -> Result<()> {
        let mut data = Parcel::new();
        data.write_interface_token(DESCRIPTOR);
        data.write_bool(show);
        self.transact(
            TRANSACTION_SEND_CLIENT_WINDOW_STATUS,
            &data,
            "send_client_window_status",
        )?;
        Ok(())
    }

    fn get_ime_display(&self) -> Result<i32> {
        let mut data = Parcel::new();
        data.write_interface_token(DESCRIPTOR);
        let mut reply = self.transact(TRANSACTION_GET_IME_DISPLAY, &data, "get_ime_display")?;
        reply.read_i32()
    }
}
