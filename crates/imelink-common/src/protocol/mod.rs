//! Imelink Protocol Layer
//!
//! Defines the transaction-code space, the parcel encoding, the exception
//! reply protocol, and the error taxonomy shared by both call ends.

pub mod error;
pub mod exception;
pub mod parcel;

#[cfg(test)]
mod tests;

pub use error::{IpcError, Result};
pub use exception::{ExceptionCode, RemoteException};
pub use parcel::Parcel;

/// Integer identifying one method within a contract.
pub type TransactionCode = u32;

/// First transaction code available to user-defined methods.
///
/// Codes below this value belong to the transport itself and must never be
/// assigned to contract methods.
pub const FIRST_CALL_TRANSACTION: TransactionCode = 0x0000_0001;

/// Last transaction code available to user-defined methods.
pub const LAST_CALL_TRANSACTION: TransactionCode = 0x00ff_ffff;

/// Reserved identity-probe transaction.
///
/// Every dispatcher answers this code with its interface descriptor string,
/// letting a caller verify it is talking to the contract it expects.
pub const INTERFACE_TRANSACTION: TransactionCode = 0x5f4e_5446;
