//! Imelink Transport Layer
//!
//! This module carries transactions between a proxy and a dispatcher.
//!
//! # Architecture
//!
//! The calling side sees one seam, [`Transport::transact`]: a transaction
//! code, an argument parcel, and call flags go in; a handled/unhandled
//! outcome with the reply parcel comes out. The receiving side sees the
//! mirror seam, [`Transactable::on_transact`]. Everything between the two,
//! whether an in-process loopback or a real channel, is an implementation
//! detail.
//!
//! # Wire Format (TCP)
//!
//! Every message is length-prefixed: `[4-byte length as u32 big-endian] +
//! [payload]`, with payloads capped at 1 MiB. A request payload is
//! `[code: u32 BE] [flags: u8] [parcel bytes]`; a reply payload is
//! `[status: u8] [parcel bytes]` where status `0` means unhandled, `1`
//! handled, and `2` a dispatch failure whose message follows as a string.
//!
//! # Components
//!
//! - **[`LoopbackTransport`]**: in-process dispatch, used by tests and
//!   single-process hosting
//! - **[`TcpTransport`]**: synchronous TCP channel for the calling side
//! - **[`TcpServer`]**: async TCP host that feeds a dispatcher

pub mod loopback;
pub mod tcp;
pub mod tcp_server;

pub use loopback::LoopbackTransport;
pub use tcp::TcpTransport;
pub use tcp_server::TcpServer;


use crate::protocol::{IpcError, Parcel, Result, TransactionCode, INTERFACE_TRANSACTION};

/// Per-call flags carried alongside the transaction code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CallFlags {
    /// Fire-and-forget: the caller does not wait for a reply and a handled
    /// one-way call carries an empty reply parcel.
    pub one_way: bool,
}

impl CallFlags {
    pub const TWO_WAY: CallFlags = CallFlags { one_way: false };
    pub const ONE_WAY: CallFlags = CallFlags { one_way: true };
}

/// Outcome of a transaction as reported by the remote end.
///
/// `Unhandled` is not an error: it is how an older peer signals that it does
/// not know the transaction code, and it is what triggers the proxy-side
/// default-implementation fallback.
#[derive(Debug)]
pub enum TransactStatus {
    Handled(Parcel),
    Unhandled,
}

/// The calling side of a channel.
///
/// A `Transport` borrows a connection the host environment manages; it owns
/// no scheduling and performs no retries. `transact` blocks until a reply
/// arrives or the channel fails, and a channel failure surfaces as an error
/// distinct from both `Unhandled` and an encoded remote exception.
pub trait Transport: Send + Sync {
    fn transact(
        &self,
        code: TransactionCode,
        data: &Parcel,
        flags: CallFlags,
    ) -> Result<TransactStatus>;
}

/// The receiving side of a channel.
///
/// Implementations must be safe under concurrent invocation: the host may
/// service multiple inbound calls on separate worker threads.
pub trait Transactable: Send + Sync {
    /// The contract descriptor this dispatcher answers for.
    fn descriptor(&self) -> &'static str;

    /// Decodes and executes one transaction.
    ///
    /// Returns `Ok(true)` if the code was recognized and a reply written
    /// (including exception replies), `Ok(false)` if the code is unknown so
    /// an outer handler may claim it, and `Err` if the argument parcel was
    /// malformed, in which case the implementation was never invoked.
    fn on_transact(
        &self,
        code: TransactionCode,
        data: &mut Parcel,
        reply: &mut Parcel,
    ) -> Result<bool>;
}

/// Runs one transaction against a dispatcher and maps its handled flag into
/// a [`TransactStatus`].
///
/// Shared by the loopback transport and the TCP server so both ends of the
/// seam agree on the mapping.
pub fn dispatch(
    target: &dyn Transactable,
    code: TransactionCode,
    data: &mut Parcel,
) -> Result<TransactStatus> {
    let mut reply = Parcel::new();
    if target.on_transact(code, data, &mut reply)? {
        Ok(TransactStatus::Handled(reply))
    } else {
        Ok(TransactStatus::Unhandled)
    }
}

/// Probes the remote end for its interface descriptor.
///
/// Sends the reserved identity transaction; the reply parcel carries the
/// descriptor string only, with no exception header.
pub fn remote_descriptor(remote: &dyn Transport) -> Result<String> {
    match remote.transact(INTERFACE_TRANSACTION, &Parcel::new(), CallFlags::TWO_WAY)? {
        TransactStatus::Handled(mut reply) => reply.read_str(),
        TransactStatus::Unhandled => Err(IpcError::UnsupportedOperation(
            "remote does not answer the identity probe".to_string(),
        )),
    }
}
