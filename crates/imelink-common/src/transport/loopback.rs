use std::sync::Arc;

use crate::protocol::{Parcel, Result, TransactionCode};
use crate::transport::{dispatch, CallFlags, TransactStatus, Transactable, Transport};

/// In-process transport that dispatches directly into a local object.
///
/// Used wherever both call ends live in one process: tests, and hosting a
/// contract without a real channel. Marshalling still happens: the argument
/// parcel is copied into the dispatcher exactly as it would cross a process
/// boundary, so loopback calls exercise the same encode/decode paths as
/// remote ones.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use imelink_common::transport::{LoopbackTransport, Transactable};
/// # fn stub() -> Arc<dyn Transactable> { unimplemented!() }
///
/// let target: Arc<dyn Transactable> = stub();
/// let transport = LoopbackTransport::new(target);
/// ```
pub struct LoopbackTransport {
    target: Arc<dyn Transactable>,
}

impl LoopbackTransport {
    pub fn new(target: Arc<dyn Transactable>) -> Self {
        LoopbackTransport { target }
    }
}

impl Transport for LoopbackTransport {
    fn transact(
        &self,
        code: TransactionCode,
        data: &Parcel,
        flags: CallFlags,
    ) -> Result<TransactStatus> {
        // The dispatcher gets its own copy with a fresh read cursor.
        let mut data = Parcel::from_bytes(data.as_bytes().to_vec());
        let status = dispatch(self.target.as_ref(), code, &mut data)?;

        if flags.one_way {
            // One-way replies are discarded even when the target wrote one.
            return Ok(match status {
                TransactStatus::Handled(_) => TransactStatus::Handled(Parcel::new()),
                TransactStatus::Unhandled => TransactStatus::Unhandled,
            });
        }
        Ok(status)
    }
}
