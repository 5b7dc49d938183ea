use std::io::{Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::sync::Mutex;
use std::time::Duration;

use crate::protocol::{IpcError, Parcel, Result, TransactionCode};
use crate::transport::{CallFlags, TransactStatus, Transport};

/// Default timeout for TCP operations (5 seconds)
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Maximum frame size (1 MiB). Parcels are small; anything larger is a
/// corrupt or hostile peer.
pub(crate) const MAX_FRAME_SIZE: usize = 1024 * 1024;

/// Reply status byte: the remote did not recognize the transaction code.
pub(crate) const STATUS_UNHANDLED: u8 = 0;
/// Reply status byte: the remote handled the call; the reply parcel follows.
pub(crate) const STATUS_HANDLED: u8 = 1;
/// Reply status byte: dispatch failed before a reply could be produced;
/// a message string follows.
pub(crate) const STATUS_FAILED: u8 = 2;

/// Synchronous TCP channel for the calling side.
///
/// Owns one connection to the remote end and serializes transactions over
/// it. Calls block until the reply frame arrives or the connection fails;
/// both read and write paths carry timeouts so a dead peer surfaces as
/// [`IpcError::Timeout`] rather than a hang.
///
/// # Wire Protocol
///
/// Request frame: `[4-byte length BE] [code: u32 BE] [flags: u8] [parcel]`.
/// Reply frame: `[4-byte length BE] [status: u8] [parcel]`. One-way calls
/// produce no reply frame.
///
/// # Example
///
/// ```no_run
/// use imelink_common::transport::TcpTransport;
///
/// let transport = TcpTransport::connect("127.0.0.1:7400").unwrap();
/// ```
#[derive(Debug)]
pub struct TcpTransport {
    stream: Mutex<TcpStream>,
}

impl TcpTransport {
    /// Connects to a remote endpoint.
    ///
    /// Resolves the address (which may yield several candidates) and tries
    /// each until one accepts, then configures read/write timeouts.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be parsed, no resolved address
    /// accepts the connection, or timeouts cannot be set on the stream.
    pub fn connect(addr: &str) -> Result<Self> {
        let socket_addrs = addr
            .to_socket_addrs()
            .map_err(|e| IpcError::Connection(format!("Invalid address '{}': {}", addr, e)))?;

        let mut last_err = None;
        for socket_addr in socket_addrs {
            match TcpStream::connect_timeout(&socket_addr, DEFAULT_TIMEOUT) {
                Ok(stream) => {
                    stream.set_read_timeout(Some(DEFAULT_TIMEOUT)).map_err(|e| {
                        IpcError::Connection(format!("Failed to set read timeout: {}", e))
                    })?;
                    stream.set_write_timeout(Some(DEFAULT_TIMEOUT)).map_err(|e| {
                        IpcError::Connection(format!("Failed to set write timeout: {}", e))
                    })?;
                    tracing::debug!(addr, "connected");
                    return Ok(TcpTransport {
                        stream: Mutex::new(stream),
                    });
                }
                Err(e) => last_err = Some(e),
            }
        }

        Err(IpcError::Connection(format!(
            "Failed to connect to {}: {}",
            addr,
            last_err
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no addresses resolved".to_string())
        )))
    }

    /// Sends one length-prefixed frame.
    pub fn send_frame(stream: &mut TcpStream, payload: &[u8]) -> Result<()> {
        let len = payload.len() as u32;
        stream
            .write_all(&len.to_be_bytes())
            .map_err(|e| map_io_error(e, "writing length prefix"))?;
        stream
            .write_all(payload)
            .map_err(|e| map_io_error(e, "writing frame"))?;
        stream
            .flush()
            .map_err(|e| map_io_error(e, "flushing stream"))?;
        Ok(())
    }

    /// Receives one length-prefixed frame.
    ///
    /// # Errors
    ///
    /// Returns an error if reading fails or the announced length exceeds
    /// [`MAX_FRAME_SIZE`].
    pub fn receive_frame(stream: &mut TcpStream) -> Result<Vec<u8>> {
        let mut len_buf = [0u8; 4];
        stream
            .read_exact(&mut len_buf)
            .map_err(|e| map_io_error(e, "reading length prefix"))?;

        let len = u32::from_be_bytes(len_buf) as usize;
        if len > MAX_FRAME_SIZE {
            return Err(IpcError::Transport(format!(
                "Frame too large: {} bytes (max {} bytes)",
                len, MAX_FRAME_SIZE
            )));
        }

        let mut buf = vec![0u8; len];
        stream
            .read_exact(&mut buf)
            .map_err(|e| map_io_error(e, "reading frame"))?;
        Ok(buf)
    }
}

impl Transport for TcpTransport {
    fn transact(
        &self,
        code: TransactionCode,
        data: &Parcel,
        flags: CallFlags,
    ) -> Result<TransactStatus> {
        let mut payload = Vec::with_capacity(5 + data.len());
        payload.extend_from_slice(&code.to_be_bytes());
        payload.push(if flags.one_way { 1 } else { 0 });
        payload.extend_from_slice(data.as_bytes());

        let mut stream = self
            .stream
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        Self::send_frame(&mut stream, &payload)?;

        if flags.one_way {
            return Ok(TransactStatus::Handled(Parcel::new()));
        }

        let reply = Self::receive_frame(&mut stream)?;
        let (&status, parcel_bytes) = reply
            .split_first()
            .ok_or_else(|| IpcError::Transport("empty reply frame".to_string()))?;

        match status {
            STATUS_UNHANDLED => Ok(TransactStatus::Unhandled),
            STATUS_HANDLED => Ok(TransactStatus::Handled(Parcel::from_bytes(
                parcel_bytes.to_vec(),
            ))),
            STATUS_FAILED => {
                let message = Parcel::from_bytes(parcel_bytes.to_vec()).read_str()?;
                Err(IpcError::Transport(format!(
                    "remote dispatch failed: {}",
                    message
                )))
            }
            other => Err(IpcError::Transport(format!(
                "unknown reply status: {}",
                other
            ))),
        }
    }
}

/// Maps IO errors to the transport-failure taxonomy.
///
/// Timeouts and connection drops get their own variants so callers can tell
/// a dead peer apart from a local IO problem.
pub(crate) fn map_io_error(err: std::io::Error, context: &str) -> IpcError {
    match err.kind() {
        std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock => {
            IpcError::Timeout(DEFAULT_TIMEOUT.as_millis() as u64)
        }
        std::io::ErrorKind::ConnectionReset
        | std::io::ErrorKind::ConnectionAborted
        | std::io::ErrorKind::UnexpectedEof
        | std::io::ErrorKind::NotConnected => {
            IpcError::Connection(format!("{}: Connection lost", context))
        }
        _ => IpcError::Io(err),
    }
}
