use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use crate::protocol::{IpcError, Parcel, Result, TransactionCode};
use crate::transport::tcp::{MAX_FRAME_SIZE, STATUS_FAILED, STATUS_HANDLED, STATUS_UNHANDLED};
use crate::transport::{dispatch, TransactStatus, Transactable};

/// Async TCP host that feeds inbound transactions to a dispatcher.
///
/// Accepts connections in a loop and spawns a task per connection; each
/// connection services multiple transactions until the peer closes it.
/// Dispatch itself is synchronous and may perform blocking work (the IME
/// manager dials back to client callbacks), so every transaction runs on the
/// blocking pool.
pub struct TcpServer {
    listener: TcpListener,
}

impl TcpServer {
    /// Binds the server to the given address.
    ///
    /// # Arguments
    /// * `bind_addr` - The address to bind to (e.g., "0.0.0.0:7400")
    pub async fn bind(bind_addr: &str) -> Result<Self> {
        let listener = TcpListener::bind(bind_addr)
            .await
            .map_err(|e| IpcError::Connection(format!("Failed to bind to {}: {}", bind_addr, e)))?;
        Ok(TcpServer { listener })
    }

    /// Gets the actual bound address.
    pub fn local_addr(&self) -> Result<std::net::SocketAddr> {
        self.listener
            .local_addr()
            .map_err(|e| IpcError::Connection(format!("Failed to get local addr: {}", e)))
    }

    /// Runs the accept loop, dispatching every transaction into `target`.
    ///
    /// The dispatcher is shared across connections and is invoked
    /// concurrently; [`Transactable`] requires `Send + Sync` for exactly
    /// this reason.
    pub async fn serve(&self, target: Arc<dyn Transactable>) -> Result<()> {
        loop {
            let (stream, peer_addr) = self
                .listener
                .accept()
                .await
                .map_err(|e| IpcError::Connection(format!("Failed to accept connection: {}", e)))?;

            tracing::debug!(%peer_addr, "connection established");

            let target = target.clone();
            tokio::spawn(async move {
                if let Err(e) = handle_connection(stream, target).await {
                    tracing::warn!(%peer_addr, error = %e, "connection error");
                }
            });
        }
    }
}

/// Services one connection: read frame, dispatch, write reply, repeat.
async fn handle_connection(mut stream: TcpStream, target: Arc<dyn Transactable>) -> Result<()> {
    loop {
        let mut len_buf = [0u8; 4];
        match stream.read_exact(&mut len_buf).await {
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                // Peer closed the connection.
                return Ok(());
            }
            Err(e) => {
                return Err(IpcError::Connection(format!("Failed to read length: {}", e)));
            }
        }

        let len = u32::from_be_bytes(len_buf) as usize;
        if len > MAX_FRAME_SIZE {
            return Err(IpcError::Transport(format!(
                "Frame too large: {} bytes (max {} bytes)",
                len, MAX_FRAME_SIZE
            )));
        }
        if len < 5 {
            return Err(IpcError::Transport(format!(
                "Request frame too short: {} bytes",
                len
            )));
        }

        let mut buf = vec![0u8; len];
        stream
            .read_exact(&mut buf)
            .await
            .map_err(|e| IpcError::Connection(format!("Failed to read frame: {}", e)))?;

        let code = TransactionCode::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]);
        let one_way = buf[4] != 0;
        let parcel_bytes = buf[5..].to_vec();

        tracing::debug!(code, one_way, "dispatching transaction");

        // Dispatch may block (dial-back to callbacks), so keep it off the
        // async workers.
        let dispatch_target = target.clone();
        let outcome = tokio::task::spawn_blocking(move || {
            let mut data = Parcel::from_bytes(parcel_bytes);
            dispatch(dispatch_target.as_ref(), code, &mut data)
        })
        .await
        .map_err(|e| IpcError::Transport(format!("dispatch task failed: {}", e)))?;

        if one_way {
            if let Err(e) = outcome {
                tracing::warn!(code, error = %e, "one-way dispatch failed");
            }
            continue;
        }

        let reply = match outcome {
            Ok(TransactStatus::Handled(parcel)) => {
                let mut frame = Vec::with_capacity(1 + parcel.len());
                frame.push(STATUS_HANDLED);
                frame.extend_from_slice(parcel.as_bytes());
                frame
            }
            Ok(TransactStatus::Unhandled) => vec![STATUS_UNHANDLED],
            Err(e) => {
                tracing::warn!(code, error = %e, "dispatch failed");
                let mut message = Parcel::new();
                message.write_str(&e.to_string());
                let mut frame = Vec::with_capacity(1 + message.len());
                frame.push(STATUS_FAILED);
                frame.extend_from_slice(message.as_bytes());
                frame
            }
        };

        let len = reply.len() as u32;
        stream
            .write_all(&len.to_be_bytes())
            .await
            .map_err(|e| IpcError::Connection(format!("Failed to write reply length: {}", e)))?;
        stream
            .write_all(&reply)
            .await
            .map_err(|e| IpcError::Connection(format!("Failed to write reply: {}", e)))?;
        stream
            .flush()
            .await
            .map_err(|e| IpcError::Connection(format!("Failed to flush reply: {}", e)))?;
    }
}
