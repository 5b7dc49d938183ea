use thiserror::Error;

use super::exception::RemoteException;

/// Errors surfaced by the imelink binding layer.
///
/// The variants mirror the distinct failure classes of the call protocol:
/// a malformed argument buffer, a domain exception the remote encoded into
/// its reply, an operation the remote does not implement, and genuine
/// transport failures. Keeping these separate matters: a caller that sees
/// `Exception` knows the call reached the implementation, while `Connection`
/// or `Timeout` mean it may never have arrived.
#[derive(Error, Debug)]
pub enum IpcError {
    #[error("Malformed parcel: {0}")]
    MalformedParcel(String),

    #[error("Interface token mismatch: expected '{expected}', got '{actual}'")]
    InterfaceMismatch { expected: String, actual: String },

    #[error("Remote exception: {0}")]
    Exception(#[from] RemoteException),

    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Request timeout after {0}ms")]
    Timeout(u64),

    #[error("Default implementation already registered for {0}")]
    DefaultAlreadySet(&'static str),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, IpcError>;
