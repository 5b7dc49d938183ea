//! Exception reply protocol.
//!
//! A dispatcher that catches a domain error from the wrapped implementation
//! encodes it into the reply parcel instead of failing the transaction: a
//! negative code identifying the category, followed by a message string.
//! The proxy re-raises the decoded exception at the caller. Transport
//! failures never travel this path.

use std::fmt;

use thiserror::Error;

/// Category of a domain exception, with binder-compatible wire values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExceptionCode {
    Security,
    BadParcel,
    IllegalArgument,
    NullPointer,
    IllegalState,
    UnsupportedOperation,
}

impl ExceptionCode {
    /// The negative integer written to the reply parcel for this category.
    pub fn wire_value(self) -> i32 {
        match self {
            ExceptionCode::Security => -1,
            ExceptionCode::BadParcel => -2,
            ExceptionCode::IllegalArgument => -3,
            ExceptionCode::NullPointer => -4,
            ExceptionCode::IllegalState => -5,
            ExceptionCode::UnsupportedOperation => -7,
        }
    }

    /// Decodes a wire value back into a category.
    ///
    /// Returns `None` for values outside the known set (including `0`,
    /// which is the no-exception marker, not a category).
    pub fn from_wire(value: i32) -> Option<Self> {
        match value {
            -1 => Some(ExceptionCode::Security),
            -2 => Some(ExceptionCode::BadParcel),
            -3 => Some(ExceptionCode::IllegalArgument),
            -4 => Some(ExceptionCode::NullPointer),
            -5 => Some(ExceptionCode::IllegalState),
            -7 => Some(ExceptionCode::UnsupportedOperation),
            _ => None,
        }
    }
}

impl fmt::Display for ExceptionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExceptionCode::Security => "security",
            ExceptionCode::BadParcel => "bad parcel",
            ExceptionCode::IllegalArgument => "illegal argument",
            ExceptionCode::NullPointer => "null pointer",
            ExceptionCode::IllegalState => "illegal state",
            ExceptionCode::UnsupportedOperation => "unsupported operation",
        };
        f.write_str(name)
    }
}

/// A business-level failure reported by the remote implementation.
///
/// Part of the normal reply protocol: the dispatcher reports the transaction
/// as handled and the caller receives the exception verbatim.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{code}: {message}")]
pub struct RemoteException {
    pub code: ExceptionCode,
    pub message: String,
}

impl RemoteException {
    pub fn new(code: ExceptionCode, message: impl Into<String>) -> Self {
        RemoteException {
            code,
            message: message.into(),
        }
    }

    pub fn illegal_argument(message: impl Into<String>) -> Self {
        Self::new(ExceptionCode::IllegalArgument, message)
    }

    pub fn illegal_state(message: impl Into<String>) -> Self {
        Self::new(ExceptionCode::IllegalState, message)
    }

    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::new(ExceptionCode::UnsupportedOperation, message)
    }
}
