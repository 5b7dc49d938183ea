//! Parcel encoding.
//!
//! A parcel is the ordered byte buffer carrying the arguments of one
//! transaction. The encoding is fixed and not self-describing, so the
//! transaction code implies which values appear and in what order:
//!
//! - `i32`: 4 bytes little-endian
//! - `bool`: an `i32`, `1` for true, `0` for false; any non-zero value
//!   decodes as true
//! - `str`: `i32` byte length, UTF-8 bytes, zero-padded to a 4-byte boundary
//!
//! A request parcel begins with the interface token (the contract descriptor
//! as a string). A reply parcel begins with the exception header: `0` for
//! success, or a negative [`ExceptionCode`] wire value followed by a message.

use super::error::{IpcError, Result};
use super::exception::{ExceptionCode, RemoteException};

/// Marker written at the head of a reply when the call succeeded.
const NO_EXCEPTION: i32 = 0;

/// An ordered argument buffer with independent write and read cursors.
///
/// Writes always append; reads consume from the front. A parcel is
/// exclusively owned by the call in progress and never shared across calls.
///
/// # Example
///
/// ```
/// use imelink_common::protocol::Parcel;
///
/// let mut parcel = Parcel::new();
/// parcel.write_i32(2);
/// parcel.write_bool(true);
///
/// let mut parcel = Parcel::from_bytes(parcel.into_bytes());
/// assert_eq!(parcel.read_i32().unwrap(), 2);
/// assert!(parcel.read_bool().unwrap());
/// ```
#[derive(Debug, Default, Clone)]
pub struct Parcel {
    buf: Vec<u8>,
    read_pos: usize,
}

impl Parcel {
    /// Creates an empty parcel.
    pub fn new() -> Self {
        Parcel::default()
    }

    /// Wraps received bytes for reading, with the read cursor at the start.
    pub fn from_bytes(buf: Vec<u8>) -> Self {
        Parcel { buf, read_pos: 0 }
    }

    /// The encoded bytes written so far.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the parcel, returning the encoded bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Number of encoded bytes in the parcel.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Number of bytes left to read.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.read_pos
    }

    /// Appends a fixed-width little-endian `i32`.
    pub fn write_i32(&mut self, value: i32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    /// Appends a boolean as a 0/1-valued `i32`.
    pub fn write_bool(&mut self, value: bool) {
        self.write_i32(if value { 1 } else { 0 });
    }

    /// Appends a string: byte length, UTF-8 data, zero padding to a 4-byte
    /// boundary.
    pub fn write_str(&mut self, value: &str) {
        let bytes = value.as_bytes();
        self.write_i32(bytes.len() as i32);
        self.buf.extend_from_slice(bytes);
        let pad = (4 - bytes.len() % 4) % 4;
        self.buf.extend_from_slice(&[0u8; 3][..pad]);
    }

    /// Reads the next `i32`.
    ///
    /// # Errors
    ///
    /// Returns `MalformedParcel` if fewer than 4 bytes remain.
    pub fn read_i32(&mut self) -> Result<i32> {
        let bytes = self.take(4)?;
        Ok(i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Reads the next boolean. Any non-zero integer decodes as true.
    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_i32()? != 0)
    }

    /// Reads the next string.
    ///
    /// # Errors
    ///
    /// Returns `MalformedParcel` if the length is negative, exceeds the
    /// remaining bytes, or the data is not valid UTF-8.
    pub fn read_str(&mut self) -> Result<String> {
        let len = self.read_i32()?;
        if len < 0 {
            return Err(IpcError::MalformedParcel(format!(
                "negative string length: {}",
                len
            )));
        }
        let len = len as usize;
        let padded = len + (4 - len % 4) % 4;
        let bytes = self.take(padded)?;
        String::from_utf8(bytes[..len].to_vec())
            .map_err(|e| IpcError::MalformedParcel(format!("invalid UTF-8 in string: {}", e)))
    }

    /// Writes the contract identity token at the head of a request.
    pub fn write_interface_token(&mut self, descriptor: &str) {
        self.write_str(descriptor);
    }

    /// Reads the identity token and checks it against the dispatcher's
    /// descriptor.
    ///
    /// A mismatch means the caller built the parcel for a different
    /// contract; the call fails before any argument is decoded.
    pub fn enforce_interface(&mut self, descriptor: &str) -> Result<()> {
        let actual = self.read_str()?;
        if actual != descriptor {
            return Err(IpcError::InterfaceMismatch {
                expected: descriptor.to_string(),
                actual,
            });
        }
        Ok(())
    }

    /// Writes the success marker at the head of a reply.
    pub fn write_no_exception(&mut self) {
        self.write_i32(NO_EXCEPTION);
    }

    /// Writes an exception header: category wire value, then the message.
    pub fn write_exception(&mut self, exception: &RemoteException) {
        self.write_i32(exception.code.wire_value());
        self.write_str(&exception.message);
    }

    /// Reads the reply header, re-raising an encoded exception.
    ///
    /// Returns `Ok(())` on the success marker; decodes and returns the
    /// exception otherwise. Return values, if any, follow the header and are
    /// read by the caller after this succeeds.
    pub fn read_exception(&mut self) -> Result<()> {
        let header = self.read_i32()?;
        if header == NO_EXCEPTION {
            return Ok(());
        }
        let code = ExceptionCode::from_wire(header).ok_or_else(|| {
            IpcError::MalformedParcel(format!("unknown exception code: {}", header))
        })?;
        let message = self.read_str()?;
        Err(IpcError::Exception(RemoteException::new(code, message)))
    }

    fn take(&mut self, n: usize) -> Result<&[u8]> {
        if self.remaining() < n {
            return Err(IpcError::MalformedParcel(format!(
                "unexpected end of parcel: wanted {} bytes, {} remain",
                n,
                self.remaining()
            )));
        }
        let start = self.read_pos;
        self.read_pos += n;
        Ok(&self.buf[start..self.read_pos])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_i32_round_trip() {
        let mut parcel = Parcel::new();
        parcel.write_i32(2);
        parcel.write_i32(-1);
        parcel.write_i32(i32::MAX);

        assert_eq!(parcel.read_i32().unwrap(), 2);
        assert_eq!(parcel.read_i32().unwrap(), -1);
        assert_eq!(parcel.read_i32().unwrap(), i32::MAX);
        assert_eq!(parcel.remaining(), 0);
    }

    #[test]
    fn test_bool_encodes_as_integer() {
        let mut parcel = Parcel::new();
        parcel.write_bool(true);
        parcel.write_bool(false);

        // true must cross the wire as integer 1
        assert_eq!(&parcel.as_bytes()[..4], &1i32.to_le_bytes());
        assert!(parcel.read_bool().unwrap());
        assert!(!parcel.read_bool().unwrap());
    }

    #[test]
    fn test_nonzero_decodes_as_true() {
        let mut parcel = Parcel::new();
        parcel.write_i32(7);
        assert!(parcel.read_bool().unwrap());
    }

    #[test]
    fn test_str_round_trip_and_alignment() {
        let mut parcel = Parcel::new();
        parcel.write_str("imelink.ImeManager");
        parcel.write_i32(42);

        assert_eq!(parcel.len() % 4, 0);
        assert_eq!(parcel.read_str().unwrap(), "imelink.ImeManager");
        assert_eq!(parcel.read_i32().unwrap(), 42);
    }

    #[test]
    fn test_empty_string() {
        let mut parcel = Parcel::new();
        parcel.write_str("");
        assert_eq!(parcel.read_str().unwrap(), "");
    }

    #[test]
    fn test_read_past_end_is_malformed() {
        let mut parcel = Parcel::from_bytes(vec![1, 2]);
        let err = parcel.read_i32().unwrap_err();
        assert!(matches!(err, IpcError::MalformedParcel(_)));
    }

    #[test]
    fn test_negative_string_length_is_malformed() {
        let mut parcel = Parcel::new();
        parcel.write_i32(-5);
        let err = parcel.read_str().unwrap_err();
        assert!(matches!(err, IpcError::MalformedParcel(_)));
    }

    #[test]
    fn test_oversized_string_length_is_malformed() {
        let mut parcel = Parcel::new();
        parcel.write_i32(1024);
        let err = parcel.read_str().unwrap_err();
        assert!(matches!(err, IpcError::MalformedParcel(_)));
    }

    #[test]
    fn test_interface_token_mismatch() {
        let mut parcel = Parcel::new();
        parcel.write_interface_token("imelink.ImeManager");
        let err = parcel.enforce_interface("imelink.ImeClientCallback").unwrap_err();
        assert!(matches!(err, IpcError::InterfaceMismatch { .. }));
    }
}
