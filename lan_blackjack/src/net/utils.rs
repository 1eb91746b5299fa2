//! Exact-length framing over `Read`/`Write`.
//!
//! Every protocol message has a fixed size, so framing is just "read
//! exactly N bytes". TCP is a stream and a single read may return fewer
//! bytes than asked; `read_exact` retries internally, and a peer close
//! before the frame is complete surfaces as
//! [`SessionError::ConnectionClosed`].

use std::io::{self, Read, Write};

use super::errors::SessionError;

/// Read exactly `N` bytes, or fail with `ConnectionClosed` if the stream
/// ends first.
pub fn read_frame<const N: usize, R: Read>(reader: &mut R) -> Result<[u8; N], SessionError> {
    let mut buf = [0u8; N];
    match reader.read_exact(&mut buf) {
        Ok(()) => Ok(buf),
        Err(error) if error.kind() == io::ErrorKind::UnexpectedEof => {
            Err(SessionError::ConnectionClosed)
        }
        Err(error) => Err(error.into()),
    }
}

/// Write a whole frame.
pub fn write_frame<W: Write>(writer: &mut W, frame: &[u8]) -> Result<(), SessionError> {
    writer.write_all(frame)?;
    Ok(())
}
