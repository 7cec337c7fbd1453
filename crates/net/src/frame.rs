//! Length-prefixed frame encoding/decoding
//!
//! Wire format: [4-byte big-endian length][raw UTF-8 payload]
//! No message-type tagging, no checksums, no versioning. A connection
//! carries an unbounded sequence of such frames until closed.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{Error, Result};

/// Read one length-prefixed frame from a stream.
///
/// Reads exactly 4 + L bytes no matter how the transport chunks them;
/// `read_exact` loops over partial reads internally. A peer that closes
/// before a frame completes (including mid-payload) yields
/// [`Error::ConnectionClosed`] — a truncated frame is a disconnect, not
/// a recoverable parse error.
pub async fn read_frame<R: AsyncRead + Unpin>(reader: &mut R) -> Result<String> {
    // Read 4-byte length prefix
    let mut len_buf = [0u8; 4];
    reader.read_exact(&mut len_buf).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            Error::ConnectionClosed
        } else {
            Error::Io(e)
        }
    })?;

    let len = u32::from_be_bytes(len_buf);

    // Read payload (empty frames are legal and decode to "")
    let mut payload = vec![0u8; len as usize];
    reader.read_exact(&mut payload).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            Error::ConnectionClosed
        } else {
            Error::Io(e)
        }
    })?;

    String::from_utf8(payload).map_err(|e| Error::Protocol(format!("Invalid UTF-8: {}", e)))
}

/// Write one length-prefixed frame to a stream.
///
/// The prefix is the payload's byte length, not its character count.
pub async fn write_frame<W: AsyncWrite + Unpin>(writer: &mut W, text: &str) -> Result<()> {
    let len: u32 = text
        .len()
        .try_into()
        .map_err(|_| Error::Protocol(format!("Message too large: {} bytes", text.len())))?;

    // Write length prefix
    writer.write_all(&len.to_be_bytes()).await?;

    // Write payload
    writer.write_all(text.as_bytes()).await?;

    // Flush to ensure delivery
    writer.flush().await?;

    Ok(())
}
