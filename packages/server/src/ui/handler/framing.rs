//! Bounded line framing for inbound connections.
//!
//! Lines end at `\n`; a trailing `\r` is stripped. At most `max_len + 1`
//! bytes of a line are ever buffered, so a peer that never sends a newline
//! cannot grow server memory. Anything past the limit is discarded up to the
//! next newline and reported as [`Frame::Oversized`].

use std::io;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// A complete line with its terminator removed
    Line(String),
    /// A line longer than the limit; its content was dropped
    Oversized,
}

/// Read the next line from `reader`, buffering at most `max_len + 1` bytes in `buf`.
///
/// Returns `Ok(None)` at end of stream. A final line without a newline is
/// still returned. Invalid UTF-8 is reported as `InvalidData`.
pub async fn read_frame<R>(
    reader: &mut R,
    buf: &mut Vec<u8>,
    max_len: usize,
) -> io::Result<Option<Frame>>
where
    R: AsyncBufRead + Unpin,
{
    buf.clear();
    // Room for one `\r` that is stripped below
    let limit = max_len.saturating_add(1);
    let mut oversized = false;
    let mut read_any = false;

    loop {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            if !read_any {
                return Ok(None);
            }
            break;
        }
        read_any = true;

        let newline = available.iter().position(|&b| b == b'\n');
        let content_len = newline.unwrap_or(available.len());
        if !oversized {
            if buf.len() + content_len > limit {
                oversized = true;
                buf.clear();
            } else {
                buf.extend_from_slice(&available[..content_len]);
            }
        }

        let consumed = content_len + usize::from(newline.is_some());
        reader.consume(consumed);
        if newline.is_some() {
            break;
        }
    }

    if oversized {
        return Ok(Some(Frame::Oversized));
    }
    if buf.last() == Some(&b'\r') {
        buf.pop();
    }
    if buf.len() > max_len {
        return Ok(Some(Frame::Oversized));
    }

    let line = std::str::from_utf8(buf.as_slice())
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    Ok(Some(Frame::Line(line.to_owned())))
}
