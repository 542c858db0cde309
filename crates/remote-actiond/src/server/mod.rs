//! Line-delimited request loop.
//!
//! Each line of input holds one JSON-RPC payload, single or batched. Each
//! payload that needs an answer produces exactly one line of output. Lines are
//! read in bounded chunks so an oversized request is rejected without being
//! buffered in full.

use std::io::{self, BufRead, ErrorKind, Write};

use thiserror::Error;
use tracing::debug;

use remote_action::{DispatchError, Dispatcher, Id, Outgoing, Response};

const SERVER_TARGET: &str = concat!(env!("CARGO_CRATE_NAME"), "::server");

/// Errors that end a serving session.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Reading the request stream failed.
    #[error("failed to read request: {0}")]
    Read(#[source] io::Error),
    /// Writing a response failed.
    #[error("failed to write response: {0}")]
    Write(#[source] io::Error),
    /// A response could not be encoded.
    #[error("failed to encode response: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Counters reported when a session ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServeSummary {
    /// Non-blank request lines received, oversized ones included.
    pub payloads: usize,
    /// Response lines written.
    pub responses: usize,
}

/// Serves one request stream against a dispatcher.
#[derive(Debug, Clone)]
pub struct LineServer<'r> {
    dispatcher: Dispatcher<'r>,
    max_request_bytes: usize,
}

impl<'r> LineServer<'r> {
    /// Creates a server that rejects lines longer than `max_request_bytes`,
    /// counting the terminating newline.
    #[must_use]
    pub const fn new(dispatcher: Dispatcher<'r>, max_request_bytes: usize) -> Self {
        Self {
            dispatcher,
            max_request_bytes,
        }
    }

    /// Reads requests until end of input, writing one response line per
    /// payload that needs one.
    ///
    /// # Errors
    ///
    /// Returns a [`ServerError`] when the stream fails. Malformed or oversized
    /// requests are answered on the wire instead.
    pub fn serve<R, W>(&self, mut reader: R, mut writer: W) -> Result<ServeSummary, ServerError>
    where
        R: BufRead,
        W: Write,
    {
        let mut summary = ServeSummary::default();
        loop {
            let outgoing = match read_bounded_line(&mut reader, self.max_request_bytes)
                .map_err(ServerError::Read)?
            {
                Line::Eof => break,
                Line::Oversized(size) => {
                    summary.payloads += 1;
                    debug!(
                        target: SERVER_TARGET,
                        size,
                        max_size = self.max_request_bytes,
                        "rejecting oversized request"
                    );
                    Some(oversized(size, self.max_request_bytes))
                }
                Line::Complete(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => continue,
                Line::Complete(bytes) => {
                    summary.payloads += 1;
                    self.dispatcher.handle_payload(&bytes)
                }
            };
            if let Some(outgoing) = outgoing {
                write_line(&mut writer, &outgoing)?;
                summary.responses += 1;
            }
        }
        Ok(summary)
    }
}

fn oversized(size: usize, max_size: usize) -> Outgoing {
    let error = DispatchError::invalid_request(format!(
        "request too large: {size} bytes exceeds {max_size} byte limit"
    ));
    Outgoing::Single(Response::failure(Id::Null, error.to_error_object()))
}

fn write_line<W: Write>(writer: &mut W, outgoing: &Outgoing) -> Result<(), ServerError> {
    serde_json::to_writer(&mut *writer, outgoing).map_err(ServerError::Encode)?;
    writer.write_all(b"\n").map_err(ServerError::Write)?;
    writer.flush().map_err(ServerError::Write)
}

#[derive(Debug, PartialEq, Eq)]
enum Line {
    Eof,
    Complete(Vec<u8>),
    Oversized(usize),
}

/// Reads up to and including the next newline.
///
/// Once the line exceeds `limit` its bytes are discarded; the rest of the line
/// is still consumed so the next read starts on a fresh request.
fn read_bounded_line<R: BufRead>(reader: &mut R, limit: usize) -> io::Result<Line> {
    let mut buffer = Vec::new();
    let mut size = 0_usize;
    let mut overflowed = false;
    loop {
        let available = match reader.fill_buf() {
            Ok(bytes) => bytes,
            Err(error) if error.kind() == ErrorKind::Interrupted => continue,
            Err(error) => return Err(error),
        };
        if available.is_empty() {
            return Ok(finish(size, overflowed, buffer));
        }
        let newline = available.iter().position(|byte| *byte == b'\n');
        let chunk = newline
            .and_then(|index| available.get(..=index))
            .unwrap_or(available);
        let consumed = chunk.len();
        size = size.saturating_add(consumed);
        if size > limit {
            overflowed = true;
            buffer = Vec::new();
        } else {
            buffer.extend_from_slice(chunk);
        }
        reader.consume(consumed);
        if newline.is_some() {
            return Ok(finish(size, overflowed, buffer));
        }
    }
}

fn finish(size: usize, overflowed: bool, buffer: Vec<u8>) -> Line {
    if size == 0 {
        Line::Eof
    } else if overflowed {
        Line::Oversized(size)
    } else {
        Line::Complete(buffer)
    }
}
