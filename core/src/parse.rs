//! Raw transfer output → `Response`.
//!
//! # Design
//! With header capture on, the transport returns every header block it
//! received followed by the body, e.g.
//!
//! ```text
//! HTTP/1.1 100 Continue\r\n\r\nHTTP/1.1 200 OK\r\nX-A: 1\r\n\r\nbody
//! ```
//!
//! Interim `100 Continue` blocks are skipped in a bounded loop; the first
//! other block supplies the status code and headers and everything after it
//! is the body. A status line that cannot be read is an error, never a
//! default code.

use crate::error::ParseError;
use crate::response::Response;

/// Upper bound on chained `100 Continue` blocks before giving up.
pub const MAX_INTERIM_RESPONSES: usize = 8;

const HEADER_TERMINATOR: &[u8] = b"\r\n\r\n";

/// Parses raw transfer output into a `Response`.
pub fn parse_raw(raw: &[u8]) -> Result<Response, ParseError> {
    let mut rest = raw;
    let mut interim = 0;

    loop {
        let (head, body) = split_head(rest);
        let head = String::from_utf8_lossy(head);
        let mut lines = head.split("\r\n");
        let status_line = lines.next().unwrap_or_default();
        if status_line.is_empty() {
            return Err(if interim == 0 {
                ParseError::Empty
            } else {
                ParseError::MissingFinalResponse
            });
        }

        let code = status_code(status_line)?;
        if code == 100 {
            interim += 1;
            if interim > MAX_INTERIM_RESPONSES {
                return Err(ParseError::TooManyInterimResponses(MAX_INTERIM_RESPONSES));
            }
            rest = body.ok_or(ParseError::MissingFinalResponse)?;
            continue;
        }

        let mut response = Response::new(code, body.unwrap_or_default());
        for line in lines.map(str::trim).filter(|line| !line.is_empty()) {
            response.add_header(line);
        }
        return Ok(response);
    }
}

/// Splits at the first blank line. Without one the whole input is the head.
fn split_head(raw: &[u8]) -> (&[u8], Option<&[u8]>) {
    match raw
        .windows(HEADER_TERMINATOR.len())
        .position(|window| window == HEADER_TERMINATOR)
    {
        Some(at) => (&raw[..at], Some(&raw[at + HEADER_TERMINATOR.len()..])),
        None => (raw, None),
    }
}

/// `HTTP/<version> <code> [reason]` → code.
fn status_code(status_line: &str) -> Result<u16, ParseError> {
    let invalid = || ParseError::InvalidStatusLine(status_line.to_string());
    let mut parts = status_line.splitn(3, ' ');
    let protocol = parts.next().unwrap_or_default();
    let code = parts.next().unwrap_or_default();

    if !protocol.starts_with("HTTP/") || code.len() != 3 || !code.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    match code.parse::<u16>() {
        Ok(code) if code >= 100 => Ok(code),
        _ => Err(invalid()),
    }
}
