//! Outcome of a call.

use std::borrow::Cow;

/// An HTTP response, or the sentinel for a failed transfer.
///
/// Code 0 means no HTTP exchange took place; `content` then holds the
/// diagnostic text. `Default` is a successful, empty `200`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    http_code: u16,
    content: Vec<u8>,
    headers: Vec<String>,
}

impl Response {
    pub fn new(http_code: u16, content: impl Into<Vec<u8>>) -> Self {
        Self {
            http_code,
            content: content.into(),
            headers: Vec::new(),
        }
    }

    pub fn http_code(&self) -> u16 {
        self.http_code
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// The body as text, replacing invalid UTF-8 sequences.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.content)
    }

    /// Raw header lines in the order they were received.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Value of the first `Name: value` line whose name matches
    /// case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter().find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.trim().eq_ignore_ascii_case(name).then(|| value.trim())
        })
    }

    pub fn add_header(&mut self, header: impl Into<String>) -> &mut Self {
        self.headers.push(header.into());
        self
    }

    pub fn is_successful(&self) -> bool {
        (200..300).contains(&self.http_code)
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::new(200, Vec::new())
    }
}
