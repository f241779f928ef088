//! Small synchronous HTTP client.
//!
//! # Overview
//! Callers describe a call as a `Request`, hand it to an `HttpClient` and get
//! a `Response` back. Failures never surface as errors from `send`: a call
//! that produced no HTTP exchange comes back as a response with code 0 and
//! the transport's diagnostic as content.
//!
//! # Design
//! - `Request` and `Response` are plain data.
//! - `Client` turns a request into a `TransferOptions` record, lets a
//!   `Transport` execute it, and parses the raw header blocks and body.
//! - `CurlTransport` is the real network transport; `FakeTransport` stubs the
//!   network while keeping encoding and parsing in play.
//! - `FakeClient` bypasses all of it for unit tests of calling code.

pub mod body;
pub mod client;
pub mod error;
pub mod fake;
pub mod options;
pub mod parse;
pub mod request;
pub mod response;
pub mod transport;

pub use body::{Part, RequestBody};
pub use client::{Client, HttpClient};
pub use error::{BodyError, Error, ParseError, TransportError};
pub use fake::FakeClient;
pub use options::{OptionKey, OptionValue, TransferOptions};
pub use parse::parse_raw;
pub use request::Request;
pub use response::Response;
pub use transport::{CurlTransport, FakeTransport, Transport};
pub use url::Url;
