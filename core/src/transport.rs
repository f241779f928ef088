//! The network boundary.
//!
//! # Design
//! A `Transport` turns one `TransferOptions` record into the raw bytes of the
//! exchange (header blocks followed by the body) or a transport error. It
//! knows nothing about `Request` or `Response`; encoding and parsing stay in
//! the client, so a stub transport exercises the same code paths as libcurl.

mod curl;
mod fake;

pub use self::curl::CurlTransport;
pub use self::fake::FakeTransport;

use crate::error::TransportError;
use crate::options::TransferOptions;

/// Executes a single transfer.
pub trait Transport {
    /// Performs the transfer described by `options`.
    ///
    /// Returns the captured output on any HTTP exchange, whatever its status
    /// code. `Err` is reserved for transfers that never got a response.
    fn perform(&mut self, options: &TransferOptions) -> Result<Vec<u8>, TransportError>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn perform(&mut self, options: &TransferOptions) -> Result<Vec<u8>, TransportError> {
        (**self).perform(options)
    }
}
