use std::fmt;

use super::Transport;
use crate::error::TransportError;
use crate::options::TransferOptions;

type Responder = Box<dyn FnMut(&TransferOptions) -> Result<Vec<u8>, TransportError>>;

/// In-memory transport for tests.
///
/// Records every option record it is asked to perform and answers through a
/// responder closure. Without one it answers `HTTP/1.1 200 OK` with no body.
pub struct FakeTransport {
    responder: Responder,
    transfers: Vec<TransferOptions>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::with_responder(|_| Ok(b"HTTP/1.1 200 OK\r\n\r\n".to_vec()))
    }

    pub fn with_responder<F>(responder: F) -> Self
    where
        F: FnMut(&TransferOptions) -> Result<Vec<u8>, TransportError> + 'static,
    {
        Self {
            responder: Box::new(responder),
            transfers: Vec::new(),
        }
    }

    /// Every option record performed so far, oldest first.
    pub fn transfers(&self) -> &[TransferOptions] {
        &self.transfers
    }

    pub fn last_transfer(&self) -> Option<&TransferOptions> {
        self.transfers.last()
    }
}

impl Default for FakeTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FakeTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FakeTransport")
            .field("transfers", &self.transfers.len())
            .finish_non_exhaustive()
    }
}

impl Transport for FakeTransport {
    fn perform(&mut self, options: &TransferOptions) -> Result<Vec<u8>, TransportError> {
        self.transfers.push(options.clone());
        (self.responder)(options)
    }
}
