//! Test double for code that depends on `HttpClient`.

use std::fmt;

use crate::client::HttpClient;
use crate::request::Request;
use crate::response::Response;

type ResponseHandler = Box<dyn FnMut(&Request) -> Response>;

/// An `HttpClient` that never touches a transport.
///
/// With no handler set every request gets `Response::default()`; otherwise
/// the handler's response is returned as is.
#[derive(Default)]
pub struct FakeClient {
    response_handler: Option<ResponseHandler>,
}

impl FakeClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_response_handler<F>(&mut self, handler: F) -> &mut Self
    where
        F: FnMut(&Request) -> Response + 'static,
    {
        self.response_handler = Some(Box::new(handler));
        self
    }
}

impl fmt::Debug for FakeClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FakeClient")
            .field("has_response_handler", &self.response_handler.is_some())
            .finish()
    }
}

impl HttpClient for FakeClient {
    fn send(&mut self, request: &Request) -> Response {
        match self.response_handler.as_mut() {
            Some(handler) => handler(request),
            None => Response::default(),
        }
    }
}
