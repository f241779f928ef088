//! Request → transport → response orchestration.
//!
//! # Design
//! `Client` owns a `Transport` and a cookie jar file. For each call it builds
//! a `TransferOptions` record in two layers (required options derived from
//! the request, then caller overrides), hands it to the transport and parses
//! the raw output. `send` never fails: every error becomes a `Response` with
//! code 0 and the error text as content. `try_send` keeps the typed error.
//!
//! The cookie jar is a temp file created with the client and removed when it
//! is dropped or closed. It is both read and written on every transfer, so
//! cookies persist across calls on one client but not across clients.
//! `send` takes `&mut self`, which keeps calls on one client sequential.

use std::io;
use std::path::Path;

use tempfile::TempPath;
use tracing::{debug, warn};

use crate::body;
use crate::error::Error;
use crate::options::{OptionValue, TransferOptions};
use crate::parse::parse_raw;
use crate::request::Request;
use crate::response::Response;
use crate::transport::{CurlTransport, Transport};

/// File name prefix of the per-client cookie jar.
pub const COOKIE_FILE_PREFIX: &str = "http-client-cookies-";

/// Anything that can answer a `Request`.
pub trait HttpClient {
    /// Sends `request`. Failures are reported in-band as a response with
    /// code 0.
    fn send(&mut self, request: &Request) -> Response;
}

/// HTTP client over a pluggable transport, libcurl by default.
#[derive(Debug)]
pub struct Client<T = CurlTransport> {
    transport: T,
    overrides: TransferOptions,
    cookie_jar: TempPath,
}

impl Client<CurlTransport> {
    pub fn new() -> Result<Self, Error> {
        Self::with_transport(CurlTransport::new())
    }
}

impl<T: Transport> Client<T> {
    pub fn with_transport(transport: T) -> Result<Self, Error> {
        let cookie_jar = tempfile::Builder::new()
            .prefix(COOKIE_FILE_PREFIX)
            .tempfile()
            .map_err(Error::CookieJar)?
            .into_temp_path();
        debug!(path = %cookie_jar.display(), "created cookie jar");
        Ok(Self {
            transport,
            overrides: TransferOptions::new(),
            cookie_jar,
        })
    }

    /// Registers a transport option applied after the client's own options.
    ///
    /// Overriding an option the client manages (see `OptionKey::is_managed`)
    /// is honoured but logged as a warning.
    pub fn set_option(&mut self, value: OptionValue) -> &mut Self {
        let key = value.key();
        if key.is_managed() {
            warn!(
                option = key.name(),
                "option is used internally by the client; setting it manually may lead to unexpected results"
            );
        }
        self.overrides.set(value);
        self
    }

    pub fn cookie_file(&self) -> &Path {
        &self.cookie_jar
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// The full option record a transfer of `request` would use.
    pub fn transfer_options(&self, request: &Request) -> Result<TransferOptions, Error> {
        let mut options = TransferOptions::defaults();
        options
            .set(OptionValue::Url(request.url().to_string()))
            .set(OptionValue::CustomRequest(request.method().to_string()))
            .set(OptionValue::HttpHeader(request.headers().to_vec()))
            .set(OptionValue::CookieJar(self.cookie_jar.to_path_buf()))
            .set(OptionValue::CookieFile(self.cookie_jar.to_path_buf()));

        if let Some(body) = body::encode(request)? {
            options.set(OptionValue::PostFields(body));
        }

        if let Some(path) = request.ca_certificate() {
            options.set(OptionValue::CaInfo(path.to_path_buf()));
        }
        if let Some(path) = request.client_certificate() {
            options.set(OptionValue::SslCert(path.to_path_buf()));
        }
        if let Some(password) = request.client_certificate_password() {
            options.set(OptionValue::SslCertPasswd(password.to_string()));
        }
        if let Some(cert_type) = request.client_certificate_type() {
            options.set(OptionValue::SslCertType(cert_type.to_string()));
        }
        if let Some(path) = request.client_key() {
            options.set(OptionValue::SslKey(path.to_path_buf()));
        }

        options.merge(&self.overrides);
        Ok(options)
    }

    /// Like `send`, but returns the failure instead of a code 0 response.
    pub fn try_send(&mut self, request: &Request) -> Result<Response, Error> {
        let options = self.transfer_options(request)?;
        debug!(method = request.method(), url = %request.url(), "sending request");
        let raw = self.transport.perform(&options)?;
        let response = parse_raw(&raw)?;
        debug!(status = response.http_code(), "received response");
        Ok(response)
    }

    /// Removes the cookie jar now, reporting failure. Dropping the client
    /// does the same silently.
    pub fn close(self) -> Result<(), Error> {
        match self.cookie_jar.close() {
            Err(err) if err.kind() != io::ErrorKind::NotFound => Err(Error::CookieJar(err)),
            _ => Ok(()),
        }
    }
}

impl<T: Transport> HttpClient for Client<T> {
    fn send(&mut self, request: &Request) -> Response {
        match self.try_send(request) {
            Ok(response) => response,
            Err(err) => {
                match &err {
                    Error::Transport(_) => debug!(url = %request.url(), error = %err, "transfer failed"),
                    _ => warn!(url = %request.url(), error = %err, "request failed"),
                }
                Response::new(0, err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use url::{form_urlencoded, Url};

    use super::*;
    use crate::body::{Part, RequestBody};
    use crate::error::{ParseError, TransportError};
    use crate::options::OptionKey;
    use crate::transport::FakeTransport;

    /// Answers like a tiny server on example.com; every other host refuses.
    fn example_com(options: &TransferOptions) -> Result<Vec<u8>, TransportError> {
        let url = Url::parse(options.url().unwrap_or_default()).unwrap();
        let host = url.host_str().unwrap_or_default();
        if host != "example.com" {
            return Err(TransportError::new(format!("Failed to connect to {host}: Connection refused")));
        }

        let mut lines: Vec<String> = Vec::new();
        let (code, headers, text) = match url.path() {
            "/" => (200, Vec::new(), "Hello World!"),
            "/continue" => {
                lines.push("HTTP/1.1 100 Continue".to_string());
                lines.push(String::new());
                (200, Vec::new(), "Hello World!")
            }
            "/response-header" => {
                let header = form_urlencoded::parse(url.query().unwrap_or_default().as_bytes())
                    .map(|(key, _)| key.into_owned())
                    .collect::<Vec<_>>();
                (200, header, "Hello World!")
            }
            _ => (404, Vec::new(), "Not found"),
        };
        lines.push(format!("HTTP/1.1 {code} Ok"));
        lines.extend(headers);
        lines.push(String::new());
        lines.push(text.to_string());
        Ok(lines.join("\r\n").into_bytes())
    }

    fn client() -> Client<FakeTransport> {
        Client::with_transport(FakeTransport::with_responder(example_com)).unwrap()
    }

    fn request(url: &str) -> Request {
        Request::new(Url::parse(url).unwrap())
    }

    fn last(client: &Client<FakeTransport>) -> &TransferOptions {
        client.transport().last_transfer().unwrap()
    }

    #[test]
    fn ok_response() {
        let mut client = client();
        let mut req = request("https://example.com/");
        req.add_header("X-Test-Header: Foo Bar");
        let response = client.send(&req);

        assert_eq!(response.http_code(), 200);
        assert!(response.is_successful());
        assert!(response.headers().is_empty());
        assert_eq!(response.text(), "Hello World!");

        let options = last(&client);
        assert_eq!(options.url(), Some("https://example.com/"));
        assert_eq!(options.method(), Some("GET"));
        assert_eq!(options.http_headers(), ["X-Test-Header: Foo Bar"]);
        assert!(options.body().is_none());
    }

    #[test]
    fn required_options_are_set() {
        let mut client = client();
        client.send(&request("https://example.com/"));
        let options = last(&client);
        assert_eq!(
            options.get(OptionKey::ConnectTimeout),
            Some(&OptionValue::ConnectTimeout(Duration::from_secs(30)))
        );
        assert_eq!(
            options.get(OptionKey::FollowLocation),
            Some(&OptionValue::FollowLocation(false))
        );
        assert_eq!(
            options.get(OptionKey::SslVerifyPeer),
            Some(&OptionValue::SslVerifyPeer(true))
        );
        assert_eq!(
            options.get(OptionKey::SslVerifyHost),
            Some(&OptionValue::SslVerifyHost(true))
        );
        assert!(!options.contains(OptionKey::CaInfo));
        assert!(!options.contains(OptionKey::SslCert));
    }

    #[test]
    fn continue_response() {
        let mut client = client();
        let response = client.send(&request("https://example.com/continue"));
        assert_eq!(response, Response::new(200, "Hello World!"));
        assert_eq!(last(&client).url(), Some("https://example.com/continue"));
    }

    #[test]
    fn failed_connection_response() {
        let mut client = client();
        let response = client.send(&request("https://localhost/"));

        assert_eq!(response.http_code(), 0);
        assert!(!response.is_successful());
        assert!(response.headers().is_empty());
        assert_eq!(response.text(), "Failed to connect to localhost: Connection refused");
        assert_eq!(last(&client).url(), Some("https://localhost/"));
        assert!(last(&client).http_headers().is_empty());
    }

    #[test]
    fn connection_refused_sentinel() {
        let transport = FakeTransport::with_responder(|_| Err(TransportError::new("Connection refused")));
        let mut client = Client::with_transport(transport).unwrap();
        let response = client.send(&request("https://example.com/"));
        assert_eq!(response, Response::new(0, "Connection refused"));
    }

    #[test]
    fn not_found_response() {
        let mut client = client();
        let response = client.send(&request("https://example.com/notfound"));
        assert_eq!(response.http_code(), 404);
        assert!(!response.is_successful());
        assert_eq!(response.text(), "Not found");
    }

    #[test]
    fn post_request() {
        let mut client = client();
        let mut req = Request::with_method(Url::parse("https://example.com/").unwrap(), "POST");
        req.set_post_field("Foo", "Bar");
        let response = client.send(&req);

        assert_eq!(response.text(), "Hello World!");
        let options = last(&client);
        assert_eq!(options.method(), Some("POST"));
        assert_eq!(options.body(), Some(&RequestBody::Form("Foo=Bar".to_string())));
        assert_eq!(
            options.body().and_then(RequestBody::content_type),
            Some("application/x-www-form-urlencoded")
        );
    }

    #[test]
    fn post_request_with_files() {
        let mut file = tempfile::Builder::new()
            .prefix("hello-world")
            .suffix(".txt")
            .tempfile()
            .unwrap();
        file.write_all(b"Hello World!").unwrap();

        let mut client = client();
        let mut req = Request::with_method(Url::parse("https://example.com/").unwrap(), "POST");
        req.set_post_field("Bar", "Baz").set_file("Foo", file.path());
        let response = client.send(&req);
        assert!(response.is_successful());

        let Some(RequestBody::Multipart(parts)) = last(&client).body() else {
            panic!("expected a multipart body");
        };
        assert_eq!(parts.len(), 2);
        match &parts[0] {
            Part::File {
                name,
                path,
                content_type,
                filename,
            } => {
                assert_eq!(name, "Foo");
                assert_eq!(path, file.path());
                assert_eq!(content_type, "text/plain");
                assert!(filename.starts_with("hello-world") && filename.ends_with(".txt"));
            }
            other => panic!("expected a file part, got {other:?}"),
        }
        assert_eq!(parts[1].name(), "Bar");
    }

    #[test]
    fn unreadable_upload_file_skips_the_transfer() {
        let mut client = client();
        let mut req = Request::with_method(Url::parse("https://example.com/").unwrap(), "POST");
        req.set_file("Foo", "/definitely/not/here.txt");
        let response = client.send(&req);

        assert_eq!(response.http_code(), 0);
        assert!(response.text().starts_with("failed to read upload file"));
        assert!(client.transport().transfers().is_empty());
    }

    #[test]
    fn response_header() {
        let mut client = client();
        let response = client.send(&request("https://example.com/response-header?X-Test-Header%3A+Foo"));
        assert_eq!(response.http_code(), 200);
        assert_eq!(response.headers(), ["X-Test-Header: Foo"]);
        assert_eq!(response.text(), "Hello World!");
    }

    #[test]
    fn raw_content() {
        let mut client = client();
        let mut req = Request::with_method(Url::parse("https://example.com/").unwrap(), "PUT");
        req.add_header("Content-Type: application/json")
            .set_raw_content("{\"Foo\": \"Bar\"}");
        client.send(&req);

        let options = last(&client);
        assert_eq!(options.method(), Some("PUT"));
        assert_eq!(options.http_headers(), ["Content-Type: application/json"]);
        assert_eq!(
            options.body(),
            Some(&RequestBody::Raw(b"{\"Foo\": \"Bar\"}".to_vec()))
        );
    }

    #[test]
    fn client_certificates() {
        let mut client = client();
        let mut req = request("https://example.com/");
        req.set_ca_certificate("/certs/cacert.pem")
            .set_client_certificate("/certs/cert.pem")
            .set_client_certificate_password("FooBar")
            .set_client_certificate_type("PEM")
            .set_client_key("/certs/key.pem");
        assert!(client.send(&req).is_successful());

        let options = last(&client);
        assert_eq!(
            options.get(OptionKey::CaInfo),
            Some(&OptionValue::CaInfo(PathBuf::from("/certs/cacert.pem")))
        );
        assert_eq!(
            options.get(OptionKey::SslCert),
            Some(&OptionValue::SslCert(PathBuf::from("/certs/cert.pem")))
        );
        assert_eq!(
            options.get(OptionKey::SslCertPasswd),
            Some(&OptionValue::SslCertPasswd("FooBar".to_string()))
        );
        assert_eq!(
            options.get(OptionKey::SslCertType),
            Some(&OptionValue::SslCertType("PEM".to_string()))
        );
        assert_eq!(
            options.get(OptionKey::SslKey),
            Some(&OptionValue::SslKey(PathBuf::from("/certs/key.pem")))
        );
    }

    #[test]
    fn overridden_options() {
        let mut client = client();
        client.set_option(OptionValue::Timeout(Duration::from_secs(123)));
        let mut req = request("https://example.com/");
        req.add_header("X-Test-Header: Foo Bar");
        assert!(client.send(&req).is_successful());

        let options = last(&client);
        assert_eq!(options.url(), Some("https://example.com/"));
        assert_eq!(options.http_headers(), ["X-Test-Header: Foo Bar"]);
        assert_eq!(
            options.get(OptionKey::Timeout),
            Some(&OptionValue::Timeout(Duration::from_secs(123)))
        );
    }

    #[test]
    fn managed_override_is_still_applied() {
        let mut client = client();
        client
            .set_option(OptionValue::Url("https://example.com/notfound".to_string()))
            .set_option(OptionValue::SslVerifyPeer(false));
        let response = client.send(&request("https://example.com/"));

        assert_eq!(response.http_code(), 404);
        assert_eq!(last(&client).url(), Some("https://example.com/notfound"));
        assert_eq!(
            last(&client).get(OptionKey::SslVerifyPeer),
            Some(&OptionValue::SslVerifyPeer(false))
        );
    }

    /// Log output shared between a test and the subscriber writing to it.
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().write(buf)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    /// Runs `f` under a warn-level subscriber and returns what it logged.
    fn warnings_from(f: impl FnOnce()) -> String {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::WARN)
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        let bytes = captured.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn managed_override_logs_a_warning() {
        let logs = warnings_from(|| {
            client().set_option(OptionValue::Url("https://example.com/notfound".to_string()));
        });
        assert!(logs.contains("WARN"), "{logs}");
        assert!(logs.contains("URL"), "{logs}");
        assert!(logs.contains("used internally by the client"), "{logs}");
    }

    #[test]
    fn unmanaged_override_is_silent() {
        let logs = warnings_from(|| {
            client().set_option(OptionValue::Timeout(Duration::from_secs(123)));
        });
        assert!(logs.is_empty(), "{logs}");
    }

    #[test]
    fn malformed_response_is_never_successful() {
        let transport = FakeTransport::with_responder(|_| Ok(b"garbage".to_vec()));
        let mut client = Client::with_transport(transport).unwrap();
        let req = request("https://example.com/");

        let err = client.try_send(&req).unwrap_err();
        assert!(matches!(err, Error::Parse(ParseError::InvalidStatusLine(_))));

        let response = client.send(&req);
        assert_eq!(response.http_code(), 0);
        assert!(!response.is_successful());
        assert!(response.text().starts_with("malformed response"));
    }

    #[test]
    fn cookie_jar_is_shared_by_every_transfer() {
        let mut client = client();
        let jar = client.cookie_file().to_path_buf();
        assert!(jar.exists());
        assert!(jar
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with(COOKIE_FILE_PREFIX));

        client.send(&request("https://example.com/"));
        client.send(&request("https://example.com/notfound"));
        for options in client.transport().transfers() {
            assert_eq!(options.get(OptionKey::CookieJar), Some(&OptionValue::CookieJar(jar.clone())));
            assert_eq!(options.get(OptionKey::CookieFile), Some(&OptionValue::CookieFile(jar.clone())));
        }
    }

    #[test]
    fn clients_have_separate_cookie_jars() {
        let first = client();
        let second = client();
        assert_ne!(first.cookie_file(), second.cookie_file());
    }

    #[test]
    fn drop_removes_cookie_jar() {
        let client = client();
        let jar = client.cookie_file().to_path_buf();
        drop(client);
        assert!(!jar.exists());
    }

    #[test]
    fn close_removes_cookie_jar() {
        let client = client();
        let jar = client.cookie_file().to_path_buf();
        client.close().unwrap();
        assert!(!jar.exists());
    }

    #[test]
    fn close_tolerates_already_removed_jar() {
        let client = client();
        std::fs::remove_file(client.cookie_file()).unwrap();
        client.close().unwrap();
    }
}
