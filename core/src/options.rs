//! Transfer options handed to a `Transport`.
//!
//! # Design
//! A transfer is described by a key→value record rather than by calls on a
//! live handle. The client builds it in two layers: the options it needs for
//! correct behavior (defaults plus values derived from the `Request`), then
//! any caller overrides, which win. Keys the client manages itself are
//! reported by `OptionKey::is_managed` so overriding them can be flagged.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::body::RequestBody;

/// Connect timeout applied to every transfer.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Well-known transport options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OptionKey {
    Url,
    CustomRequest,
    HttpHeader,
    /// Include response header blocks in the captured output.
    Header,
    /// Capture the transfer output instead of forwarding it.
    ReturnTransfer,
    FollowLocation,
    SslVerifyPeer,
    SslVerifyHost,
    ConnectTimeout,
    Timeout,
    CookieJar,
    CookieFile,
    AcceptEncoding,
    PostFields,
    CaInfo,
    SslCert,
    SslCertPasswd,
    SslCertType,
    SslKey,
    UserAgent,
    Verbose,
}

impl OptionKey {
    /// Options the client sets from the request or its own state. Overriding
    /// them may break request encoding, response parsing, or cookies.
    pub fn is_managed(self) -> bool {
        matches!(
            self,
            OptionKey::CaInfo
                | OptionKey::CookieFile
                | OptionKey::CookieJar
                | OptionKey::CustomRequest
                | OptionKey::Header
                | OptionKey::HttpHeader
                | OptionKey::PostFields
                | OptionKey::ReturnTransfer
                | OptionKey::SslCert
                | OptionKey::SslCertPasswd
                | OptionKey::SslCertType
                | OptionKey::SslKey
                | OptionKey::Url
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            OptionKey::Url => "URL",
            OptionKey::CustomRequest => "CUSTOMREQUEST",
            OptionKey::HttpHeader => "HTTPHEADER",
            OptionKey::Header => "HEADER",
            OptionKey::ReturnTransfer => "RETURNTRANSFER",
            OptionKey::FollowLocation => "FOLLOWLOCATION",
            OptionKey::SslVerifyPeer => "SSL_VERIFYPEER",
            OptionKey::SslVerifyHost => "SSL_VERIFYHOST",
            OptionKey::ConnectTimeout => "CONNECTTIMEOUT",
            OptionKey::Timeout => "TIMEOUT",
            OptionKey::CookieJar => "COOKIEJAR",
            OptionKey::CookieFile => "COOKIEFILE",
            OptionKey::AcceptEncoding => "ENCODING",
            OptionKey::PostFields => "POSTFIELDS",
            OptionKey::CaInfo => "CAINFO",
            OptionKey::SslCert => "SSLCERT",
            OptionKey::SslCertPasswd => "SSLCERTPASSWD",
            OptionKey::SslCertType => "SSLCERTTYPE",
            OptionKey::SslKey => "SSLKEY",
            OptionKey::UserAgent => "USERAGENT",
            OptionKey::Verbose => "VERBOSE",
        }
    }
}

/// A typed option value. Each variant belongs to exactly one `OptionKey`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    Url(String),
    CustomRequest(String),
    HttpHeader(Vec<String>),
    Header(bool),
    ReturnTransfer(bool),
    FollowLocation(bool),
    SslVerifyPeer(bool),
    SslVerifyHost(bool),
    ConnectTimeout(Duration),
    Timeout(Duration),
    CookieJar(PathBuf),
    CookieFile(PathBuf),
    /// Empty string means every encoding the transport supports.
    AcceptEncoding(String),
    PostFields(RequestBody),
    CaInfo(PathBuf),
    SslCert(PathBuf),
    SslCertPasswd(String),
    SslCertType(String),
    SslKey(PathBuf),
    UserAgent(String),
    Verbose(bool),
}

impl OptionValue {
    pub fn key(&self) -> OptionKey {
        match self {
            OptionValue::Url(_) => OptionKey::Url,
            OptionValue::CustomRequest(_) => OptionKey::CustomRequest,
            OptionValue::HttpHeader(_) => OptionKey::HttpHeader,
            OptionValue::Header(_) => OptionKey::Header,
            OptionValue::ReturnTransfer(_) => OptionKey::ReturnTransfer,
            OptionValue::FollowLocation(_) => OptionKey::FollowLocation,
            OptionValue::SslVerifyPeer(_) => OptionKey::SslVerifyPeer,
            OptionValue::SslVerifyHost(_) => OptionKey::SslVerifyHost,
            OptionValue::ConnectTimeout(_) => OptionKey::ConnectTimeout,
            OptionValue::Timeout(_) => OptionKey::Timeout,
            OptionValue::CookieJar(_) => OptionKey::CookieJar,
            OptionValue::CookieFile(_) => OptionKey::CookieFile,
            OptionValue::AcceptEncoding(_) => OptionKey::AcceptEncoding,
            OptionValue::PostFields(_) => OptionKey::PostFields,
            OptionValue::CaInfo(_) => OptionKey::CaInfo,
            OptionValue::SslCert(_) => OptionKey::SslCert,
            OptionValue::SslCertPasswd(_) => OptionKey::SslCertPasswd,
            OptionValue::SslCertType(_) => OptionKey::SslCertType,
            OptionValue::SslKey(_) => OptionKey::SslKey,
            OptionValue::UserAgent(_) => OptionKey::UserAgent,
            OptionValue::Verbose(_) => OptionKey::Verbose,
        }
    }
}

/// Option record for one transfer, at most one value per key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferOptions {
    values: BTreeMap<OptionKey, OptionValue>,
}

impl TransferOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options every transfer starts from: capture headers and body, no
    /// redirects, verified TLS, fixed connect timeout, any content encoding.
    pub fn defaults() -> Self {
        let mut options = Self::new();
        options
            .set(OptionValue::ReturnTransfer(true))
            .set(OptionValue::Header(true))
            .set(OptionValue::FollowLocation(false))
            .set(OptionValue::SslVerifyPeer(true))
            .set(OptionValue::SslVerifyHost(true))
            .set(OptionValue::ConnectTimeout(CONNECT_TIMEOUT))
            .set(OptionValue::AcceptEncoding(String::new()));
        options
    }

    /// Sets a value, replacing any earlier value for the same key.
    pub fn set(&mut self, value: OptionValue) -> &mut Self {
        self.values.insert(value.key(), value);
        self
    }

    pub fn get(&self, key: OptionKey) -> Option<&OptionValue> {
        self.values.get(&key)
    }

    pub fn contains(&self, key: OptionKey) -> bool {
        self.values.contains_key(&key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &OptionValue> {
        self.values.values()
    }

    /// Layers `other` on top of `self`; values in `other` win.
    pub fn merge(&mut self, other: &TransferOptions) -> &mut Self {
        for value in other.iter() {
            self.set(value.clone());
        }
        self
    }

    pub fn url(&self) -> Option<&str> {
        match self.get(OptionKey::Url) {
            Some(OptionValue::Url(url)) => Some(url),
            _ => None,
        }
    }

    pub fn method(&self) -> Option<&str> {
        match self.get(OptionKey::CustomRequest) {
            Some(OptionValue::CustomRequest(method)) => Some(method),
            _ => None,
        }
    }

    pub fn http_headers(&self) -> &[String] {
        match self.get(OptionKey::HttpHeader) {
            Some(OptionValue::HttpHeader(headers)) => headers,
            _ => &[],
        }
    }

    pub fn body(&self) -> Option<&RequestBody> {
        match self.get(OptionKey::PostFields) {
            Some(OptionValue::PostFields(body)) => Some(body),
            _ => None,
        }
    }
}
