//! Outbound request description.
//!
//! # Design
//! `Request` is plain data: the client reads it, the transport never sees it.
//! Mutators return `&mut Self` so a request can be assembled in one chain.
//! The body sources are mutually exclusive: raw content on one side, post
//! fields and files on the other. Setting either side clears the other, so at
//! most one of them is ever non-empty.

use std::path::{Path, PathBuf};

use url::Url;

/// A single outbound HTTP call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    url: Url,
    method: String,
    headers: Vec<String>,
    post_fields: Vec<(String, String)>,
    files: Vec<(String, PathBuf)>,
    raw_content: Vec<u8>,
    ca_certificate: Option<PathBuf>,
    client_certificate: Option<PathBuf>,
    client_certificate_password: Option<String>,
    client_certificate_type: Option<String>,
    client_key: Option<PathBuf>,
}

impl Request {
    /// A `GET` request for `url`.
    pub fn new(url: Url) -> Self {
        Self::with_method(url, "GET")
    }

    pub fn with_method(url: Url, method: impl Into<String>) -> Self {
        Self {
            url,
            method: method.into(),
            headers: Vec::new(),
            post_fields: Vec::new(),
            files: Vec::new(),
            raw_content: Vec::new(),
            ca_certificate: None,
            client_certificate: None,
            client_certificate_password: None,
            client_certificate_type: None,
            client_key: None,
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    /// Raw header lines (`Name: value`) in insertion order.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn post_fields(&self) -> &[(String, String)] {
        &self.post_fields
    }

    pub fn files(&self) -> &[(String, PathBuf)] {
        &self.files
    }

    pub fn raw_content(&self) -> &[u8] {
        &self.raw_content
    }

    pub fn ca_certificate(&self) -> Option<&Path> {
        self.ca_certificate.as_deref()
    }

    pub fn client_certificate(&self) -> Option<&Path> {
        self.client_certificate.as_deref()
    }

    pub fn client_certificate_password(&self) -> Option<&str> {
        self.client_certificate_password.as_deref()
    }

    pub fn client_certificate_type(&self) -> Option<&str> {
        self.client_certificate_type.as_deref()
    }

    pub fn client_key(&self) -> Option<&Path> {
        self.client_key.as_deref()
    }

    /// Appends a raw header line. Duplicates are kept.
    pub fn add_header(&mut self, header: impl Into<String>) -> &mut Self {
        self.headers.push(header.into());
        self
    }

    /// Sets a form field, replacing an earlier value under the same name.
    /// Clears any raw content.
    pub fn set_post_field(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.raw_content.clear();
        upsert(&mut self.post_fields, name.into(), value.into());
        self
    }

    /// Sets a file to upload as a multipart part named `name`.
    /// Clears any raw content.
    pub fn set_file(&mut self, name: impl Into<String>, path: impl Into<PathBuf>) -> &mut Self {
        self.raw_content.clear();
        upsert(&mut self.files, name.into(), path.into());
        self
    }

    /// Sets the exact body bytes. Clears post fields and files.
    pub fn set_raw_content(&mut self, content: impl Into<Vec<u8>>) -> &mut Self {
        self.post_fields.clear();
        self.files.clear();
        self.raw_content = content.into();
        self
    }

    pub fn set_ca_certificate(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.ca_certificate = Some(path.into());
        self
    }

    pub fn set_client_certificate(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.client_certificate = Some(path.into());
        self
    }

    pub fn set_client_certificate_password(&mut self, password: impl Into<String>) -> &mut Self {
        self.client_certificate_password = Some(password.into());
        self
    }

    /// Certificate encoding understood by the transport, e.g. `PEM` or `P12`.
    pub fn set_client_certificate_type(&mut self, cert_type: impl Into<String>) -> &mut Self {
        self.client_certificate_type = Some(cert_type.into());
        self
    }

    pub fn set_client_key(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.client_key = Some(path.into());
        self
    }
}

/// Insert or replace by key, keeping the position of the first insertion.
fn upsert<V>(entries: &mut Vec<(String, V)>, name: String, value: V) {
    match entries.iter_mut().find(|(existing, _)| *existing == name) {
        Some(entry) => entry.1 = value,
        None => entries.push((name, value)),
    }
}
