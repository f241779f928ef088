//! Request body encoding.
//!
//! # Design
//! The first matching rule decides the body:
//! 1. non-empty raw content is sent untouched;
//! 2. any file entry makes the body `multipart/form-data`, files first, then
//!    post fields as plain parts; a field sharing a file's name takes that
//!    file's place, so each name appears once;
//! 3. post fields alone are sent `application/x-www-form-urlencoded`;
//! 4. otherwise there is no body.
//!
//! Multipart framing is left to the transport; this module only decides the
//! parts and sniffs each file's MIME type from its leading bytes.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use url::form_urlencoded;

use crate::error::BodyError;
use crate::request::Request;

pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";
pub const MULTIPART_FORM_DATA: &str = "multipart/form-data";

/// Bytes read from an upload file for MIME sniffing.
const SNIFF_LEN: u64 = 8192;

/// An encoded request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBody {
    Raw(Vec<u8>),
    /// Already URL-encoded `name=value&...`.
    Form(String),
    Multipart(Vec<Part>),
}

impl RequestBody {
    /// The content type implied by the encoding. Raw bodies carry whatever
    /// the caller put in the request headers.
    pub fn content_type(&self) -> Option<&'static str> {
        match self {
            RequestBody::Raw(_) => None,
            RequestBody::Form(_) => Some(FORM_URLENCODED),
            RequestBody::Multipart(_) => Some(MULTIPART_FORM_DATA),
        }
    }
}

/// One part of a multipart body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    Field {
        name: String,
        value: String,
    },
    File {
        name: String,
        path: PathBuf,
        content_type: String,
        filename: String,
    },
}

impl Part {
    pub fn name(&self) -> &str {
        match self {
            Part::Field { name, .. } | Part::File { name, .. } => name,
        }
    }
}

/// Chooses and builds the body for `request`.
pub fn encode(request: &Request) -> Result<Option<RequestBody>, BodyError> {
    if !request.raw_content().is_empty() {
        return Ok(Some(RequestBody::Raw(request.raw_content().to_vec())));
    }

    if !request.files().is_empty() {
        let mut parts = Vec::with_capacity(request.files().len() + request.post_fields().len());
        for (name, path) in request.files() {
            parts.push(Part::File {
                name: name.clone(),
                path: path.clone(),
                content_type: sniff_mime_type(path)?.to_string(),
                filename: base_name(path),
            });
        }
        // A field named like a file replaces that file's part in place.
        for (name, value) in request.post_fields() {
            let field = Part::Field {
                name: name.clone(),
                value: value.clone(),
            };
            match parts.iter_mut().find(|part| part.name() == name) {
                Some(existing) => *existing = field,
                None => parts.push(field),
            }
        }
        return Ok(Some(RequestBody::Multipart(parts)));
    }

    if !request.post_fields().is_empty() {
        return Ok(Some(RequestBody::Form(form_encode(request.post_fields()))));
    }

    Ok(None)
}

/// `name=value` pairs joined by `&`, spaces as `+`.
pub fn form_encode(fields: &[(String, String)]) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(fields)
        .finish()
}

fn base_name(path: &Path) -> String {
    match path.file_name() {
        Some(name) => name.to_string_lossy().into_owned(),
        None => path.to_string_lossy().into_owned(),
    }
}

/// MIME type from file content. The extension only refines plain text.
pub fn sniff_mime_type(path: &Path) -> Result<&'static str, BodyError> {
    let unreadable = |source| BodyError::UnreadableFile {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(unreadable)?;
    let mut head = Vec::new();
    file.take(SNIFF_LEN).read_to_end(&mut head).map_err(unreadable)?;
    Ok(match mime_type_of(&head) {
        "text/plain" => text_subtype(path).unwrap_or("text/plain"),
        other => other,
    })
}

/// Structured text formats magic bytes cannot tell apart from plain text.
fn text_subtype(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "json" => Some("application/json"),
        "xml" => Some("text/xml"),
        "html" | "htm" => Some("text/html"),
        "csv" => Some("text/csv"),
        _ => None,
    }
}

fn mime_type_of(head: &[u8]) -> &'static str {
    if head.is_empty() {
        return "application/x-empty";
    }
    if let Some(kind) = infer::get(head) {
        return kind.mime_type();
    }
    if looks_like_text(head) {
        "text/plain"
    } else {
        "application/octet-stream"
    }
}

fn looks_like_text(head: &[u8]) -> bool {
    if head.contains(&0) {
        return false;
    }
    match std::str::from_utf8(head) {
        Ok(_) => true,
        // A multi-byte character cut off by the sniff window is still text.
        Err(err) => err.error_len().is_none(),
    }
}
