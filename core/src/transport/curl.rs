use std::io::{self, Write};

use curl::easy::{Easy, Form, List};

use super::Transport;
use crate::body::{Part, RequestBody};
use crate::error::TransportError;
use crate::options::{OptionValue, TransferOptions};

/// libcurl-backed transport.
///
/// Each call gets its own easy handle, dropped before `perform` returns, so
/// no connection or handle state outlives a transfer. The cookie jar named in
/// the options is written when the handle is dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct CurlTransport;

impl CurlTransport {
    pub fn new() -> Self {
        Self
    }
}

impl Transport for CurlTransport {
    fn perform(&mut self, options: &TransferOptions) -> Result<Vec<u8>, TransportError> {
        let mut easy = Easy::new();
        let mut capture = true;
        for value in options.iter() {
            if let OptionValue::ReturnTransfer(enabled) = value {
                capture = *enabled;
            } else {
                apply(&mut easy, value)?;
            }
        }

        let mut raw = Vec::new();
        {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| {
                if capture {
                    raw.extend_from_slice(data);
                } else if io::stdout().write_all(data).is_err() {
                    // Short count makes libcurl abort with a write error.
                    return Ok(0);
                }
                Ok(data.len())
            })?;
            transfer.perform()?;
        }
        Ok(raw)
    }
}

fn apply(easy: &mut Easy, value: &OptionValue) -> Result<(), TransportError> {
    match value {
        OptionValue::Url(url) => easy.url(url)?,
        OptionValue::CustomRequest(method) => {
            easy.custom_request(method)?;
            if method.eq_ignore_ascii_case("HEAD") {
                easy.nobody(true)?;
            }
        }
        OptionValue::HttpHeader(lines) => {
            let mut list = List::new();
            for line in lines {
                list.append(line)?;
            }
            easy.http_headers(list)?;
        }
        OptionValue::Header(enabled) => easy.show_header(*enabled)?,
        OptionValue::ReturnTransfer(_) => {}
        OptionValue::FollowLocation(enabled) => easy.follow_location(*enabled)?,
        OptionValue::SslVerifyPeer(enabled) => easy.ssl_verify_peer(*enabled)?,
        OptionValue::SslVerifyHost(enabled) => easy.ssl_verify_host(*enabled)?,
        OptionValue::ConnectTimeout(timeout) => easy.connect_timeout(*timeout)?,
        OptionValue::Timeout(timeout) => easy.timeout(*timeout)?,
        OptionValue::CookieJar(path) => easy.cookie_jar(path)?,
        OptionValue::CookieFile(path) => easy.cookie_file(path)?,
        OptionValue::AcceptEncoding(encoding) => easy.accept_encoding(encoding)?,
        OptionValue::PostFields(body) => apply_body(easy, body)?,
        OptionValue::CaInfo(path) => easy.cainfo(path)?,
        OptionValue::SslCert(path) => easy.ssl_cert(path)?,
        OptionValue::SslCertPasswd(password) => easy.key_password(password)?,
        OptionValue::SslCertType(cert_type) => easy.ssl_cert_type(cert_type)?,
        OptionValue::SslKey(path) => easy.ssl_key(path)?,
        OptionValue::UserAgent(agent) => easy.useragent(agent)?,
        OptionValue::Verbose(enabled) => easy.verbose(*enabled)?,
    }
    Ok(())
}

fn apply_body(easy: &mut Easy, body: &RequestBody) -> Result<(), TransportError> {
    match body {
        RequestBody::Raw(bytes) => easy.post_fields_copy(bytes)?,
        // libcurl sends POSTFIELDS as application/x-www-form-urlencoded
        // unless the caller supplied a Content-Type header.
        RequestBody::Form(encoded) => easy.post_fields_copy(encoded.as_bytes())?,
        RequestBody::Multipart(parts) => {
            let mut form = Form::new();
            for part in parts {
                match part {
                    Part::Field { name, value } => form.part(name).contents(value.as_bytes()).add()?,
                    Part::File {
                        name,
                        path,
                        content_type,
                        filename,
                    } => form
                        .part(name)
                        .file(path)
                        .content_type(content_type)
                        .filename(filename)
                        .add()?,
                }
            }
            easy.httppost(form)?;
        }
    }
    Ok(())
}
