//! httpbin-style echo server used as the remote end in end-to-end tests.
//!
//! Routes:
//! - `/anything`, `/anything/{*rest}`: echoes method, headers, query args,
//!   form fields, uploaded files and raw body as JSON.
//! - `/status/{code}`: empty response with the given status.
//! - `/response-headers?Name=value`: each query pair becomes a header.
//! - `/redirect-to?url=...`: `302` to `url`.
//! - `/cookies`: echoes the request cookies.
//! - `/cookies/set?name=value`: sets each pair as a cookie.

use std::collections::BTreeMap;

use axum::{
    body::Bytes,
    extract::{FromRequest, Multipart, Path, Query, Request},
    http::{
        header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE},
        HeaderMap, HeaderName, HeaderValue, StatusCode,
    },
    response::{IntoResponse, Response},
    routing::{any, get},
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

/// Everything the server saw of a request to `/anything`.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Echo {
    pub method: String,
    /// Header names are lowercase; repeated headers are joined with `, `.
    pub headers: BTreeMap<String, String>,
    pub args: BTreeMap<String, String>,
    pub form: BTreeMap<String, String>,
    pub files: BTreeMap<String, UploadedFile>,
    /// Body of requests that were neither form nor multipart.
    pub data: String,
    pub json: Option<serde_json::Value>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadedFile {
    pub filename: String,
    pub content_type: Option<String>,
    pub content: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Cookies {
    pub cookies: BTreeMap<String, String>,
}

pub fn app() -> Router {
    Router::new()
        .route("/anything", any(anything))
        .route("/anything/{*rest}", any(anything))
        .route("/status/{code}", any(status))
        .route("/response-headers", get(response_headers))
        .route("/redirect-to", get(redirect_to))
        .route("/cookies", get(cookies))
        .route("/cookies/set", get(set_cookies))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn anything(request: Request) -> Result<Json<Echo>, Response> {
    let (parts, body) = request.into_parts();
    let mut echo = Echo {
        method: parts.method.to_string(),
        headers: header_map(&parts.headers),
        args: Query::try_from_uri(&parts.uri)
            .map(|Query(args)| args)
            .unwrap_or_default(),
        ..Echo::default()
    };
    let content_type = parts
        .headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let request = Request::from_parts(parts, body);

    if content_type.starts_with("multipart/form-data") {
        let mut multipart = Multipart::from_request(request, &())
            .await
            .map_err(IntoResponse::into_response)?;
        while let Some(field) = multipart.next_field().await.map_err(IntoResponse::into_response)? {
            let name = field.name().unwrap_or_default().to_string();
            match field.file_name().map(str::to_string) {
                Some(filename) => {
                    let content_type = field.content_type().map(str::to_string);
                    let content = field.text().await.map_err(IntoResponse::into_response)?;
                    echo.files.insert(
                        name,
                        UploadedFile {
                            filename,
                            content_type,
                            content,
                        },
                    );
                }
                None => {
                    let value = field.text().await.map_err(IntoResponse::into_response)?;
                    echo.form.insert(name, value);
                }
            }
        }
    } else if content_type.starts_with("application/x-www-form-urlencoded") {
        let Form(form) = Form::<BTreeMap<String, String>>::from_request(request, &())
            .await
            .map_err(IntoResponse::into_response)?;
        echo.form = form;
    } else {
        let bytes = Bytes::from_request(request, &())
            .await
            .map_err(IntoResponse::into_response)?;
        echo.data = String::from_utf8_lossy(&bytes).into_owned();
        echo.json = serde_json::from_slice(&bytes).ok();
    }

    Ok(Json(echo))
}

async fn status(Path(code): Path<u16>) -> Response {
    match StatusCode::from_u16(code) {
        Ok(status) => status.into_response(),
        Err(_) => (StatusCode::BAD_REQUEST, "invalid status code").into_response(),
    }
}

async fn response_headers(Query(args): Query<BTreeMap<String, String>>) -> Response {
    let mut headers = HeaderMap::new();
    for (name, value) in &args {
        if let (Ok(name), Ok(value)) = (
            HeaderName::try_from(name.as_str()),
            HeaderValue::try_from(value.as_str()),
        ) {
            headers.append(name, value);
        }
    }
    (headers, Json(args)).into_response()
}

async fn redirect_to(Query(args): Query<BTreeMap<String, String>>) -> Response {
    let target = args.get("url").map(String::as_str).unwrap_or("/");
    match HeaderValue::try_from(target) {
        Ok(location) => (StatusCode::FOUND, [(LOCATION, location)]).into_response(),
        Err(_) => (StatusCode::BAD_REQUEST, "invalid redirect target").into_response(),
    }
}

async fn cookies(headers: HeaderMap) -> Json<Cookies> {
    Json(Cookies {
        cookies: request_cookies(&headers),
    })
}

async fn set_cookies(
    headers: HeaderMap,
    Query(args): Query<BTreeMap<String, String>>,
) -> Response {
    let mut cookies = request_cookies(&headers);
    let mut response_headers = HeaderMap::new();
    for (name, value) in args {
        if let Ok(header) = HeaderValue::try_from(format!("{name}={value}; Path=/")) {
            response_headers.append(SET_COOKIE, header);
            cookies.insert(name, value);
        }
    }
    (response_headers, Json(Cookies { cookies })).into_response()
}

fn header_map(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut map: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes());
        map.entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert_with(|| value.into_owned());
    }
    map
}

fn request_cookies(headers: &HeaderMap) -> BTreeMap<String, String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect()
}
