use crate::types::HttpResponse;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{self, HeaderValue};
use hyper::{Method, Response, StatusCode};
use serde_json::Value;

pub fn build_response(
    body_text: String,
    status_code: StatusCode,
    content_type: &str,
) -> anyhow::Result<HttpResponse> {
    let mut r = Response::builder()
        .status(status_code)
        .body(Full::new(Bytes::from(body_text)))?;
    r.headers_mut()
        .insert(header::CONTENT_TYPE, content_type.parse()?);
    Ok(r)
}

/// Plain text response with the given status.
pub fn with_status(body_text: impl Into<String>, status_code: StatusCode) -> HttpResponse {
    let mut r = Response::new(Full::new(Bytes::from(body_text.into())));
    *r.status_mut() = status_code;
    r.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    r
}

pub fn text(body_text: impl Into<String>) -> HttpResponse {
    with_status(body_text, StatusCode::OK)
}

pub fn response_json(body_text: String, status_code: StatusCode) -> anyhow::Result<HttpResponse> {
    build_response(body_text, status_code, "application/json")
}

pub fn ok_json(v: Value) -> anyhow::Result<HttpResponse> {
    ret_json(StatusCode::OK, v)
}

pub fn ret_json(status_code: StatusCode, v: Value) -> anyhow::Result<HttpResponse> {
    response_json(v.to_string(), status_code)
}

pub fn not_found(path: &str) -> HttpResponse {
    with_status(format!("Not found: {}", path), StatusCode::NOT_FOUND)
}

pub fn method_not_allowed(method: &Method, allowed: &[Method]) -> HttpResponse {
    let mut r = with_status(
        format!("Method not allowed: {}", method),
        StatusCode::METHOD_NOT_ALLOWED,
    );
    let allow = allowed
        .iter()
        .map(Method::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    if let Ok(v) = HeaderValue::from_str(&allow) {
        r.headers_mut().insert(header::ALLOW, v);
    }
    r
}

pub fn internal_server_error(error: &anyhow::Error) -> HttpResponse {
    with_status(
        format!("Error: {}", error),
        StatusCode::INTERNAL_SERVER_ERROR,
    )
}
