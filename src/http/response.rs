//! HTTP response building module
//!
//! Builders for the fixed status responses of the content route.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{
    HeaderMap, HeaderValue, ALLOW, CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE, LOCATION,
};
use hyper::{Response, StatusCode};

pub const ALLOWED_METHODS: &str = "GET, HEAD, OPTIONS";

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// Build a response from prepared headers and a body
pub fn build_response(
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(body));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}

/// Build 304 Not Modified response from headers already stripped of
/// representation metadata
pub fn build_304_response(headers: HeaderMap) -> Response<Full<Bytes>> {
    build_response(StatusCode::NOT_MODIFIED, headers, Bytes::new())
}

/// Build 412 Precondition Failed response (empty body)
pub fn build_412_response() -> Response<Full<Bytes>> {
    build_response(
        StatusCode::PRECONDITION_FAILED,
        HeaderMap::new(),
        Bytes::new(),
    )
}

/// Build 301 Moved Permanently response pointing at `location`
pub fn build_301_response(location: &str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::MOVED_PERMANENTLY)
        .header(LOCATION, location)
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error("301", &e);
            build_404_response()
        })
}

/// Build 404 Not Found response
pub fn build_404_response() -> Response<Full<Bytes>> {
    build_text_response(StatusCode::NOT_FOUND, "404 page not found")
}

/// Build 500 Internal Server Error response with a generic message
pub fn build_500_response() -> Response<Full<Bytes>> {
    build_text_response(StatusCode::INTERNAL_SERVER_ERROR, "render page failed")
}

/// Build 405 Method Not Allowed response
pub fn build_405_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::METHOD_NOT_ALLOWED)
        .header(CONTENT_TYPE, TEXT_PLAIN)
        .header(ALLOW, ALLOWED_METHODS)
        .body(Full::new(Bytes::from("405 Method Not Allowed")))
        .unwrap_or_else(|e| {
            log_build_error("405", &e);
            Response::new(Full::new(Bytes::from("405 Method Not Allowed")))
        })
}

/// Build OPTIONS response
pub fn build_options_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header(ALLOW, ALLOWED_METHODS)
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error("OPTIONS", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build 413 Payload Too Large response
pub fn build_413_response() -> Response<Full<Bytes>> {
    build_text_response(StatusCode::PAYLOAD_TOO_LARGE, "413 Payload Too Large")
}

/// Build 416 Range Not Satisfiable response
pub fn build_416_response(mut headers: HeaderMap, size: usize) -> Response<Full<Bytes>> {
    headers.remove(CONTENT_LENGTH);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(TEXT_PLAIN));
    if let Ok(value) = format!("bytes */{size}").parse() {
        headers.insert(CONTENT_RANGE, value);
    }
    build_response(
        StatusCode::RANGE_NOT_SATISFIABLE,
        headers,
        Bytes::from("Range Not Satisfiable"),
    )
}

fn build_text_response(status: StatusCode, message: &'static str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, TEXT_PLAIN)
        .body(Full::new(Bytes::from(message)))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            Response::new(Full::new(Bytes::from(message)))
        })
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}
