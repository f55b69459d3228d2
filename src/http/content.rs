//! Range-aware content serving
//!
//! Writes a fully rendered body, honoring `Range` and `If-Range`. Validators
//! that decide between 200/304/412 are evaluated before this point.

use super::conditional::{self, Condition};
use super::range::{parse_range_header, RangeParseResult};
use super::response::{build_416_response, build_response};
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderMap, HeaderValue, ACCEPT_RANGES, CONTENT_LENGTH, CONTENT_RANGE, ETAG, RANGE};
use hyper::{Method, Response, StatusCode};
use std::time::SystemTime;

/// Serve `body` with the prepared response `headers`.
///
/// Sets `Last-Modified` (when known), `Accept-Ranges` and `Content-Length`.
/// `HEAD` requests get the same headers and no body.
pub fn serve_content(
    method: &Method,
    request_headers: &HeaderMap,
    mut headers: HeaderMap,
    modified: SystemTime,
    body: Bytes,
) -> Response<Full<Bytes>> {
    conditional::set_last_modified(&mut headers, modified);
    headers.insert(ACCEPT_RANGES, HeaderValue::from_static("bytes"));

    let etag = headers
        .get(ETAG)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string);
    let range_header = if conditional::check_if_range(
        method,
        request_headers,
        etag.as_deref(),
        modified,
    ) == Condition::Fails
    {
        None
    } else {
        request_headers.get(RANGE).and_then(|v| v.to_str().ok())
    };

    let is_head = *method == Method::HEAD;
    let total = body.len();

    match parse_range_header(range_header, total) {
        RangeParseResult::Satisfiable(range) => {
            headers.insert(CONTENT_LENGTH, HeaderValue::from(range.len()));
            if let Ok(value) = HeaderValue::from_str(&range.content_range(total)) {
                headers.insert(CONTENT_RANGE, value);
            }
            let part = if is_head {
                Bytes::new()
            } else {
                body.slice(range.start..=range.end)
            };
            build_response(StatusCode::PARTIAL_CONTENT, headers, part)
        }
        RangeParseResult::NotSatisfiable => build_416_response(headers, total),
        RangeParseResult::Ignored => {
            headers.insert(CONTENT_LENGTH, HeaderValue::from(total));
            let body = if is_head { Bytes::new() } else { body };
            build_response(StatusCode::OK, headers, body)
        }
    }
}
