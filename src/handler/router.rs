//! Request dispatch module
//!
//! Entry point for HTTP request processing: method and body-size checks,
//! handing the request to the content pipeline, and access logging.

use crate::config::AppState;
use crate::handler::serve::{self, ServeRequest};
use crate::http;
use crate::logger::{self, AccessLogEntry};
use http_body_util::Full;
use hyper::body::{Body as _, Bytes};
use hyper::header::{HeaderName, HeaderValue, CONTENT_LENGTH, REFERER, SERVER, USER_AGENT};
use hyper::{Method, Request, Response, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Main entry point for HTTP request handling
pub async fn handle_request(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
    remote_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    // Request bodies are never read; drop the stream up front
    let (parts, _body) = req.into_parts();
    let req = Request::from_parts(parts, ());
    Ok(process(&req, &state, remote_addr).await)
}

/// Route one request and decorate the response. The request body is never
/// read, so any body type will do.
pub async fn process<B>(
    req: &Request<B>,
    state: &Arc<AppState>,
    remote_addr: SocketAddr,
) -> Response<Full<Bytes>> {
    let started = Instant::now();

    let mut response = route(req, state).await;
    if let Ok(value) = HeaderValue::from_str(&state.config.http.server_name) {
        response.headers_mut().insert(SERVER, value);
    }

    if state.config.logging.access_log {
        let entry = access_entry(req, &response, remote_addr, started);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }
    response
}

async fn route<B>(req: &Request<B>, state: &Arc<AppState>) -> Response<Full<Bytes>> {
    // 1. OPTIONS is answered without touching the store
    if *req.method() == Method::OPTIONS {
        return http::build_options_response();
    }

    // 2. Check body size
    if let Some(resp) = check_body_size(req, state.config.http.max_body_size) {
        return resp;
    }

    // 3. Filesystem reads and rendering block, so run them off the reactor
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let headers = req.headers().clone();
    let state = Arc::clone(state);
    let task = tokio::task::spawn_blocking(move || {
        let request = ServeRequest {
            method: &method,
            path: &path,
            headers: &headers,
        };
        serve::respond(state.fs.as_ref(), &state.renderer, &request)
    });

    match task.await {
        Ok(response) => response,
        Err(e) => {
            logger::log_error(&format!("Request task failed: {e}"));
            http::build_500_response()
        }
    }
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size<B>(req: &Request<B>, max_body_size: u64) -> Option<Response<Full<Bytes>>> {
    let content_length = req.headers().get(CONTENT_LENGTH)?;
    let Ok(size_str) = content_length.to_str() else {
        logger::log_warning("Content-Length header contains non-ASCII characters");
        return None;
    };
    match size_str.parse::<u64>() {
        Ok(size) if size > max_body_size => {
            logger::log_warning(&format!(
                "Request body too large: {size} bytes (max: {max_body_size})"
            ));
            Some(http::build_413_response())
        }
        Ok(_) => None,
        Err(_) => {
            logger::log_warning(&format!(
                "Invalid Content-Length value: '{size_str}', skipping size check"
            ));
            None
        }
    }
}

fn access_entry<B>(
    req: &Request<B>,
    response: &Response<Full<Bytes>>,
    remote_addr: SocketAddr,
    started: Instant,
) -> AccessLogEntry {
    let header = |name: HeaderName| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };

    let mut entry = AccessLogEntry::new(
        remote_addr.ip().to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = version_label(req.version()).to_string();
    entry.status = response.status().as_u16();
    entry.body_bytes = response
        .body()
        .size_hint()
        .exact()
        .and_then(|n| usize::try_from(n).ok())
        .unwrap_or(0);
    entry.referer = header(REFERER);
    entry.user_agent = header(USER_AGENT);
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
    entry
}

const fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}
