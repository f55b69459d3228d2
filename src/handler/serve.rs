//! Per-request content pipeline
//!
//! Resolves a path through the filtered store, negotiates freshness and
//! renders the result. Everything here is synchronous; the router moves it
//! off the async reactor.

use crate::error::ServeError;
use crate::fs::{clean_segments, Entry, File, FileSystem};
use crate::http::conditional::{self, Condition};
use crate::http::response::build_response;
use crate::http::{self, generate_etag, serve_content, Precondition};
use crate::logger;
use crate::render::{Content, Renderer};
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderMap, HeaderValue, CONTENT_LENGTH, CONTENT_TYPE};
use hyper::{Method, Response, StatusCode};
use percent_encoding::percent_decode_str;
use std::io::Read;

pub const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// The parts of a request the pipeline looks at
#[derive(Debug, Clone, Copy)]
pub struct ServeRequest<'a> {
    pub method: &'a Method,
    /// Raw URI path, still percent-encoded
    pub path: &'a str,
    pub headers: &'a HeaderMap,
}

/// Produce the response for one request. Never fails: every error is
/// mapped to its status here.
pub fn respond(
    fs: &dyn FileSystem,
    renderer: &Renderer,
    request: &ServeRequest<'_>,
) -> Response<Full<Bytes>> {
    match serve(fs, renderer, request) {
        Ok(response) => response,
        Err(err) => error_response(&err, request.path),
    }
}

/// Percent-decode `raw` and clean it into an absolute path that cannot climb
/// above `/`.
pub fn normalize_path(raw: &str) -> String {
    let decoded = percent_decode_str(raw).decode_utf8_lossy();
    format!("/{}", clean_segments(&decoded).join("/"))
}

fn serve(
    fs: &dyn FileSystem,
    renderer: &Renderer,
    request: &ServeRequest<'_>,
) -> Result<Response<Full<Bytes>>, ServeError> {
    let path = normalize_path(request.path);
    let mut file = fs.open(&path).map_err(|e| {
        logger::log_debug(&format!("Cannot open '{path}': {e}"));
        ServeError::NotFound(path.clone())
    })?;
    let info = file.stat()?;

    if info.is_dir {
        if let Some(location) = directory_redirect(request) {
            return Ok(http::build_301_response(&location));
        }
        serve_directory(file.as_mut(), &info, renderer, request)
    } else {
        serve_file(file.as_mut(), &info, renderer, request)
    }
}

fn serve_file(
    file: &mut dyn File,
    info: &Entry,
    renderer: &Renderer,
    request: &ServeRequest<'_>,
) -> Result<Response<Full<Bytes>>, ServeError> {
    let mut source = Vec::with_capacity(usize::try_from(info.size).unwrap_or(0));
    file.read_to_end(&mut source)?;

    let etag = generate_etag(&source);
    let mut headers = HeaderMap::new();
    conditional::set_etag(&mut headers, &etag);

    match conditional::evaluate(request.method, request.headers, &etag, info.modified) {
        Precondition::NotModified => {
            conditional::write_not_modified(&mut headers);
            return Ok(http::build_304_response(headers));
        }
        Precondition::Failed => return Err(ServeError::PreconditionFailed),
        Precondition::Proceed => {}
    }
    ensure_readable(request.method)?;

    let document = renderer.render(&info.name, Content::file(&info.name, &source));
    let page = renderer.render_page(&document)?;
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(HTML_CONTENT_TYPE));

    Ok(serve_content(
        request.method,
        request.headers,
        headers,
        info.modified,
        page,
    ))
}

fn serve_directory(
    dir: &mut dyn File,
    info: &Entry,
    renderer: &Renderer,
    request: &ServeRequest<'_>,
) -> Result<Response<Full<Bytes>>, ServeError> {
    if conditional::check_if_modified_since(request.method, request.headers, info.modified)
        == Condition::Fails
    {
        let mut headers = HeaderMap::new();
        conditional::write_not_modified(&mut headers);
        return Ok(http::build_304_response(headers));
    }
    ensure_readable(request.method)?;

    let mut headers = HeaderMap::new();
    conditional::set_last_modified(&mut headers, info.modified);

    let entries = dir.list()?;
    let document = renderer.render(&info.name, Content::Listing(entries));
    let page = renderer.render_page(&document)?;

    headers.insert(CONTENT_TYPE, HeaderValue::from_static(HTML_CONTENT_TYPE));
    headers.insert(CONTENT_LENGTH, HeaderValue::from(page.len()));
    let body = if *request.method == Method::HEAD {
        Bytes::new()
    } else {
        page
    };
    Ok(build_response(StatusCode::OK, headers, body))
}

/// Listings use relative links, so a directory must be addressed with a
/// trailing slash
fn directory_redirect(request: &ServeRequest<'_>) -> Option<String> {
    let readable = *request.method == Method::GET || *request.method == Method::HEAD;
    if readable && !request.path.ends_with('/') {
        Some(format!("{}/", request.path))
    } else {
        None
    }
}

/// Only GET and HEAD get past the validators
fn ensure_readable(method: &Method) -> Result<(), ServeError> {
    if *method == Method::GET || *method == Method::HEAD {
        Ok(())
    } else {
        Err(ServeError::MethodNotAllowed(method.clone()))
    }
}

fn error_response(err: &ServeError, path: &str) -> Response<Full<Bytes>> {
    match err {
        ServeError::NotFound(_) => http::build_404_response(),
        ServeError::PreconditionFailed => http::build_412_response(),
        ServeError::MethodNotAllowed(method) => {
            logger::log_warning(&format!("Method not allowed: {method} {path}"));
            http::build_405_response()
        }
        ServeError::Render(_) | ServeError::Io(_) => {
            logger::log_error(&format!("Failed to serve '{path}': {err}"));
            http::build_500_response()
        }
    }
}
