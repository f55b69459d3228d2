//! Error types for the content pipeline
//!
//! Components return these through `Result`; only the request handler turns
//! them into responses.

use hyper::{Method, StatusCode};
use std::io;
use thiserror::Error;

/// Page template errors
#[derive(Error, Debug)]
pub enum RenderError {
    /// Template failed to parse or to render
    #[error("template error: {0}")]
    Template(#[from] tera::Error),

    /// Template asset could not be read
    #[error("failed to read template '{path}': {source}")]
    TemplateFile {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// Terminal failure of a single request
#[derive(Error, Debug)]
pub enum ServeError {
    /// Path missing or filtered out
    #[error("not found: {0}")]
    NotFound(String),

    /// A validator failed on a request that cannot be answered with 304
    #[error("precondition failed")]
    PreconditionFailed,

    #[error("method not allowed: {0}")]
    MethodNotAllowed(Method),

    #[error("render failed: {0}")]
    Render(#[from] RenderError),

    /// Reading or listing the underlying store failed
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl ServeError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::PreconditionFailed => StatusCode::PRECONDITION_FAILED,
            Self::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            Self::Render(_) | Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
