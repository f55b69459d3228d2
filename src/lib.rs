//! Serve a directory of plain-text and Markdown files as rendered HTML pages.
//!
//! The request pipeline (`handler::serve`) is synchronous and independent of
//! the network layer; `server` wires it to hyper.

pub mod config;
pub mod error;
pub mod fs;
pub mod handler;
pub mod http;
pub mod logger;
pub mod render;
pub mod server;
