//! Request handler module
//!
//! `router` extracts what the pipeline needs from a hyper request and writes
//! the access log; `serve` is the per-request content state machine.

pub mod router;
pub mod serve;

// Re-export main entry point
pub use router::handle_request;
