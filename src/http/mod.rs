//! HTTP protocol layer module
//!
//! Conditional requests, fingerprints, ranges and response builders,
//! independent of how content is rendered.

pub mod cache;
pub mod conditional;
pub mod content;
pub mod range;
pub mod response;

// Re-export commonly used items
pub use cache::generate_etag;
pub use conditional::Precondition;
pub use content::serve_content;
pub use response::{
    build_301_response, build_304_response, build_404_response, build_405_response, build_412_response,
    build_413_response, build_500_response, build_options_response,
};
