//! Filesystem abstraction module
//!
//! The pipeline never touches `std::fs` directly. It talks to a [`FileSystem`]
//! that hands out [`File`] handles able to stat, read and list themselves.
//! [`FilteredFs`] wraps any such store and restricts what is visible.

mod dir;
mod filter;
mod memory;

pub use dir::DirFs;
pub use filter::{FilterPolicy, FilteredFs};
pub use memory::{MemFs, DEFAULT_MODIFIED_SECS};

use std::io::{self, Read};
use std::time::SystemTime;

/// One filesystem object, as returned by `stat` or a directory listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub is_dir: bool,
    /// `UNIX_EPOCH` when the store cannot tell
    pub modified: SystemTime,
    pub size: u64,
}

impl Entry {
    pub fn file(name: impl Into<String>, size: u64, modified: SystemTime) -> Self {
        Self {
            name: name.into(),
            is_dir: false,
            modified,
            size,
        }
    }

    pub fn dir(name: impl Into<String>, modified: SystemTime) -> Self {
        Self {
            name: name.into(),
            is_dir: true,
            modified,
            size: 0,
        }
    }
}

/// An open handle, scoped to a single request and closed on drop
pub trait File: Read + Send {
    fn stat(&self) -> io::Result<Entry>;

    /// List the entries of a directory handle, in no particular order
    fn list(&mut self) -> io::Result<Vec<Entry>>;
}

/// A hierarchical byte store addressed by slash-separated paths
pub trait FileSystem: Send + Sync {
    /// Open `path` (always starting with `/`). Any failure means "not found"
    /// to the caller.
    fn open(&self, path: &str) -> io::Result<Box<dyn File>>;
}

impl<T: FileSystem + ?Sized> FileSystem for Box<T> {
    fn open(&self, path: &str) -> io::Result<Box<dyn File>> {
        (**self).open(path)
    }
}

/// Resolve `.` and `..` segments so the result never climbs above `/`.
///
/// Returns the cleaned segments, root first. An empty vector is the root.
pub fn clean_segments(path: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    segments
}
