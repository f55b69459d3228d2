//! Visibility filter over another filesystem

use super::{Entry, File, FileSystem};
use std::io::{self, Read};

/// Which entries a listing may show
///
/// Hidden (dot-prefixed) names are always excluded. Directories are always
/// included otherwise. Files must end with one of the accepted suffixes
/// (case-sensitive).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterPolicy {
    pub suffixes: &'static [&'static str],
    pub hidden_prefix: char,
}

impl FilterPolicy {
    pub const TEXT_FILES: Self = Self {
        suffixes: &[".txt", ".md", ".markdown"],
        hidden_prefix: '.',
    };

    pub fn is_hidden(&self, name: &str) -> bool {
        name.starts_with(self.hidden_prefix)
    }

    pub fn has_accepted_suffix(&self, name: &str) -> bool {
        self.suffixes.iter().any(|suffix| name.ends_with(suffix))
    }

    /// Decide whether a listing shows `entry`
    pub fn admits(&self, entry: &Entry) -> bool {
        if self.is_hidden(&entry.name) {
            return false;
        }
        entry.is_dir || self.has_accepted_suffix(&entry.name)
    }

    /// Decide whether `entry` may be opened directly by path.
    ///
    /// Directories stay navigable even when hidden; only the final path
    /// component is checked, never its ancestors.
    pub fn admits_target(&self, entry: &Entry) -> bool {
        entry.is_dir || self.admits(entry)
    }
}

impl Default for FilterPolicy {
    fn default() -> Self {
        Self::TEXT_FILES
    }
}

/// Wraps a filesystem so that only text and Markdown files are visible
#[derive(Debug, Clone)]
pub struct FilteredFs<F> {
    inner: F,
    policy: FilterPolicy,
}

impl<F: FileSystem> FilteredFs<F> {
    pub fn new(inner: F) -> Self {
        Self::with_policy(inner, FilterPolicy::default())
    }

    pub const fn with_policy(inner: F, policy: FilterPolicy) -> Self {
        Self { inner, policy }
    }
}

impl<F: FileSystem> FileSystem for FilteredFs<F> {
    fn open(&self, path: &str) -> io::Result<Box<dyn File>> {
        let file = self.inner.open(path)?;
        let stat = file.stat()?;
        if !self.policy.admits_target(&stat) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{path} is filtered out"),
            ));
        }
        Ok(Box::new(FilteredFile {
            inner: file,
            policy: self.policy,
        }))
    }
}

struct FilteredFile {
    inner: Box<dyn File>,
    policy: FilterPolicy,
}

impl Read for FilteredFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl File for FilteredFile {
    fn stat(&self) -> io::Result<Entry> {
        self.inner.stat()
    }

    fn list(&mut self) -> io::Result<Vec<Entry>> {
        let mut entries = self.inner.list()?;
        entries.retain(|entry| self.policy.admits(entry));
        Ok(entries)
    }
}
