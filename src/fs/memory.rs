//! In-memory filesystem, mostly for tests

use super::{clean_segments, Entry, File, FileSystem};
use std::collections::BTreeMap;
use std::io::{self, Cursor, Read};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Modification time given to nodes created without an explicit one
pub const DEFAULT_MODIFIED_SECS: u64 = 1_700_000_000;

#[derive(Debug, Clone)]
enum Node {
    File {
        content: Arc<[u8]>,
        modified: SystemTime,
    },
    Dir {
        modified: SystemTime,
        readable: bool,
    },
}

/// A [`FileSystem`] kept entirely in memory.
///
/// Parent directories are created implicitly.
#[derive(Debug, Clone)]
pub struct MemFs {
    nodes: BTreeMap<String, Node>,
}

impl MemFs {
    pub fn new() -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert(
            "/".to_string(),
            Node::Dir {
                modified: default_modified(),
                readable: true,
            },
        );
        Self { nodes }
    }

    #[must_use]
    pub fn with_file(self, path: &str, content: impl Into<Vec<u8>>) -> Self {
        self.with_file_at(path, content, default_modified())
    }

    #[must_use]
    pub fn with_file_at(
        mut self,
        path: &str,
        content: impl Into<Vec<u8>>,
        modified: SystemTime,
    ) -> Self {
        let key = self.make_parents(path);
        let content: Vec<u8> = content.into();
        self.nodes.insert(
            key,
            Node::File {
                content: Arc::from(content),
                modified,
            },
        );
        self
    }

    #[must_use]
    pub fn with_dir(self, path: &str) -> Self {
        self.with_dir_at(path, default_modified())
    }

    #[must_use]
    pub fn with_dir_at(mut self, path: &str, modified: SystemTime) -> Self {
        let key = self.make_parents(path);
        self.nodes.insert(
            key,
            Node::Dir {
                modified,
                readable: true,
            },
        );
        self
    }

    /// A directory that opens fine but fails to list
    #[must_use]
    pub fn with_unreadable_dir(mut self, path: &str) -> Self {
        let key = self.make_parents(path);
        self.nodes.insert(
            key,
            Node::Dir {
                modified: default_modified(),
                readable: false,
            },
        );
        self
    }

    fn make_parents(&mut self, path: &str) -> String {
        let segments = clean_segments(path);
        let mut current = String::new();
        for segment in segments.iter().take(segments.len().saturating_sub(1)) {
            current.push('/');
            current.push_str(segment);
            self.nodes.entry(current.clone()).or_insert(Node::Dir {
                modified: default_modified(),
                readable: true,
            });
        }
        key_for(&segments)
    }

    fn children(&self, dir: &str) -> Vec<Entry> {
        let prefix = if dir == "/" {
            "/".to_string()
        } else {
            format!("{dir}/")
        };
        self.nodes
            .iter()
            .filter_map(|(key, node)| {
                let rest = key.strip_prefix(&prefix)?;
                if rest.is_empty() || rest.contains('/') {
                    return None;
                }
                Some(entry_for(rest, node))
            })
            .collect()
    }
}

impl Default for MemFs {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem for MemFs {
    fn open(&self, path: &str) -> io::Result<Box<dyn File>> {
        let key = key_for(&clean_segments(path));
        let node = self.nodes.get(&key).ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("{key}: no such file"))
        })?;

        let name = key.rsplit('/').next().filter(|n| !n.is_empty()).unwrap_or("/");
        let stat = entry_for(name, node);
        let (reader, listing) = match node {
            Node::File { content, .. } => (Cursor::new(content.to_vec()), None),
            Node::Dir { readable, .. } => {
                let listing = if *readable {
                    Ok(self.children(&key))
                } else {
                    Err(format!("{key}: permission denied"))
                };
                (Cursor::new(Vec::new()), Some(listing))
            }
        };

        Ok(Box::new(MemFile {
            stat,
            reader,
            listing,
        }))
    }
}

struct MemFile {
    stat: Entry,
    reader: Cursor<Vec<u8>>,
    /// `None` for regular files
    listing: Option<Result<Vec<Entry>, String>>,
}

impl Read for MemFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.stat.is_dir {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "is a directory",
            ));
        }
        self.reader.read(buf)
    }
}

impl File for MemFile {
    fn stat(&self) -> io::Result<Entry> {
        Ok(self.stat.clone())
    }

    fn list(&mut self) -> io::Result<Vec<Entry>> {
        match &self.listing {
            Some(Ok(entries)) => Ok(entries.clone()),
            Some(Err(msg)) => Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                msg.clone(),
            )),
            None => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "not a directory",
            )),
        }
    }
}

fn default_modified() -> SystemTime {
    UNIX_EPOCH + Duration::from_secs(DEFAULT_MODIFIED_SECS)
}

fn key_for(segments: &[&str]) -> String {
    format!("/{}", segments.join("/"))
}

fn entry_for(name: &str, node: &Node) -> Entry {
    match node {
        Node::File { content, modified } => Entry::file(name, content.len() as u64, *modified),
        Node::Dir { modified, .. } => Entry::dir(name, *modified),
    }
}
