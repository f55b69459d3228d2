//! On-disk filesystem rooted at a directory

use super::{clean_segments, Entry, File, FileSystem};
use crate::logger;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// A [`FileSystem`] backed by a local directory
#[derive(Debug, Clone)]
pub struct DirFs {
    root: PathBuf,
}

impl DirFs {
    /// Create a filesystem rooted at `root`, which must exist
    pub fn new(root: impl AsRef<Path>) -> io::Result<Self> {
        let root = root.as_ref().canonicalize()?;
        if !root.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a directory", root.display()),
            ));
        }
        Ok(Self { root })
    }

    /// Map a request path to its canonical location and the name it was
    /// requested under
    fn resolve(&self, path: &str) -> io::Result<(PathBuf, String)> {
        if path.contains('\0') {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "path contains NUL byte",
            ));
        }

        let segments = clean_segments(path);
        let name = segments.last().map_or_else(|| "/".to_string(), |s| (*s).to_string());
        let full = segments
            .into_iter()
            .fold(self.root.clone(), |acc, segment| acc.join(segment));

        // Symlinks may still point outside the root
        let canonical = full.canonicalize()?;
        if !canonical.starts_with(&self.root) {
            logger::log_warning(&format!(
                "Path traversal attempt blocked: {} -> {}",
                path,
                canonical.display()
            ));
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "path escapes served root",
            ));
        }
        Ok((canonical, name))
    }
}

impl FileSystem for DirFs {
    fn open(&self, path: &str) -> io::Result<Box<dyn File>> {
        let (path, name) = self.resolve(path)?;
        let file = fs::File::open(&path)?;
        Ok(Box::new(DirFile { path, name, file }))
    }
}

struct DirFile {
    /// Canonical location, used for listing
    path: PathBuf,
    /// Last segment of the request path, so symlinks keep their own name
    name: String,
    file: fs::File,
}

impl Read for DirFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }
}

impl File for DirFile {
    fn stat(&self) -> io::Result<Entry> {
        let meta = self.file.metadata()?;
        Ok(Entry {
            name: self.name.clone(),
            is_dir: meta.is_dir(),
            modified: modified_or_epoch(meta.modified()),
            size: meta.len(),
        })
    }

    fn list(&mut self) -> io::Result<Vec<Entry>> {
        let mut entries = Vec::new();
        for dirent in fs::read_dir(&self.path)? {
            let dirent = dirent?;
            // File type comes from the dirent, so symlinks are not followed
            let is_dir = dirent.file_type()?.is_dir();
            let meta = dirent.metadata()?;
            entries.push(Entry {
                name: dirent.file_name().to_string_lossy().into_owned(),
                is_dir,
                modified: modified_or_epoch(meta.modified()),
                size: meta.len(),
            });
        }
        Ok(entries)
    }
}

fn modified_or_epoch(modified: io::Result<SystemTime>) -> SystemTime {
    modified.unwrap_or(UNIX_EPOCH)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "hello").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub").join("b.md"), "# b").unwrap();
        dir
    }

    #[test]
    fn test_open_and_read_file() {
        let dir = setup();
        let fs = DirFs::new(dir.path()).unwrap();
        let mut file = fs.open("/a.txt").unwrap();
        let stat = file.stat().unwrap();
        assert_eq!(stat.name, "a.txt");
        assert!(!stat.is_dir);
        assert_eq!(stat.size, 5);

        let mut content = String::new();
        file.read_to_string(&mut content).unwrap();
        assert_eq!(content, "hello");
    }

    #[test]
    fn test_list_directory() {
        let dir = setup();
        let fs = DirFs::new(dir.path()).unwrap();
        let mut root = fs.open("/").unwrap();
        assert!(root.stat().unwrap().is_dir);

        let mut names: Vec<_> = root.list().unwrap().into_iter().map(|e| e.name).collect();
        names.sort();
        assert_eq!(names, vec!["a.txt", "sub"]);
    }

    #[test]
    fn test_missing_file() {
        let dir = setup();
        let fs = DirFs::new(dir.path()).unwrap();
        let err = fs.open("/nope.txt").err().unwrap();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_dot_dot_stays_inside_root() {
        let dir = setup();
        let fs = DirFs::new(dir.path().join("sub")).unwrap();
        // `..` collapses at the root, so this resolves to sub/b.md
        assert!(fs.open("/../b.md").is_ok());
        assert!(fs.open("/../a.txt").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_outside_root_rejected() {
        let outside = tempfile::tempdir().unwrap();
        fs::write(outside.path().join("secret.txt"), "x").unwrap();
        let dir = setup();
        std::os::unix::fs::symlink(
            outside.path().join("secret.txt"),
            dir.path().join("link.txt"),
        )
        .unwrap();

        let fs = DirFs::new(dir.path()).unwrap();
        let err = fs.open("/link.txt").err().unwrap();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_reports_link_name() {
        let dir = setup();
        fs::write(dir.path().join("real.md"), "# Head").unwrap();
        std::os::unix::fs::symlink(dir.path().join("real.md"), dir.path().join("b.txt")).unwrap();

        let fs = DirFs::new(dir.path()).unwrap();
        let mut file = fs.open("/b.txt").unwrap();
        let stat = file.stat().unwrap();
        assert_eq!(stat.name, "b.txt");
        assert!(!stat.is_dir);

        let mut content = String::new();
        file.read_to_string(&mut content).unwrap();
        assert_eq!(content, "# Head");
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_admitted_by_its_own_name() {
        use crate::fs::FilteredFs;

        let dir = setup();
        fs::write(dir.path().join("blob.bin"), "data").unwrap();
        std::os::unix::fs::symlink(dir.path().join("blob.bin"), dir.path().join("c.txt")).unwrap();

        let fs = FilteredFs::new(DirFs::new(dir.path()).unwrap());
        assert_eq!(fs.open("/c.txt").unwrap().stat().unwrap().name, "c.txt");
        assert_eq!(
            fs.open("/blob.bin").err().unwrap().kind(),
            io::ErrorKind::NotFound
        );
    }

    #[test]
    fn test_root_and_subdir_names() {
        let dir = setup();
        let fs = DirFs::new(dir.path()).unwrap();
        assert_eq!(fs.open("/").unwrap().stat().unwrap().name, "/");
        assert_eq!(fs.open("/sub/").unwrap().stat().unwrap().name, "sub");
    }

    #[test]
    fn test_root_must_be_directory() {
        let dir = setup();
        assert!(DirFs::new(dir.path().join("a.txt")).is_err());
    }
}
