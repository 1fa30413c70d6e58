//! Local filesystem backend.
//!
//! Exposes a host directory read-only, with path security to prevent
//! escaping the root directory.

use std::fs;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use crate::cursor::DirCursor;
use crate::error::{VfsError, VfsResult};
use crate::ops::{File, FileSystem, ReadDirFile};
use crate::path::{self, MOUNT_ROOT, SEPARATOR};
use crate::types::{DirEntry, FileAttr, FileType};

/// Local filesystem backend.
///
/// All operations are relative to `root`. For example, if `root` is
/// `/srv/photos`, then `open("2024/a.jpg")` opens `/srv/photos/2024/a.jpg`.
///
/// Anything that resolves outside the root, through `..` or a symlink, is
/// reported as not found.
#[derive(Debug, Clone)]
pub struct LocalFs {
    root: PathBuf,
}

impl LocalFs {
    /// Create a local filesystem rooted at the given path.
    ///
    /// The root is canonicalized at construction time to handle symlinks
    /// (e.g. macOS `/tmp` → `/private/tmp`).
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root: PathBuf = root.into();
        let root = dunce::canonicalize(&root).unwrap_or(root);
        Self { root }
    }

    /// Get the root path.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a relative path to a canonical absolute path within the root.
    fn resolve(&self, path: &str) -> VfsResult<PathBuf> {
        let cleaned = path::clean(path);
        let relative = cleaned.trim_start_matches(SEPARATOR);
        if relative == ".." || relative.starts_with("../") {
            return Err(VfsError::not_found(path));
        }
        if relative.is_empty() || relative == MOUNT_ROOT {
            return Ok(self.root.clone());
        }

        let full = self.root.join(relative);
        let canonical = dunce::canonicalize(&full)?;
        if !canonical.starts_with(&self.root) {
            tracing::debug!(path, resolved = %canonical.display(), "path escapes local root");
            return Err(VfsError::not_found(path));
        }
        Ok(canonical)
    }

    /// Convert std::fs::Metadata to FileAttr.
    fn metadata_to_attr(name: &str, meta: &fs::Metadata) -> FileAttr {
        let kind = if meta.is_dir() {
            FileType::Directory
        } else if meta.file_type().is_symlink() {
            FileType::Symlink
        } else {
            FileType::File
        };

        FileAttr {
            name: name.to_string(),
            size: if kind.is_dir() { 0 } else { meta.len() },
            kind,
            perm: perm_bits(meta),
            mtime: meta.modified().unwrap_or(std::time::SystemTime::UNIX_EPOCH),
        }
    }
}

#[cfg(unix)]
fn perm_bits(meta: &fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode() & 0o7777
}

#[cfg(not(unix))]
fn perm_bits(meta: &fs::Metadata) -> u32 {
    if meta.permissions().readonly() {
        0o444
    } else {
        0o644
    }
}

impl FileSystem for LocalFs {
    fn open(&self, path: &str) -> VfsResult<Box<dyn File>> {
        let full = self.resolve(path)?;
        let meta = fs::metadata(&full)?;

        let cleaned = path::clean(path);
        let name = cleaned
            .trim_start_matches(SEPARATOR)
            .rsplit(SEPARATOR)
            .next()
            .filter(|n| !n.is_empty())
            .unwrap_or(MOUNT_ROOT);
        let attr = Self::metadata_to_attr(name, &meta);

        if meta.is_dir() {
            Ok(Box::new(LocalDir {
                path: full,
                attr,
                cursor: None,
            }))
        } else {
            let file = fs::File::open(&full)?;
            Ok(Box::new(LocalFile { file, attr }))
        }
    }
}

/// Open regular file on the host.
#[derive(Debug)]
struct LocalFile {
    file: fs::File,
    attr: FileAttr,
}

impl File for LocalFile {
    fn stat(&self) -> VfsResult<FileAttr> {
        Ok(self.attr.clone())
    }

    fn read(&mut self, buf: &mut [u8]) -> VfsResult<usize> {
        Ok(self.file.read(buf)?)
    }

    fn seek(&mut self, pos: SeekFrom) -> VfsResult<u64> {
        Ok(self.file.seek(pos)?)
    }
}

/// Open directory on the host. Listed on first read.
#[derive(Debug)]
struct LocalDir {
    path: PathBuf,
    attr: FileAttr,
    cursor: Option<DirCursor>,
}

impl LocalDir {
    fn list(&self) -> VfsResult<Vec<DirEntry>> {
        let mut entries: Vec<DirEntry> = Vec::new();
        for entry in fs::read_dir(&self.path)? {
            let entry = entry?;
            let meta = entry.metadata()?;
            let name = entry.file_name().to_string_lossy().into_owned();
            entries.push(LocalFs::metadata_to_attr(&name, &meta).into());
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }
}

impl File for LocalDir {
    fn stat(&self) -> VfsResult<FileAttr> {
        Ok(self.attr.clone())
    }

    fn read(&mut self, _buf: &mut [u8]) -> VfsResult<usize> {
        Err(VfsError::is_a_directory(self.attr.name.as_str()))
    }

    fn as_read_dir(&mut self) -> Option<&mut dyn ReadDirFile> {
        Some(self)
    }
}

impl ReadDirFile for LocalDir {
    fn read_dir(&mut self, n: isize) -> VfsResult<Vec<DirEntry>> {
        let cursor = match self.cursor {
            Some(ref mut cursor) => cursor,
            None => {
                let entries = self.list()?;
                self.cursor.insert(DirCursor::new(entries))
            }
        };
        cursor.read(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::read_file;
    use tempfile::TempDir;

    fn setup() -> (LocalFs, TempDir) {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("dir/sub")).unwrap();
        fs::write(dir.path().join("dir/file.txt"), b"hello").unwrap();
        fs::write(dir.path().join("top.txt"), b"top").unwrap();
        let backend = LocalFs::new(dir.path());
        (backend, dir)
    }

    #[test]
    fn test_read_file() {
        let (backend, _dir) = setup();
        assert_eq!(read_file(&backend, "dir/file.txt").unwrap(), b"hello");
    }

    #[test]
    fn test_stat() {
        let (backend, _dir) = setup();
        let attr = backend.stat("dir/file.txt").unwrap();
        assert_eq!(attr.name, "file.txt");
        assert_eq!(attr.size, 5);
        assert!(attr.is_file());

        let root = backend.stat(".").unwrap();
        assert_eq!(root.name, ".");
        assert!(root.is_dir());
    }

    #[test]
    fn test_read_dir_sorted() {
        let (backend, _dir) = setup();
        let names: Vec<_> = backend
            .read_dir(".")
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, ["dir", "top.txt"]);

        let entries = backend.read_dir("dir").unwrap();
        assert_eq!(entries[0].name, "file.txt");
        assert_eq!(entries[0].size, 5);
        assert!(entries[1].is_dir());
    }

    #[test]
    fn test_missing_is_not_found() {
        let (backend, _dir) = setup();
        assert!(backend.open("nope").unwrap_err().is_not_found());
    }

    #[test]
    fn test_escape_is_not_found() {
        let (backend, _dir) = setup();
        assert!(backend.open("../etc/passwd").unwrap_err().is_not_found());
        assert!(backend.open("dir/../../x").unwrap_err().is_not_found());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_escape_is_not_found() {
        let (backend, dir) = setup();
        let outside = TempDir::new().unwrap();
        fs::write(outside.path().join("secret"), b"s").unwrap();
        std::os::unix::fs::symlink(outside.path(), dir.path().join("link")).unwrap();

        assert!(backend.open("link/secret").unwrap_err().is_not_found());
    }

    #[test]
    fn test_seek() {
        let (backend, _dir) = setup();
        let mut file = backend.open("dir/file.txt").unwrap();
        file.seek(SeekFrom::Start(3)).unwrap();
        let mut buf = [0u8; 8];
        let n = file.read(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"lo");
    }

    #[test]
    fn test_directory_read_fails() {
        let (backend, _dir) = setup();
        let mut dir = backend.open("dir").unwrap();
        assert!(matches!(dir.read(&mut [0u8; 4]), Err(VfsError::IsADirectory(_))));
    }
}
