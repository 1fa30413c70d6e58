//! Synthetic directory handles.
//!
//! Neither directory exists in any backend. [`RootDir`] lists mount
//! identifiers; [`MountRootDir`] stands in for a mount's own root and pulls
//! the backend's top-level listing the first time it is read.

use std::sync::Arc;

use super::cursor::DirCursor;
use super::error::{VfsError, VfsResult};
use super::ops::{File, FileSystem, ReadDirFile};
use super::path::MOUNT_ROOT;
use super::types::{DirEntry, FileAttr};

/// The global root: one directory entry per mount identifier.
#[derive(Debug)]
pub struct RootDir {
    cursor: DirCursor,
}

impl RootDir {
    /// Build from a snapshot of mount identifiers. Names are listed sorted.
    pub fn new(mut ids: Vec<String>) -> Self {
        ids.sort();
        let entries = ids.into_iter().map(DirEntry::synthetic_dir).collect();
        Self {
            cursor: DirCursor::new(entries),
        }
    }
}

impl File for RootDir {
    fn stat(&self) -> VfsResult<FileAttr> {
        Ok(FileAttr::synthetic_dir(MOUNT_ROOT))
    }

    fn read(&mut self, _buf: &mut [u8]) -> VfsResult<usize> {
        Err(VfsError::is_a_directory(MOUNT_ROOT))
    }

    fn as_read_dir(&mut self) -> Option<&mut dyn ReadDirFile> {
        Some(self)
    }
}

impl ReadDirFile for RootDir {
    fn read_dir(&mut self, n: isize) -> VfsResult<Vec<DirEntry>> {
        self.cursor.read(n)
    }
}

/// A mount's own root directory.
///
/// The backend's listing of `"."` is fetched on the first read and kept for
/// the life of this handle only. A failed fetch is not cached, so the next
/// read tries again.
pub struct MountRootDir {
    id: String,
    fs: Arc<dyn FileSystem>,
    cursor: Option<DirCursor>,
}

impl std::fmt::Debug for MountRootDir {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MountRootDir")
            .field("id", &self.id)
            .field("loaded", &self.cursor.is_some())
            .finish()
    }
}

impl MountRootDir {
    pub fn new(id: impl Into<String>, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            id: id.into(),
            fs,
            cursor: None,
        }
    }

    fn cursor(&mut self) -> VfsResult<&mut DirCursor> {
        match self.cursor {
            Some(ref mut cursor) => Ok(cursor),
            None => {
                let entries = self.fs.read_dir(MOUNT_ROOT)?;
                tracing::trace!(id = %self.id, count = entries.len(), "loaded mount root");
                Ok(self.cursor.insert(DirCursor::new(entries)))
            }
        }
    }
}

impl File for MountRootDir {
    fn stat(&self) -> VfsResult<FileAttr> {
        Ok(FileAttr::synthetic_dir(MOUNT_ROOT))
    }

    fn read(&mut self, _buf: &mut [u8]) -> VfsResult<usize> {
        Err(VfsError::is_a_directory(self.id.as_str()))
    }

    fn as_read_dir(&mut self) -> Option<&mut dyn ReadDirFile> {
        Some(self)
    }
}

impl ReadDirFile for MountRootDir {
    fn read_dir(&mut self, n: isize) -> VfsResult<Vec<DirEntry>> {
        self.cursor()?.read(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::MemoryFs;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts listings of the backend root.
    struct CountingFs {
        inner: MemoryFs,
        listings: AtomicUsize,
    }

    impl FileSystem for CountingFs {
        fn open(&self, path: &str) -> VfsResult<Box<dyn File>> {
            self.inner.open(path)
        }

        fn read_dir(&self, path: &str) -> VfsResult<Vec<DirEntry>> {
            self.listings.fetch_add(1, Ordering::SeqCst);
            self.inner.read_dir(path)
        }
    }

    #[test]
    fn test_root_dir_lists_sorted_synthetic_dirs() {
        let mut dir = RootDir::new(vec!["two".into(), "one".into()]);
        let entries = dir.read_dir(-1).unwrap();

        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["one", "two"]);
        assert!(entries.iter().all(|e| e.is_dir() && e.size == 0 && e.perm == 0o555));
    }

    #[test]
    fn test_root_dir_stat_and_read() {
        let mut dir = RootDir::new(Vec::new());
        let attr = dir.stat().unwrap();
        assert_eq!(attr.name, ".");
        assert!(attr.is_dir());
        assert!(matches!(dir.read(&mut [0u8; 4]), Err(VfsError::IsADirectory(_))));
    }

    #[test]
    fn test_mount_root_passes_entries_through() {
        let fs = MemoryFs::new()
            .with_file("a.txt", b"abc")
            .with_file("sub/b.txt", b"b");
        let mut dir = MountRootDir::new("one", Arc::new(fs));

        let entries = dir.read_dir(-1).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "a.txt");
        assert!(!entries[0].is_dir());
        assert_eq!(entries[0].size, 3);
        assert_eq!(entries[1].name, "sub");
        assert!(entries[1].is_dir());
    }

    #[test]
    fn test_mount_root_fetches_once_per_handle() {
        let fs = Arc::new(CountingFs {
            inner: MemoryFs::new().with_file("a", b"").with_file("b", b""),
            listings: AtomicUsize::new(0),
        });

        let mut dir = MountRootDir::new("one", fs.clone());
        assert_eq!(fs.listings.load(Ordering::SeqCst), 0);

        dir.read_dir(1).unwrap();
        dir.read_dir(1).unwrap();
        assert!(dir.read_dir(1).unwrap_err().is_end_of_directory());
        assert_eq!(fs.listings.load(Ordering::SeqCst), 1);

        let mut again = MountRootDir::new("one", fs.clone());
        again.read_dir(-1).unwrap();
        assert_eq!(fs.listings.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_mount_root_stat_is_dot() {
        let dir = MountRootDir::new("snap", Arc::new(MemoryFs::new()));
        let attr = dir.stat().unwrap();
        assert_eq!(attr.name, ".");
        assert!(attr.is_dir());
    }
}
