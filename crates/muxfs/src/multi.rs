//! The multiplexer façade.
//!
//! `MultiFs` resolves a caller path, then either serves one of the synthetic
//! directories or forwards the rest of the path to the mounted backend.
//! Backend results, including errors, are returned unchanged.

use std::sync::Arc;

use super::error::{VfsError, VfsResult};
use super::mount::{MountInfo, MountTable};
use super::ops::{File, FileSystem};
use super::path::{self, ResolvedPath};
use super::root::{MountRootDir, RootDir};

/// Many named backends under one read-only namespace.
///
/// `"<id>/<rest>"` addresses `<rest>` inside the backend mounted as `<id>`.
/// The empty path and `"."` address a synthetic root listing every mount.
///
/// Each instance owns its own mount table; instances never share state.
#[derive(Debug, Default)]
pub struct MultiFs {
    mounts: MountTable,
}

impl MultiFs {
    /// Create a multiplexer with nothing mounted.
    pub fn new() -> Self {
        Self {
            mounts: MountTable::new(),
        }
    }

    /// Mount a backend under `id`, replacing any previous one.
    pub fn mount(&self, id: &str, fs: impl FileSystem + 'static) -> VfsResult<()> {
        self.mounts.mount(id, Some(Arc::new(fs)))
    }

    /// Mount a backend that is shared with other owners.
    pub fn mount_arc(&self, id: &str, fs: Arc<dyn FileSystem>) -> VfsResult<()> {
        self.mounts.mount(id, Some(fs))
    }

    /// Mount an optional backend; `None` fails with [`VfsError::NilBackend`].
    pub fn mount_opt(&self, id: &str, fs: Option<Arc<dyn FileSystem>>) -> VfsResult<()> {
        self.mounts.mount(id, fs)
    }

    /// Remove the mount under `id`.
    pub fn unmount(&self, id: &str) -> VfsResult<()> {
        self.mounts.unmount(id)
    }

    /// Backend mounted under `id`, if any.
    pub fn lookup(&self, id: &str) -> Option<Arc<dyn FileSystem>> {
        self.mounts.lookup(id)
    }

    /// Returns true if `id` is currently mounted.
    pub fn is_mounted(&self, id: &str) -> bool {
        self.mounts.contains(id)
    }

    /// Snapshot of mounted identifiers, in no particular order.
    pub fn mount_ids(&self) -> Vec<String> {
        self.mounts.snapshot()
    }

    /// List all current mounts, sorted by identifier.
    pub fn list_mounts(&self) -> Vec<MountInfo> {
        self.mounts.list_mounts()
    }

    /// Number of mounts.
    pub fn len(&self) -> usize {
        self.mounts.len()
    }

    /// Returns true if nothing is mounted.
    pub fn is_empty(&self) -> bool {
        self.mounts.is_empty()
    }

    /// The underlying mount table.
    pub fn mount_table(&self) -> &MountTable {
        &self.mounts
    }

    /// Resolve `path` against the current mounts.
    ///
    /// Unknown identifiers and paths that escape the root both fail with
    /// [`VfsError::NotFound`].
    pub fn resolve(&self, path: &str) -> VfsResult<ResolvedPath> {
        let resolved = path::split(path)?;
        if let ResolvedPath::Mount { id, .. } = &resolved {
            if !self.mounts.contains(id) {
                return Err(VfsError::not_found(path));
            }
        }
        tracing::trace!(path, ?resolved, "resolved");
        Ok(resolved)
    }
}

impl FileSystem for MultiFs {
    fn open(&self, path: &str) -> VfsResult<Box<dyn File>> {
        let (id, subpath) = match path::split(path)? {
            ResolvedPath::Root => {
                return Ok(Box::new(RootDir::new(self.mounts.snapshot())));
            }
            ResolvedPath::Mount { id, subpath } => (id, subpath),
        };

        // id check and backend come from the same table read
        let fs = self
            .mounts
            .lookup(&id)
            .ok_or_else(|| VfsError::not_found(path))?;
        tracing::trace!(path, %id, %subpath, "resolved");

        if subpath == path::MOUNT_ROOT {
            return Ok(Box::new(MountRootDir::new(id, fs)));
        }
        fs.open(&subpath)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::MemoryFs;
    use crate::ops::read_file;

    fn mux() -> MultiFs {
        let mux = MultiFs::new();
        mux.mount(
            "one",
            MemoryFs::new()
                .with_file("foo.txt", b"hello from fs1")
                .with_file("dir/file.txt", b"hello"),
        )
        .unwrap();
        mux.mount("two", MemoryFs::new().with_file("qux.txt", b"hello from fs2"))
            .unwrap();
        mux
    }

    fn names(mut entries: Vec<crate::DirEntry>) -> Vec<String> {
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        entries.into_iter().map(|e| e.name).collect()
    }

    #[test]
    fn test_resolve() {
        let mux = mux();
        assert_eq!(mux.resolve("").unwrap(), ResolvedPath::Root);
        assert!(mux.resolve("/one").unwrap().is_mount_root());
        assert_eq!(
            mux.resolve("one/dir/file.txt").unwrap(),
            ResolvedPath::Mount {
                id: "one".into(),
                subpath: "dir/file.txt".into()
            }
        );
        assert!(mux.resolve("three/x").unwrap_err().is_not_found());
        assert!(mux.resolve("../x").unwrap_err().is_not_found());
    }

    #[test]
    fn test_open_delegates() {
        let mux = mux();
        assert_eq!(read_file(&mux, "one/foo.txt").unwrap(), b"hello from fs1");
        assert_eq!(read_file(&mux, "/two/qux.txt").unwrap(), b"hello from fs2");
    }

    #[test]
    fn test_backend_error_passes_through() {
        let mux = mux();
        let err = mux.open("one/missing.txt").unwrap_err();
        // MemoryFs reports the backend-relative key, not the mux path
        assert!(matches!(err, VfsError::NotFound(ref p) if p == "missing.txt"));
    }

    #[test]
    fn test_root_listing() {
        let mux = mux();
        assert_eq!(names(mux.read_dir(".").unwrap()), ["one", "two"]);
        assert_eq!(names(mux.read_dir("").unwrap()), ["one", "two"]);
        assert_eq!(names(mux.read_dir("/").unwrap()), ["one", "two"]);
    }

    #[test]
    fn test_root_stat() {
        let mux = mux();
        let attr = mux.stat(".").unwrap();
        assert_eq!(attr.name, ".");
        assert!(attr.is_dir());
    }

    #[test]
    fn test_mount_root_listing() {
        let mux = mux();
        assert_eq!(names(mux.read_dir("one").unwrap()), ["dir", "foo.txt"]);
        assert!(mux.stat("one/").unwrap().is_dir());
    }

    #[test]
    fn test_read_dir_on_file() {
        let mux = mux();
        assert!(matches!(
            mux.read_dir("one/foo.txt"),
            Err(VfsError::NotADirectory(_))
        ));
    }

    #[test]
    fn test_unknown_mount() {
        let mux = mux();
        assert!(mux.open("three").unwrap_err().is_not_found());
        assert!(mux.open("three/foo.txt").unwrap_err().is_not_found());
    }

    #[test]
    fn test_nested_multiplexer() {
        let inner = MultiFs::new();
        inner
            .mount("leaf", MemoryFs::new().with_file("x.txt", b"deep"))
            .unwrap();

        let outer = MultiFs::new();
        outer.mount("inner", inner).unwrap();

        assert_eq!(read_file(&outer, "inner/leaf/x.txt").unwrap(), b"deep");
        assert_eq!(names(outer.read_dir("inner").unwrap()), ["leaf"]);
    }

    #[test]
    fn test_instances_are_independent() {
        let a = MultiFs::new();
        let b = MultiFs::new();
        a.mount("one", MemoryFs::new()).unwrap();

        assert!(a.is_mounted("one"));
        assert!(!b.is_mounted("one"));
        assert!(b.is_empty());
    }
}
