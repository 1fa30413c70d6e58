//! Backend capability traits.
//!
//! A backend is anything that can open a slash-separated relative path and
//! hand back a [`File`]. Directory handles additionally expose
//! [`ReadDirFile`]. The multiplexer only ever calls these traits, so any
//! storage (in-memory, on-disk, networked) mounts the same way.

use std::fmt;
use std::io::SeekFrom;

use super::error::{VfsError, VfsResult};
use super::types::{DirEntry, FileAttr};

/// Read-only hierarchical filesystem.
///
/// Paths handed to a backend by the multiplexer are always cleaned: no
/// leading or trailing `/`, no `.` or `..` segments, and `"."` for the
/// backend's own root.
pub trait FileSystem: Send + Sync {
    /// Open a file or directory.
    fn open(&self, path: &str) -> VfsResult<Box<dyn File>>;

    // ========================================================================
    // Convenience methods (default implementations)
    // ========================================================================

    /// Get attributes: open, stat, close.
    fn stat(&self, path: &str) -> VfsResult<FileAttr> {
        let mut file = self.open(path)?;
        let attr = file.stat()?;
        file.close()?;
        Ok(attr)
    }

    /// List a whole directory: open, read everything, close.
    ///
    /// Fails with [`VfsError::NotADirectory`] if the opened handle cannot
    /// enumerate entries.
    fn read_dir(&self, path: &str) -> VfsResult<Vec<DirEntry>> {
        let mut file = self.open(path)?;
        let entries = match file.as_read_dir() {
            Some(dir) => dir.read_dir(-1)?,
            None => return Err(VfsError::not_a_directory(path)),
        };
        file.close()?;
        Ok(entries)
    }
}

/// An open file or directory handle.
///
/// Handles are single-owner and not meant to be shared across threads while
/// in use; every `open` returns independent state.
pub trait File: Send + fmt::Debug {
    /// Attributes of the opened file.
    fn stat(&self) -> VfsResult<FileAttr>;

    /// Read bytes at the current position. Returns 0 at end of file.
    fn read(&mut self, buf: &mut [u8]) -> VfsResult<usize>;

    /// Reposition the read cursor.
    fn seek(&mut self, pos: SeekFrom) -> VfsResult<u64> {
        let _ = pos;
        Err(VfsError::unsupported("seek"))
    }

    /// Release the handle. Dropping the handle has the same effect.
    fn close(&mut self) -> VfsResult<()> {
        Ok(())
    }

    /// Directory view of this handle, if it is a directory.
    fn as_read_dir(&mut self) -> Option<&mut dyn ReadDirFile> {
        None
    }
}

/// Resumable directory enumeration.
pub trait ReadDirFile: Send {
    /// Read directory entries.
    ///
    /// - `n <= 0`: every remaining entry, possibly none.
    /// - `n > 0`: up to `n` entries; once the handle is exhausted this fails
    ///   with [`VfsError::EndOfDirectory`] on every call.
    fn read_dir(&mut self, n: isize) -> VfsResult<Vec<DirEntry>>;
}

/// Read an entire file through a [`FileSystem`].
pub fn read_file<F: FileSystem + ?Sized>(fs: &F, path: &str) -> VfsResult<Vec<u8>> {
    let mut file = fs.open(path)?;
    let attr = file.stat()?;
    if attr.is_dir() {
        return Err(VfsError::is_a_directory(path));
    }

    let mut data = Vec::with_capacity(attr.size as usize);
    let mut buf = [0u8; 8192];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buf[..n]);
    }
    file.close()?;
    Ok(data)
}
