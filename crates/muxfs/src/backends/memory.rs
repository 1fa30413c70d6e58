//! In-memory filesystem backend.
//!
//! Used for testing and for small fixed trees. All data is ephemeral. Parent
//! directories are implied by the files added under them.

use std::collections::HashMap;
use std::io::{self, SeekFrom};
use std::sync::{Arc, RwLock};
use std::time::SystemTime;

use crate::cursor::DirCursor;
use crate::error::{VfsError, VfsResult};
use crate::ops::{File, FileSystem, ReadDirFile};
use crate::path::{self, MOUNT_ROOT, SEPARATOR};
use crate::types::{DirEntry, FileAttr};

/// Entry in the memory filesystem.
#[derive(Debug, Clone)]
enum Entry {
    File { data: Arc<[u8]>, attr: FileAttr },
    Directory { attr: FileAttr },
}

impl Entry {
    fn attr(&self) -> &FileAttr {
        match self {
            Entry::File { attr, .. } => attr,
            Entry::Directory { attr } => attr,
        }
    }
}

/// In-memory filesystem backend.
///
/// Thread-safe via internal `RwLock`. Content can be added while the
/// backend is mounted; open handles keep the data they were opened with.
#[derive(Debug)]
pub struct MemoryFs {
    entries: RwLock<HashMap<String, Entry>>,
}

impl Default for MemoryFs {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryFs {
    /// Create a new empty in-memory filesystem.
    pub fn new() -> Self {
        let mut entries = HashMap::new();
        // Root directory always exists
        entries.insert(
            MOUNT_ROOT.to_string(),
            Entry::Directory {
                attr: FileAttr::directory(MOUNT_ROOT, 0o755, SystemTime::now()),
            },
        );
        Self {
            entries: RwLock::new(entries),
        }
    }

    /// Builder form of [`MemoryFs::add_file`].
    ///
    /// # Panics
    ///
    /// Panics if a parent of `path` is already a file.
    pub fn with_file(self, path: &str, data: impl AsRef<[u8]>) -> Self {
        if let Err(e) = self.add_file(path, data) {
            panic!("MemoryFs::with_file({path:?}): {e}");
        }
        self
    }

    /// Builder form of [`MemoryFs::add_dir`].
    ///
    /// # Panics
    ///
    /// Panics if `path` or one of its parents is already a file.
    pub fn with_dir(self, path: &str) -> Self {
        if let Err(e) = self.add_dir(path) {
            panic!("MemoryFs::with_dir({path:?}): {e}");
        }
        self
    }

    /// Add or replace a file, creating parent directories as needed.
    pub fn add_file(&self, path: &str, data: impl AsRef<[u8]>) -> VfsResult<()> {
        let key = Self::normalize(path)?;
        if key == MOUNT_ROOT {
            return Err(VfsError::is_a_directory(path));
        }

        let mut entries = self
            .entries
            .write()
            .map_err(|_| VfsError::other("lock poisoned"))?;
        Self::ensure_parents(&mut entries, &key)?;

        if let Some(Entry::Directory { .. }) = entries.get(&key) {
            return Err(VfsError::is_a_directory(key));
        }

        let data: Arc<[u8]> = Arc::from(data.as_ref());
        let attr = FileAttr::file(
            Self::base_name(&key),
            data.len() as u64,
            0o444,
            SystemTime::now(),
        );
        entries.insert(key, Entry::File { data, attr });
        Ok(())
    }

    /// Add a directory, creating parent directories as needed.
    pub fn add_dir(&self, path: &str) -> VfsResult<()> {
        let key = Self::normalize(path)?;
        let mut entries = self
            .entries
            .write()
            .map_err(|_| VfsError::other("lock poisoned"))?;
        Self::ensure_parents(&mut entries, &key)?;

        match entries.get(&key) {
            Some(Entry::Directory { .. }) => Ok(()),
            Some(Entry::File { .. }) => Err(VfsError::not_a_directory(key)),
            None => {
                let attr = FileAttr::directory(Self::base_name(&key), 0o555, SystemTime::now());
                entries.insert(key, Entry::Directory { attr });
                Ok(())
            }
        }
    }

    /// Remove a file or a directory with everything under it.
    pub fn remove(&self, path: &str) -> VfsResult<()> {
        let key = Self::normalize(path)?;
        if key == MOUNT_ROOT {
            return Err(VfsError::other("cannot remove root"));
        }

        let mut entries = self
            .entries
            .write()
            .map_err(|_| VfsError::other("lock poisoned"))?;
        if entries.remove(&key).is_none() {
            return Err(VfsError::not_found(key));
        }
        let prefix = format!("{key}{SEPARATOR}");
        entries.retain(|k, _| !k.starts_with(&prefix));
        Ok(())
    }

    /// Normalize to a clean relative key; the root is `"."`.
    fn normalize(path: &str) -> VfsResult<String> {
        let cleaned = path::clean(path);
        let relative = cleaned.trim_start_matches(SEPARATOR);
        if relative == ".." || relative.starts_with("../") {
            return Err(VfsError::not_found(path));
        }
        if relative.is_empty() {
            Ok(MOUNT_ROOT.to_string())
        } else {
            Ok(relative.to_string())
        }
    }

    /// Parent key of a non-root key.
    fn parent(key: &str) -> &str {
        key.rsplit_once(SEPARATOR)
            .map(|(parent, _)| parent)
            .unwrap_or(MOUNT_ROOT)
    }

    fn base_name(key: &str) -> &str {
        key.rsplit_once(SEPARATOR)
            .map(|(_, name)| name)
            .unwrap_or(key)
    }

    /// Ensure all parent directories exist.
    fn ensure_parents(entries: &mut HashMap<String, Entry>, key: &str) -> VfsResult<()> {
        let mut current = String::new();
        let Some((parents, _)) = key.rsplit_once(SEPARATOR) else {
            return Ok(());
        };

        for segment in parents.split(SEPARATOR) {
            if !current.is_empty() {
                current.push(SEPARATOR);
            }
            current.push_str(segment);

            match entries.get(&current) {
                Some(Entry::Directory { .. }) => {}
                Some(Entry::File { .. }) => return Err(VfsError::not_a_directory(current)),
                None => {
                    let attr = FileAttr::directory(segment, 0o555, SystemTime::now());
                    entries.insert(current.clone(), Entry::Directory { attr });
                }
            }
        }
        Ok(())
    }

    /// Direct children of `dir`, sorted by name.
    fn children(entries: &HashMap<String, Entry>, dir: &str) -> Vec<DirEntry> {
        let mut result: Vec<DirEntry> = entries
            .iter()
            .filter(|(key, _)| key.as_str() != MOUNT_ROOT && Self::parent(key) == dir)
            .map(|(_, entry)| entry.attr().clone().into())
            .collect();

        // Sort for consistent ordering
        result.sort_by(|a, b| a.name.cmp(&b.name));
        result
    }
}

impl FileSystem for MemoryFs {
    fn open(&self, path: &str) -> VfsResult<Box<dyn File>> {
        let key = Self::normalize(path)?;
        let entries = self
            .entries
            .read()
            .map_err(|_| VfsError::other("lock poisoned"))?;

        match entries.get(&key) {
            Some(Entry::File { data, attr }) => Ok(Box::new(MemoryFile {
                attr: attr.clone(),
                data: Arc::clone(data),
                pos: 0,
            })),
            Some(Entry::Directory { attr }) => Ok(Box::new(MemoryDir {
                attr: attr.clone(),
                cursor: DirCursor::new(Self::children(&entries, &key)),
            })),
            None => Err(VfsError::not_found(key)),
        }
    }
}

/// Open file in a [`MemoryFs`].
#[derive(Debug)]
struct MemoryFile {
    attr: FileAttr,
    data: Arc<[u8]>,
    pos: u64,
}

impl File for MemoryFile {
    fn stat(&self) -> VfsResult<FileAttr> {
        Ok(self.attr.clone())
    }

    fn read(&mut self, buf: &mut [u8]) -> VfsResult<usize> {
        let start = (self.pos as usize).min(self.data.len());
        let end = (start + buf.len()).min(self.data.len());
        let n = end - start;
        buf[..n].copy_from_slice(&self.data[start..end]);
        self.pos += n as u64;
        Ok(n)
    }

    fn seek(&mut self, pos: SeekFrom) -> VfsResult<u64> {
        let target = match pos {
            SeekFrom::Start(offset) => Some(offset),
            SeekFrom::End(offset) => (self.data.len() as u64).checked_add_signed(offset),
            SeekFrom::Current(offset) => self.pos.checked_add_signed(offset),
        };
        let target = target.ok_or_else(|| {
            VfsError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                "seek to a negative offset",
            ))
        })?;
        self.pos = target;
        Ok(target)
    }
}

/// Open directory in a [`MemoryFs`]. Children are captured at open time.
#[derive(Debug)]
struct MemoryDir {
    attr: FileAttr,
    cursor: DirCursor,
}

impl File for MemoryDir {
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

impl ReadDirFile for MemoryDir {
    fn read_dir(&mut self, n: isize) -> VfsResult<Vec<DirEntry>> {
        self.cursor.read(n)
    }
}
