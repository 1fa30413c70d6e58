//! Core VFS types.
//!
//! Metadata and directory entries are plain values. Entries fabricated by the
//! multiplexer use [`FileAttr::synthetic_dir`]; entries that come out of a
//! backend are passed along untouched.

use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// Permission bits reported for every synthetic directory (r-x for all).
pub const SYNTHETIC_DIR_PERM: u32 = 0o555;

/// File type enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileType {
    /// Regular file.
    File,
    /// Directory.
    Directory,
    /// Symbolic link.
    Symlink,
}

impl FileType {
    /// Returns true if this is a regular file.
    pub fn is_file(&self) -> bool {
        matches!(self, FileType::File)
    }

    /// Returns true if this is a directory.
    pub fn is_dir(&self) -> bool {
        matches!(self, FileType::Directory)
    }

    /// Returns true if this is a symbolic link.
    pub fn is_symlink(&self) -> bool {
        matches!(self, FileType::Symlink)
    }

    /// The `S_IFMT` bits for this type.
    pub fn format_bits(&self) -> u32 {
        match self {
            FileType::File => 0o100000,
            FileType::Directory => 0o040000,
            FileType::Symlink => 0o120000,
        }
    }
}

/// File attributes (metadata).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileAttr {
    /// Base name of the file (not the full path).
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// File type.
    pub kind: FileType,
    /// Unix permissions (e.g., 0o644).
    pub perm: u32,
    /// Last modification time.
    pub mtime: SystemTime,
}

impl FileAttr {
    /// Attributes for a regular file.
    pub fn file(name: impl Into<String>, size: u64, perm: u32, mtime: SystemTime) -> Self {
        Self {
            name: name.into(),
            size,
            kind: FileType::File,
            perm,
            mtime,
        }
    }

    /// Attributes for a directory.
    pub fn directory(name: impl Into<String>, perm: u32, mtime: SystemTime) -> Self {
        Self {
            name: name.into(),
            size: 0,
            kind: FileType::Directory,
            perm,
            mtime,
        }
    }

    /// Attributes for a directory that exists only in the multiplexer's view:
    /// read-only, empty, and timestamped at the epoch.
    pub fn synthetic_dir(name: impl Into<String>) -> Self {
        Self::directory(name, SYNTHETIC_DIR_PERM, SystemTime::UNIX_EPOCH)
    }

    /// Returns true if this is a regular file.
    pub fn is_file(&self) -> bool {
        self.kind.is_file()
    }

    /// Returns true if this is a directory.
    pub fn is_dir(&self) -> bool {
        self.kind.is_dir()
    }

    /// Returns true if this is a symbolic link.
    pub fn is_symlink(&self) -> bool {
        self.kind.is_symlink()
    }

    /// Full mode word: type bits plus permission bits.
    pub fn mode(&self) -> u32 {
        self.kind.format_bits() | (self.perm & 0o7777)
    }
}

/// Directory entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirEntry {
    /// Entry name (not full path).
    pub name: String,
    /// Entry type.
    pub kind: FileType,
    /// Size in bytes.
    pub size: u64,
    /// Unix permissions.
    pub perm: u32,
    /// Last modification time.
    pub mtime: SystemTime,
}

impl DirEntry {
    /// Entry for a directory fabricated by the multiplexer.
    pub fn synthetic_dir(name: impl Into<String>) -> Self {
        FileAttr::synthetic_dir(name).into()
    }

    /// Returns true if this entry is a directory.
    pub fn is_dir(&self) -> bool {
        self.kind.is_dir()
    }

    /// Full metadata for the entry.
    pub fn info(&self) -> FileAttr {
        FileAttr {
            name: self.name.clone(),
            size: self.size,
            kind: self.kind,
            perm: self.perm,
            mtime: self.mtime,
        }
    }
}

impl From<FileAttr> for DirEntry {
    fn from(attr: FileAttr) -> Self {
        Self {
            name: attr.name,
            kind: attr.kind,
            size: attr.size,
            perm: attr.perm,
            mtime: attr.mtime,
        }
    }
}
