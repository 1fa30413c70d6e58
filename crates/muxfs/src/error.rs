//! Error types shared by the multiplexer and its backends.

use std::io;
use thiserror::Error;

/// VFS error type.
#[derive(Debug, Error)]
pub enum VfsError {
    /// File, directory, or mount not found.
    ///
    /// Also returned for paths that would escape the virtual root, so callers
    /// see one "does not exist" class for both.
    #[error("not found: {0}")]
    NotFound(String),

    /// Mount identifier is empty or spans more than one path segment.
    #[error("invalid mount identifier: {0:?}")]
    InvalidIdentifier(String),

    /// Mount was attempted without a backend.
    #[error("no backend given for mount {0:?}")]
    NilBackend(String),

    /// Expected a directory.
    #[error("not a directory: {0}")]
    NotADirectory(String),

    /// Expected a file.
    #[error("is a directory: {0}")]
    IsADirectory(String),

    /// A directory handle has no more entries to hand out.
    #[error("end of directory")]
    EndOfDirectory,

    /// Operation not supported by this handle.
    #[error("unsupported operation: {0}")]
    Unsupported(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Other error.
    #[error("{0}")]
    Other(String),
}

impl VfsError {
    /// Create a NotFound error.
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound(path.into())
    }

    /// Create an InvalidIdentifier error.
    pub fn invalid_identifier(id: impl Into<String>) -> Self {
        Self::InvalidIdentifier(id.into())
    }

    /// Create a NotADirectory error.
    pub fn not_a_directory(path: impl Into<String>) -> Self {
        Self::NotADirectory(path.into())
    }

    /// Create an IsADirectory error.
    pub fn is_a_directory(path: impl Into<String>) -> Self {
        Self::IsADirectory(path.into())
    }

    /// Create an Unsupported error.
    pub fn unsupported(op: impl Into<String>) -> Self {
        Self::Unsupported(op.into())
    }

    /// Create an Other error.
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// True for anything in the "does not exist" class, whether raised by the
    /// multiplexer itself or surfaced from a backend's I/O layer.
    pub fn is_not_found(&self) -> bool {
        match self {
            VfsError::NotFound(_) => true,
            VfsError::Io(e) => e.kind() == io::ErrorKind::NotFound,
            _ => false,
        }
    }

    /// True for the end-of-sequence signal raised by directory reads.
    pub fn is_end_of_directory(&self) -> bool {
        matches!(self, VfsError::EndOfDirectory)
    }
}

/// Convert VfsError to std::io::Error for compatibility.
impl From<VfsError> for io::Error {
    fn from(e: VfsError) -> Self {
        match e {
            VfsError::NotFound(msg) => io::Error::new(io::ErrorKind::NotFound, msg),
            VfsError::InvalidIdentifier(id) => io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid mount identifier: {id:?}"),
            ),
            VfsError::NilBackend(id) => io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("no backend given for mount {id:?}"),
            ),
            VfsError::NotADirectory(msg) => io::Error::new(io::ErrorKind::NotADirectory, msg),
            VfsError::IsADirectory(msg) => io::Error::new(io::ErrorKind::IsADirectory, msg),
            VfsError::EndOfDirectory => {
                io::Error::new(io::ErrorKind::UnexpectedEof, "end of directory")
            }
            VfsError::Unsupported(msg) => io::Error::new(io::ErrorKind::Unsupported, msg),
            VfsError::Io(e) => e,
            VfsError::Other(msg) => io::Error::other(msg),
        }
    }
}

/// VFS result type.
pub type VfsResult<T> = Result<T, VfsError>;
