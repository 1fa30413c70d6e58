//! # muxfs
//!
//! A read-only filesystem multiplexer. Independent backends are mounted
//! under string identifiers and browsed through one namespace:
//! `"<id>/<path>"` resolves to `<path>` inside the backend mounted as `<id>`.
//!
//! Key components:
//!
//! - [`FileSystem`] / [`File`] / [`ReadDirFile`] - what a backend provides
//! - [`MountTable`] - identifier → backend, behind one reader/writer lock
//! - [`path::split`] - turns caller paths into a mount id and subpath
//! - [`RootDir`] / [`MountRootDir`] - the synthetic directories
//! - [`MultiFs`] - the façade tying it together
//! - [`MemoryFs`] / [`LocalFs`] - bundled backends
//!
//! ```
//! use muxfs::{FileSystem, MemoryFs, MultiFs, read_file};
//!
//! let mux = MultiFs::new();
//! mux.mount("one", MemoryFs::new().with_file("dir/file.txt", b"hello"))?;
//!
//! assert_eq!(read_file(&mux, "one/dir/file.txt")?, b"hello");
//! assert_eq!(mux.read_dir(".")?[0].name, "one");
//! # Ok::<(), muxfs::VfsError>(())
//! ```

pub mod backends;
pub mod config;
mod cursor;
mod error;
mod mount;
mod multi;
mod ops;
pub mod path;
mod root;
mod types;

pub use backends::{LocalFs, MemoryFs};
pub use config::{ConfigError, MountConfig, MuxConfig, expand_home};
pub use cursor::DirCursor;
pub use error::{VfsError, VfsResult};
pub use mount::{MountInfo, MountTable, validate_id};
pub use multi::MultiFs;
pub use ops::{File, FileSystem, ReadDirFile, read_file};
pub use path::ResolvedPath;
pub use root::{MountRootDir, RootDir};
pub use types::{DirEntry, FileAttr, FileType, SYNTHETIC_DIR_PERM};
