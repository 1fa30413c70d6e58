//! Bundled backends.
//!
//! Backends implement [`FileSystem`](crate::FileSystem) for different
//! storage types. Any other implementation mounts the same way.

mod local;
mod memory;

pub use local::LocalFs;
pub use memory::MemoryFs;
