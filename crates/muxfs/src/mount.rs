//! Mount table: identifier → backend.
//!
//! One reader/writer lock guards the whole map. Lookups take the shared
//! side; mount and unmount take the exclusive side, so an identifier is
//! always either absent or bound to exactly one backend.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use super::error::{VfsError, VfsResult};
use super::ops::FileSystem;
use super::path::SEPARATOR;

/// Information about a mount point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountInfo {
    /// The mount identifier (first path segment).
    pub id: String,
}

/// Normalize a mount identifier.
///
/// Surrounding separators are trimmed. What is left must be non-empty and a
/// single path segment.
pub fn validate_id(id: &str) -> VfsResult<&str> {
    let trimmed = id.trim_matches(SEPARATOR);
    if trimmed.is_empty() || trimmed.contains(SEPARATOR) {
        return Err(VfsError::invalid_identifier(id));
    }
    Ok(trimmed)
}

/// Concurrency-safe map of mounted backends.
pub struct MountTable {
    mounts: RwLock<HashMap<String, Arc<dyn FileSystem>>>,
}

impl std::fmt::Debug for MountTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut ids = self.snapshot();
        ids.sort();
        f.debug_struct("MountTable").field("mounts", &ids).finish()
    }
}

impl Default for MountTable {
    fn default() -> Self {
        Self::new()
    }
}

impl MountTable {
    /// Create a new empty mount table.
    pub fn new() -> Self {
        Self {
            mounts: RwLock::new(HashMap::new()),
        }
    }

    /// Bind `fs` under `id`, replacing any backend already there.
    ///
    /// Fails with [`VfsError::InvalidIdentifier`] for a bad id and
    /// [`VfsError::NilBackend`] when `fs` is `None`. A failed call leaves the
    /// table untouched.
    pub fn mount(&self, id: &str, fs: Option<Arc<dyn FileSystem>>) -> VfsResult<()> {
        let id = validate_id(id)?;
        let fs = fs.ok_or_else(|| VfsError::NilBackend(id.to_string()))?;

        let replaced = self.mounts.write().insert(id.to_string(), fs).is_some();
        if replaced {
            tracing::debug!(id, "replaced mount");
        } else {
            tracing::debug!(id, "mounted");
        }
        Ok(())
    }

    /// Remove the mount under `id`.
    ///
    /// `id` must match the stored identifier exactly; it is not trimmed the
    /// way [`mount`](Self::mount) trims. Handles already opened from the
    /// backend stay usable; the table only drops its own reference.
    pub fn unmount(&self, id: &str) -> VfsResult<()> {
        match self.mounts.write().remove(id) {
            Some(_) => {
                tracing::debug!(id, "unmounted");
                Ok(())
            }
            None => Err(VfsError::not_found(id)),
        }
    }

    /// Backend mounted under `id`, if any.
    pub fn lookup(&self, id: &str) -> Option<Arc<dyn FileSystem>> {
        self.mounts.read().get(id).cloned()
    }

    /// Returns true if `id` is currently mounted.
    pub fn contains(&self, id: &str) -> bool {
        self.mounts.read().contains_key(id)
    }

    /// Every mounted identifier, copied under one read lock.
    ///
    /// Order is unspecified.
    pub fn snapshot(&self) -> Vec<String> {
        self.mounts.read().keys().cloned().collect()
    }

    /// List all current mounts, sorted by identifier.
    pub fn list_mounts(&self) -> Vec<MountInfo> {
        let mut mounts: Vec<_> = self
            .mounts
            .read()
            .keys()
            .map(|id| MountInfo { id: id.clone() })
            .collect();
        mounts.sort_by(|a, b| a.id.cmp(&b.id));
        mounts
    }

    /// Number of mounts.
    pub fn len(&self) -> usize {
        self.mounts.read().len()
    }

    /// Returns true if nothing is mounted.
    pub fn is_empty(&self) -> bool {
        self.mounts.read().is_empty()
    }
}
