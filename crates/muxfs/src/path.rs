//! Lexical path handling for the multiplexed namespace.
//!
//! Paths use `/` as the only separator on every platform. Nothing in here
//! touches a backend: [`clean`] is purely textual and [`split`] only decides
//! which mount identifier a path names. Checking that the identifier is
//! actually mounted is the caller's job.

use super::error::{VfsError, VfsResult};

/// The one path separator.
pub const SEPARATOR: char = '/';

/// Subpath handed to a backend for its own root.
pub const MOUNT_ROOT: &str = ".";

/// Where a path points inside the multiplexer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedPath {
    /// The synthetic global root listing every mount.
    Root,
    /// Something under mount `id`. `subpath` is [`MOUNT_ROOT`] for the mount
    /// itself, otherwise a clean backend-relative path.
    Mount { id: String, subpath: String },
}

impl ResolvedPath {
    /// True when this addresses a mount's own root directory.
    pub fn is_mount_root(&self) -> bool {
        matches!(self, ResolvedPath::Mount { subpath, .. } if subpath == MOUNT_ROOT)
    }
}

/// Lexically normalize a slash-separated path.
///
/// Collapses repeated separators and `.` segments, resolves `..` against the
/// preceding real segment, and drops trailing separators. A rooted path
/// cannot climb above `/`; an unrooted one keeps its leading `..` segments.
/// The empty path cleans to `"."`.
pub fn clean(path: &str) -> String {
    if path.is_empty() {
        return MOUNT_ROOT.to_string();
    }

    let rooted = path.starts_with(SEPARATOR);
    let mut out: Vec<&str> = Vec::new();
    for segment in path.split(SEPARATOR) {
        match segment {
            "" | "." => {}
            ".." => match out.last() {
                Some(&last) if last != ".." => {
                    out.pop();
                }
                _ if rooted => {}
                _ => out.push(".."),
            },
            _ => out.push(segment),
        }
    }

    let joined = out.join("/");
    if rooted {
        format!("/{joined}")
    } else if joined.is_empty() {
        MOUNT_ROOT.to_string()
    } else {
        joined
    }
}

/// Split a caller path into the root marker or a mount identifier plus
/// backend-relative subpath.
///
/// A single leading `/` is tolerated, so `"/one/file"` and `"one/file"` are
/// the same path. Anything that cleans to `..` or below fails with
/// [`VfsError::NotFound`]. Only the whole cleaned path is checked:
/// `one/sub/../x` is fine (it is `one/x`), and `one/sub/../../other` is
/// simply `other`.
pub fn split(path: &str) -> VfsResult<ResolvedPath> {
    let cleaned = clean(path);
    let name = cleaned.strip_prefix(SEPARATOR).unwrap_or(&cleaned);

    if name.is_empty() || name == MOUNT_ROOT {
        return Ok(ResolvedPath::Root);
    }

    if name == ".." || name.starts_with("../") {
        return Err(VfsError::not_found(path));
    }

    let (id, subpath) = match name.split_once(SEPARATOR) {
        Some((id, rest)) => (id, rest),
        None => (name, MOUNT_ROOT),
    };

    Ok(ResolvedPath::Mount {
        id: id.to_string(),
        subpath: subpath.to_string(),
    })
}
