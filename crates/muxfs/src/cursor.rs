//! Buffered directory cursor.

use super::error::{VfsError, VfsResult};
use super::types::DirEntry;

/// Ordered buffer of entries plus a read position.
///
/// Backs every directory handle that enumerates a fixed list: the global
/// root, a mount's root, and the bundled backends' own directories.
#[derive(Debug, Clone, Default)]
pub struct DirCursor {
    entries: Vec<DirEntry>,
    pos: usize,
}

impl DirCursor {
    pub fn new(entries: Vec<DirEntry>) -> Self {
        Self { entries, pos: 0 }
    }

    /// Entries not yet handed out.
    pub fn remaining(&self) -> usize {
        self.entries.len().saturating_sub(self.pos)
    }

    /// Read up to `n` entries, or everything left when `n <= 0`.
    ///
    /// Asking for a positive count once exhausted fails with
    /// [`VfsError::EndOfDirectory`]; asking for "all" returns an empty batch.
    pub fn read(&mut self, n: isize) -> VfsResult<Vec<DirEntry>> {
        let remaining = self.remaining();
        if remaining == 0 && n > 0 {
            return Err(VfsError::EndOfDirectory);
        }

        let take = if n <= 0 {
            remaining
        } else {
            remaining.min(n as usize)
        };

        let batch = self.entries[self.pos..self.pos + take].to_vec();
        self.pos += take;
        Ok(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cursor(names: &[&str]) -> DirCursor {
        DirCursor::new(names.iter().map(|n| DirEntry::synthetic_dir(*n)).collect())
    }

    fn names(entries: &[DirEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn test_read_all() {
        let mut c = cursor(&["a", "b", "c"]);
        assert_eq!(names(&c.read(-1).unwrap()), ["a", "b", "c"]);
        assert_eq!(c.remaining(), 0);
    }

    #[test]
    fn test_partial_reads_advance() {
        let mut c = cursor(&["a", "b", "c"]);
        assert_eq!(names(&c.read(2).unwrap()), ["a", "b"]);
        assert_eq!(names(&c.read(2).unwrap()), ["c"]);
        assert!(matches!(c.read(2), Err(VfsError::EndOfDirectory)));
    }

    #[test]
    fn test_mixed_partial_then_all() {
        let mut c = cursor(&["a", "b", "c"]);
        assert_eq!(names(&c.read(1).unwrap()), ["a"]);
        assert_eq!(names(&c.read(0).unwrap()), ["b", "c"]);
    }

    #[test]
    fn test_exhausted_asymmetry() {
        let mut c = cursor(&["a"]);
        c.read(0).unwrap();

        // "all" on an exhausted cursor is an empty batch, every time
        assert!(c.read(0).unwrap().is_empty());
        assert!(c.read(-5).unwrap().is_empty());

        // a positive count is the end signal, every time
        assert!(matches!(c.read(1), Err(VfsError::EndOfDirectory)));
        assert!(matches!(c.read(1), Err(VfsError::EndOfDirectory)));
    }

    #[test]
    fn test_empty_cursor() {
        let mut c = DirCursor::default();
        assert!(c.read(-1).unwrap().is_empty());
        assert!(c.read(1).unwrap_err().is_end_of_directory());
    }
}
