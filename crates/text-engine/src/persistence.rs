//! Whole-file persistence backends.
//!
//! Buffers read and write their content through a [`FileSystem`], each call handling the full
//! content at once. [`LocalFileSystem`] goes to disk; [`MemoryFileSystem`] keeps files in memory
//! for scratch sessions and tests.

use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

/// Whole-content file access.
pub trait FileSystem: Send + Sync + fmt::Debug {
    /// Read the complete file.
    fn read_file(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Replace the file with `bytes`, returning the number of bytes written.
    fn write_file(&self, path: &Path, bytes: &[u8]) -> io::Result<usize>;
}

/// The local disk via `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileSystem;

impl FileSystem for LocalFileSystem {
    fn read_file(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }

    fn write_file(&self, path: &Path, bytes: &[u8]) -> io::Result<usize> {
        std::fs::write(path, bytes)?;
        Ok(bytes.len())
    }
}

/// In-memory files, with counters and an optional read-only switch.
#[derive(Default)]
pub struct MemoryFileSystem {
    files: Mutex<HashMap<PathBuf, Vec<u8>>>,
    writes: AtomicUsize,
    read_only: Mutex<bool>,
}

impl MemoryFileSystem {
    /// Empty file system.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a file.
    pub fn insert(&self, path: impl Into<PathBuf>, content: impl Into<Vec<u8>>) {
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.into(), content.into());
    }

    /// Content of a file, if present.
    pub fn contents(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path.as_ref())
            .cloned()
    }

    /// Successful writes so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Make every write fail with `PermissionDenied`.
    pub fn set_read_only(&self, read_only: bool) {
        *self.read_only.lock().unwrap_or_else(PoisonError::into_inner) = read_only;
    }
}

impl fmt::Debug for MemoryFileSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let files = self.files.lock().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("MemoryFileSystem")
            .field("files", &files.keys().collect::<Vec<_>>())
            .field("writes", &self.write_count())
            .finish()
    }
}

impl FileSystem for MemoryFileSystem {
    fn read_file(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.contents(path)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such file"))
    }

    fn write_file(&self, path: &Path, bytes: &[u8]) -> io::Result<usize> {
        if *self.read_only.lock().unwrap_or_else(PoisonError::into_inner) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "read-only file system",
            ));
        }
        self.insert(path, bytes);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(bytes.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_round_trip() {
        let fs = MemoryFileSystem::new();
        assert_eq!(fs.write_file(Path::new("a.txt"), b"hi").unwrap(), 2);
        assert_eq!(fs.read_file(Path::new("a.txt")).unwrap(), b"hi");
        assert_eq!(fs.write_count(), 1);
    }

    #[test]
    fn test_memory_missing_file() {
        let fs = MemoryFileSystem::new();
        let err = fs.read_file(Path::new("nope")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_memory_read_only() {
        let fs = MemoryFileSystem::new();
        fs.set_read_only(true);
        let err = fs.write_file(Path::new("a"), b"x").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
        assert_eq!(fs.write_count(), 0);
        assert!(fs.contents("a").is_none());
    }

    #[test]
    fn test_local_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("file.txt");
        let fs = LocalFileSystem;
        assert_eq!(fs.write_file(&path, "héllo".as_bytes()).unwrap(), 6);
        assert_eq!(fs.read_file(&path).unwrap(), "héllo".as_bytes());
    }
}
