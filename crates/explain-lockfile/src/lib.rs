//! Advisory lock guarding an output directory's queue.
//!
//! Mutating commands hold a [`QueueLock`] from load to save so two `explain`
//! processes never interleave read-modify-write cycles on one `topics.json`.
//! The lock is `flock(2)` based (via `fs2`), so the OS releases it if the
//! process dies.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use thiserror::Error;
use tracing::debug;

/// File name of the lock inside an output directory.
pub const LOCK_FILE_NAME: &str = "topics.lock";

/// Errors from acquiring the lock.
#[derive(Debug, Error)]
pub enum LockError {
    /// Another process holds the lock.
    #[error("queue is locked by another explain process ({})", path.display())]
    Held { path: PathBuf },

    #[error("failed to lock {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl LockError {
    /// Returns `true` if the lock is held elsewhere.
    pub fn is_held(&self) -> bool {
        matches!(self, Self::Held { .. })
    }
}

/// A specialized `Result` type for lock operations.
pub type Result<T> = std::result::Result<T, LockError>;

/// An exclusive lock on an output directory, released on drop.
#[derive(Debug)]
pub struct QueueLock {
    path: PathBuf,
    _file: File,
}

impl QueueLock {
    /// Takes the lock on `<dir>/topics.lock` without waiting, creating the
    /// directory and lock file if needed.
    pub fn try_acquire(dir: &Path) -> Result<Self> {
        let path = dir.join(LOCK_FILE_NAME);
        let io_err = |source| LockError::Io {
            path: path.clone(),
            source,
        };

        std::fs::create_dir_all(dir).map_err(io_err)?;
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(io_err)?;

        match file.try_lock_exclusive() {
            Ok(()) => {
                debug!(path = %path.display(), "queue lock acquired");
                Ok(Self { path, _file: file })
            }
            Err(e) if is_contended(&e) => Err(LockError::Held { path }),
            Err(e) => Err(io_err(e)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn is_contended(e: &io::Error) -> bool {
    e.kind() == io::ErrorKind::WouldBlock
        || e.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_creates_lock_file() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("explanations");
        let lock = QueueLock::try_acquire(&out).unwrap();
        assert!(lock.path().exists());
        assert_eq!(lock.path(), out.join(LOCK_FILE_NAME));
    }

    #[test]
    fn second_acquire_fails_fast() {
        let dir = tempfile::tempdir().unwrap();
        let _held = QueueLock::try_acquire(dir.path()).unwrap();
        let err = QueueLock::try_acquire(dir.path()).unwrap_err();
        assert!(err.is_held(), "unexpected error: {err}");
    }

    #[test]
    fn released_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        drop(QueueLock::try_acquire(dir.path()).unwrap());
        assert!(QueueLock::try_acquire(dir.path()).is_ok());
    }
}
