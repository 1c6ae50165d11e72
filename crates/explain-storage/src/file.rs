//! [`JsonFileStore`] -- `topics.json` inside the output directory.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{QueueError, Result};
use crate::traits::QueueStorage;

/// File name of the queue inside an output directory.
pub const QUEUE_FILE_NAME: &str = "topics.json";

/// File-backed queue storage.
///
/// Saves write a sibling temp file, fsync it and rename it over the old
/// document, so readers only ever see a complete snapshot.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Storage at an explicit file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Storage at `<output_dir>/topics.json`.
    pub fn in_dir(output_dir: impl AsRef<Path>) -> Self {
        Self::new(output_dir.as_ref().join(QUEUE_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn error(&self, reason: impl std::fmt::Display) -> QueueError {
        QueueError::persistence(self.location(), reason)
    }
}

impl QueueStorage for JsonFileStore {
    fn location(&self) -> String {
        self.path.display().to_string()
    }

    fn load_raw(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no queue file yet");
                Ok(None)
            }
            Err(e) => Err(self.error(format!("failed to read: {e}"))),
        }
    }

    fn save_raw(&self, contents: &str) -> Result<()> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)
            .map_err(|e| self.error(format!("failed to create {}: {e}", dir.display())))?;

        let mut tmp = NamedTempFile::new_in(&dir)
            .map_err(|e| self.error(format!("failed to create temp file: {e}")))?;
        tmp.write_all(contents.as_bytes())
            .map_err(|e| self.error(format!("failed to write temp file: {e}")))?;
        tmp.as_file()
            .sync_all()
            .map_err(|e| self.error(format!("failed to sync temp file: {e}")))?;
        tmp.persist(&self.path)
            .map_err(|e| self.error(format!("failed to replace queue file: {}", e.error)))?;

        debug!(path = %self.path.display(), bytes = contents.len(), "queue file written");
        Ok(())
    }
}
