//! [`MemoryStore`] -- in-process queue storage for tests and dry runs.

use std::cell::{Cell, RefCell};

use crate::error::Result;
use crate::traits::QueueStorage;

/// Keeps the serialized document in memory and counts writes.
#[derive(Debug, Default)]
pub struct MemoryStore {
    contents: RefCell<Option<String>>,
    writes: Cell<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `contents`.
    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            contents: RefCell::new(Some(contents.into())),
            writes: Cell::new(0),
        }
    }

    /// The last saved document.
    pub fn contents(&self) -> Option<String> {
        self.contents.borrow().clone()
    }

    /// Number of successful `save_raw` calls.
    pub fn writes(&self) -> usize {
        self.writes.get()
    }
}

impl QueueStorage for MemoryStore {
    fn location(&self) -> String {
        "memory".to_string()
    }

    fn load_raw(&self) -> Result<Option<String>> {
        Ok(self.contents.borrow().clone())
    }

    fn save_raw(&self, contents: &str) -> Result<()> {
        *self.contents.borrow_mut() = Some(contents.to_string());
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}
