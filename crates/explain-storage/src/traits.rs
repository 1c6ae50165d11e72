//! The storage seam behind [`TopicQueue`](crate::TopicQueue).
//!
//! The queue itself owns parsing, validation and serialization; a backend
//! only moves one opaque document in and out. Tests substitute
//! [`MemoryStore`](crate::MemoryStore) for the file backend.

use crate::error::Result;

/// Where a serialized queue document is kept.
pub trait QueueStorage {
    /// Human-readable location used in error messages and logs.
    fn location(&self) -> String;

    /// Returns the stored document, or `None` if nothing has been saved yet.
    fn load_raw(&self) -> Result<Option<String>>;

    /// Replaces the stored document. Implementations must never leave a
    /// partially written document behind.
    fn save_raw(&self, contents: &str) -> Result<()>;
}
