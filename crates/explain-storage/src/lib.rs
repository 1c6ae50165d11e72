//! Persistence for the explain exploration queue.
//!
//! [`TopicQueue`] holds the queue in memory and enforces its invariants;
//! a [`QueueStorage`] backend ([`JsonFileStore`] or [`MemoryStore`]) moves
//! the serialized document to and from wherever it lives.

pub mod error;
pub mod file;
pub mod memory;
pub mod queue;
pub mod traits;

pub use error::{QueueError, Result};
pub use file::{JsonFileStore, QUEUE_FILE_NAME};
pub use memory::MemoryStore;
pub use queue::{QueueCounts, TopicQueue};
pub use traits::QueueStorage;
