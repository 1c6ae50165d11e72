//! Queue error types.

use explain_core::TopicState;

/// Errors raised by the queue and its storage backends.
#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    /// The persisted queue could not be read, parsed or written.
    #[error("queue store {path}: {reason}")]
    Persistence {
        /// Where the queue lives (a file path, or `memory`).
        path: String,
        /// Underlying error description.
        reason: String,
    },

    /// No topic with this key is queued.
    #[error("unknown topic: {key}")]
    UnknownTopic {
        /// Canonical key that was looked up.
        key: String,
    },

    /// The topic is not in a state that allows the transition.
    #[error("topic {key} cannot move from {from} to {to}")]
    InvalidTransition {
        key: String,
        from: TopicState,
        to: TopicState,
    },

    /// There are no pending topics.
    #[error("nothing to explore: no pending topics")]
    EmptyQueue,
}

/// Convenience alias used throughout the storage crate.
pub type Result<T> = std::result::Result<T, QueueError>;

impl QueueError {
    // -- Constructors --------------------------------------------------------

    /// Creates a [`QueueError::Persistence`] for `path`.
    pub fn persistence(path: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::Persistence {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Creates a [`QueueError::UnknownTopic`].
    pub fn unknown_topic(key: impl Into<String>) -> Self {
        Self::UnknownTopic { key: key.into() }
    }

    // -- Predicates ----------------------------------------------------------

    /// Returns `true` if this is [`QueueError::EmptyQueue`].
    pub fn is_empty_queue(&self) -> bool {
        matches!(self, Self::EmptyQueue)
    }

    /// Returns `true` if the persisted store is corrupt or unwritable.
    pub fn is_persistence(&self) -> bool {
        matches!(self, Self::Persistence { .. })
    }

    /// Returns `true` for errors that indicate a broken queue invariant
    /// rather than a user-facing condition.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            Self::UnknownTopic { .. } | Self::InvalidTransition { .. }
        )
    }
}
