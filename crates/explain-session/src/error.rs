//! Session and explainer error types.

use explain_core::{DispatchError, NormalizeError};
use explain_storage::QueueError;

/// Failures of an [`Explainer`](crate::Explainer) call.
///
/// Every variant leaves the topic being explained pending.
#[derive(Debug, thiserror::Error)]
pub enum ExplainError {
    /// The model CLI could not be run or exited unsuccessfully.
    #[error("model '{model}' failed: {reason}")]
    Model { model: String, reason: String },

    /// Reading inputs or writing the explanation failed.
    #[error("{context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// A git command needed to build the prompt failed.
    #[error("git: {0}")]
    Git(String),

    /// The target exists but there is nothing to explain (e.g. no staged
    /// changes, or the symbol was not found).
    #[error("nothing to explain: {0}")]
    NothingToExplain(String),
}

impl ExplainError {
    pub fn model(model: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Model {
            model: model.into(),
            reason: reason.into(),
        }
    }

    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Returns `true` if running the same topic again may succeed without
    /// the user changing anything.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Model { .. } | Self::Io { .. } | Self::Git(_))
    }
}

/// Errors surfaced by [`Session`](crate::Session) operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Queue(#[from] QueueError),

    /// The topic's kind cannot be dispatched; it stays pending.
    #[error(transparent)]
    Unroutable(#[from] DispatchError),

    /// A seed target could not be normalized.
    #[error("invalid {kind} target '{target}'")]
    InvalidTarget {
        kind: String,
        target: String,
        #[source]
        source: NormalizeError,
    },

    /// The explanation call failed; the topic stays pending.
    #[error("explaining {key} failed")]
    ExplanationFailed {
        key: String,
        #[source]
        source: ExplainError,
    },
}

/// Convenience alias used throughout the session crate.
pub type Result<T> = std::result::Result<T, SessionError>;

impl SessionError {
    /// Returns `true` if the queue had nothing pending.
    pub fn is_empty_queue(&self) -> bool {
        matches!(self, Self::Queue(e) if e.is_empty_queue())
    }

    pub fn is_unroutable(&self) -> bool {
        matches!(self, Self::Unroutable(_))
    }

    pub fn is_explanation_failed(&self) -> bool {
        matches!(self, Self::ExplanationFailed { .. })
    }
}
