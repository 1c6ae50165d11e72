//! Session orchestration for the explain exploration queue.
//!
//! A [`Session`] wraps a loaded [`TopicQueue`](explain_storage::TopicQueue)
//! for one command: seeding it from a user-chosen target, or taking the next
//! pending topic through the dispatcher and an [`Explainer`].

pub mod error;
pub mod explainer;
pub mod session;

pub use error::{ExplainError, Result, SessionError};
pub use explainer::{Explainer, Explanation};
pub use session::{NextOutcome, SeedOutcome, Session};
