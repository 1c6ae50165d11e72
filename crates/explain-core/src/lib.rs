//! Core types for the explain exploration queue.
//!
//! Explanation text flows through [`parser`] (raw candidates), [`normalize`]
//! (canonical topics with dedup keys) and, once queued, [`dispatch`] (which
//! handler explains a topic).

pub mod dispatch;
pub mod enums;
pub mod normalize;
pub mod parser;
pub mod topic;

pub use dispatch::{DispatchError, Route, route};
pub use enums::{TopicKind, TopicState};
pub use normalize::{NormalizeError, Normalizer, canonical_key};
pub use parser::{RawTopic, parse_topics};
pub use topic::{DEFAULT_DIFF_BASE, DiffRange, NormalizedTopic, Topic};
