//! Mapping from a queued topic to the handler that explains it.

use crate::enums::TopicKind;
use crate::topic::{DiffRange, Topic};

/// A handler and its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    File { path: String },
    Function { path: String, symbol: String },
    Repo { path: String },
    Diff(DiffRange),
    /// Free text used as an ad-hoc prompt subject.
    General { subject: String },
}

impl Route {
    /// Name of the handler this route targets.
    pub fn handler_name(&self) -> &'static str {
        match self {
            Self::File { .. } => "file",
            Self::Function { .. } => "function",
            Self::Repo { .. } => "repo",
            Self::Diff(_) => "diff",
            Self::General { .. } => "general",
        }
    }
}

/// The topic cannot be mapped to any handler.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    #[error("topic '{key}' has kind '{kind}' which no handler explains")]
    Unroutable { key: String, kind: String },
}

/// Routes `topic` to its handler. Pure; never touches the queue.
pub fn route(topic: &Topic) -> Result<Route, DispatchError> {
    let unroutable = || DispatchError::Unroutable {
        key: topic.canonical_key(),
        kind: topic.kind.to_string(),
    };

    let route = match &topic.kind {
        TopicKind::File => Route::File {
            path: topic.target.clone(),
        },
        TopicKind::Function => {
            let (path, symbol) = topic
                .target
                .rsplit_once(':')
                .filter(|(p, s)| !p.trim().is_empty() && !s.trim().is_empty())
                .ok_or_else(unroutable)?;
            Route::Function {
                path: path.trim().to_string(),
                symbol: symbol.trim().to_string(),
            }
        }
        TopicKind::Repo => Route::Repo {
            path: topic.target.clone(),
        },
        TopicKind::Diff => Route::Diff(DiffRange::from_target(&topic.target)),
        TopicKind::General => Route::General {
            subject: topic.target.clone(),
        },
        TopicKind::Unknown(_) => return Err(unroutable()),
    };
    Ok(route)
}
