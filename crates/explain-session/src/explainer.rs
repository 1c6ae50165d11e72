//! The [`Explainer`] collaborator: everything between a route and the text
//! of its explanation.

use std::path::PathBuf;

use explain_core::Route;

use crate::error::ExplainError;

/// A finished explanation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Explanation {
    /// Full explanation text, including any "Topics to Explore" section.
    pub text: String,
    /// Where the explanation was written, if it was.
    pub output_path: Option<PathBuf>,
}

impl Explanation {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            output_path: None,
        }
    }

    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = Some(path.into());
        self
    }
}

/// Produces an explanation for a routed topic.
///
/// Implementations build the prompt, call the model and may write the
/// result somewhere. They never touch the queue.
pub trait Explainer {
    fn explain(&mut self, route: &Route) -> Result<Explanation, ExplainError>;
}

impl<F> Explainer for F
where
    F: FnMut(&Route) -> Result<Explanation, ExplainError>,
{
    fn explain(&mut self, route: &Route) -> Result<Explanation, ExplainError> {
        self(route)
    }
}
