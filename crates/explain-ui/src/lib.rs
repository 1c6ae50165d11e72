//! Terminal output for explain: colour detection, Ayu-themed styles and the
//! queue listing.

pub mod listing;
pub mod styles;
pub mod terminal;

pub use listing::{render_topic_line, render_topics};
pub use styles::Styler;
