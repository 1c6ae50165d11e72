//! Colour styling for queue output, using the Ayu Dark palette.
//!
//! Only states that need attention get colour: pending topics are accented,
//! finished ones are muted.

use owo_colors::OwoColorize;

use explain_core::{TopicKind, TopicState};

use crate::terminal::supports_color;

const PASS: (u8, u8, u8) = (0xc2, 0xd9, 0x4c); // #c2d94c
const WARN: (u8, u8, u8) = (0xff, 0xb4, 0x54); // #ffb454
const FAIL: (u8, u8, u8) = (0xf0, 0x71, 0x78); // #f07178
const MUTED: (u8, u8, u8) = (0x6c, 0x76, 0x80); // #6c7680
const ACCENT: (u8, u8, u8) = (0x59, 0xc2, 0xff); // #59c2ff
const KIND_SOURCE: (u8, u8, u8) = (0xd2, 0xa6, 0xff); // #d2a6ff, file/function
const KIND_SCOPE: (u8, u8, u8) = (0x95, 0xe6, 0xcb); // #95e6cb, repo/diff

pub const ICON_PENDING: &str = "\u{25CB}"; // ○
pub const ICON_DONE: &str = "\u{2713}"; // ✓
pub const ICON_SKIPPED: &str = "-";

/// Applies styles when colour is enabled and passes text through otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Styler {
    color: bool,
}

impl Styler {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    /// Colour on when the environment and terminal allow it.
    pub fn detect() -> Self {
        Self::new(supports_color())
    }

    /// Never emits escape codes.
    pub fn plain() -> Self {
        Self::new(false)
    }

    pub fn is_color(&self) -> bool {
        self.color
    }

    fn rgb(&self, s: &str, rgb: (u8, u8, u8)) -> String {
        if self.color {
            s.truecolor(rgb.0, rgb.1, rgb.2).to_string()
        } else {
            s.to_string()
        }
    }

    pub fn pass(&self, s: &str) -> String {
        self.rgb(s, PASS)
    }

    pub fn warn(&self, s: &str) -> String {
        self.rgb(s, WARN)
    }

    pub fn fail(&self, s: &str) -> String {
        self.rgb(s, FAIL)
    }

    pub fn muted(&self, s: &str) -> String {
        self.rgb(s, MUTED)
    }

    pub fn accent(&self, s: &str) -> String {
        self.rgb(s, ACCENT)
    }

    pub fn bold(&self, s: &str) -> String {
        if self.color {
            s.bold().to_string()
        } else {
            s.to_string()
        }
    }

    /// Section header, e.g. `Pending (3):`.
    pub fn header(&self, s: &str) -> String {
        if self.color {
            s.truecolor(ACCENT.0, ACCENT.1, ACCENT.2).bold().to_string()
        } else {
            s.to_string()
        }
    }

    /// `[kind]` tag coloured by what the topic points at.
    pub fn kind_tag(&self, kind: &TopicKind) -> String {
        let tag = format!("[{kind}]");
        match kind {
            TopicKind::File | TopicKind::Function => self.rgb(&tag, KIND_SOURCE),
            TopicKind::Repo | TopicKind::Diff => self.rgb(&tag, KIND_SCOPE),
            TopicKind::General => tag,
            TopicKind::Unknown(_) => self.rgb(&tag, FAIL),
        }
    }

    /// Icon for a topic state.
    pub fn state_icon(&self, state: TopicState) -> String {
        match state {
            TopicState::Pending => self.accent(ICON_PENDING),
            TopicState::Done => self.pass(ICON_DONE),
            TopicState::Skipped => self.muted(ICON_SKIPPED),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_passes_text_through() {
        let s = Styler::plain();
        assert_eq!(s.accent("x"), "x");
        assert_eq!(s.header("Pending (1):"), "Pending (1):");
        assert_eq!(s.kind_tag(&TopicKind::File), "[file]");
        assert_eq!(s.state_icon(TopicState::Done), ICON_DONE);
    }

    #[test]
    fn color_emits_escape_codes() {
        let s = Styler::new(true);
        let tagged = s.kind_tag(&TopicKind::Unknown("module".into()));
        assert!(tagged.contains("\u{1b}["));
        assert!(tagged.contains("[module]"));
        // General topics are never coloured.
        assert_eq!(s.kind_tag(&TopicKind::General), "[general]");
    }
}
