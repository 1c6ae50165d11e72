//! Enum types for the exploration queue.
//!
//! [`TopicKind`] keeps unknown strings in an `Unknown(String)` fallback so a
//! damaged queue file still loads and the bad record can be inspected and
//! skipped. [`TopicState`] has no fallback: an unknown state is treated as a
//! corrupt store.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

// ---------------------------------------------------------------------------
// Macro: defines an enum with known string variants + an Unknown(String) fallback.
// ---------------------------------------------------------------------------
macro_rules! define_enum {
    (
        $(#[$meta:meta])*
        $name:ident, default = $default:ident, custom_variant = $custom_variant:ident,
        variants: [
            $( ($variant:ident, $str:expr) ),+ $(,)?
        ]
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $variant, )+
            $custom_variant(String),
        }

        impl $name {
            /// All built-in variants, in declaration order.
            pub const BUILTIN: &'static [$name] = &[ $( Self::$variant, )+ ];

            /// Returns the string representation.
            pub fn as_str(&self) -> &str {
                match self {
                    $( Self::$variant => $str, )+
                    Self::$custom_variant(s) => s.as_str(),
                }
            }

            /// Returns `true` if this is the default variant.
            pub fn is_default(&self) -> bool {
                *self == Self::$default
            }

            /// Returns `true` if this is a built-in (non-fallback) variant.
            pub fn is_builtin(&self) -> bool {
                !matches!(self, Self::$custom_variant(_))
            }

            /// Parses a built-in variant, returning `None` for anything else.
            pub fn parse_builtin(s: &str) -> Option<Self> {
                match s {
                    $( $str => Some(Self::$variant), )+
                    _ => None,
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::$default
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                Ok(Self::from(s))
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                match s {
                    $( $str => Self::$variant, )+
                    other => Self::$custom_variant(other.to_owned()),
                }
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                // Check known variants first to avoid allocation in common case.
                match s.as_str() {
                    $( $str => Self::$variant, )+
                    _ => Self::$custom_variant(s),
                }
            }
        }
    };
}

// ===========================================================================
// TopicKind
// ===========================================================================

define_enum! {
    /// What a topic points at, and therefore which handler explains it.
    TopicKind, default = General, custom_variant = Unknown,
    variants: [
        (File, "file"),
        (Function, "function"),
        (Repo, "repo"),
        (Diff, "diff"),
        (General, "general"),
    ]
}

impl TopicKind {
    /// Parses a kind tag case-insensitively (`[File]`, `[function]`, ...).
    pub fn parse_tag(tag: &str) -> Option<Self> {
        Self::parse_builtin(&tag.trim().to_ascii_lowercase())
    }
}

// ===========================================================================
// TopicState
// ===========================================================================

/// Lifecycle state of a queued topic.
///
/// Transitions only go forward: `pending -> done` or `pending -> skipped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TopicState {
    #[default]
    Pending,
    Done,
    Skipped,
}

impl TopicState {
    /// Returns the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Done => "done",
            Self::Skipped => "skipped",
        }
    }

    /// Returns `true` for `done` and `skipped`, which never change again.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for TopicState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
