/// Book state definitions for tracking pipeline progress
///
/// This module defines all possible states a catalog entry can be in while the
/// coordinator processes it.
use std::fmt;

/// Represents the current state of a catalog entry in the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BookState {
    // ===== Active States =====
    /// Detail page is being fetched
    Fetching,

    /// Detail page is being parsed into a record
    Parsing,

    /// Cover image and text edition are being downloaded
    Downloading,

    // ===== Terminal States =====
    /// Record was appended to the record set
    Recorded,

    /// Detail page was missing or unreachable; no record exists
    Skipped,
}

impl BookState {
    /// Returns true if this is a terminal state (no further processing needed)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Recorded | Self::Skipped)
    }

    /// Returns true if a record for the book ends up in the record set
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Recorded)
    }

    /// Returns true if moving from `self` to `next` is a legal step
    ///
    /// Downloading is optional: a parsed book may be recorded directly when
    /// both asset downloads are disabled. Only fetching can end in a skip.
    pub fn can_transition_to(&self, next: BookState) -> bool {
        matches!(
            (self, next),
            (Self::Fetching, Self::Parsing)
                | (Self::Fetching, Self::Skipped)
                | (Self::Parsing, Self::Downloading)
                | (Self::Parsing, Self::Recorded)
                | (Self::Downloading, Self::Recorded)
        )
    }

    /// Short lowercase name used in log lines
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fetching => "fetching",
            Self::Parsing => "parsing",
            Self::Downloading => "downloading",
            Self::Recorded => "recorded",
            Self::Skipped => "skipped",
        }
    }

    /// Returns all possible book states
    pub fn all_states() -> Vec<Self> {
        vec![
            Self::Fetching,
            Self::Parsing,
            Self::Downloading,
            Self::Recorded,
            Self::Skipped,
        ]
    }
}

impl fmt::Display for BookState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
