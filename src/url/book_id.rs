//! Typed book identifiers
//!
//! Catalog links point at `/{prefix}{number}/`, e.g. `/b239/`. The text endpoint
//! wants the bare number. `BookId` keeps both forms so that nothing downstream
//! slices strings by hand.

use crate::BookIdError;
use std::fmt;
use url::Url;

/// A book identifier parsed from a catalog link
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BookId {
    segment: String,
    number: u64,
}

impl BookId {
    /// Parses a path segment such as `b239`
    ///
    /// Exactly one leading character is treated as the prefix. The rest must be
    /// ASCII digits.
    pub fn from_segment(segment: &str) -> Result<Self, BookIdError> {
        let mut chars = segment.chars();
        if chars.next().is_none() {
            return Err(BookIdError::Empty);
        }

        let digits = chars.as_str();
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(BookIdError::NotNumeric(segment.to_string()));
        }

        let number = digits
            .parse::<u64>()
            .map_err(|_| BookIdError::NotNumeric(segment.to_string()))?;

        Ok(Self {
            segment: segment.to_string(),
            number,
        })
    }

    /// Parses the id from the first path segment of a link href
    ///
    /// The href may be relative (`/b239/`) or absolute.
    pub fn from_href(href: &str, base: &Url) -> Result<Self, BookIdError> {
        let resolved = base
            .join(href.trim())
            .map_err(|_| BookIdError::NotNumeric(href.to_string()))?;

        let segment = resolved
            .path_segments()
            .and_then(|mut segments| segments.next())
            .unwrap_or("");

        Self::from_segment(segment)
    }

    /// The path segment as it appeared in the catalog, e.g. `b239`
    pub fn as_segment(&self) -> &str {
        &self.segment
    }

    /// The numeric id the text endpoint expects, e.g. `239`
    pub fn number(&self) -> u64 {
        self.number
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segment)
    }
}

/// One book row found on a catalog page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Absolute URL of the detail page
    pub detail_url: Url,

    /// Id parsed from the detail page path
    pub book_id: BookId,
}
