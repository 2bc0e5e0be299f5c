//! Local filename derivation
//!
//! Titles and URL segments come from the remote site and end up as file names
//! under the books and images directories. Everything here returns a single
//! path component that is valid on common filesystems.

use percent_encoding::percent_decode_str;
use url::Url;

/// Extension appended to downloaded text editions
pub const TEXT_EXTENSION: &str = "txt";

/// Longest filename most filesystems accept, in bytes
const MAX_FILENAME_BYTES: usize = 255;

/// Characters that are reserved on at least one common filesystem
const RESERVED_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Device names Windows refuses as file stems
const RESERVED_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Makes a title safe to use as a file name
///
/// Control characters and reserved characters are removed, surrounding
/// whitespace and trailing dots are trimmed and the result is capped at 255
/// bytes. An empty result becomes `_`; reserved device names get a `_` after
/// the stem, so `nul.txt` becomes `nul_.txt`.
///
/// # Examples
///
/// ```
/// use tululu_scraper::url::sanitize_filename;
///
/// assert_eq!(sanitize_filename("Что делать?"), "Что делать");
/// assert_eq!(sanitize_filename("a/b\\c"), "abc");
/// ```
pub fn sanitize_filename(name: &str) -> String {
    sanitize_within(name, MAX_FILENAME_BYTES)
}

/// File name of the text edition of a book with the given title
///
/// The title part is capped so that the name with its extension still fits
/// in 255 bytes.
pub fn text_file_name(title: &str) -> String {
    let max_stem = MAX_FILENAME_BYTES - TEXT_EXTENSION.len() - 1;
    format!("{}.{}", sanitize_within(title, max_stem), TEXT_EXTENSION)
}

fn sanitize_within(name: &str, max: usize) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| !c.is_control() && !RESERVED_CHARS.contains(c))
        .collect();

    let mut result = trim_to(cleaned.trim(), max).to_string();
    if result.is_empty() {
        return "_".to_string();
    }

    let stem_len = result.find('.').unwrap_or(result.len());
    if RESERVED_NAMES
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(result[..stem_len].trim()))
    {
        result.insert(stem_len, '_');
        result = trim_to(&result, max).to_string();
    }

    result
}

/// Truncates to `max` bytes and drops trailing dots and whitespace
fn trim_to(s: &str, max: usize) -> &str {
    truncate_to_bytes(s, max).trim_end_matches(|c: char| c == '.' || c.is_whitespace())
}

/// File name of a cover image: the final path segment, percent-decoded
///
/// # Examples
///
/// ```
/// use tululu_scraper::url::image_file_name;
/// use url::Url;
///
/// let url = Url::parse("https://tululu.org/shots/%D0%BA%D0%BE%D1%82.jpg").unwrap();
/// assert_eq!(image_file_name(&url), "кот.jpg");
/// ```
pub fn image_file_name(url: &Url) -> String {
    let segment = url
        .path_segments()
        .and_then(|segments| segments.last())
        .unwrap_or("");

    let decoded = percent_decode_str(segment).decode_utf8_lossy();
    sanitize_filename(&decoded)
}

/// Truncates a string to at most `max` bytes on a character boundary
fn truncate_to_bytes(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }

    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
