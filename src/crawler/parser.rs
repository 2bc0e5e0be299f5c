//! Detail page parser
//!
//! This module turns a fetched book detail page into a [`BookRecord`]:
//! - Cover image URL (resolved against the page URL)
//! - Title and author from the `Title :: Author` heading
//! - Genre links and reader comments, in document order

use crate::storage::BookRecord;
use crate::ParseError;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Separator between title and author in the page heading
pub const TITLE_DELIMITER: &str = " :: ";

const COVER_IMAGE_SELECTOR: &str = "div.bookimage img[src]";
const HEADING_SELECTOR: &str = "h1";
const GENRE_SELECTOR: &str = "span.d_book a";
const COMMENT_SELECTOR: &str = "div.texts span.black";

/// Parses a detail page into a book record
///
/// # Arguments
///
/// * `html` - The detail page body
/// * `base_url` - URL of the detail page, used to resolve the cover image
///
/// # Returns
///
/// * `Ok(BookRecord)` - Successfully parsed page
/// * `Err(ParseError)` - The page lacks the cover image, the heading, or the
///   title/author delimiter
///
/// # Example
///
/// ```
/// use tululu_scraper::crawler::parse_book_page;
/// use url::Url;
///
/// let html = r#"<h1>Алиби &nbsp; :: &nbsp; Агата Кристи</h1>
///     <div class="bookimage"><a href="/b1/"><img src="/shots/1.jpg"></a></div>"#;
/// let base_url = Url::parse("https://tululu.org/b1/").unwrap();
/// let record = parse_book_page(html, &base_url).unwrap();
/// assert_eq!(record.title, "Алиби");
/// assert_eq!(record.author, "Агата Кристи");
/// assert_eq!(record.image_url.as_str(), "https://tululu.org/shots/1.jpg");
/// ```
pub fn parse_book_page(html: &str, base_url: &Url) -> Result<BookRecord, ParseError> {
    let document = Html::parse_document(html);

    let image_url = extract_image_url(&document, base_url)?;
    let (title, author) = extract_title_and_author(&document)?;

    Ok(BookRecord {
        title,
        author,
        image_url,
        genres: select_texts(&document, GENRE_SELECTOR),
        comments: select_texts(&document, COMMENT_SELECTOR),
    })
}

fn extract_image_url(document: &Html, base_url: &Url) -> Result<Url, ParseError> {
    let src = select_first(document, COVER_IMAGE_SELECTOR)
        .and_then(|img| img.value().attr("src"))
        .ok_or(ParseError::MissingCoverImage)?;

    base_url.join(src.trim()).map_err(|e| ParseError::BadUrl {
        href: src.to_string(),
        message: e.to_string(),
    })
}

/// Splits the heading on the first delimiter and trims both halves
fn extract_title_and_author(document: &Html) -> Result<(String, String), ParseError> {
    let heading = select_first(document, HEADING_SELECTOR)
        .map(element_text)
        .ok_or(ParseError::MissingHeading)?;

    let (title, author) = heading
        .split_once(TITLE_DELIMITER)
        .ok_or_else(|| ParseError::MissingDelimiter(heading.trim().to_string()))?;

    Ok((title.trim().to_string(), author.trim().to_string()))
}

fn select_first<'a>(document: &'a Html, css: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(css).ok()?;
    document.select(&selector).next()
}

fn select_texts(document: &Html, css: &str) -> Vec<String> {
    let Ok(selector) = Selector::parse(css) else {
        return Vec::new();
    };

    document
        .select(&selector)
        .map(|element| element_text(element).trim().to_string())
        .collect()
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect()
}
