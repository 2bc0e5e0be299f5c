//! HTML page rendering
//!
//! Pages are built as plain strings. Every piece of record text goes through
//! [`escape_html`] before it is written.

use crate::config::RenderConfig;
use crate::output::pages::{page_file_name, RecordPage};
use crate::storage::BookRecord;
use crate::url::{image_file_name, text_file_name};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// Characters escaped when a file name is used as a URL path segment
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'\'')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Layout options for rendered pages
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Books shown side by side in one row
    pub columns: usize,
    /// Path from the pages directory to the directory holding `images/` and `books/`
    pub media_prefix: String,
}

impl RenderOptions {
    pub fn from_config(config: &RenderConfig) -> Self {
        Self {
            columns: config.columns,
            media_prefix: config.media_prefix.trim_end_matches('/').to_string(),
        }
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::from_config(&RenderConfig::default())
    }
}

/// Escapes text for use in HTML element content and attribute values
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Renders a single page of the library
pub fn render_page(page: &RecordPage<'_>, options: &RenderOptions) -> String {
    let mut html = String::new();

    html.push_str("<!doctype html>\n<html lang=\"ru\">\n<head>\n");
    html.push_str("  <meta charset=\"utf-8\">\n");
    html.push_str(
        "  <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n",
    );
    let _ = writeln!(
        html,
        "  <title>Library, page {} of {}</title>",
        page.current_page, page.total_pages
    );
    html.push_str(STYLE);
    html.push_str("</head>\n<body>\n");

    render_pagination(&mut html, page);

    html.push_str("<main>\n");
    for row in page.rows(options.columns) {
        html.push_str("  <div class=\"row\">\n");
        for record in row {
            render_card(&mut html, record, options);
        }
        html.push_str("  </div>\n");
    }
    html.push_str("</main>\n");

    render_pagination(&mut html, page);

    html.push_str("</body>\n</html>\n");
    html
}

fn render_card(html: &mut String, record: &BookRecord, options: &RenderOptions) {
    let image_src = format!(
        "{}/images/{}",
        options.media_prefix,
        utf8_percent_encode(&image_file_name(&record.image_url), PATH_SEGMENT)
    );
    let text_href = format!(
        "{}/books/{}",
        options.media_prefix,
        utf8_percent_encode(&text_file_name(&record.title), PATH_SEGMENT)
    );

    html.push_str("    <div class=\"card\">\n");
    let _ = writeln!(
        html,
        "      <img src=\"{}\" alt=\"{}\">",
        escape_html(&image_src),
        escape_html(&record.title)
    );
    html.push_str("      <div class=\"card-body\">\n");
    let _ = writeln!(
        html,
        "        <h5>{}</h5>\n        <p class=\"author\">{}</p>",
        escape_html(&record.title),
        escape_html(&record.author)
    );

    if !record.genres.is_empty() {
        let genres: Vec<String> = record.genres.iter().map(|g| escape_html(g)).collect();
        let _ = writeln!(html, "        <p class=\"genres\">{}</p>", genres.join(", "));
    }

    let _ = writeln!(
        html,
        "        <a href=\"{}\" target=\"_blank\">Читать</a>",
        escape_html(&text_href)
    );
    html.push_str("      </div>\n    </div>\n");
}

fn render_pagination(html: &mut String, page: &RecordPage<'_>) {
    if page.total_pages <= 1 {
        return;
    }

    html.push_str("<nav class=\"pagination\">\n");

    if page.has_previous() {
        let _ = writeln!(
            html,
            "  <a href=\"{}\">Назад</a>",
            page_file_name(page.current_page - 1)
        );
    } else {
        html.push_str("  <span class=\"disabled\">Назад</span>\n");
    }

    for number in 1..=page.total_pages {
        if number == page.current_page {
            let _ = writeln!(html, "  <span class=\"active\">{}</span>", number);
        } else {
            let _ = writeln!(html, "  <a href=\"{}\">{}</a>", page_file_name(number), number);
        }
    }

    if page.has_next() {
        let _ = writeln!(
            html,
            "  <a href=\"{}\">Вперёд</a>",
            page_file_name(page.current_page + 1)
        );
    } else {
        html.push_str("  <span class=\"disabled\">Вперёд</span>\n");
    }

    html.push_str("</nav>\n");
}

const STYLE: &str = r#"  <style>
    body { font-family: sans-serif; margin: 2em auto; max-width: 960px; }
    .row { display: flex; gap: 1em; margin-bottom: 1em; }
    .card { display: flex; flex: 1; gap: 1em; border: 1px solid #ddd; padding: 1em; }
    .card img { max-width: 140px; object-fit: contain; }
    .pagination { display: flex; gap: .5em; margin: 1em 0; }
    .pagination .active { font-weight: bold; }
    .pagination .disabled { color: #aaa; }
  </style>
"#;

/// Writes every page to `dir` as `index{n}.html`
///
/// Page files left over from an earlier, longer render are removed first.
///
/// # Returns
///
/// The written paths, first page first
pub fn render_pages(
    pages: &[RecordPage<'_>],
    dir: &Path,
    options: &RenderOptions,
) -> crate::Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;
    remove_stale_pages(dir)?;

    let mut written = Vec::with_capacity(pages.len());
    for page in pages {
        let path = dir.join(page.file_name());
        std::fs::write(&path, render_page(page, options))?;
        tracing::debug!("Rendered {}", path.display());
        written.push(path);
    }

    Ok(written)
}

fn remove_stale_pages(dir: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };

        let is_page = name
            .strip_prefix("index")
            .and_then(|rest| rest.strip_suffix(".html"))
            .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()));

        if is_page && entry.file_type()?.is_file() {
            std::fs::remove_file(entry.path())?;
        }
    }
    Ok(())
}
