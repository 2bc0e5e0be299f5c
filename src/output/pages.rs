//! Record set pagination

use crate::storage::BookRecord;

/// One page worth of records
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordPage<'a> {
    /// 1-based page number
    pub current_page: usize,
    /// Number of pages in the whole site
    pub total_pages: usize,
    pub records: &'a [BookRecord],
}

impl<'a> RecordPage<'a> {
    /// Records grouped into rows of `columns` books
    pub fn rows(&self, columns: usize) -> impl Iterator<Item = &'a [BookRecord]> {
        self.records.chunks(columns.max(1))
    }

    pub fn file_name(&self) -> String {
        page_file_name(self.current_page)
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }
}

/// File name of the given 1-based page
pub fn page_file_name(page: usize) -> String {
    format!("index{}.html", page)
}

/// Splits records into pages of `per_page`, keeping their order
///
/// The last page holds the remainder. An empty record set yields no pages.
pub fn paginate(records: &[BookRecord], per_page: usize) -> Vec<RecordPage<'_>> {
    let chunks: Vec<&[BookRecord]> = records.chunks(per_page.max(1)).collect();
    let total_pages = chunks.len();

    chunks
        .into_iter()
        .enumerate()
        .map(|(index, records)| RecordPage {
            current_page: index + 1,
            total_pages,
            records,
        })
        .collect()
}
