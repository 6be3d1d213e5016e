//! # reindex-pdf
//!
//! PDF page-range text extraction for the book index re-organizer.
//!
//! A PDF carries no machine-readable TOC or index, so the caller names the
//! page ranges where those live; this crate extracts their raw text, which
//! the LLM structuring collaborator turns into the chapter and occurrence
//! lists the core engine consumes.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use reindex_pdf::{extract_pdf, PageRange};
//!
//! let raw = extract_pdf("book.pdf", PageRange::new(5, 8), PageRange::new(450, 470))?;
//! println!("{} pages, TOC text: {} chars", raw.page_count, raw.toc_raw.len());
//! # Ok::<(), reindex_pdf::PdfError>(())
//! ```

use std::path::Path;

use log::debug;
use thiserror::Error;

/// Result type alias for PDF extraction
pub type Result<T> = std::result::Result<T, PdfError>;

/// Errors that can occur during PDF text extraction
#[derive(Debug, Error)]
pub enum PdfError {
    /// PDF file missing on disk
    #[error("PDF not found: {0}")]
    NotFound(String),

    /// The PDF library failed to read the document
    #[error("Failed to parse PDF: {0}")]
    Parse(String),

    /// The document yielded no text at all, likely a scanned PDF, which
    /// needs OCR and is out of scope here
    #[error("No extractable text in {0}; scanned PDFs are not supported")]
    NoText(String),

    /// Standard I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// An inclusive, 1-based page range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageRange {
    /// First page of the range
    pub start: u32,
    /// Last page of the range (inclusive)
    pub end: u32,
}

impl PageRange {
    /// Creates a page range; `start` and `end` are 1-based and inclusive.
    #[must_use = "creates a page range"]
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }
}

/// Raw text pulled out of the TOC and index page ranges.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawExtraction {
    /// Concatenated text of the TOC pages
    pub toc_raw: String,

    /// Concatenated text of the index pages
    pub index_raw: String,

    /// Total pages in the document (used as the last chapter's end bound)
    pub page_count: u32,
}

/// Extract raw text from the TOC and index page ranges of a PDF.
///
/// Ranges are clamped to `[1, page_count]`; a range that is empty after
/// clamping yields empty text rather than an error.
///
/// # Errors
///
/// Returns an error if the file is missing, the PDF cannot be parsed, or
/// the document contains no extractable text at all.
pub fn extract_pdf<P: AsRef<Path>>(
    path: P,
    toc_range: PageRange,
    index_range: PageRange,
) -> Result<RawExtraction> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(PdfError::NotFound(path.display().to_string()));
    }

    let bytes = std::fs::read(path)?;
    let pages = pdf_extract::extract_text_from_mem_by_pages(&bytes)
        .map_err(|e| PdfError::Parse(e.to_string()))?;

    if pages.iter().all(|p| p.trim().is_empty()) {
        return Err(PdfError::NoText(path.display().to_string()));
    }

    let page_count = pages.len() as u32;
    debug!(
        "extracted {page_count} pages from {}; toc {}-{}, index {}-{}",
        path.display(),
        toc_range.start,
        toc_range.end,
        index_range.start,
        index_range.end
    );

    Ok(RawExtraction {
        toc_raw: join_range(&pages, toc_range),
        index_raw: join_range(&pages, index_range),
        page_count,
    })
}

/// Join the text of the pages in `range`, clamped to the document.
fn join_range(pages: &[String], range: PageRange) -> String {
    let start = range.start.max(1) as usize;
    let end = (range.end as usize).min(pages.len());
    if start > end {
        return String::new();
    }
    pages[start - 1..end].join("\n")
}
