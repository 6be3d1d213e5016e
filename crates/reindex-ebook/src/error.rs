/// Error types for EPUB extraction
use std::io;

/// Result type alias for EPUB extraction
pub type Result<T> = std::result::Result<T, EbookError>;

/// Errors that can occur while extracting the TOC and index from an EPUB
#[derive(Debug, thiserror::Error)]
pub enum EbookError {
    /// EPUB container could not be opened or is structurally invalid
    #[error("EPUB parsing error: {0}")]
    EpubError(String),

    /// XML parsing failed (toc.ncx)
    #[error("Failed to parse XML: {0}")]
    XmlParse(String),

    /// ZIP archive extraction error
    #[error("Failed to extract ZIP: {0}")]
    ZipError(#[from] zip::result::ZipError),

    /// No index document found in the EPUB manifest
    #[error("No index document found: {0}")]
    MissingIndex(String),

    /// The EPUB carries no page-number information at all, so chapter
    /// boundaries cannot be expressed in the page scheme the engine needs
    #[error("No page numbering found: {0}")]
    NoPageNumbers(String),

    /// The navigation map yielded no chapters
    #[error("Empty table of contents: {0}")]
    EmptyToc(String),

    /// Standard I/O error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}
