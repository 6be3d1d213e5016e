//! # reindex-ebook
//!
//! EPUB extraction for the book index re-organizer.
//!
//! Parses an EPUB's table of contents, NCX pageList, and back-of-book index
//! markup into the chapter boundary table and occurrence list consumed by
//! [`reindex_core::group_by_chapter`]. Both are expressed in printed page
//! numbers, the same scheme the PDF path uses.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use reindex_ebook::parse_epub;
//!
//! let book = parse_epub("novel.epub")?;
//! println!("Title: {}", book.title);
//! for chapter in &book.chapters {
//!     println!("  {} starts at p. {}", chapter.title, chapter.start_position);
//! }
//! println!("{} index occurrences", book.occurrences.len());
//! # Ok::<(), reindex_ebook::EbookError>(())
//! ```

pub mod epub;
pub mod error;
pub mod headings;
pub mod index;
pub mod pages;
pub mod types;

pub use crate::epub::parse_epub;
pub use error::{EbookError, Result};
pub use index::{parse_index_document, parse_index_refs};
pub use types::{ExtractedBook, IndexRef, PageTarget};
