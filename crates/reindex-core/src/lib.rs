//! # reindex-core
//!
//! Core of the book index re-organizer: the data model, the
//! mapping-and-ordering engine, and the Markdown report serializer.
//!
//! The engine takes a chapter boundary table and a flat list of index
//! occurrences (both produced by the extraction crates) and groups the
//! occurrences per chapter in order of first appearance.
//!
//! ## Quick Start
//!
//! ```rust
//! use reindex_core::{group_by_chapter, Chapter, IndexOccurrence};
//!
//! let chapters = vec![
//!     Chapter::new("Intro", 1, 0),
//!     Chapter::new("Chapter 1", 10, 1),
//! ];
//! let occurrences = vec![
//!     IndexOccurrence::new("Gathering", 9),
//!     IndexOccurrence::new("Decision", 10),
//!     IndexOccurrence::new("Gathering", 11),
//! ];
//!
//! let groups = group_by_chapter(&chapters, &occurrences)?;
//! assert_eq!(groups[0].entries.len(), 1); // Gathering@9 → Intro
//! assert_eq!(groups[1].entries.len(), 2); // Decision@10, Gathering@11 → Chapter 1
//! # Ok::<(), reindex_core::CoreError>(())
//! ```
//!
//! This crate is pure: no I/O, no network, no ambient configuration. The
//! extraction collaborators (`reindex-ebook`, `reindex-pdf` + `reindex-llm`)
//! produce the two input sequences; `reindex-cli` wires everything together.

pub mod engine;
pub mod error;
pub mod serializer;
pub mod types;

pub use engine::group_by_chapter;
pub use error::{CoreError, Result};
pub use serializer::{safe_output_filename, MarkdownOptions, MarkdownSerializer};
pub use types::{Chapter, ChapterGroup, IndexOccurrence, IndexReport};
