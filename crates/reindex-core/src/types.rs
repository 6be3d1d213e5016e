/// Common types shared by the extraction collaborators and the engine
use serde::{Deserialize, Serialize};

/// A chapter (or front-matter section) of the book.
///
/// `start_position` is expressed in whatever numbering scheme the extraction
/// produced: printed page numbers for both the EPUB and PDF paths. All
/// occurrences fed to the engine must use the same scheme.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Chapter {
    /// Chapter title as it appears in the table of contents
    pub title: String,

    /// First page of the chapter
    pub start_position: u32,

    /// 0-based position in the book's reading order
    pub order_index: usize,
}

impl Chapter {
    /// Creates a chapter with the given title and start page.
    ///
    /// `order_index` starts at 0; [`group_by_chapter`] reassigns it when it
    /// has to repair an unsorted boundary table.
    ///
    /// [`group_by_chapter`]: crate::engine::group_by_chapter
    #[must_use = "creates a chapter boundary entry"]
    pub fn new(title: impl Into<String>, start_position: u32, order_index: usize) -> Self {
        Self {
            title: title.into(),
            start_position,
            order_index,
        }
    }
}

/// One (term, page) pairing from the back-of-book index.
///
/// A term with k page references yields k occurrences. Invariant: `page >= 1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexOccurrence {
    /// Index term (exact string from the source, trimmed)
    pub term: String,

    /// Optional subentry qualifying the term (e.g. "sorting" under "algorithms")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subentry: Option<String>,

    /// Page the reference points at
    pub page: u32,

    /// In-chapter subheading the page falls under, when the extraction
    /// recovered one (headings between page anchors in the chapter text)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subheading: Option<String>,
}

impl IndexOccurrence {
    /// Creates an occurrence without a subentry.
    #[must_use = "creates an index occurrence"]
    pub fn new(term: impl Into<String>, page: u32) -> Self {
        Self {
            term: term.into(),
            subentry: None,
            page,
            subheading: None,
        }
    }

    /// Creates an occurrence with a subentry.
    #[must_use = "creates an index occurrence"]
    pub fn with_subentry(term: impl Into<String>, subentry: impl Into<String>, page: u32) -> Self {
        Self {
            term: term.into(),
            subentry: Some(subentry.into()),
            page,
            subheading: None,
        }
    }

    /// Attaches the in-chapter subheading the occurrence falls under.
    #[must_use = "returns the occurrence with the subheading set"]
    pub fn under_subheading(mut self, subheading: impl Into<String>) -> Self {
        self.subheading = Some(subheading.into());
        self
    }
}

/// A chapter together with its index entries in order of first appearance.
///
/// Built only by the engine; every entry's page falls within the chapter's
/// page range (the last chapter's range is open-ended, and pages before the
/// first chapter fold into the first chapter).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterGroup {
    /// The owning chapter
    pub chapter: Chapter,

    /// Entries ordered by (page ascending, extraction order for ties)
    pub entries: Vec<IndexOccurrence>,
}

/// The complete re-organized index, ready for serialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexReport {
    /// Book title for the report heading
    pub book_title: String,

    /// One group per chapter, in reading order
    pub groups: Vec<ChapterGroup>,
}

impl IndexReport {
    /// Creates a report from a title and the engine's output.
    #[must_use = "creates a report for serialization"]
    pub fn new(book_title: impl Into<String>, groups: Vec<ChapterGroup>) -> Self {
        Self {
            book_title: book_title.into(),
            groups,
        }
    }

    /// Total number of entries across all groups.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.groups.iter().map(|g| g.entries.len()).sum()
    }
}
