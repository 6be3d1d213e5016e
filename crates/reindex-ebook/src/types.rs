/// Common types for EPUB extraction
use serde::{Deserialize, Serialize};

use reindex_core::{Chapter, IndexOccurrence};

/// Everything the core engine needs, extracted from one EPUB.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedBook {
    /// Book title (dc:title, or the file stem when metadata is missing)
    pub title: String,

    /// Chapter boundary table in reading order, positions in printed pages
    pub chapters: Vec<Chapter>,

    /// Index occurrences in the order the index markup listed them
    pub occurrences: Vec<IndexOccurrence>,
}

/// One page-reference link from the index document.
///
/// `file` is the basename of the content file the link points into; the
/// subheading lookup is scoped per file, so two files reusing the same
/// printed page range cannot bleed headings into each other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexRef {
    /// Basename of the target content file (empty for same-file links)
    pub file: String,

    /// The occurrence the link encodes
    pub occurrence: IndexOccurrence,
}

/// One pageTarget from the NCX pageList: a printed page number and the
/// content file it lands in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageTarget {
    /// Page label (e.g., "1", "{vii}", "324")
    pub label: String,

    /// Target content file (href, possibly with an anchor)
    pub href: String,
}
